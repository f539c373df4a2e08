// start
// macro to be included once in the lib.rs of a crate that declares plugins
/// Include the `PluginRegistry` emitted by `build!` (placed in
/// `OUT_DIR/plugweave.rs`, or the file named in `[output] file`).
#[macro_export]
macro_rules! start {
    () => {
        include!(concat!(env!("OUT_DIR"), "/plugweave.rs"));
    };
    ($file:literal) => {
        include!(concat!(env!("OUT_DIR"), "/", $file));
    };
}
