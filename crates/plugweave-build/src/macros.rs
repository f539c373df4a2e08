//! Build-script helper that runs plugin discovery for the current crate and
//! writes the registry that `start!` includes.
//!
//! Use from a `build.rs` whose `main` returns a `Result` with a boxed error.
#[macro_export]
macro_rules! build {
    () => {
        //
        // CARGO
        //
        // rerun for the build script itself, then for every input the
        // generation pass read
        //

        println!("cargo:rerun-if-changed=build.rs");

        // add the cfg flag
        println!("cargo:rustc-check-cfg=cfg(plugweave)");
        println!("cargo:rustc-cfg=plugweave");

        //
        // REGISTRY CODE
        //

        let report = $crate::run_from_env()?;

        for input in &report.inputs {
            println!("cargo:rerun-if-changed={}", input.display());
        }
    };
}
