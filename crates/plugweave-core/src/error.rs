use thiserror::Error as ThisError;

///
/// PluginError
///
/// Raised by plugin hooks at run time. Build-time discovery never produces
/// these; it degrades to diagnostics instead.
///

#[derive(Debug, ThisError)]
pub enum PluginError {
    #[error("plugin '{id}' failed to initialize: {message}")]
    Initialize { id: String, message: String },

    #[error("duplicate plugin id '{0}'")]
    DuplicateId(String),
}

impl PluginError {
    /// Construct an initialization failure for the plugin with the given id.
    pub fn initialize(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Initialize {
            id: id.into(),
            message: message.into(),
        }
    }
}
