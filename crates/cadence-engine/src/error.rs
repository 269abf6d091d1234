use crate::settings::ConfigError;

/// Errors surfaced to the caller of a run sequence.
///
/// Everything here is fatal for the run: once returned, no loop is running and
/// the application will not receive further tick/render callbacks.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("application create callback failed")]
    Create(#[source] anyhow::Error),

    #[error("application start callback failed")]
    Start(#[source] anyhow::Error),

    #[error("plugin `{name}` failed to initialize")]
    Plugin {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("host platform failure")]
    Host(#[source] anyhow::Error),

    #[error("failed to spawn {name} loop thread")]
    Spawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("application dispose callback failed")]
    Dispose(#[source] anyhow::Error),
}

pub type Result<T, E = RuntimeError> = std::result::Result<T, E>;
