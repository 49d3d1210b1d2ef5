use dltrigger_core::api::{ConfigError, TriggerError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Trigger(#[from] TriggerError),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error("failed to render outcome")]
    Output(#[from] serde_json::Error),

    #[error("server error: {0}")]
    Server(#[source] anyhow::Error),
}
