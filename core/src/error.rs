use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(String),

    #[error("config read error: {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),

    #[error("env var invalid: {key}")]
    EnvInvalid {
        key: String,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("timeout")]
    Timeout { secs: u64 },

    #[error("failed to spawn process: {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("io error while reading {stream}: {source}")]
    StreamIo {
        stream: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for process: {0}")]
    Wait(#[source] std::io::Error),
}

impl TriggerError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TriggerError::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_is_bare() {
        let err = TriggerError::Timeout { secs: 300 };
        assert_eq!(err.to_string(), "timeout");
        assert!(err.is_timeout());
    }

    #[test]
    fn spawn_message_names_program() {
        let err = TriggerError::Spawn {
            program: "/app/download.sh".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/app/download.sh"));
        assert!(msg.contains("No such file"));
        assert!(!err.is_timeout());
    }
}
