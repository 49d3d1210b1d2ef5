use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub script: ScriptConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// How the download script is launched and how much of its output is echoed back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptConfig {
    #[serde(default = "default_script_path")]
    pub path: String,

    /// Program used to run `path`. Empty means exec the script directly.
    #[serde(default = "default_interpreter")]
    pub interpreter: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Time between SIGTERM and SIGKILL when a timed out script is torn down.
    #[serde(default = "default_kill_grace_ms")]
    pub kill_grace_ms: u64,

    #[serde(default = "default_stdout_tail_chars")]
    pub stdout_tail_chars: usize,

    #[serde(default = "default_stderr_tail_chars")]
    pub stderr_tail_chars: usize,
}

fn default_script_path() -> String {
    "/app/download.sh".to_string()
}

fn default_interpreter() -> String {
    "bash".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_kill_grace_ms() -> u64 {
    2_000
}

fn default_stdout_tail_chars() -> usize {
    2_000
}

fn default_stderr_tail_chars() -> usize {
    500
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            path: default_script_path(),
            interpreter: default_interpreter(),
            timeout_secs: default_timeout_secs(),
            kill_grace_ms: default_kill_grace_ms(),
            stdout_tail_chars: default_stdout_tail_chars(),
            stderr_tail_chars: default_stderr_tail_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily rolling log files; stdout only when unset.
    #[serde(default)]
    pub dir: Option<String>,

    #[serde(default = "default_log_file_prefix")]
    pub file_prefix: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file_prefix() -> String {
    "dltrigger.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
            file_prefix: default_log_file_prefix(),
        }
    }
}
