//! Stable re-exports for consumers (`cli` and integration tests).
//!
//! Prefer importing from `dltrigger_core::api` instead of reaching into internal modules.

pub use crate::config::{load, AppConfig, LoggingConfig, ScriptConfig, ServerConfig};
pub use crate::error::{ConfigError, TriggerError};
pub use crate::executor::{TriggerExecutor, TriggerOutcome};
pub use crate::parser::{parse_output, strip_ansi, tail_chars, FileState, FileStatus, ParsedOutput};
pub use crate::runner::{run_script, RawProcessResult, ScriptInvocation};
