//! Startup configuration.
//!
//! - `types.rs` (data structures + defaults)
//! - `load.rs`  (IO: file lookup + env overrides + validation)

mod load;
mod types;

pub use load::{apply_env_overrides, load, parse_str, validate};
pub use types::{AppConfig, LoggingConfig, ScriptConfig, ServerConfig};
