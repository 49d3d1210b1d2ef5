//! tracing 初始化：stdout 输出，可选按天滚动的日志文件

use dltrigger_core::api::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::error::CliError;

/// 初始化全局 subscriber。`RUST_LOG` 优先于配置中的 level。
///
/// 返回的 guard 必须在 main 中持有，否则文件日志会丢失尾部内容。
pub fn init_logging(cfg: &LoggingConfig) -> Result<Option<WorkerGuard>, CliError> {
    let filter = build_filter(cfg)?;

    let stdout_layer = fmt::layer().with_target(false);

    let (file_layer, guard) = match cfg.dir.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, &cfg.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer).boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))?;

    Ok(guard)
}

fn build_filter(cfg: &LoggingConfig) -> Result<EnvFilter, CliError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&cfg.level).map_err(|e| CliError::Logging(format!("invalid level {:?}: {e}", cfg.level)))
}
