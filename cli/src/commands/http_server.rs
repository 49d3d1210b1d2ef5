//! HTTP服务器命令处理器

use dltrigger_core::api::{AppConfig, TriggerExecutor};

use crate::error::CliError;
use crate::http::{server, AppState};

/// 处理 serve 命令
pub async fn handle_http_server(cfg: &AppConfig) -> Result<(), CliError> {
    let state = AppState::new(TriggerExecutor::new(cfg.script.clone()));

    tracing::info!(
        "Starting HTTP server on {}:{} (script: {}, timeout: {}s)",
        cfg.server.host,
        cfg.server.port,
        cfg.script.path,
        cfg.script.timeout_secs
    );

    server::start_server(&cfg.server, state)
        .await
        .map_err(CliError::Server)
}
