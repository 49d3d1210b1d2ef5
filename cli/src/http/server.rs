//! HTTP服务器生命周期管理

use std::future::Future;
use std::net::SocketAddr;

use axum::{middleware, Router};
use dltrigger_core::api::ServerConfig;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use crate::http::{
    middleware::{create_catch_panic_layer, request_logger},
    routes::create_router,
    AppState,
};

/// 路由 + 中间件
pub fn build_app(state: AppState) -> Router {
    create_router(state)
        .layer(create_catch_panic_layer())
        .layer(middleware::from_fn(request_logger))
}

/// 启动HTTP服务器，Ctrl+C 或 SIGTERM 时优雅关闭
pub async fn start_server(config: &ServerConfig, state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(&addr).await?;

    serve(listener, state, wait_for_shutdown()).await
}

/// 在已绑定的 listener 上服务，`shutdown` 完成后停止接收新连接
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local = listener.local_addr()?;
    info!("Trigger server running on http://{}", local);
    info!("  GET /trigger-download - Run {}", state.executor.script().path);
    info!("  GET /trigger-download?force=true - Run with --force");
    info!("  GET /health - Health check");

    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn wait_for_shutdown() {
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C signal");
        }
        _ = wait_for_sigterm() => {
            info!("Received SIGTERM signal");
        }
    }
    info!("Starting graceful shutdown...");
}

/// 等待 SIGTERM 信号（Unix系统）
#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            tracing::warn!("Failed to setup SIGTERM handler: {}", e);
            std::future::pending::<()>().await
        }
    }
}

/// Windows 系统不支持 SIGTERM，使用空操作
#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending::<()>().await
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use dltrigger_core::api::{ScriptConfig, TriggerExecutor};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    async fn raw_get(addr: SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut buf = String::new();
        stream.read_to_string(&mut buf).await.unwrap();
        buf
    }

    #[tokio::test]
    async fn test_server_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("download.sh");
        std::fs::write(&script, "echo \"✓ Downloaded: a.txt\"\n").unwrap();

        let state = AppState::new(TriggerExecutor::new(ScriptConfig {
            path: script.display().to_string(),
            timeout_secs: 10,
            ..ScriptConfig::default()
        }));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server_handle = tokio::spawn(serve(listener, state, async move {
            let _ = shutdown_rx.await;
        }));

        let health = raw_get(addr, "/health").await;
        assert!(health.starts_with("HTTP/1.1 200"), "{health}");
        assert!(health.to_ascii_lowercase().contains("content-type: application/json"));
        assert!(health.contains("\"status\": \"ok\""));

        let trigger = raw_get(addr, "/trigger-download").await;
        assert!(trigger.starts_with("HTTP/1.1 200"), "{trigger}");
        assert!(trigger.contains("\"file\": \"a.txt\""));

        let missing = raw_get(addr, "/nope").await;
        assert!(missing.starts_with("HTTP/1.1 404"), "{missing}");

        let _ = shutdown_tx.send(());
        let result = tokio::time::timeout(Duration::from_secs(5), server_handle).await;
        assert!(result.is_ok(), "Server should shutdown gracefully");
    }
}
