//! HTTP路由handlers

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use dltrigger_core::api::TriggerOutcome;

use crate::http::{
    error::HttpServerError,
    models::{HealthResponse, PrettyJson},
    state::AppState,
};

/// 创建所有路由
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // HEAD must not start a download
        .route(
            "/trigger-download",
            get(trigger_download_handler).head(method_not_allowed_handler),
        )
        .route("/health", get(health_handler))
        .fallback(not_found_handler)
        .method_not_allowed_fallback(method_not_allowed_handler)
        .with_state(state)
}

/// `force=true` 才是强制模式，其它取值或缺省均为普通模式
fn is_forced(params: &HashMap<String, String>) -> bool {
    params.get("force").is_some_and(|v| v == "true")
}

/// GET /trigger-download[?force=true] - 运行下载脚本
///
/// 脚本本身失败（非零退出码、输出中的 ✗ 行）仍返回 200，由 `success` 字段表达。
async fn trigger_download_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<PrettyJson<TriggerOutcome>, HttpServerError> {
    let force = is_forced(&params);
    let outcome = state.executor.execute(force).await?;
    Ok(PrettyJson::ok(outcome))
}

/// GET /health - 健康检查
async fn health_handler() -> PrettyJson<HealthResponse> {
    PrettyJson::ok(HealthResponse::ok())
}

async fn not_found_handler() -> HttpServerError {
    HttpServerError::NotFound
}

async fn method_not_allowed_handler() -> HttpServerError {
    HttpServerError::MethodNotAllowed
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use dltrigger_core::api::{ScriptConfig, TriggerExecutor};
    use pretty_assertions::assert_eq;
    use std::path::{Path, PathBuf};
    use std::time::{Duration, Instant};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn write_script(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("download.sh");
        std::fs::write(&path, format!("#!/usr/bin/env bash\n{body}\n")).unwrap();
        path
    }

    fn create_test_state(script: &Path, timeout_secs: u64) -> AppState {
        AppState::new(TriggerExecutor::new(ScriptConfig {
            path: script.display().to_string(),
            timeout_secs,
            kill_grace_ms: 200,
            ..ScriptConfig::default()
        }))
    }

    async fn get(app: Router, uri: &str) -> Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn assert_json_content_type(response: &Response) {
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_health_handler() {
        let dir = TempDir::new().unwrap();
        let app = create_router(create_test_state(&dir.path().join("unused.sh"), 5));

        let response = get(app, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_json_content_type(&response);
        assert_eq!(json_body(response).await, serde_json::json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let dir = TempDir::new().unwrap();
        let app = create_router(create_test_state(&dir.path().join("unused.sh"), 5));

        let response = get(app, "/nonexistent-path").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_json_content_type(&response);
        assert_eq!(
            json_body(response).await,
            serde_json::json!({"error": "Not found"})
        );
    }

    #[tokio::test]
    async fn test_post_is_405() {
        let dir = TempDir::new().unwrap();
        let app = create_router(create_test_state(&dir.path().join("unused.sh"), 5));

        let request = Request::builder()
            .method("POST")
            .uri("/trigger-download")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            json_body(response).await,
            serde_json::json!({"error": "Method not allowed"})
        );
    }

    #[tokio::test]
    async fn test_head_is_405_and_does_not_run_script() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("ran.txt");
        let script = write_script(&dir, &format!("touch \"{}\"", marker.display()));
        let app = create_router(create_test_state(&script, 5));

        let request = Request::builder()
            .method("HEAD")
            .uri("/trigger-download?force=true")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(!marker.exists(), "HEAD ran the download script");
    }

    #[tokio::test]
    async fn test_trigger_force_passes_flag() {
        let dir = TempDir::new().unwrap();
        let args_file = dir.path().join("args.txt");
        let script = write_script(
            &dir,
            &format!(
                "echo \"$@\" > \"{}\"\nprintf '✓ Downloaded: a.txt\\nAlready exists: b.txt\\n'\nexit 0",
                args_file.display()
            ),
        );
        let app = create_router(create_test_state(&script, 10));

        let response = get(app, "/trigger-download?force=true").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_json_content_type(&response);

        let body = json_body(response).await;
        assert_eq!(body["success"], serde_json::json!(true));
        assert_eq!(
            body["files"],
            serde_json::json!([
                {"file": "a.txt", "status": "downloaded"},
                {"file": "b.txt", "status": "exists"}
            ])
        );
        assert!(body.get("errors").is_none());
        assert_eq!(std::fs::read_to_string(&args_file).unwrap().trim(), "--force");
    }

    #[tokio::test]
    async fn test_trigger_without_query_is_not_forced() {
        let dir = TempDir::new().unwrap();
        let args_file = dir.path().join("args.txt");
        let script = write_script(&dir, &format!("echo \"$@\" > \"{}\"", args_file.display()));
        let state = create_test_state(&script, 10);

        for uri in ["/trigger-download", "/trigger-download?force=false", "/trigger-download?force"] {
            let response = get(create_router(state.clone()), uri).await;
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
            assert_eq!(std::fs::read_to_string(&args_file).unwrap().trim(), "", "{uri}");
        }
    }

    #[tokio::test]
    async fn test_force_query_order_does_not_matter() {
        let dir = TempDir::new().unwrap();
        let args_file = dir.path().join("args.txt");
        let script = write_script(&dir, &format!("echo \"$@\" > \"{}\"", args_file.display()));
        let app = create_router(create_test_state(&script, 10));

        let response = get(app, "/trigger-download?verbose=1&force=true").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(std::fs::read_to_string(&args_file).unwrap().trim(), "--force");
    }

    #[tokio::test]
    async fn test_script_failure_is_still_200() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "echo \"✗ network error\"\nexit 1");
        let app = create_router(create_test_state(&script, 10));

        let response = get(app, "/trigger-download").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], serde_json::json!(false));
        assert_eq!(body["errors"], serde_json::json!(["network error"]));
        assert_eq!(body["files"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_timeout_is_500() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "sleep 30");
        let app = create_router(create_test_state(&script, 1));

        let started = Instant::now();
        let response = get(app, "/trigger-download").await;
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_json_content_type(&response);
        assert_eq!(
            json_body(response).await,
            serde_json::json!({"success": false, "error": "timeout"})
        );
    }

    #[tokio::test]
    async fn test_spawn_failure_is_500_with_message() {
        let dir = TempDir::new().unwrap();
        let state = AppState::new(TriggerExecutor::new(ScriptConfig {
            path: dir.path().join("download.sh").display().to_string(),
            interpreter: "/nonexistent/dltrigger-shell".into(),
            ..ScriptConfig::default()
        }));

        let response = get(create_router(state), "/trigger-download").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["success"], serde_json::json!(false));
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("/nonexistent/dltrigger-shell"));
    }

    #[test]
    fn test_is_forced() {
        let mut params = HashMap::new();
        assert!(!is_forced(&params));
        params.insert("force".to_string(), "TRUE".to_string());
        assert!(!is_forced(&params));
        params.insert("force".to_string(), "true".to_string());
        assert!(is_forced(&params));
    }
}
