//! HTTP 请求/响应模型

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".into(),
        }
    }
}

/// 404/405 等路由级错误
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// 脚本执行失败（超时或无法启动）
#[derive(Debug, Serialize, Deserialize)]
pub struct TriggerErrorResponse {
    pub success: bool,
    pub error: String,
}

/// 2 空格缩进的 JSON 响应
#[derive(Debug)]
pub struct PrettyJson<T>(pub StatusCode, pub T);

impl<T: Serialize> PrettyJson<T> {
    pub fn ok(body: T) -> Self {
        Self(StatusCode::OK, body)
    }
}

impl<T: Serialize> IntoResponse for PrettyJson<T> {
    fn into_response(self) -> Response {
        let PrettyJson(status, body) = self;
        match serde_json::to_vec_pretty(&body) {
            Ok(bytes) => (
                status,
                [(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                )],
                bytes,
            )
                .into_response(),
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize response body");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    [(
                        header::CONTENT_TYPE,
                        HeaderValue::from_static("application/json"),
                    )],
                    r#"{"success": false, "error": "serialization failed"}"#,
                )
                    .into_response()
            }
        }
    }
}
