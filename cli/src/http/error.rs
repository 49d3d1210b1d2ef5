//! HTTP 错误类型与状态码映射

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dltrigger_core::api::TriggerError;
use thiserror::Error;

use crate::http::models::{ErrorResponse, PrettyJson, TriggerErrorResponse};

#[derive(Debug, Error)]
pub enum HttpServerError {
    /// 脚本超时，已被终止
    #[error("timeout")]
    Timeout,

    /// 脚本无法启动或读取输出失败
    #[error("{0}")]
    Execution(String),

    #[error("Not found")]
    NotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// handler panic
    #[error("internal error")]
    Internal,
}

impl From<TriggerError> for HttpServerError {
    fn from(e: TriggerError) -> Self {
        if e.is_timeout() {
            HttpServerError::Timeout
        } else {
            HttpServerError::Execution(e.to_string())
        }
    }
}

impl HttpServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            HttpServerError::NotFound => StatusCode::NOT_FOUND,
            HttpServerError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            HttpServerError::Timeout
            | HttpServerError::Execution(_)
            | HttpServerError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            HttpServerError::NotFound | HttpServerError::MethodNotAllowed => PrettyJson(
                status,
                ErrorResponse {
                    error: self.to_string(),
                },
            )
            .into_response(),
            _ => PrettyJson(
                status,
                TriggerErrorResponse {
                    success: false,
                    error: self.to_string(),
                },
            )
            .into_response(),
        }
    }
}
