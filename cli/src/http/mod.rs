//! HTTP 触发服务：路由、错误映射、中间件、生命周期

pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod state;

pub use state::AppState;
