//! 共享状态

use std::sync::Arc;

use dltrigger_core::api::TriggerExecutor;

/// 路由共享状态，只读，请求之间无可变共享
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<TriggerExecutor>,
}

impl AppState {
    pub fn new(executor: TriggerExecutor) -> Self {
        Self {
            executor: Arc::new(executor),
        }
    }
}
