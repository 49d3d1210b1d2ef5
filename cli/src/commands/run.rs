//! 单次执行：运行脚本并把结果 JSON 打印到 stdout

use dltrigger_core::api::{AppConfig, TriggerExecutor};

use crate::commands::cli::RunArgs;
use crate::error::CliError;

/// 返回进程退出码：成功 0，脚本失败 1
pub async fn handle_run(args: &RunArgs, cfg: &AppConfig) -> Result<u8, CliError> {
    let executor = TriggerExecutor::new(cfg.script.clone());
    let outcome = executor.execute(args.force).await?;

    let json = serde_json::to_string_pretty(&outcome)?;
    println!("{json}");

    Ok(if outcome.success { 0 } else { 1 })
}
