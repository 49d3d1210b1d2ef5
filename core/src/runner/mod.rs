mod exit;
mod process_group;

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;

use crate::config::ScriptConfig;
use crate::error::TriggerError;

pub use exit::normalize_exit;

const FORCE_FLAG: &str = "--force";
const DRAIN_AFTER_KILL: Duration = Duration::from_secs(1);

/// Program and argv for one script run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptInvocation {
    pub program: String,
    pub args: Vec<String>,
}

impl ScriptInvocation {
    pub fn from_config(cfg: &ScriptConfig, force: bool) -> Self {
        let (program, mut args) = if cfg.interpreter.trim().is_empty() {
            (cfg.path.clone(), Vec::new())
        } else {
            (cfg.interpreter.clone(), vec![cfg.path.clone()])
        };
        if force {
            args.push(FORCE_FLAG.to_string());
        }
        Self { program, args }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProcessResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
    pub duration_ms: u64,
}

/// Spawn the script, drain both pipes concurrently and wait up to `timeout`.
///
/// One deadline covers both the exit of the script and the end of its output:
/// a background child that keeps stdout/stderr open past the deadline counts
/// as a timeout. A timed out run has its whole process group terminated before
/// this returns; the result then carries `timed_out = true`, exit code -1 and
/// whatever output was flushed before the kill.
pub async fn run_script(
    invocation: &ScriptInvocation,
    timeout: Duration,
    kill_grace: Duration,
) -> Result<RawProcessResult, TriggerError> {
    let started = Instant::now();
    let deadline = tokio::time::Instant::now() + timeout;

    let mut command = tokio::process::Command::new(&invocation.program);
    command
        .args(&invocation.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    process_group::isolate_process_group(&mut command);

    let mut child = command.spawn().map_err(|source| TriggerError::Spawn {
        program: invocation.program.clone(),
        source,
    })?;
    // Recorded up front: `Child::id` is gone once the leader is reaped, but the
    // group it leads may still have members.
    let pid = child.id().unwrap_or(0);
    tracing::debug!(pid, program = %invocation.program, args = ?invocation.args, "script spawned");

    let mut stdout_task = child.stdout.take().map(drain);
    let mut stderr_task = child.stderr.take().map(drain);

    let waited = tokio::time::timeout_at(deadline, child.wait()).await;
    let exit_code = match waited {
        Ok(Ok(status)) => Some(normalize_exit(status)),
        Ok(Err(e)) => {
            process_group::terminate_process_tree(pid, &mut child, kill_grace).await;
            abort(stdout_task);
            abort(stderr_task);
            return Err(TriggerError::Wait(e));
        }
        Err(_) => None,
    };

    if let Some(exit_code) = exit_code {
        let drained = tokio::time::timeout_at(deadline, async {
            let stdout = join_stream(&mut stdout_task, "stdout").await?;
            let stderr = join_stream(&mut stderr_task, "stderr").await?;
            Ok::<_, TriggerError>((stdout, stderr))
        })
        .await;

        if let Ok(streams) = drained {
            let (stdout, stderr) = streams?;
            return Ok(RawProcessResult {
                exit_code,
                stdout,
                stderr,
                timed_out: false,
                duration_ms: started.elapsed().as_millis() as u64,
            });
        }
        tracing::debug!(pid, "script exited but its pipes are still open at the deadline");
    }

    process_group::terminate_process_tree(pid, &mut child, kill_grace).await;
    let stdout = drain_after_kill(stdout_task, "stdout").await;
    let stderr = drain_after_kill(stderr_task, "stderr").await;

    Ok(RawProcessResult {
        exit_code: -1,
        stdout,
        stderr,
        timed_out: true,
        duration_ms: started.elapsed().as_millis() as u64,
    })
}

type DrainTask = JoinHandle<std::io::Result<Vec<u8>>>;

fn drain<R>(mut reader: R) -> DrainTask
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    })
}

fn abort(task: Option<DrainTask>) {
    if let Some(t) = task {
        t.abort();
    }
}

/// Await a drain task in place. The handle is only cleared once it has
/// completed, so a join cancelled by the deadline can be resumed after the kill.
async fn join_stream(
    task: &mut Option<DrainTask>,
    stream: &'static str,
) -> Result<String, TriggerError> {
    let Some(handle) = task.as_mut() else {
        return Ok(String::new());
    };
    let joined = handle.await;
    *task = None;

    match joined {
        Ok(Ok(bytes)) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Ok(Err(source)) => Err(TriggerError::StreamIo { stream, source }),
        Err(join) => Err(TriggerError::StreamIo {
            stream,
            source: std::io::Error::new(std::io::ErrorKind::Other, join.to_string()),
        }),
    }
}

/// Best-effort read of what was flushed before the kill.
async fn drain_after_kill(mut task: Option<DrainTask>, stream: &'static str) -> String {
    // Orphans that left the group may still hold the pipe open.
    let joined = tokio::time::timeout(DRAIN_AFTER_KILL, join_stream(&mut task, stream)).await;
    match joined {
        Ok(Ok(text)) => text,
        Ok(Err(_)) => String::new(),
        Err(_) => {
            abort(task);
            String::new()
        }
    }
}
