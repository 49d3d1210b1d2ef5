use std::time::Duration;

/// Run the child as leader of its own process group so a timeout can take
/// down everything the script started, not just the interpreter.
#[cfg(unix)]
pub fn isolate_process_group(command: &mut tokio::process::Command) {
    // SAFETY: pre_exec runs in the forked child before exec; setpgid is
    // async-signal-safe.
    unsafe {
        command.pre_exec(|| {
            if libc::setpgid(0, 0) != 0 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(())
        });
    }
}

#[cfg(not(unix))]
pub fn isolate_process_group(command: &mut tokio::process::Command) {
    let _ = command;
}

#[cfg(unix)]
fn signal_group(pid: u32, signal: i32) -> bool {
    pid != 0 && unsafe { libc::kill(-(pid as libc::pid_t), signal) == 0 }
}

#[cfg(unix)]
fn signal_group_or_pid(pid: u32, signal: i32) -> bool {
    if signal_group(pid, signal) {
        return true;
    }
    pid != 0 && unsafe { libc::kill(pid as libc::pid_t, signal) == 0 }
}

/// SIGTERM the group led by `pid`, escalate to SIGKILL after `grace`, then
/// reap the child. Works after the leader has already exited as long as the
/// group still has members.
pub async fn terminate_process_tree(pid: u32, child: &mut tokio::process::Child, grace: Duration) {
    #[cfg(unix)]
    {
        if matches!(child.try_wait(), Ok(Some(_))) {
            // leader already reaped: its pid may be reused, only the group is safe to signal
            if signal_group(pid, libc::SIGTERM) {
                let deadline = tokio::time::Instant::now() + grace;
                // signal 0 only checks whether any member is left
                while signal_group(pid, 0) && tokio::time::Instant::now() < deadline {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                }
                let _ = signal_group(pid, libc::SIGKILL);
            }
            return;
        }
        if !signal_group_or_pid(pid, libc::SIGTERM) {
            let _ = child.start_kill();
        }
        if tokio::time::timeout(grace, child.wait()).await.is_ok() {
            // leader is gone; make sure stragglers in the group are too
            let _ = signal_group(pid, libc::SIGKILL);
            return;
        }
        if !signal_group_or_pid(pid, libc::SIGKILL) {
            let _ = child.start_kill();
        }
    }

    #[cfg(not(unix))]
    {
        let _ = (pid, grace);
        let _ = child.start_kill();
    }

    if tokio::time::timeout(Duration::from_secs(1), child.wait())
        .await
        .is_err()
    {
        tracing::warn!(pid, "child did not exit after SIGKILL");
    }
}
