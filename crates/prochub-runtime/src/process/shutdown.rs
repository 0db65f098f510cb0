//! Graceful termination of a child with SIGTERM → SIGKILL escalation.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;

#[cfg(unix)]
use tokio::time::timeout;

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// How a terminated child ended.
#[derive(Debug, Clone, Copy)]
pub struct Termination {
    pub status: ExitStatus,
    /// The grace period ran out and the child was killed.
    pub forced: bool,
}

/// Terminate a child, escalating to a hard kill after `grace`.
///
/// # Strategy
/// 1. Send SIGTERM and wait up to `grace` for the child to exit
/// 2. If still running, send SIGKILL
/// 3. Wait for reaping (required to avoid zombies)
///
/// # Platform behavior
/// - Unix: Uses nix for SIGTERM, then SIGKILL via `.kill()`
/// - Windows: Immediately calls `.kill()` (no graceful shutdown available)
pub async fn terminate_child(child: &mut Child, grace: Duration) -> io::Result<Termination> {
    #[cfg(unix)]
    {
        terminate_unix(child, grace).await
    }

    #[cfg(not(unix))]
    {
        let _ = grace;
        terminate_windows(child).await
    }
}

#[cfg(unix)]
async fn terminate_unix(child: &mut Child, grace: Duration) -> io::Result<Termination> {
    let Some(pid) = child.id() else {
        // Already reaped
        let status = child.wait().await?;
        return Ok(Termination {
            status,
            forced: false,
        });
    };

    let raw = i32::try_from(pid).map_err(|_| io::Error::other("pid out of range"))?;
    if let Err(e) = signal::kill(Pid::from_raw(raw), Signal::SIGTERM) {
        // Process may have already exited
        if e != nix::errno::Errno::ESRCH {
            return Err(io::Error::other(e));
        }
    }

    if let Ok(result) = timeout(grace, child.wait()).await {
        return result.map(|status| Termination {
            status,
            forced: false,
        });
    }

    // Child::kill sends SIGKILL on Unix and reaps
    child.kill().await?;
    let status = child.wait().await?;
    Ok(Termination {
        status,
        forced: true,
    })
}

#[cfg(not(unix))]
async fn terminate_windows(child: &mut Child) -> io::Result<Termination> {
    child.kill().await?;
    let status = child.wait().await?;
    Ok(Termination {
        status,
        forced: false,
    })
}

/// Human-readable reason for an exit that carries no exit code.
#[cfg(unix)]
pub fn describe_signal(status: ExitStatus) -> Option<String> {
    use std::os::unix::process::ExitStatusExt;

    let raw = status.signal()?;
    let name = Signal::try_from(raw).map_or_else(|_| format!("signal {raw}"), |s| s.as_str().to_string());
    Some(format!("terminated by {name}"))
}

#[cfg(not(unix))]
pub fn describe_signal(_status: ExitStatus) -> Option<String> {
    None
}
