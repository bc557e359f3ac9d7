use std::io;
use std::time::Duration;
use tokio::process::Child;
use tracing::{debug, warn};

/// Ask `child` to stop, wait up to `grace`, then kill it outright.
///
/// Returns once the child has been reaped or the kill itself failed.
pub(crate) async fn terminate(child: &mut Child, service: &str, grace: Duration) {
    if let Err(e) = request_stop(child) {
        warn!(service = %service, "Failed to send termination request: {}", e);
        force_kill(child, service).await;
        return;
    }

    match tokio::time::timeout(grace, child.wait()).await {
        Ok(Ok(status)) => debug!(service = %service, "Stopped with {}", status),
        Ok(Err(e)) => warn!(service = %service, "Failed waiting for exit: {}", e),
        Err(_) => {
            warn!(service = %service, "Did not stop within {:?}, killing", grace);
            force_kill(child, service).await;
        }
    }
}

/// SIGTERM to the child's process group, which also reaches whatever the
/// runner started underneath it
#[cfg(unix)]
fn request_stop(child: &mut Child) -> io::Result<()> {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        // Already reaped
        return Ok(());
    };
    killpg(Pid::from_raw(pid as i32), Signal::SIGTERM).map_err(io::Error::from)
}

#[cfg(not(unix))]
fn request_stop(child: &mut Child) -> io::Result<()> {
    child.start_kill()
}

async fn force_kill(child: &mut Child, service: &str) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
            debug!(service = %service, "Process group kill failed: {}", e);
        }
    }

    if let Err(e) = child.kill().await {
        warn!(service = %service, "Failed to kill process: {}", e);
    }
}
