use super::ToolError;
use std::io::Read;
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs `cmd` to completion and collects its output. The child is killed
/// once `timeout` has passed.
pub fn output_with_timeout(cmd: &mut Command, timeout: Duration) -> Result<Output, ToolError> {
    let program = cmd.get_program().to_string_lossy().to_string();
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    // Pipes are drained concurrently so a chatty child cannot fill them and stall.
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            warn!("{} exceeded {:?}, killing it", program, timeout);
            let _ = child.kill();
            let _ = child.wait();
            return Err(ToolError::TimedOut { program, timeout });
        }
        thread::sleep(POLL_INTERVAL);
    };

    Ok(Output {
        status,
        stdout: collect(stdout),
        stderr: collect(stderr),
    })
}

/// Starts a long-lived child (an application window) without waiting for
/// it. A watcher thread reaps it when it exits.
pub fn spawn_detached(cmd: &mut Command) -> Result<(), ToolError> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    let pid = child.id();
    thread::spawn(move || match child.wait() {
        Ok(status) => debug!("detached child {} exited with {}", pid, status),
        Err(e) => debug!("detached child {} could not be reaped: {}", pid, e),
    });
    Ok(())
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    let mut pipe = pipe?;
    Some(thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    }))
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}
