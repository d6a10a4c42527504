//! Spawning the native bridge process.

use std::io;
use std::process::Stdio;

use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::info;

/// A running bridge with its stdio taken for the transport.
#[derive(Debug)]
pub struct BridgeProcess {
    pub child: Child,
    pub stdin: ChildStdin,
    pub stdout: ChildStdout,
}

/// Start `command` with piped stdin/stdout. Its stderr is inherited so the
/// bridge's own diagnostics end up next to ours. The child is killed when
/// the returned handle is dropped.
pub fn spawn_bridge(command: &str, args: &[String]) -> io::Result<BridgeProcess> {
    let mut child = Command::new(command)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()?;

    let stdin = child
        .stdin
        .take()
        .ok_or_else(|| io::Error::other("bridge stdin was not captured"))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::other("bridge stdout was not captured"))?;

    info!(command, pid = ?child.id(), "spawned native bridge");
    Ok(BridgeProcess {
        child,
        stdin,
        stdout,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_executable_is_an_io_error() {
        let err = spawn_bridge("/nonexistent/deskpin-bridge", &[]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn bridge_stdio_is_wired() {
        use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

        let mut bridge = spawn_bridge("cat", &[]).unwrap();
        bridge.stdin.write_all(b"{\"debug\":\"echo\"}\n").await.unwrap();
        bridge.stdin.flush().await.unwrap();

        let mut lines = BufReader::new(bridge.stdout).lines();
        let line = lines.next_line().await.unwrap().unwrap();
        assert_eq!(line, "{\"debug\":\"echo\"}");
    }
}
