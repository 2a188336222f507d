// crates/conduit-transport/src/stdio.rs
// ============================================================================
// Module: Stdio Transport
// Description: One-shot child-process invocation over framed JSON on stdio.
// Purpose: Let a Capability be backed by a local executable.
// Dependencies: tokio, serde_json
// ============================================================================

//! ## Overview
//! Each invocation spawns a fresh child process, writes one newline-
//! terminated JSON input line to its stdin, and reads one newline-terminated
//! JSON output line from its stdout. Pooling (`pool_size` on the capability)
//! is the Agent Invoker's concern — limiting how many concurrent children run
//! for a capability — not this worker's; this worker only knows how to run
//! one request through one child.

use std::process::Stdio;
use std::time::Duration;

use serde_json::Value;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tokio::process::Child;
use tokio::process::Command;

use crate::contract::InvocationContext;
use crate::contract::Invoke;
use crate::contract::InvokeError;

/// How long [`interrupt_then_kill`] waits for a child to exit after sending
/// its termination signal before escalating to a hard kill.
const TERMINATION_GRACE_PERIOD: Duration = Duration::from_millis(500);

/// Sends the child a termination signal and waits up to
/// [`TERMINATION_GRACE_PERIOD`] for it to exit before escalating to a hard
/// kill (`SIGKILL` on unix).
async fn interrupt_then_kill(child: &mut Child) {
    if send_interrupt(child).is_ok() && tokio::time::timeout(TERMINATION_GRACE_PERIOD, child.wait()).await.is_ok() {
        return;
    }
    let _ = child.kill().await;
}

#[cfg(unix)]
fn send_interrupt(child: &Child) -> Result<(), ()> {
    let Some(pid) = child.id() else { return Err(()) };
    #[allow(clippy::cast_possible_wrap, reason = "process ids fit in i32 on every supported unix target")]
    let pid = nix::unistd::Pid::from_raw(pid as i32);
    nix::sys::signal::kill(pid, nix::sys::signal::Signal::SIGTERM).map_err(|_| ())
}

#[cfg(not(unix))]
fn send_interrupt(_child: &Child) -> Result<(), ()> {
    Err(())
}

/// Invokes a Capability bound to [`conduit_core::Transport::Stdio`].
pub struct StdioWorker {
    command: String,
    args: Vec<String>,
    cwd: Option<String>,
}

impl StdioWorker {
    /// Builds a worker that spawns `command` with `args` in `cwd`.
    #[must_use]
    pub fn new(command: String, args: Vec<String>, cwd: Option<String>) -> Self {
        Self { command, args, cwd }
    }
}

#[async_trait::async_trait]
impl Invoke for StdioWorker {
    async fn invoke(&self, input: Value, ctx: &InvocationContext) -> Result<Value, InvokeError> {
        let mut command = Command::new(&self.command);
        command.args(&self.args).stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::null());
        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }
        let mut child =
            command.spawn().map_err(|err| InvokeError::Transport(format!("spawn failed: {err}")))?;

        let mut stdin = child.stdin.take().ok_or_else(|| InvokeError::Transport("no stdin".to_string()))?;
        let stdout = child.stdout.take().ok_or_else(|| InvokeError::Transport("no stdout".to_string()))?;
        let mut reader = BufReader::new(stdout);

        let mut line = serde_json::to_string(&input)
            .map_err(|err| InvokeError::Transport(format!("input serialize failed: {err}")))?;
        line.push('\n');

        let mut ctx = ctx.clone();
        let exchange = async {
            stdin.write_all(line.as_bytes()).await.map_err(|err| InvokeError::Transport(err.to_string()))?;
            stdin.shutdown().await.map_err(|err| InvokeError::Transport(err.to_string()))?;
            let mut response = String::new();
            reader
                .read_line(&mut response)
                .await
                .map_err(|err| InvokeError::Transport(err.to_string()))?;
            Ok::<String, InvokeError>(response)
        };

        let response = tokio::select! {
            result = exchange => {
                let _ = child.kill().await;
                result?
            }
            err = ctx.race_to_interrupt() => {
                interrupt_then_kill(&mut child).await;
                return Err(err);
            }
        };

        if response.trim().is_empty() {
            return Err(InvokeError::Transport("worker produced no output".to_string()));
        }
        serde_json::from_str(response.trim()).map_err(|err| InvokeError::MalformedResponse(err.to_string()))
    }
}
