// crates/conduit-transport/src/container.rs
// ============================================================================
// Module: Container-Exec Transport
// Description: Invocation by running a container against a mounted directory.
// Purpose: Let a Capability be backed by an isolated, disposable environment.
// Dependencies: tokio, serde_json
// ============================================================================

//! ## Overview
//! Shares its process-spawn and framed-JSON-over-stdio exchange with
//! [`crate::stdio`], but the spawned command is the container runtime
//! (`docker run` / `podman run`) rather than the capability's own
//! executable, and the working directory is bind-mounted instead of set
//! with `current_dir`. The container is torn down (`--rm`) regardless of
//! outcome so a cancelled or timed-out invocation never leaks a runner.

use serde_json::Value;

use crate::contract::InvocationContext;
use crate::contract::Invoke;
use crate::contract::InvokeError;
use crate::stdio::StdioWorker;

/// Container runtime binary invoked to run the capability's image.
const CONTAINER_RUNTIME: &str = "docker";

/// Invokes a Capability bound to [`conduit_core::Transport::Container`].
pub struct ContainerWorker {
    image: String,
    args: Vec<String>,
    mount_dir: Option<String>,
}

impl ContainerWorker {
    /// Builds a worker that runs `image` with `args` appended after the
    /// entrypoint, bind-mounting `mount_dir` at `/workspace` when given.
    #[must_use]
    pub fn new(image: String, args: Vec<String>, mount_dir: Option<String>) -> Self {
        Self { image, args, mount_dir }
    }

    fn runtime_args(&self) -> Vec<String> {
        let mut runtime_args =
            vec!["run".to_string(), "--rm".to_string(), "-i".to_string(), "--network".to_string(), "none".to_string()];
        if let Some(mount_dir) = &self.mount_dir {
            runtime_args.push("-v".to_string());
            runtime_args.push(format!("{mount_dir}:/workspace"));
        }
        runtime_args.push(self.image.clone());
        runtime_args.extend(self.args.iter().cloned());
        runtime_args
    }
}

#[async_trait::async_trait]
impl Invoke for ContainerWorker {
    async fn invoke(&self, input: Value, ctx: &InvocationContext) -> Result<Value, InvokeError> {
        let delegate = StdioWorker::new(CONTAINER_RUNTIME.to_string(), self.runtime_args(), None);
        delegate.invoke(input, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_args_disable_networking_and_mount_workspace() {
        let worker = ContainerWorker::new(
            "runner:latest".to_string(),
            vec!["run-task".to_string()],
            Some("/tmp/run-1".to_string()),
        );
        let args = worker.runtime_args();
        assert!(args.contains(&"none".to_string()));
        assert!(args.contains(&"/tmp/run-1:/workspace".to_string()));
        assert_eq!(args.last(), Some(&"run-task".to_string()));
    }
}
