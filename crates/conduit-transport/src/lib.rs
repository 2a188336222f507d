// crates/conduit-transport/src/lib.rs
// ============================================================================
// Module: Conduit Transport
// Description: The transport-blind invocation contract and its four bindings.
// Purpose: Let the Agent Invoker call any Capability without knowing whether
//          it runs in-process, over stdio, over HTTP, or inside a container.
// Dependencies: conduit-core, tokio, reqwest
// ============================================================================

//! ## Overview
//! Every Capability declares exactly one [`conduit_core::Transport`]. This
//! crate supplies one [`Invoke`] implementation per transport variant and a
//! [`dispatch`] function that picks the right one; callers never match on
//! the transport themselves. All four implementations share the same
//! contract: take an input value, a deadline, and a cancellation signal, and
//! return an output value or an [`InvokeError`].

#![deny(missing_docs)]

pub mod container;
/// The transport-blind invocation contract types.
pub mod contract;
pub mod http;
/// In-process invocation handler registry.
pub mod in_process;
pub mod stdio;

pub use contract::InvocationContext;
pub use contract::Invoke;
pub use contract::InvokeError;
pub use in_process::InProcessHandler;
pub use in_process::InProcessRegistry;

use std::sync::Arc;

use conduit_core::Transport;
use serde_json::Value;

use crate::container::ContainerWorker;
use crate::http::HttpWorker;
use crate::stdio::StdioWorker;

/// Dispatches an invocation to the transport implementation matching
/// `transport`, using `in_process` to resolve in-process handler ids.
///
/// # Errors
///
/// Returns [`InvokeError::UnknownHandler`] when `transport` is
/// [`Transport::InProcess`] and no handler is registered under its
/// `handler_id`. Otherwise propagates whatever the selected transport's
/// [`Invoke::invoke`] returns.
pub async fn dispatch(
    transport: &Transport,
    in_process: &InProcessRegistry,
    input: Value,
    ctx: &InvocationContext,
) -> Result<Value, InvokeError> {
    match transport {
        Transport::InProcess { handler_id } => {
            let handler = in_process
                .invoker(handler_id)
                .ok_or_else(|| InvokeError::UnknownHandler(handler_id.clone()))?;
            handler.invoke(input, ctx).await
        }
        Transport::Stdio { command, args, cwd, pool_size: _ } => {
            let worker = StdioWorker::new(command.clone(), args.clone(), cwd.clone());
            worker.invoke(input, ctx).await
        }
        Transport::Http { url, method } => {
            let worker = HttpWorker::new(url.clone(), method.clone());
            worker.invoke(input, ctx).await
        }
        Transport::Container { image, args, mount_dir } => {
            let worker = ContainerWorker::new(image.clone(), args.clone(), mount_dir.clone());
            worker.invoke(input, ctx).await
        }
    }
}

/// Shared HTTP client used by [`http::HttpWorker`], built once per process.
#[must_use]
pub fn shared_http_client() -> Arc<reqwest::Client> {
    Arc::new(
        reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap_or_default(),
    )
}
