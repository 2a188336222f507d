// crates/conduit-status/src/sink/log.rs
// ============================================================================
// Module: Log Sink
// Description: Writes one structured line per StatusEvent to any Write target.
// Purpose: The ambient "logging" story in a stack with no tracing dependency.
// Dependencies: conduit-core, time, std::io
// ============================================================================

use std::io::Write;
use std::sync::Mutex;

use conduit_core::SinkError;
use conduit_core::StatusEvent;
use conduit_core::StatusSink;

/// A [`StatusSink`] that writes one line per event to a shared writer.
///
/// # Invariants
/// - Each call to [`StatusSink::observe`] writes exactly one line, so
///   concurrent writers never interleave partial lines.
pub struct LogSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> LogSink<W> {
    /// Wraps `writer` as a [`StatusSink`].
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer: Mutex::new(writer) }
    }
}

impl<W: Write + Send> StatusSink for LogSink<W> {
    fn observe(&self, event: &StatusEvent) -> Result<(), SinkError> {
        let line = format_event(event);
        let mut writer = self.writer.lock().map_err(|_| SinkError::DeliveryFailed("log writer lock poisoned".to_string()))?;
        writeln!(writer, "{line}").map_err(|err| SinkError::DeliveryFailed(err.to_string()))
    }
}

fn format_event(event: &StatusEvent) -> String {
    match event {
        StatusEvent::Transition { task_id, from, to, at_ms, reason } => {
            let reason = reason.as_deref().unwrap_or("-");
            format!("t={at_ms}ms task={task_id} transition={from:?}->{to:?} reason={reason}")
        }
        StatusEvent::PhaseAdvanced { phase } => format!("phase_advanced={phase}"),
        StatusEvent::ArtifactPublished { artifact_id, producer } => {
            format!("artifact_published id={artifact_id} producer={producer}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_core::ids::TaskId;
    use conduit_core::TaskState;

    #[test]
    fn writes_one_line_per_event() {
        let buffer: Vec<u8> = Vec::new();
        let sink = LogSink::new(buffer);
        sink.observe(&StatusEvent::Transition {
            task_id: TaskId::new("t1"),
            from: TaskState::Pending,
            to: TaskState::Scheduled,
            at_ms: 10,
            reason: None,
        })
        .unwrap();
        let written = sink.writer.lock().unwrap();
        let text = String::from_utf8_lossy(&written);
        assert!(text.contains("task=t1"));
        assert!(text.ends_with('\n'));
    }
}
