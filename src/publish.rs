//! Publishes the rendered line to the window-manager status sink.
//!
//! Publish failures are the one operationally significant error class,
//! but they never stop the loop; the scheduler logs and retries next
//! cycle.

use crate::probe::{CommandRunner, PROBE_TIMEOUT, ProbeError};
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("status sink failed: {0}")]
    Sink(#[from] ProbeError),
}

#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn publish(&self, line: &str) -> Result<(), PublishError>;
}

/// Sets the X root window name, which bar-style window managers display.
pub struct XsetrootSink {
    runner: Arc<dyn CommandRunner>,
}

impl XsetrootSink {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl StatusSink for XsetrootSink {
    async fn publish(&self, line: &str) -> Result<(), PublishError> {
        self.runner
            .run("xsetroot", &["-name", line], PROBE_TIMEOUT)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::testing::{Scripted, ScriptedRunner};

    #[tokio::test]
    async fn publishes_via_xsetroot() {
        let runner = Arc::new(ScriptedRunner::new().respond("xsetroot", Scripted::Ok("")));
        let sink = XsetrootSink::new(Arc::clone(&runner) as Arc<dyn CommandRunner>);
        sink.publish("[ d | t ]").await.unwrap();
        assert_eq!(runner.calls(), vec!["xsetroot"]);
    }

    #[tokio::test]
    async fn missing_sink_tool_is_an_error() {
        let runner = Arc::new(ScriptedRunner::new());
        let sink = XsetrootSink::new(runner as Arc<dyn CommandRunner>);
        assert!(sink.publish("[ d | t ]").await.is_err());
    }
}
