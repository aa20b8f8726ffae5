//! The check capability and its execution results

use std::sync::Arc;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::error::Result;

/// A named probe. The registry stores checks as shared read-only references
/// and never mutates them; the name is the sole key, compared exactly after
/// the caller trims surrounding whitespace.
#[async_trait::async_trait]
pub trait Check: Send + Sync {
    fn name(&self) -> &str;

    /// Runs the probe once. A check wanting predictable latency must bound
    /// its own I/O; the executor adds no watchdog.
    async fn execute(&self) -> Result<CheckResult>;
}

/// Outcome of one check execution. Produced fresh on every run, never cached.
#[derive(Debug, Clone)]
pub struct CheckResult {
    healthy: bool,
    message: Option<String>,
    error: Option<Arc<anyhow::Error>>,
}

impl CheckResult {
    pub fn healthy() -> Self {
        Self {
            healthy: true,
            message: None,
            error: None,
        }
    }

    pub fn healthy_with_message(message: impl Into<String>) -> Self {
        Self {
            healthy: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            healthy: false,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn unhealthy_with_error(message: impl Into<String>, error: anyhow::Error) -> Self {
        Self {
            healthy: false,
            message: Some(message.into()),
            error: Some(Arc::new(error)),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn error(&self) -> Option<&anyhow::Error> {
        self.error.as_deref()
    }
}

impl Serialize for CheckResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CheckResult", 3)?;
        state.serialize_field("healthy", &self.healthy)?;
        state.serialize_field("message", &self.message)?;
        state.serialize_field("error", &self.error.as_ref().map(|e| format!("{:#}", e)))?;
        state.end()
    }
}

/// A [`CheckResult`] annotated with the wall-clock duration of the single
/// execution that produced it, measured by the executor.
#[derive(Debug, Clone)]
pub struct TimedCheckResult {
    result: CheckResult,
    elapsed_ms: u64,
}

impl TimedCheckResult {
    pub fn new(result: CheckResult, elapsed_ms: u64) -> Self {
        Self { result, elapsed_ms }
    }

    pub fn result(&self) -> &CheckResult {
        &self.result
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn is_healthy(&self) -> bool {
        self.result.is_healthy()
    }

    pub fn message(&self) -> Option<&str> {
        self.result.message()
    }

    pub fn error(&self) -> Option<&anyhow::Error> {
        self.result.error()
    }
}

impl Serialize for TimedCheckResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("TimedCheckResult", 2)?;
        state.serialize_field("result", &self.result)?;
        state.serialize_field("elapsed_ms", &self.elapsed_ms)?;
        state.end()
    }
}
