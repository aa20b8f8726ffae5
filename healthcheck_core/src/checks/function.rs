//! Closure-backed check

use crate::check::{Check, CheckResult};
use crate::error::Result;

/// Wraps a plain function as a named check: `Ok(message)` is healthy,
/// `Err` is unhealthy with the error kept as the cause.
pub struct FnCheck {
    name: String,
    check_fn: Box<dyn Fn() -> Result<String> + Send + Sync>,
}

impl FnCheck {
    pub fn new<F>(name: impl Into<String>, check_fn: F) -> Self
    where
        F: Fn() -> Result<String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check_fn: Box::new(check_fn),
        }
    }
}

#[async_trait::async_trait]
impl Check for FnCheck {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self) -> Result<CheckResult> {
        match (self.check_fn)() {
            Ok(message) => Ok(CheckResult::healthy_with_message(message)),
            Err(err) => Ok(CheckResult::unhealthy_with_error(err.to_string(), err.into())),
        }
    }
}
