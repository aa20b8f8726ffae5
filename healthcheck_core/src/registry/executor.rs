//! Runs a snapshot of the active set, isolating each check's failure

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures_util::FutureExt;
use tracing::{error, info};

use crate::check::{Check, CheckResult, TimedCheckResult};

/// Executes every snapshot member sequentially and returns the name-ordered
/// result map. A check that returns `Err` or panics becomes an unhealthy
/// result carrying the fault; it never aborts the run or hides the other
/// checks' results.
pub(crate) async fn run_checks(
    snapshot: Vec<(String, Arc<dyn Check>)>,
) -> BTreeMap<String, TimedCheckResult> {
    let mut results = BTreeMap::new();

    for (name, check) in snapshot {
        let start = Instant::now();
        let outcome = AssertUnwindSafe(check.execute()).catch_unwind().await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => {
                let message = err.to_string();
                CheckResult::unhealthy_with_error(message, err.into())
            }
            Err(panic) => {
                let detail = panic_message(panic.as_ref());
                CheckResult::unhealthy_with_error(
                    format!("check panicked: {}", detail),
                    anyhow::anyhow!("panic: {}", detail),
                )
            }
        };

        if result.is_healthy() {
            info!("Check '{}' passed in {}ms", name, elapsed_ms);
        } else {
            error!(
                "Check '{}' failed in {}ms: {}",
                name,
                elapsed_ms,
                result.message().unwrap_or("no message")
            );
        }

        results.insert(name, TimedCheckResult::new(result, elapsed_ms));
    }

    results
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
