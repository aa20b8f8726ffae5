//! Database connectivity check

use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::{debug, error, info};

use crate::check::{Check, CheckResult};
use crate::error::Result;

/// Validation query used when none is configured.
pub const DEFAULT_VALIDATION_QUERY: &str = "SELECT 1";

/// Probes a database by running a validation query against its pool.
///
/// A SQL failure is the outcome this check exists to observe, so it is
/// reported as an unhealthy result with the cause attached rather than as an
/// execution error. The optional query timeout bounds a single execution;
/// exceeding it also fails the check.
pub struct DatabaseCheck {
    name: String,
    pool: SqlitePool,
    validation_query: Option<String>,
    query_timeout: Option<Duration>,
}

impl DatabaseCheck {
    pub fn new(name: impl Into<String>, pool: SqlitePool) -> Self {
        Self {
            name: name.into(),
            pool,
            validation_query: None,
            query_timeout: None,
        }
    }

    /// Builds a check whose pool connects on first use, so construction
    /// never touches the database.
    pub fn connect_lazy(name: impl Into<String>, url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new().connect_lazy(url)?;
        Ok(Self::new(name, pool))
    }

    pub fn with_validation_query(mut self, query: impl Into<String>) -> Self {
        self.validation_query = Some(query.into());
        self
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }
}

#[async_trait::async_trait]
impl Check for DatabaseCheck {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self) -> Result<CheckResult> {
        info!("Execute check '{}'", self.name);

        let query = self
            .validation_query
            .as_deref()
            .unwrap_or(DEFAULT_VALIDATION_QUERY);
        debug!("Execute validation query '{}' for check '{}'", query, self.name);

        let run = sqlx::query(query).fetch_one(&self.pool);
        let outcome = match self.query_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, run).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    error!(
                        "Validation query timed out after {}ms for check '{}'",
                        timeout.as_millis(),
                        self.name
                    );
                    return Ok(CheckResult::unhealthy(format!(
                        "validation query timed out after {}ms",
                        timeout.as_millis()
                    )));
                }
            },
            None => run.await,
        };

        match outcome {
            Ok(_) => {
                info!("Check '{}' is OK", self.name);
                Ok(CheckResult::healthy())
            }
            Err(err) => {
                error!("Cannot access database for check '{}': {}", self.name, err);
                Ok(CheckResult::unhealthy_with_error(
                    format!("cannot connect to {}", self.name),
                    err.into(),
                ))
            }
        }
    }
}
