//! Check providers: pluggable sources of checks consumed during discovery

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error};

use crate::check::Check;
use crate::checks::DatabaseCheck;
use crate::error::Result;

/// Supplies zero or more checks, optionally driven by the environment map
/// handed to discovery. Providers are registered explicitly on the registry,
/// in order; discovery invokes each one exactly once.
///
/// An empty vec means "no checks available"; `Err` signals a discovery
/// failure and aborts catalogue initialization.
pub trait CheckProvider: Send + Sync {
    /// Provider name, used in discovery diagnostics.
    fn name(&self) -> &str;

    fn checks(&self, environment: Option<&HashMap<String, String>>) -> Result<Vec<Arc<dyn Check>>>;
}

/// Environment key listing the database URLs to probe, separated by `;`.
pub const DATASOURCE_LIST_KEY: &str = "database.urls";

/// Environment key giving the validation query timeout in seconds.
pub const QUERY_TIMEOUT_KEY: &str = "database.queryTimeout";

/// Builds one [`DatabaseCheck`] per URL listed under [`DATASOURCE_LIST_KEY`].
/// Pools connect lazily, so discovery never touches the databases themselves.
pub struct DataSourceCheckProvider;

impl CheckProvider for DataSourceCheckProvider {
    fn name(&self) -> &str {
        "datasource"
    }

    fn checks(&self, environment: Option<&HashMap<String, String>>) -> Result<Vec<Arc<dyn Check>>> {
        let Some(environment) = environment else {
            debug!("Datasource provider invoked without an environment");
            return Ok(Vec::new());
        };

        let Some(urls) = environment.get(DATASOURCE_LIST_KEY) else {
            return Ok(Vec::new());
        };

        let query_timeout = parse_timeout(environment, QUERY_TIMEOUT_KEY);

        let mut checks: Vec<Arc<dyn Check>> = Vec::new();
        for url in urls.split(';').map(str::trim).filter(|url| !url.is_empty()) {
            debug!("Datasource provider found database URL '{}'", url);

            let mut check = DatabaseCheck::connect_lazy(format!("database {}", url), url)?;
            if let Some(timeout) = query_timeout {
                check = check.with_query_timeout(timeout);
            }
            checks.push(Arc::new(check));
        }

        Ok(checks)
    }
}

fn parse_timeout(environment: &HashMap<String, String>, key: &str) -> Option<Duration> {
    let value = environment.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())?;

    match value.parse::<u64>() {
        Ok(seconds) => Some(Duration::from_secs(seconds)),
        Err(_) => {
            error!(
                "Cannot parse the '{}' variable (value found '{}') - no timeout applied",
                key, value
            );
            None
        }
    }
}
