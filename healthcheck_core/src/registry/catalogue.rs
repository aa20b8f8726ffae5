//! One-time discovery of the universe of known checks

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::check::Check;
use crate::error::{HealthCheckError, Result};
use crate::provider::CheckProvider;

/// The set of all checks known to the registry, keyed by name. Discovery
/// happens at most once: the first caller runs it under `discovery_lock`
/// while later and concurrent callers either see the finished map or block
/// until it exists. After discovery the map is read-only.
pub(crate) struct Catalogue {
    static_checks: Vec<Arc<dyn Check>>,
    providers: Vec<Arc<dyn CheckProvider>>,
    checks: RwLock<Option<HashMap<String, Arc<dyn Check>>>>,
    discovery_lock: Mutex<()>,
}

impl Catalogue {
    pub(crate) fn new() -> Self {
        Self {
            static_checks: Vec::new(),
            providers: Vec::new(),
            checks: RwLock::new(None),
            discovery_lock: Mutex::new(()),
        }
    }

    pub(crate) fn add_static_check(&mut self, check: Arc<dyn Check>) {
        self.static_checks.push(check);
    }

    pub(crate) fn add_provider(&mut self, provider: Arc<dyn CheckProvider>) {
        self.providers.push(provider);
    }

    /// Idempotent discovery. A provider failure propagates and leaves the
    /// catalogue uninitialized; the lock guard is released on every exit
    /// path, so a later call may retry.
    pub(crate) fn ensure_discovered(
        &self,
        environment: Option<&HashMap<String, String>>,
    ) -> Result<()> {
        if self.checks.read().is_some() {
            return Ok(());
        }

        let _guard = self.discovery_lock.lock();
        if self.checks.read().is_some() {
            return Ok(());
        }

        let discovered = self.discover(environment)?;
        *self.checks.write() = Some(discovered);
        Ok(())
    }

    fn discover(
        &self,
        environment: Option<&HashMap<String, String>>,
    ) -> Result<HashMap<String, Arc<dyn Check>>> {
        let mut discovered: HashMap<String, Arc<dyn Check>> = HashMap::new();

        for check in &self.static_checks {
            debug!("Found a check '{}'", check.name());
            if let Some(replaced) = discovered.insert(check.name().to_string(), Arc::clone(check)) {
                debug!("Check '{}' replaces an earlier entry with the same name", replaced.name());
            }
        }

        for provider in &self.providers {
            let checks = provider.checks(environment).map_err(|source| {
                HealthCheckError::Discovery {
                    provider: provider.name().to_string(),
                    source: source.into(),
                }
            })?;

            for check in checks {
                debug!(
                    "Found a check '{}' given by the provider '{}'",
                    check.name(),
                    provider.name()
                );
                if let Some(replaced) =
                    discovered.insert(check.name().to_string(), Arc::clone(&check))
                {
                    debug!("Check '{}' replaces an earlier entry with the same name", replaced.name());
                }
            }
        }

        Ok(discovered)
    }

    /// Every discovered check, empty when discovery has not run.
    pub(crate) fn all(&self) -> Vec<Arc<dyn Check>> {
        self.checks
            .read()
            .as_ref()
            .map(|checks| checks.values().cloned().collect())
            .unwrap_or_default()
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<Arc<dyn Check>> {
        self.checks
            .read()
            .as_ref()
            .and_then(|checks| checks.get(name).cloned())
    }
}
