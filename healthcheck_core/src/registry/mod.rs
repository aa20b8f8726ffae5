//! The check registry: catalogue, activation state and the run-all protocol

mod catalogue;
mod executor;
mod filter;

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::check::{Check, TimedCheckResult};
use crate::error::Result;
use crate::provider::CheckProvider;
use catalogue::Catalogue;

/// Registry of health checks.
///
/// Holds the catalogue of every known check (discovered once, lazily, from
/// the configured providers and static checks) and the active set of checks
/// that will run on the next execution. One instance per hosting application;
/// share it as `Arc<CheckRegistry>` — every method takes `&self` and is safe
/// under arbitrary concurrent invocation.
pub struct CheckRegistry {
    catalogue: Catalogue,
    active: RwLock<HashMap<String, Arc<dyn Check>>>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self {
            catalogue: Catalogue::new(),
            active: RwLock::new(HashMap::new()),
        }
    }

    /// Adds a provider consulted during discovery. Providers run in
    /// registration order; on a name collision the later check wins.
    pub fn with_provider(mut self, provider: impl CheckProvider + 'static) -> Self {
        self.catalogue.add_provider(Arc::new(provider));
        self
    }

    /// Adds a singleton check catalogued ahead of every provider.
    pub fn with_static_check(mut self, check: impl Check + 'static) -> Self {
        self.catalogue.add_static_check(Arc::new(check));
        self
    }

    /// Runs discovery if it has not happened yet, handing `environment`
    /// through to every provider unmodified. Idempotent: only the first
    /// caller discovers, concurrent callers block until the catalogue
    /// exists, later callers return immediately. A provider failure
    /// propagates and leaves the catalogue uninitialized.
    pub fn initialize(&self, environment: Option<&HashMap<String, String>>) -> Result<()> {
        self.catalogue.ensure_discovered(environment)
    }

    /// Every discovered check. Triggers discovery (without an environment)
    /// when [`initialize`](Self::initialize) has not been called.
    pub fn all_checks(&self) -> Result<Vec<Arc<dyn Check>>> {
        self.catalogue.ensure_discovered(None)?;
        Ok(self.catalogue.all())
    }

    /// Every discovered check except those named in `exclude`. Exclusion
    /// entries and check names are trimmed before the exact comparison; an
    /// empty `exclude` returns everything.
    pub fn filtered_checks<S: AsRef<str>>(&self, exclude: &[S]) -> Result<Vec<Arc<dyn Check>>> {
        Ok(filter::filter_checks(self.all_checks()?, exclude))
    }

    /// Like [`filtered_checks`](Self::filtered_checks) with the exclusions
    /// given as a `;`-separated list; empty tokens are dropped.
    pub fn filtered_checks_from_list(&self, exclude_list: &str) -> Result<Vec<Arc<dyn Check>>> {
        self.filtered_checks(&filter::parse_exclude_list(exclude_list))
    }

    /// Inserts `check` into the active set, keyed by its name, only if no
    /// check with that name is already registered: the original registration
    /// wins and a repeat is a silent no-op.
    pub fn register_check(&self, check: Arc<dyn Check>) {
        debug!("Register a check '{}'", check.name());
        let mut active = self.active.write();
        active.entry(check.name().to_string()).or_insert(check);
    }

    pub fn register_checks(&self, checks: impl IntoIterator<Item = Arc<dyn Check>>) {
        for check in checks {
            self.register_check(check);
        }
    }

    /// Registers every catalogued check.
    pub fn register_all(&self) -> Result<()> {
        self.register_checks(self.all_checks()?);
        Ok(())
    }

    /// Registers every catalogued check except those named in `exclude`.
    pub fn register_filtered<S: AsRef<str>>(&self, exclude: &[S]) -> Result<()> {
        self.register_checks(self.filtered_checks(exclude)?);
        Ok(())
    }

    /// Looks `name` up in the catalogue (trimmed) and registers the check.
    /// An unknown name is reported at warn level and is otherwise a no-op;
    /// only a discovery failure is an error.
    pub fn activate_check(&self, name: &str) -> Result<()> {
        self.catalogue.ensure_discovered(None)?;
        match self.catalogue.lookup(name.trim()) {
            Some(check) => self.register_check(check),
            None => warn!("Not able to activate an unknown check '{}'", name.trim()),
        }
        Ok(())
    }

    pub fn activate_checks<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        for name in names {
            self.activate_check(name.as_ref())?;
        }
        Ok(())
    }

    /// Removes `name` (trimmed) from the active set. An absent name is
    /// reported at warn level and is otherwise a no-op.
    pub fn deactivate_check(&self, name: &str) {
        let name = name.trim();
        if self.active.write().remove(name).is_none() {
            warn!("Not able to deactivate an unknown check '{}'", name);
        }
    }

    pub fn deactivate(&self, check: &dyn Check) {
        self.deactivate_check(check.name());
    }

    pub fn deactivate_checks<S: AsRef<str>>(&self, names: &[S]) {
        for name in names {
            self.deactivate_check(name.as_ref());
        }
    }

    /// Empties the active set unconditionally. Idempotent.
    pub fn deactivate_all(&self) {
        self.active.write().clear();
    }

    /// Names currently registered for execution, sorted.
    pub fn active_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.active.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn active_count(&self) -> usize {
        self.active.read().len()
    }

    /// Runs every check registered at call time and returns a name-ordered
    /// map of timed results. The active set is snapshotted first, so
    /// registrations and deactivations that land during the run do not
    /// affect it. Failures are isolated per check (see the executor).
    pub async fn run_all_detailed(&self) -> BTreeMap<String, TimedCheckResult> {
        let snapshot: Vec<(String, Arc<dyn Check>)> = self
            .active
            .read()
            .iter()
            .map(|(name, check)| (name.clone(), Arc::clone(check)))
            .collect();

        executor::run_checks(snapshot).await
    }

    /// `true` iff every registered check reports healthy. An empty active
    /// set is vacuously healthy.
    pub async fn run_all(&self) -> bool {
        self.run_all_detailed()
            .await
            .values()
            .all(|result| result.is_healthy())
    }
}

impl Default for CheckRegistry {
    fn default() -> Self {
        Self::new()
    }
}
