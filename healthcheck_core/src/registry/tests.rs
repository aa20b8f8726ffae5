#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::check::{Check, CheckResult};
    use crate::checks::FnCheck;
    use crate::error::{HealthCheckError, Result};
    use crate::provider::CheckProvider;
    use crate::registry::CheckRegistry;

    fn ok_check(name: &str) -> Arc<dyn Check> {
        let message = format!("{} is fine", name);
        Arc::new(FnCheck::new(name, move || Ok(message.clone())))
    }

    fn failing_check(name: &str) -> Arc<dyn Check> {
        let name = name.to_string();
        Arc::new(FnCheck::new(name.clone(), move || {
            Err(HealthCheckError::Other(anyhow::anyhow!(
                "{} is broken",
                name
            )))
        }))
    }

    struct PanickingCheck;

    #[async_trait::async_trait]
    impl Check for PanickingCheck {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn execute(&self) -> Result<CheckResult> {
            panic!("boom");
        }
    }

    struct StaticProvider {
        checks: Vec<Arc<dyn Check>>,
    }

    impl CheckProvider for StaticProvider {
        fn name(&self) -> &str {
            "static"
        }

        fn checks(
            &self,
            _environment: Option<&HashMap<String, String>>,
        ) -> Result<Vec<Arc<dyn Check>>> {
            Ok(self.checks.clone())
        }
    }

    struct FailingProvider;

    impl CheckProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        fn checks(
            &self,
            _environment: Option<&HashMap<String, String>>,
        ) -> Result<Vec<Arc<dyn Check>>> {
            Err(HealthCheckError::Other(anyhow::anyhow!(
                "provider exploded"
            )))
        }
    }

    struct CountingProvider {
        invocations: Arc<AtomicUsize>,
    }

    impl CheckProvider for CountingProvider {
        fn name(&self) -> &str {
            "counting"
        }

        fn checks(
            &self,
            _environment: Option<&HashMap<String, String>>,
        ) -> Result<Vec<Arc<dyn Check>>> {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            Ok(vec![ok_check("counted")])
        }
    }

    struct EnvironmentProvider;

    impl CheckProvider for EnvironmentProvider {
        fn name(&self) -> &str {
            "environment"
        }

        fn checks(
            &self,
            environment: Option<&HashMap<String, String>>,
        ) -> Result<Vec<Arc<dyn Check>>> {
            let Some(environment) = environment else {
                return Ok(Vec::new());
            };
            Ok(environment
                .get("check.name")
                .map(|name| vec![ok_check(name)])
                .into_iter()
                .flatten()
                .collect())
        }
    }

    fn catalogue_of(names: &[&str]) -> CheckRegistry {
        let mut registry = CheckRegistry::new();
        for name in names {
            registry = registry.with_static_check(FnCheck::new(*name, || Ok("ok".to_string())));
        }
        registry
    }

    #[tokio::test]
    async fn second_registration_for_same_name_is_a_no_op() {
        let registry = CheckRegistry::new();
        registry.register_check(Arc::new(FnCheck::new("dup", || Ok("first".to_string()))));
        registry.register_check(Arc::new(FnCheck::new("dup", || Ok("second".to_string()))));

        assert_eq!(registry.active_count(), 1);

        let results = registry.run_all_detailed().await;
        assert_eq!(results["dup"].message(), Some("first"));
    }

    #[tokio::test]
    async fn deactivate_all_is_idempotent() {
        let registry = CheckRegistry::new();
        registry.register_checks([ok_check("a"), ok_check("b")]);
        assert_eq!(registry.active_count(), 2);

        registry.deactivate_all();
        assert_eq!(registry.active_count(), 0);
        registry.deactivate_all();
        assert_eq!(registry.active_count(), 0);

        assert!(registry.run_all_detailed().await.is_empty());
        assert!(registry.run_all().await);
    }

    #[test]
    fn filter_exclusion_is_whitespace_insensitive() {
        let registry = catalogue_of(&["a", "b", "c"]);

        let filtered = registry.filtered_checks(&["  b "]).unwrap();
        let mut names: Vec<&str> = filtered.iter().map(|check| check.name()).collect();
        names.sort();

        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn delimited_filter_parses_semicolon_lists() {
        let registry = catalogue_of(&["a", "b", "c"]);

        let filtered = registry.filtered_checks_from_list("b; c").unwrap();
        let names: Vec<&str> = filtered.iter().map(|check| check.name()).collect();
        assert_eq!(names, vec!["a"]);

        let unfiltered = registry.filtered_checks_from_list("").unwrap();
        assert_eq!(unfiltered.len(), 3);
    }

    #[test]
    fn empty_exclusion_returns_everything() {
        let registry = catalogue_of(&["a", "b"]);
        let filtered = registry.filtered_checks::<&str>(&[]).unwrap();
        assert_eq!(filtered.len(), 2);
    }

    #[tokio::test]
    async fn a_panicking_check_does_not_abort_the_run() {
        let registry = CheckRegistry::new();
        registry.register_check(ok_check("a"));
        registry.register_check(Arc::new(PanickingCheck));
        registry.register_check(ok_check("z"));

        let results = registry.run_all_detailed().await;

        assert_eq!(results.len(), 3);
        assert!(results["a"].is_healthy());
        assert!(results["z"].is_healthy());

        let broken = &results["panicking"];
        assert!(!broken.is_healthy());
        assert!(broken.error().is_some());
        assert!(broken.message().unwrap().contains("boom"));
    }

    #[tokio::test]
    async fn a_failing_check_is_reported_with_its_cause() {
        let registry = CheckRegistry::new();
        registry.register_check(ok_check("first"));
        registry.register_check(failing_check("second"));
        registry.register_check(ok_check("third"));

        let results = registry.run_all_detailed().await;

        assert_eq!(results.len(), 3);
        assert!(results["first"].is_healthy());
        assert!(results["third"].is_healthy());

        let failed = &results["second"];
        assert!(!failed.is_healthy());
        assert!(failed.message().unwrap().contains("second is broken"));
        assert!(failed.error().is_some());

        assert!(!registry.run_all().await);
    }

    #[tokio::test]
    async fn detailed_results_are_ordered_by_name() {
        let registry = CheckRegistry::new();
        registry.register_checks([ok_check("c"), ok_check("a"), ok_check("b")]);

        let results = registry.run_all_detailed().await;
        let names: Vec<&str> = results.keys().map(String::as_str).collect();

        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn activate_and_deactivate_round_trip() {
        let registry = catalogue_of(&["x", "y", "z"]);

        registry.activate_checks(&["x", "y"]).unwrap();
        registry.deactivate_check("x");

        assert_eq!(registry.active_names(), vec!["y"]);
    }

    #[tokio::test]
    async fn activation_trims_the_name() {
        let registry = catalogue_of(&["x"]);

        registry.activate_check("  x  ").unwrap();
        assert_eq!(registry.active_names(), vec!["x"]);

        registry.deactivate_check("  x ");
        assert!(registry.active_names().is_empty());
    }

    #[test]
    fn unknown_names_are_safe_no_ops() {
        let registry = catalogue_of(&["a"]);
        registry.register_check(ok_check("a"));

        registry.activate_check("does-not-exist").unwrap();
        registry.deactivate_check("does-not-exist");

        assert_eq!(registry.active_names(), vec!["a"]);
        assert_eq!(registry.all_checks().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_active_set_is_vacuously_healthy() {
        let registry = CheckRegistry::new();
        assert!(registry.run_all().await);
        assert!(registry.run_all_detailed().await.is_empty());
    }

    #[test]
    fn discovery_failure_propagates_and_leaves_no_partial_catalogue() {
        let registry = CheckRegistry::new()
            .with_static_check(FnCheck::new("early", || Ok("ok".to_string())))
            .with_provider(FailingProvider);

        assert!(matches!(
            registry.initialize(None),
            Err(HealthCheckError::Discovery { .. })
        ));

        // still uninitialized, the next access retries and fails again
        assert!(registry.all_checks().is_err());
    }

    #[test]
    fn discovery_runs_exactly_once() {
        let invocations = Arc::new(AtomicUsize::new(0));
        let registry = CheckRegistry::new().with_provider(CountingProvider {
            invocations: Arc::clone(&invocations),
        });

        registry.initialize(None).unwrap();
        registry.initialize(None).unwrap();
        let _ = registry.all_checks().unwrap();

        assert_eq!(invocations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn environment_is_handed_to_providers_unmodified() {
        let registry = CheckRegistry::new().with_provider(EnvironmentProvider);

        let mut environment = HashMap::new();
        environment.insert("check.name".to_string(), "from-environment".to_string());

        registry.initialize(Some(&environment)).unwrap();

        let checks = registry.all_checks().unwrap();
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].name(), "from-environment");
    }

    #[tokio::test]
    async fn later_discovery_of_a_name_overwrites_the_earlier_one() {
        let registry = CheckRegistry::new()
            .with_static_check(FnCheck::new("dup", || Ok("static".to_string())))
            .with_provider(StaticProvider {
                checks: vec![Arc::new(FnCheck::new("dup", || Ok("provided".to_string())))],
            });

        registry.register_all().unwrap();
        assert_eq!(registry.active_count(), 1);

        let results = registry.run_all_detailed().await;
        assert_eq!(results["dup"].message(), Some("provided"));
    }

    #[test]
    fn register_filtered_skips_excluded_checks() {
        let registry = catalogue_of(&["a", "b", "c"]);

        registry.register_filtered(&["b"]).unwrap();

        assert_eq!(registry.active_names(), vec!["a", "c"]);
    }

    #[tokio::test]
    async fn deactivate_by_check_reference() {
        let registry = CheckRegistry::new();
        let check = ok_check("by-ref");
        registry.register_check(Arc::clone(&check));
        assert_eq!(registry.active_count(), 1);

        registry.deactivate(check.as_ref());
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn concurrent_registration_keeps_one_entry_per_name() {
        let registry = Arc::new(CheckRegistry::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    registry.register_check(ok_check("shared"));
                    registry.register_check(ok_check(&format!("unique-{}", i)));
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.active_count(), 17);
    }

    #[tokio::test]
    async fn mutations_during_a_run_do_not_corrupt_the_snapshot() {
        let registry = Arc::new(CheckRegistry::new());
        registry.register_checks([ok_check("a"), ok_check("b")]);

        let runner = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.run_all_detailed().await })
        };

        registry.deactivate_check("a");
        registry.register_check(ok_check("c"));

        let results = runner.await.unwrap();
        // the snapshot saw a consistent membership, whichever one it was
        for name in results.keys() {
            assert!(["a", "b", "c"].contains(&name.as_str()));
        }
        assert!(results.contains_key("b"));
    }
}
