//! Exclusion-aware views over a collection of checks

use std::sync::Arc;

use crate::check::Check;

/// Keeps every check whose trimmed name does not exactly match a trimmed
/// exclusion entry. An empty exclusion list returns the collection untouched.
pub(crate) fn filter_checks<S: AsRef<str>>(
    checks: Vec<Arc<dyn Check>>,
    exclude: &[S],
) -> Vec<Arc<dyn Check>> {
    if exclude.is_empty() {
        return checks;
    }

    let excluded: Vec<&str> = exclude.iter().map(|name| name.as_ref().trim()).collect();

    checks
        .into_iter()
        .filter(|check| !excluded.contains(&check.name().trim()))
        .collect()
}

/// Splits a `;`-separated exclusion list, trimming tokens and dropping empty ones.
pub(crate) fn parse_exclude_list(exclude_list: &str) -> Vec<String> {
    exclude_list
        .split(';')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
