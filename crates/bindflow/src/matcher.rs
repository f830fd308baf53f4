//! Exchange matching and result ordering.
//!
//! [`ExchangeMatcher::find`] selects every binding record whose `Exchange`
//! equals the query exactly, maps each to a [`MatchResult`], orders them and
//! persists the ordered list as the `<name>.json` artifact.
//!
//! # Ordering
//!
//! 1. Results whose binding key contains `"error"` go after all others.
//! 2. Within each class, results are ordered by the numeric version embedded
//!    in the binding key ([`VersionKey`](bindflow_core::version::VersionKey)).
//! 3. Ties keep their encounter order.

use std::{cmp::Ordering, path::PathBuf};

use log::{debug, info};

use bindflow_core::record::{ConfigEntry, MatchResult};

use crate::{
    BindflowError,
    artifact::{ArtifactKind, ArtifactStore},
};

/// Compares two results by error class, then by binding-key version.
pub fn compare_results(a: &MatchResult, b: &MatchResult) -> Ordering {
    a.is_error_class()
        .cmp(&b.is_error_class())
        .then_with(|| a.version_key().cmp(&b.version_key()))
}

/// Sorts results in place using [`compare_results`]. The sort is stable.
pub fn sort_results(results: &mut [MatchResult]) {
    results.sort_by_cached_key(|result| (result.is_error_class(), result.version_key()));
}

/// Checks that an exchange query is usable.
///
/// # Errors
///
/// Returns [`BindflowError::Validation`] if `exchange` is empty.
pub fn validate_exchange(exchange: &str) -> Result<(), BindflowError> {
    if exchange.is_empty() {
        return Err(BindflowError::validation("Exchange value is required"));
    }
    Ok(())
}

/// Collects results for every record bound to `exchange`, in encounter order.
pub fn collect_matches(entries: &[ConfigEntry], exchange: &str) -> Vec<MatchResult> {
    entries
        .iter()
        .flat_map(|entry| {
            entry
                .records()
                .iter()
                .filter(|record| record.exchange() == exchange)
                .map(|record| MatchResult::from_record(entry.source_stem(), record))
        })
        .collect()
}

/// Finds and persists the ordered bindings of one exchange.
#[derive(Debug)]
pub struct ExchangeMatcher<'a> {
    store: &'a ArtifactStore,
    name: &'a str,
}

impl<'a> ExchangeMatcher<'a> {
    /// Creates a matcher that persists results as `name` in `store`.
    pub fn new(store: &'a ArtifactStore, name: &'a str) -> Self {
        Self { store, name }
    }

    /// Returns the path the results are persisted to.
    pub fn results_path(&self) -> PathBuf {
        self.store.path_for(self.name, ArtifactKind::Results)
    }

    /// Returns the ordered results for `exchange`, after persisting them.
    ///
    /// An exchange with no bindings yields an empty list, which is also
    /// persisted.
    ///
    /// # Errors
    ///
    /// - [`BindflowError::Validation`] if `exchange` is empty; nothing is
    ///   written in that case.
    /// - [`BindflowError::Io`] if the results cannot be persisted.
    pub fn find(
        &self,
        entries: &[ConfigEntry],
        exchange: &str,
    ) -> Result<Vec<MatchResult>, BindflowError> {
        validate_exchange(exchange)?;
        info!(exchange, entries = entries.len(); "Searching for exchange");

        let mut results = collect_matches(entries, exchange);
        sort_results(&mut results);
        info!(exchange, count = results.len(); "Found matches");

        let path = self.store.write_results(self.name, &results)?;
        debug!(path = path.display().to_string(); "Results saved");

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use bindflow_core::record::BindingRecord;
    use tempfile::tempdir;

    use super::*;

    fn keys(results: &[MatchResult]) -> Vec<&str> {
        results.iter().filter_map(MatchResult::binding_key).collect()
    }

    #[test]
    fn test_exact_case_sensitive_match() {
        let entries = vec![ConfigEntry::new(
            "svc.json",
            vec![
                BindingRecord::new("orders", "a"),
                BindingRecord::new("Orders", "b"),
                BindingRecord::new("orders-eu", "c"),
                BindingRecord::new("order", "d"),
            ],
        )];

        let results = collect_matches(&entries, "orders");
        assert_eq!(keys(&results), ["a"]);
        assert_eq!(results[0].source(), "svc");
    }

    #[test]
    fn test_no_matches_is_empty() {
        let entries = vec![ConfigEntry::new("x.json", BindingRecord::new("other", "a"))];
        assert!(collect_matches(&entries, "orders").is_empty());
    }

    #[test]
    fn test_error_class_goes_last() {
        let mut results = vec![
            MatchResult::new("s", "proc.error.v1.0"),
            MatchResult::new("s", "proc.v2.0"),
            MatchResult::new("s", "proc.v1.0"),
        ];
        sort_results(&mut results);
        assert_eq!(keys(&results), ["proc.v1.0", "proc.v2.0", "proc.error.v1.0"]);
    }

    #[test]
    fn test_numeric_version_order() {
        let mut results = vec![
            MatchResult::new("s", "proc.v1.10"),
            MatchResult::new("s", "proc.v1.2"),
        ];
        sort_results(&mut results);
        assert_eq!(keys(&results), ["proc.v1.2", "proc.v1.10"]);
    }

    #[test]
    fn test_ties_keep_encounter_order() {
        let mut results = vec![
            MatchResult::new("first", "alpha.v1"),
            MatchResult::new("second", "beta.v1.0"),
            MatchResult::new("third", "gamma.v1"),
        ];
        sort_results(&mut results);
        let sources: Vec<_> = results.iter().map(MatchResult::source).collect();
        assert_eq!(sources, ["first", "second", "third"]);
    }

    #[test]
    fn test_sort_agrees_with_comparator() {
        let mut by_key = vec![
            MatchResult::new("s", "x.error.v3"),
            MatchResult::new("s", "x.v10"),
            MatchResult::new("s", "x.v9"),
            MatchResult::new("s", "x.error.v1"),
            MatchResult::new("s", "plain"),
        ];
        let mut by_cmp = by_key.clone();

        sort_results(&mut by_key);
        by_cmp.sort_by(compare_results);

        assert_eq!(by_key, by_cmp);
        assert_eq!(
            keys(&by_key),
            ["plain", "x.v9", "x.v10", "x.error.v1", "x.error.v3"]
        );
    }

    #[test]
    fn test_find_rejects_empty_exchange_without_writing() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("out"));
        let matcher = ExchangeMatcher::new(&store, "flow");

        let err = matcher.find(&[], "").unwrap_err();

        assert!(matches!(err, BindflowError::Validation(_)));
        assert!(!store.root().exists());
    }

    #[test]
    fn test_find_persists_ordered_results() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let matcher = ExchangeMatcher::new(&store, "flow");
        let entries = vec![
            ConfigEntry::new(
                "b.json",
                BindingRecord::new("orders", "proc.error.v1.0")
                    .with_error_routing_key("dead.letter"),
            ),
            ConfigEntry::new(
                "a.json",
                BindingRecord::new("orders", "proc.v1.0").with_ok_routing_key("next.v1.0"),
            ),
        ];

        let results = matcher.find(&entries, "orders").unwrap();

        assert_eq!(keys(&results), ["proc.v1.0", "proc.error.v1.0"]);
        assert_eq!(store.read_results("flow.json").unwrap(), results);
        assert_eq!(matcher.results_path(), dir.path().join("flow.json"));
    }

    #[test]
    fn test_find_persists_empty_list() {
        let dir = tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let matcher = ExchangeMatcher::new(&store, "empty");

        let results = matcher.find(&[], "orders").unwrap();

        assert!(results.is_empty());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("empty.json")).unwrap(),
            "[]"
        );
    }
}
