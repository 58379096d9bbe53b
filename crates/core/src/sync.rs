//! Local/remote reconciliation planning and sync outcomes.
//!
//! Collections are usable immediately from per-browser storage and converge
//! with a remote per-identity record when a session exists. Reconciliation
//! is additive and last-write-wins: there are no version stamps and no
//! conflict detection across tabs or devices. That is a documented non-goal
//! for a storefront cart, not an accident.

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::hash::Hash;

/// How far a mutation propagated.
///
/// Mutations are optimistic: local state is updated first, the remote write
/// is best-effort. Callers get the outcome as data instead of having to
/// scrape logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// No session; the write went to per-browser storage only.
    LocalOnly,
    /// Applied locally and mirrored to the remote per-identity record.
    Synced,
    /// Applied locally; the remote write failed and was logged. Local state
    /// is kept as-is, never rolled back.
    RemoteFailed,
}

impl SyncOutcome {
    /// Whether the mutation reached the remote record.
    #[must_use]
    pub const fn is_synced(self) -> bool {
        matches!(self, Self::Synced)
    }
}

/// Result of planning an additive merge of local entries into a remote
/// record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePlan<T> {
    /// The converged collection: every remote entry, then local entries the
    /// remote did not have. Becomes the new source of truth locally.
    pub merged: Vec<T>,
    /// Local-only entries that must be pushed to the remote record. The
    /// merge never deletes remote entries.
    pub to_push: Vec<T>,
}

/// Plan an additive merge of `local` into `remote`, keyed by `key`.
///
/// Entries present on both sides keep the remote version (the fetched record
/// wins); local-only entries are appended and scheduled for push.
pub fn plan_additive_merge<T, K, F>(local: &[T], remote: &[T], key: F) -> MergePlan<T>
where
    T: Clone,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let remote_keys: HashSet<K> = remote.iter().map(&key).collect();

    let mut merged: Vec<T> = remote.to_vec();
    let mut to_push = Vec::new();
    for entry in local {
        if !remote_keys.contains(&key(entry)) {
            merged.push(entry.clone());
            to_push.push(entry.clone());
        }
    }

    MergePlan { merged, to_push }
}

/// Decode a stored JSON value, falling back to the default on corruption.
///
/// Per-browser storage has no schema versioning; corrupt or missing data is
/// treated as an empty collection rather than an error the user ever sees.
#[must_use]
pub fn fail_soft<T>(raw: Option<serde_json::Value>) -> T
where
    T: DeserializeOwned + Default,
{
    raw.and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Entry {
        id: &'static str,
        quantity: u32,
    }

    fn entry(id: &'static str, quantity: u32) -> Entry {
        Entry { id, quantity }
    }

    #[test]
    fn test_merge_pushes_local_only_entries() {
        let local = vec![entry("a", 1), entry("b", 2)];
        let remote = vec![entry("b", 5), entry("c", 1)];

        let plan = plan_additive_merge(&local, &remote, |e| e.id);

        assert_eq!(plan.to_push, vec![entry("a", 1)]);
        assert_eq!(
            plan.merged,
            vec![entry("b", 5), entry("c", 1), entry("a", 1)]
        );
    }

    #[test]
    fn test_merge_never_deletes_remote_entries() {
        let local: Vec<Entry> = vec![];
        let remote = vec![entry("x", 1), entry("y", 2)];

        let plan = plan_additive_merge(&local, &remote, |e| e.id);

        assert!(plan.to_push.is_empty());
        assert_eq!(plan.merged, remote);
    }

    #[test]
    fn test_merge_remote_version_wins_on_overlap() {
        let local = vec![entry("a", 9)];
        let remote = vec![entry("a", 3)];

        let plan = plan_additive_merge(&local, &remote, |e| e.id);

        assert!(plan.to_push.is_empty());
        assert_eq!(plan.merged, vec![entry("a", 3)]);
    }

    #[test]
    fn test_fail_soft_decodes_valid_data() {
        let decoded: Vec<u32> = fail_soft(Some(json!([1, 2, 3])));
        assert_eq!(decoded, vec![1, 2, 3]);
    }

    #[test]
    fn test_fail_soft_corrupt_and_missing_become_default() {
        let decoded: Vec<u32> = fail_soft(Some(json!({"not": "a list"})));
        assert!(decoded.is_empty());

        let decoded: Vec<u32> = fail_soft(None);
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_sync_outcome_flags() {
        assert!(SyncOutcome::Synced.is_synced());
        assert!(!SyncOutcome::LocalOnly.is_synced());
        assert!(!SyncOutcome::RemoteFailed.is_synced());
    }
}
