//! Check result snapshots
//!
//! The check-evaluation subsystem is an external collaborator; the state
//! tree only carries a detachable snapshot of its most recent results so
//! later commands can report them. Snapshots are replaced wholesale —
//! merging two runs' results would present stale outcomes as current.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Outcome of one configuration check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckStatus {
    /// All conditions held
    Pass,
    /// At least one condition failed
    Fail,
    /// Evaluation itself failed
    Error,
    /// The check was not evaluated, e.g. due to an upstream failure
    Unknown,
}

/// Result of one check: status plus any failure messages for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Aggregate outcome
    pub status: CheckStatus,
    /// Messages from failed conditions, in evaluation order
    pub failure_messages: Vec<String>,
}

impl CheckResult {
    /// Passing result
    #[inline]
    #[must_use]
    pub fn pass() -> Self {
        Self {
            status: CheckStatus::Pass,
            failure_messages: Vec::new(),
        }
    }

    /// Failing result with messages
    #[inline]
    #[must_use]
    pub fn fail(messages: Vec<String>) -> Self {
        Self {
            status: CheckStatus::Fail,
            failure_messages: messages,
        }
    }
}

/// Snapshot of all check results from one run, keyed by the string form of
/// the checkable object's address
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CheckResults {
    results: IndexMap<String, CheckResult>,
}

impl CheckResults {
    /// Empty snapshot
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one check's result, replacing any previous result for the
    /// same address
    pub fn record(&mut self, addr: impl Into<String>, result: CheckResult) {
        self.results.insert(addr.into(), result);
    }

    /// Look up the result for one checkable object
    #[inline]
    #[must_use]
    pub fn get(&self, addr: &str) -> Option<&CheckResult> {
        self.results.get(addr)
    }

    /// Number of recorded results
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether the snapshot is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Iterate results in recording order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CheckResult)> {
        self.results.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Seam through which the check-evaluation subsystem supplies snapshots
///
/// [`crate::SyncState::record_check_results`] takes any implementor, so the
/// state engine never depends on how checks are evaluated.
pub trait CheckSource {
    /// Produce a snapshot of the current check outcomes
    fn check_results(&self) -> CheckResults;
}

impl CheckSource for CheckResults {
    fn check_results(&self) -> CheckResults {
        self.clone()
    }
}
