//! Completion-status monotonicity tracking
//!
//! The backend is expected never to clear a progress flag once set. Each
//! fetched snapshot is compared with the previous one for the same
//! attendance and regressions are reported instead of silently rendering
//! an earlier stage.

use serde::Serialize;
use tracing::warn;

use crate::models::CompletionStatus;
use crate::utils::errors::{VpassError, Result};

/// A progress flag that went from true back to false
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusAnomaly {
    pub attendance_id: i64,
    pub field: &'static str,
}

/// What to do when a regression is seen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonotonicPolicy {
    /// Report and adopt the new snapshot
    Report,
    /// Report and keep the previous snapshot
    Reject,
}

impl MonotonicPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            MonotonicPolicy::Reject
        } else {
            MonotonicPolicy::Report
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusMonitor {
    policy: MonotonicPolicy,
    attendance_id: Option<i64>,
    last: Option<CompletionStatus>,
    anomalies: Vec<StatusAnomaly>,
}

impl StatusMonitor {
    pub fn new(policy: MonotonicPolicy) -> Self {
        Self {
            policy,
            attendance_id: None,
            last: None,
            anomalies: Vec::new(),
        }
    }

    pub fn last(&self) -> Option<CompletionStatus> {
        self.last
    }

    /// Every regression seen so far
    pub fn anomalies(&self) -> &[StatusAnomaly] {
        &self.anomalies
    }

    /// Forget the tracked snapshot, e.g. when switching attendance
    pub fn reset(&mut self) {
        self.attendance_id = None;
        self.last = None;
    }

    /// Compare `next` against the previous snapshot and record it.
    ///
    /// Returns the snapshot to render and the regressions found in this
    /// observation. Under [`MonotonicPolicy::Reject`] a regression yields
    /// [`VpassError::NonMonotonicStatus`] and the previous snapshot stays.
    pub fn observe(&mut self, attendance_id: i64, next: CompletionStatus) -> Result<(CompletionStatus, Vec<StatusAnomaly>)> {
        if self.attendance_id != Some(attendance_id) {
            self.attendance_id = Some(attendance_id);
            self.last = None;
        }

        let found = match self.last {
            Some(previous) => regressions(attendance_id, &previous, &next),
            None => Vec::new(),
        };

        for anomaly in &found {
            warn!(
                attendance_id = anomaly.attendance_id,
                field = anomaly.field,
                "Completion flag regressed"
            );
        }
        self.anomalies.extend(found.iter().cloned());

        if !found.is_empty() && self.policy == MonotonicPolicy::Reject {
            return Err(VpassError::NonMonotonicStatus {
                fields: found.iter().map(|a| a.field.to_string()).collect(),
            });
        }

        self.last = Some(next);
        Ok((next, found))
    }
}

fn regressions(attendance_id: i64, previous: &CompletionStatus, next: &CompletionStatus) -> Vec<StatusAnomaly> {
    previous
        .progress_flags()
        .iter()
        .zip(next.progress_flags().iter())
        .filter(|((_, was), (_, now))| *was && !*now)
        .map(|((field, _), _)| StatusAnomaly { attendance_id, field: *field })
        .collect()
}
