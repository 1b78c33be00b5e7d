//! Check scheduling for the active question.
//!
//! The coordinator decides when a drawing snapshot is forwarded to the
//! checker and whether a returning verdict still applies. It is plain state
//! driven by the session systems, with time passed in as the elapsed app time.
//!
//! Phases: `Idle` (nothing checked yet for this question), `Checking` (one
//! request in flight), `Resolved` (latest outcome applied). A snapshot is
//! forwarded only if its key differs from the one last forwarded, at most once
//! per check interval; explicit requests skip both rules. Responses are matched
//! by token, so anything arriving after a question change or for an older
//! request is dropped.

use std::sync::Arc;
use std::time::Duration;

use bevy::prelude::*;

use super::propagation::{order_by_regions, propagate_dependent_errors};
use crate::canvas::{DrawingSnapshot, RecognizedRegion, SnapshotKey};
use crate::collaborators::{CollaboratorError, Question, StepCheck};
use crate::constants::DEFAULT_CHECK_INTERVAL_SECS;

/// Review hint attached to outcomes with at least one wrong step
pub const REVIEW_HINT: &str =
    "Try reviewing the power rule for differentiation and check your calculations carefully.";

/// Correlates a collaborator response with the request that produced it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestToken {
    pub question_id: String,
    pub seq: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckPhase {
    Idle,
    Checking {
        token: RequestToken,
        snapshot: DrawingSnapshot,
    },
    Resolved,
}

/// Everything a check task needs
#[derive(Debug, Clone)]
pub struct CheckRequest {
    pub token: RequestToken,
    pub snapshot: DrawingSnapshot,
    pub question: Question,
}

/// Result of one check, with dependent errors already propagated
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CheckOutcome {
    pub has_error: bool,
    pub steps: Vec<StepCheck>,
    pub hint_message: Option<String>,
}

impl CheckOutcome {
    /// Nothing to report: empty canvas or a failed checker
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn from_steps(mut steps: Vec<StepCheck>) -> Self {
        propagate_dependent_errors(&mut steps);
        let has_error = steps.iter().any(|s| !s.is_correct);
        Self {
            has_error,
            steps,
            hint_message: has_error.then(|| REVIEW_HINT.to_string()),
        }
    }

    pub fn first_error(&self) -> Option<&StepCheck> {
        self.steps.iter().find(|s| !s.is_correct)
    }

    #[cfg(test)]
    pub fn has_warnings(&self) -> bool {
        self.steps.iter().any(|s| s.warning_message.is_some())
    }
}

#[derive(Resource)]
pub struct SessionCoordinator {
    question: Option<Question>,
    phase: CheckPhase,
    check_interval: Duration,
    next_seq: u64,
    /// Most recent snapshot seen, checked or not
    latest: Option<DrawingSnapshot>,
    /// Key of the snapshot last forwarded (or resolved without the checker)
    last_forwarded: Option<SnapshotKey>,
    last_forward_at: Option<Duration>,
    /// A newer snapshot is waiting for the interval or for the in-flight check
    pending: bool,
    outcome: Option<CheckOutcome>,
    /// Regions the current outcome was computed against
    checked_regions: Arc<Vec<RecognizedRegion>>,
    /// Bumped whenever a new outcome is applied
    resolved_count: u64,
}

impl Default for SessionCoordinator {
    fn default() -> Self {
        Self::new(Duration::from_secs_f32(DEFAULT_CHECK_INTERVAL_SECS))
    }
}

impl SessionCoordinator {
    pub fn new(check_interval: Duration) -> Self {
        Self {
            question: None,
            phase: CheckPhase::Idle,
            check_interval,
            next_seq: 0,
            latest: None,
            last_forwarded: None,
            last_forward_at: None,
            pending: false,
            outcome: None,
            checked_regions: Arc::new(Vec::new()),
            resolved_count: 0,
        }
    }

    pub fn set_check_interval(&mut self, interval: Duration) {
        self.check_interval = interval;
    }

    /// Switch questions. Returns false if `question` is already active.
    ///
    /// Resets to `Idle`; a check in flight for the previous question is
    /// orphaned and its response will be discarded.
    pub fn select_question(&mut self, question: Option<Question>) -> bool {
        let same = match (&self.question, &question) {
            (Some(a), Some(b)) => a.id == b.id,
            (None, None) => true,
            _ => false,
        };
        if same {
            return false;
        }

        if let CheckPhase::Checking { token, .. } = &self.phase {
            debug!("Orphaning check {} for question {}", token.seq, token.question_id);
        }
        self.question = question;
        self.phase = CheckPhase::Idle;
        self.last_forwarded = None;
        self.last_forward_at = None;
        self.pending = false;
        self.outcome = None;
        self.checked_regions = Arc::new(Vec::new());
        true
    }

    /// Record a new drawing snapshot and forward it if it is worth checking now
    pub fn submit_snapshot(&mut self, snapshot: DrawingSnapshot, now: Duration) -> Option<CheckRequest> {
        let key = snapshot.key();
        let known = self.latest.as_ref().is_some_and(|s| s.key() == key);
        self.latest = Some(snapshot);

        if self.question.is_none() || known || self.last_forwarded == Some(key) {
            return None;
        }
        if self.is_checking() || !self.interval_elapsed(now) {
            self.pending = true;
            return None;
        }
        self.start_check(now)
    }

    /// Forward a deferred snapshot once the interval has passed and nothing is in flight
    pub fn poll(&mut self, now: Duration) -> Option<CheckRequest> {
        if !self.pending || self.is_checking() || !self.interval_elapsed(now) {
            return None;
        }
        self.pending = false;
        let latest_key = self.latest.as_ref().map(|s| s.key());
        if latest_key.is_none() || latest_key == self.last_forwarded {
            return None;
        }
        self.start_check(now)
    }

    /// Check again straight after a result was applied if the drawing moved on
    /// while the previous check was in flight. The interval does not apply.
    pub fn follow_up(&mut self, now: Duration) -> Option<CheckRequest> {
        if !self.pending || self.is_checking() {
            return None;
        }
        self.pending = false;
        let latest_key = self.latest.as_ref().map(|s| s.key());
        if latest_key.is_none() || latest_key == self.last_forwarded {
            return None;
        }
        self.start_check(now)
    }

    /// Explicit check: ignores the interval and the duplicate filter,
    /// but never runs two checks at once.
    pub fn request_check(&mut self, now: Duration) -> Option<CheckRequest> {
        if self.question.is_none() || self.is_checking() {
            return None;
        }
        self.start_check(now)
    }

    fn start_check(&mut self, now: Duration) -> Option<CheckRequest> {
        let question = self.question.clone()?;
        let snapshot = self.latest.clone().unwrap_or_else(empty_snapshot);

        self.last_forwarded = Some(snapshot.key());
        self.last_forward_at = Some(now);
        self.pending = false;

        if snapshot.regions.is_empty() {
            // Nothing recognized, so there is nothing to ask the checker about
            self.set_outcome(CheckOutcome::neutral(), Arc::clone(&snapshot.regions));
            return None;
        }

        self.next_seq += 1;
        let token = RequestToken {
            question_id: question.id.clone(),
            seq: self.next_seq,
        };
        info!(
            "Checking {} step(s) for question {} (request {})",
            snapshot.regions.len(),
            question.id,
            token.seq
        );
        self.phase = CheckPhase::Checking {
            token: token.clone(),
            snapshot: snapshot.clone(),
        };
        Some(CheckRequest {
            token,
            snapshot,
            question,
        })
    }

    /// Apply a checker response. Returns false when the response is stale.
    pub fn apply_check_result(
        &mut self,
        token: &RequestToken,
        result: Result<Vec<StepCheck>, CollaboratorError>,
    ) -> bool {
        let CheckPhase::Checking {
            token: current,
            snapshot,
        } = &self.phase
        else {
            debug!("Dropping check {} for {}: nothing in flight", token.seq, token.question_id);
            return false;
        };
        if current != token {
            debug!(
                "Dropping stale check {} for {} (expecting {} for {})",
                token.seq, token.question_id, current.seq, current.question_id
            );
            return false;
        }

        let regions = Arc::clone(&snapshot.regions);
        let outcome = match result {
            Ok(steps) => CheckOutcome::from_steps(order_by_regions(steps, &regions)),
            Err(e) => {
                warn!("Checker failed: {}", e);
                CheckOutcome::neutral()
            }
        };
        debug!(
            "Check {} resolved: {} step(s), has_error={}",
            token.seq,
            outcome.steps.len(),
            outcome.has_error
        );
        self.set_outcome(outcome, regions);
        true
    }

    fn set_outcome(&mut self, outcome: CheckOutcome, regions: Arc<Vec<RecognizedRegion>>) {
        self.outcome = Some(outcome);
        self.checked_regions = regions;
        self.phase = CheckPhase::Resolved;
        self.resolved_count += 1;
    }

    fn interval_elapsed(&self, now: Duration) -> bool {
        self.last_forward_at
            .is_none_or(|at| now.saturating_sub(at) >= self.check_interval)
    }

    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    #[cfg(test)]
    pub fn phase(&self) -> &CheckPhase {
        &self.phase
    }

    pub fn is_checking(&self) -> bool {
        matches!(self.phase, CheckPhase::Checking { .. })
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn outcome(&self) -> Option<&CheckOutcome> {
        self.outcome.as_ref()
    }

    pub fn resolved_count(&self) -> u64 {
        self.resolved_count
    }

    #[cfg(test)]
    pub fn latest_snapshot(&self) -> Option<&DrawingSnapshot> {
        self.latest.as_ref()
    }

    /// Regions the current outcome refers to, used to place markers
    pub fn checked_regions(&self) -> &[RecognizedRegion] {
        &self.checked_regions
    }
}

fn empty_snapshot() -> DrawingSnapshot {
    DrawingSnapshot {
        revision: 0,
        strokes: Arc::new(Vec::new()),
        regions: Arc::new(Vec::new()),
        width: 0,
        height: 0,
    }
}

#[cfg(test)]
mod tests;
