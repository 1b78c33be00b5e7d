use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::collaborators::Difficulty;
use crate::session::propagation::DEPENDENT_WARNING;

fn question(id: &str) -> Question {
    Question {
        id: id.to_string(),
        text: format!("Question {}", id),
        options: Vec::new(),
        difficulty: Difficulty::Medium,
        subject: "Mathematics".to_string(),
        chapter: "Calculus".to_string(),
        solution: None,
    }
}

fn region(id: &str) -> RecognizedRegion {
    RecognizedRegion {
        id: id.to_string(),
        content: String::new(),
        bounding_box: None,
    }
}

fn snapshot(revision: u64, region_ids: &[&str]) -> DrawingSnapshot {
    DrawingSnapshot {
        revision,
        strokes: Arc::new(Vec::new()),
        regions: Arc::new(region_ids.iter().map(|id| region(id)).collect()),
        width: 800,
        height: 600,
    }
}

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

fn coordinator_with(question_id: &str) -> SessionCoordinator {
    let mut coordinator = SessionCoordinator::new(secs(10));
    coordinator.select_question(Some(question(question_id)));
    coordinator
}

#[test]
fn test_first_snapshot_is_forwarded() {
    let mut coordinator = coordinator_with("q1");
    let request = coordinator.submit_snapshot(snapshot(1, &["a"]), secs(0)).unwrap();
    assert_eq!(request.token.question_id, "q1");
    assert_eq!(request.question.id, "q1");
    assert!(coordinator.is_checking());
}

#[test]
fn test_nothing_forwarded_without_question() {
    let mut coordinator = SessionCoordinator::new(secs(10));
    assert!(coordinator.submit_snapshot(snapshot(1, &["a"]), secs(0)).is_none());
    assert!(coordinator.request_check(secs(0)).is_none());
    assert_eq!(coordinator.phase(), &CheckPhase::Idle);
}

#[test]
fn test_empty_regions_resolve_without_checker() {
    let mut coordinator = coordinator_with("q1");
    assert!(coordinator.submit_snapshot(snapshot(1, &[]), secs(0)).is_none());
    assert_eq!(coordinator.phase(), &CheckPhase::Resolved);
    let outcome = coordinator.outcome().unwrap();
    assert!(!outcome.has_error);
    assert!(outcome.steps.is_empty());
    assert!(outcome.hint_message.is_none());
}

#[test]
fn test_explicit_check_on_empty_canvas_is_neutral() {
    let mut coordinator = coordinator_with("q1");
    assert!(coordinator.request_check(secs(0)).is_none());
    assert_eq!(coordinator.phase(), &CheckPhase::Resolved);
    assert_eq!(coordinator.outcome(), Some(&CheckOutcome::neutral()));
}

#[test]
fn test_duplicate_snapshot_is_not_forwarded_twice() {
    let mut coordinator = coordinator_with("q1");
    let request = coordinator.submit_snapshot(snapshot(1, &["a"]), secs(0)).unwrap();
    assert!(coordinator.apply_check_result(&request.token, Ok(vec![StepCheck::correct("a")])));

    assert!(coordinator.submit_snapshot(snapshot(1, &["a"]), secs(30)).is_none());
    assert!(!coordinator.is_pending());
}

#[test]
fn test_snapshots_within_interval_are_deferred() {
    let mut coordinator = coordinator_with("q1");
    let request = coordinator.submit_snapshot(snapshot(1, &["a"]), secs(0)).unwrap();
    coordinator.apply_check_result(&request.token, Ok(vec![StepCheck::correct("a")]));

    assert!(coordinator.submit_snapshot(snapshot(2, &["a", "b"]), secs(3)).is_none());
    assert!(coordinator.is_pending());
    assert!(coordinator.poll(secs(9)).is_none());

    let follow_up = coordinator.poll(secs(10)).unwrap();
    assert_eq!(follow_up.snapshot.revision, 2);
    assert!(!coordinator.is_pending());
}

#[test]
fn test_snapshot_during_check_waits_for_result() {
    let mut coordinator = coordinator_with("q1");
    let first = coordinator.submit_snapshot(snapshot(1, &["a"]), secs(0)).unwrap();
    assert!(coordinator.submit_snapshot(snapshot(2, &["a", "b"]), secs(20)).is_none());
    assert!(coordinator.is_pending());
    assert!(coordinator.poll(secs(21)).is_none());

    assert!(coordinator.apply_check_result(&first.token, Ok(vec![StepCheck::correct("a")])));
    let follow_up = coordinator.follow_up(secs(21)).unwrap();
    assert_eq!(follow_up.snapshot.revision, 2);
    assert!(follow_up.token.seq > first.token.seq);
}

#[test]
fn test_follow_up_skips_interval() {
    let mut coordinator = coordinator_with("q1");
    let first = coordinator.submit_snapshot(snapshot(1, &["a"]), secs(0)).unwrap();
    assert!(coordinator.submit_snapshot(snapshot(2, &["a", "b"]), secs(2)).is_none());

    assert!(coordinator.apply_check_result(&first.token, Ok(vec![StepCheck::correct("a")])));
    // Interval poll would still wait until 10s
    let follow_up = coordinator.follow_up(secs(3)).unwrap();
    assert_eq!(follow_up.snapshot.revision, 2);
    assert!(coordinator.is_checking());
    assert!(!coordinator.is_pending());
}

#[test]
fn test_no_follow_up_without_new_drawing() {
    let mut coordinator = coordinator_with("q1");
    let first = coordinator.submit_snapshot(snapshot(1, &["a"]), secs(0)).unwrap();
    assert!(coordinator.apply_check_result(&first.token, Ok(vec![StepCheck::correct("a")])));
    assert!(coordinator.follow_up(secs(1)).is_none());

    assert!(coordinator.submit_snapshot(snapshot(2, &["a", "b"]), secs(4)).is_none());
    assert!(coordinator.is_pending());
    assert!(coordinator.poll(secs(10)).is_some());
}

#[test]
fn test_explicit_check_ignores_interval_and_duplicates() {
    let mut coordinator = coordinator_with("q1");
    let request = coordinator.submit_snapshot(snapshot(1, &["a"]), secs(0)).unwrap();
    coordinator.apply_check_result(&request.token, Ok(vec![StepCheck::correct("a")]));

    let again = coordinator.request_check(secs(1)).unwrap();
    assert_eq!(again.snapshot.revision, 1);
}

#[test]
fn test_explicit_check_never_overlaps() {
    let mut coordinator = coordinator_with("q1");
    coordinator.submit_snapshot(snapshot(1, &["a"]), secs(0)).unwrap();
    assert!(coordinator.request_check(secs(1)).is_none());
}

#[test]
fn test_stale_token_after_question_change_is_dropped() {
    let mut coordinator = coordinator_with("q1");
    let request = coordinator.submit_snapshot(snapshot(1, &["a"]), secs(0)).unwrap();

    assert!(coordinator.select_question(Some(question("q2"))));
    assert_eq!(coordinator.phase(), &CheckPhase::Idle);

    let applied = coordinator.apply_check_result(&request.token, Ok(vec![StepCheck::incorrect("a", "wrong")]));
    assert!(!applied);
    assert!(coordinator.outcome().is_none());
    assert_eq!(coordinator.phase(), &CheckPhase::Idle);
}

#[test]
fn test_older_request_is_dropped_after_newer_one() {
    let mut coordinator = coordinator_with("q1");
    let first = coordinator.submit_snapshot(snapshot(1, &["a"]), secs(0)).unwrap();
    coordinator.select_question(Some(question("q2")));
    coordinator.select_question(Some(question("q1")));
    let second = coordinator.request_check(secs(1)).unwrap();
    assert_eq!(first.token.question_id, second.token.question_id);
    assert_ne!(first.token, second.token);

    assert!(!coordinator.apply_check_result(&first.token, Ok(Vec::new())));
    assert!(coordinator.is_checking());
    assert!(coordinator.apply_check_result(&second.token, Ok(vec![StepCheck::correct("a")])));
}

#[test]
fn test_reselecting_same_question_keeps_state() {
    let mut coordinator = coordinator_with("q1");
    coordinator.submit_snapshot(snapshot(1, &["a"]), secs(0)).unwrap();
    assert!(!coordinator.select_question(Some(question("q1"))));
    assert!(coordinator.is_checking());
}

#[test]
fn test_question_change_clears_outcome() {
    let mut coordinator = coordinator_with("q1");
    let request = coordinator.submit_snapshot(snapshot(1, &["a"]), secs(0)).unwrap();
    coordinator.apply_check_result(&request.token, Ok(vec![StepCheck::incorrect("a", "wrong")]));
    assert!(coordinator.outcome().is_some());

    coordinator.select_question(Some(question("q2")));
    assert!(coordinator.outcome().is_none());
}

#[test]
fn test_result_is_ordered_and_propagated() {
    let mut coordinator = coordinator_with("q1");
    let request = coordinator
        .submit_snapshot(snapshot(1, &["a", "b", "c"]), secs(0))
        .unwrap();
    let steps = vec![
        StepCheck::correct("c"),
        StepCheck::correct("ghost"),
        StepCheck::incorrect("b", "Sign error"),
        StepCheck::correct("a"),
    ];
    assert!(coordinator.apply_check_result(&request.token, Ok(steps)));

    let outcome = coordinator.outcome().unwrap();
    let ids: Vec<&str> = outcome.steps.iter().map(|s| s.region_id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "c"]);
    assert!(outcome.has_error);
    assert_eq!(outcome.hint_message.as_deref(), Some(REVIEW_HINT));
    assert_eq!(outcome.first_error().unwrap().region_id, "b");
    assert!(outcome.steps[0].warning_message.is_none());
    assert!(outcome.steps[1].warning_message.is_none());
    assert_eq!(outcome.steps[2].warning_message.as_deref(), Some(DEPENDENT_WARNING));
    assert!(outcome.has_warnings());
}

#[test]
fn test_all_correct_has_no_hint() {
    let mut coordinator = coordinator_with("q1");
    let request = coordinator.submit_snapshot(snapshot(1, &["a", "b"]), secs(0)).unwrap();
    coordinator.apply_check_result(&request.token, Ok(vec![StepCheck::correct("a"), StepCheck::correct("b")]));

    let outcome = coordinator.outcome().unwrap();
    assert!(!outcome.has_error);
    assert!(outcome.hint_message.is_none());
    assert!(!outcome.has_warnings());
}

#[test]
fn test_checker_failure_is_neutral() {
    let mut coordinator = coordinator_with("q1");
    let request = coordinator.submit_snapshot(snapshot(1, &["a"]), secs(0)).unwrap();
    assert!(coordinator.apply_check_result(&request.token, Err(CollaboratorError::Unavailable)));
    assert_eq!(coordinator.outcome(), Some(&CheckOutcome::neutral()));
    assert_eq!(coordinator.phase(), &CheckPhase::Resolved);
}

#[test]
fn test_result_without_check_in_flight_is_dropped() {
    let mut coordinator = coordinator_with("q1");
    let token = RequestToken {
        question_id: "q1".to_string(),
        seq: 1,
    };
    assert!(!coordinator.apply_check_result(&token, Ok(Vec::new())));
}

#[test]
fn test_every_resolution_is_counted() {
    let mut coordinator = coordinator_with("q1");
    assert_eq!(coordinator.resolved_count(), 0);
    coordinator.request_check(secs(0));
    assert_eq!(coordinator.resolved_count(), 1);

    let request = coordinator.submit_snapshot(snapshot(1, &["a"]), secs(20)).unwrap();
    assert_eq!(coordinator.resolved_count(), 1);
    coordinator.apply_check_result(&request.token, Ok(vec![StepCheck::correct("a")]));
    assert_eq!(coordinator.resolved_count(), 2);
}

#[test]
fn test_markers_use_regions_of_checked_snapshot() {
    let mut coordinator = coordinator_with("q1");
    let request = coordinator.submit_snapshot(snapshot(1, &["a"]), secs(0)).unwrap();
    coordinator.submit_snapshot(snapshot(2, &["a", "b"]), secs(1));
    coordinator.apply_check_result(&request.token, Ok(vec![StepCheck::correct("a")]));

    let ids: Vec<&str> = coordinator.checked_regions().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["a"]);
    assert_eq!(coordinator.latest_snapshot().unwrap().revision, 2);
}
