use std::time::Duration;

use bevy::tasks::TaskPool;

use super::*;
use crate::canvas::DrawingSnapshot;

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

fn question(collaborators: &Collaborators, id: &str) -> Question {
    collaborators.questions.fetch_by_id(id).unwrap().unwrap()
}

#[test]
fn test_response_held_until_ready() {
    let ready_at = Duration::from_millis(1500);
    assert!(!response_due(ready_at, Duration::from_millis(200)));
    assert!(response_due(ready_at, ready_at));
    assert!(response_due(ready_at, Duration::from_secs(2)));
}

#[test]
fn test_check_resolves_while_hint_is_pending() {
    let pool = AsyncComputeTaskPool::get_or_init(TaskPool::new);
    let collaborators = Collaborators::default();
    let q1 = question(&collaborators, "q1");
    let now = Duration::ZERO;

    let mut hint_panel = HintPanel::default();
    let hint_token = RequestToken {
        question_id: q1.id.clone(),
        seq: 1,
    };
    assert!(hint_panel.request(hint_token));
    let hints = Arc::clone(&collaborators.hints);
    let hint_ready_at = now + hints.response_delay();
    let hint_question = q1.clone();
    let hint_task = pool.spawn(async move { hints.generate_hint(&snapshot(1, &["step-0"]), &hint_question) });

    let mut coordinator = SessionCoordinator::new(Duration::from_secs(10));
    coordinator.select_question(Some(q1));
    let request = coordinator.submit_snapshot(snapshot(1, &["step-0"]), now).unwrap();
    let checker = Arc::clone(&collaborators.checker);
    let CheckRequest {
        token,
        snapshot: checked,
        question,
    } = request;
    let check_task = pool.spawn(async move { checker.check(&checked, &question) });

    let result = future::block_on(check_task);
    assert!(coordinator.apply_check_result(&token, result));
    assert!(coordinator.outcome().is_some());

    // The hint itself is computed, but not shown before its delay
    assert!(future::block_on(hint_task).is_ok());
    assert!(hint_panel.is_generating());
    assert!(!response_due(hint_ready_at, Duration::from_millis(100)));
}

#[test]
fn test_listen_delay_comes_from_listener() {
    let collaborators = Collaborators::default();
    let started = std::time::Instant::now();
    assert!(collaborators.voice.listen().is_ok());
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(collaborators.voice.response_delay() >= Duration::from_secs(1));
}
