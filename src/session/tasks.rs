//! Collaborator calls on the task pools, and the systems that apply their results.
//!
//! Every task is an entity holding the task handle and the token it was issued
//! with. Pollers hand results to the coordinator or hint panel, which decide
//! whether they still apply.

use std::sync::Arc;
use std::time::Duration;

use bevy::prelude::*;
use bevy::tasks::{AsyncComputeTaskPool, Task};
use futures_lite::future;

use super::coordinator::{CheckRequest, RequestToken, SessionCoordinator};
use super::hint::HintPanel;
use super::messages::{
    CheckRequested, CheckResolved, FetchQuestionsRequest, HintRequested, ListenRequested,
    LoadQuestionRequest, QuestionChanged, SelectQuestionRequest, UploadQuestionRequest,
};
use super::resources::{QuestionList, VoiceStatus};
use super::voice::VoiceIntent;
use crate::canvas::{DrawingChanged, DrawingSurface, RecognizedRegion};
use crate::collaborators::{parse_question_text, CollaboratorError, Collaborators, Question, StepCheck};
use crate::config::{AppConfig, UpdateLastQuestionRequest};

type Outcome<T> = Result<T, CollaboratorError>;

#[derive(Component)]
pub struct RecognitionTask {
    pub revision: u64,
    pub task: Task<Outcome<Vec<RecognizedRegion>>>,
}

#[derive(Component)]
pub struct CheckTask {
    pub token: RequestToken,
    pub task: Task<Outcome<Vec<StepCheck>>>,
}

#[derive(Component)]
pub struct HintTask {
    pub token: RequestToken,
    /// App time before which a finished hint is held back
    pub ready_at: Duration,
    pub task: Task<Outcome<String>>,
}

#[derive(Component)]
pub struct ListenTask {
    pub ready_at: Duration,
    pub task: Task<Outcome<String>>,
}

#[derive(Component)]
pub struct FetchQuestionsTask(pub Task<Outcome<Vec<Question>>>);

#[derive(Component)]
pub struct LoadQuestionTask(pub Task<Outcome<Option<Question>>>);

/// Startup system: seed timings from the config and restore the last session
pub fn start_session(
    config: Res<AppConfig>,
    mut coordinator: ResMut<SessionCoordinator>,
    mut hint_panel: ResMut<HintPanel>,
    mut fetch_events: MessageWriter<FetchQuestionsRequest>,
    mut load_events: MessageWriter<LoadQuestionRequest>,
    question_list: Res<QuestionList>,
) {
    coordinator.set_check_interval(config.data.check_interval());
    hint_panel.set_collapse_after(config.data.hint_collapse());

    fetch_events.write(FetchQuestionsRequest {
        criteria: question_list.criteria.clone(),
    });

    if let Some(id) = config.data.last_question_id.clone() {
        info!("Restoring last question {}", id);
        load_events.write(LoadQuestionRequest { id });
    }
}

pub fn load_question_system(
    mut commands: Commands,
    mut events: MessageReader<LoadQuestionRequest>,
    coordinator: Res<SessionCoordinator>,
    collaborators: Res<Collaborators>,
) {
    for event in events.read() {
        if coordinator.question().is_some_and(|q| q.id == event.id) {
            continue;
        }
        let id = event.id.clone();
        let source = Arc::clone(&collaborators.questions);
        let task = AsyncComputeTaskPool::get().spawn(async move { source.fetch_by_id(&id) });
        commands.spawn(LoadQuestionTask(task));
    }
}

pub fn fetch_questions_system(
    mut commands: Commands,
    mut events: MessageReader<FetchQuestionsRequest>,
    collaborators: Res<Collaborators>,
    mut question_list: ResMut<QuestionList>,
    existing: Query<Entity, With<FetchQuestionsTask>>,
) {
    // Only the newest criteria matter
    let Some(event) = events.read().last() else {
        return;
    };
    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }

    let criteria = event.criteria.clone();
    question_list.criteria = criteria.clone();
    question_list.is_fetching = true;
    question_list.error = None;

    let source = Arc::clone(&collaborators.questions);
    let task = AsyncComputeTaskPool::get().spawn(async move { source.fetch(&criteria) });
    commands.spawn(FetchQuestionsTask(task));
}

pub fn poll_fetch_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut FetchQuestionsTask)>,
    mut question_list: ResMut<QuestionList>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(result) = future::block_on(future::poll_once(&mut task.0)) {
            question_list.is_fetching = false;
            match result {
                Ok(questions) => {
                    debug!("Fetched {} question(s)", questions.len());
                    question_list.questions = questions;
                }
                Err(e) => {
                    warn!("Question fetch failed: {}", e);
                    question_list.error = Some(format!("Could not load questions: {}", e));
                }
            }
            commands.entity(entity).despawn();
        }
    }
}

pub fn poll_load_question_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut LoadQuestionTask)>,
    mut select_events: MessageWriter<SelectQuestionRequest>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(result) = future::block_on(future::poll_once(&mut task.0)) {
            match result {
                Ok(Some(question)) => {
                    select_events.write(SelectQuestionRequest {
                        question: Some(question),
                    });
                }
                Ok(None) => info!("Question is no longer available"),
                Err(e) => warn!("Could not load question: {}", e),
            }
            commands.entity(entity).despawn();
        }
    }
}

pub fn handle_upload_requests(
    mut events: MessageReader<UploadQuestionRequest>,
    mut question_list: ResMut<QuestionList>,
    mut select_events: MessageWriter<SelectQuestionRequest>,
) {
    for event in events.read() {
        match parse_question_text(&event.text) {
            Ok(question) => {
                info!("Uploaded question {} with {} option(s)", question.id, question.options.len());
                question_list.error = None;
                question_list.insert_uploaded(question.clone());
                select_events.write(SelectQuestionRequest {
                    question: Some(question),
                });
            }
            Err(e) => {
                warn!("Rejected uploaded question: {}", e);
                question_list.error = Some("No question found in the uploaded text.".to_string());
            }
        }
    }
}

pub fn apply_question_selection(
    mut events: MessageReader<SelectQuestionRequest>,
    mut coordinator: ResMut<SessionCoordinator>,
    mut hint_panel: ResMut<HintPanel>,
    mut changed_events: MessageWriter<QuestionChanged>,
    mut config_events: MessageWriter<UpdateLastQuestionRequest>,
) {
    for event in events.read() {
        if !coordinator.select_question(event.question.clone()) {
            continue;
        }
        let question_id = event.question.as_ref().map(|q| q.id.clone());
        info!("Active question: {:?}", question_id);

        hint_panel.close();
        changed_events.write(QuestionChanged {
            question_id: question_id.clone(),
        });
        config_events.write(UpdateLastQuestionRequest { question_id });
    }
}

/// Send each new committed drawing to the recognizer. Older recognition
/// tasks are dropped since their revision can no longer be applied.
pub fn start_recognition(
    mut commands: Commands,
    mut events: MessageReader<DrawingChanged>,
    collaborators: Res<Collaborators>,
    existing: Query<Entity, With<RecognitionTask>>,
) {
    let Some(event) = events.read().last() else {
        return;
    };
    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }

    let revision = event.snapshot.revision;
    let strokes = Arc::clone(&event.snapshot.strokes);
    let recognizer = Arc::clone(&collaborators.recognizer);
    let task = AsyncComputeTaskPool::get().spawn(async move { recognizer.recognize(&strokes) });
    commands.spawn(RecognitionTask { revision, task });
}

pub fn poll_recognition_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut RecognitionTask)>,
    mut surface: ResMut<DrawingSurface>,
    mut coordinator: ResMut<SessionCoordinator>,
    collaborators: Res<Collaborators>,
    time: Res<Time>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(result) = future::block_on(future::poll_once(&mut task.task)) {
            commands.entity(entity).despawn();

            let regions = result.unwrap_or_else(|e| {
                warn!("Recognition failed: {}", e);
                Vec::new()
            });
            let Some(snapshot) = surface.apply_regions(task.revision, regions) else {
                debug!("Dropping recognition for stale revision {}", task.revision);
                continue;
            };
            if let Some(request) = coordinator.submit_snapshot(snapshot, time.elapsed()) {
                spawn_check(&mut commands, &collaborators, request);
            }
        }
    }
}

fn spawn_check(commands: &mut Commands, collaborators: &Collaborators, request: CheckRequest) {
    let CheckRequest {
        token,
        snapshot,
        question,
    } = request;
    let checker = Arc::clone(&collaborators.checker);
    let task = AsyncComputeTaskPool::get().spawn(async move { checker.check(&snapshot, &question) });
    commands.spawn(CheckTask { token, task });
}

/// Issue deferred and follow-up checks once the interval allows
pub fn poll_check_schedule(
    mut commands: Commands,
    mut coordinator: ResMut<SessionCoordinator>,
    collaborators: Res<Collaborators>,
    time: Res<Time>,
) {
    if !coordinator.is_pending() {
        return;
    }
    if let Some(request) = coordinator.poll(time.elapsed()) {
        spawn_check(&mut commands, &collaborators, request);
    }
}

pub fn handle_check_requests(
    mut commands: Commands,
    mut events: MessageReader<CheckRequested>,
    mut coordinator: ResMut<SessionCoordinator>,
    collaborators: Res<Collaborators>,
    time: Res<Time>,
) {
    // Several requests in one frame collapse into one check
    if events.read().count() == 0 {
        return;
    }
    if coordinator.question().is_none() {
        debug!("Check requested without an active question");
        return;
    }
    if let Some(request) = coordinator.request_check(time.elapsed()) {
        spawn_check(&mut commands, &collaborators, request);
    }
}

pub fn poll_check_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut CheckTask)>,
    mut coordinator: ResMut<SessionCoordinator>,
    collaborators: Res<Collaborators>,
    time: Res<Time>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(result) = future::block_on(future::poll_once(&mut task.task)) {
            commands.entity(entity).despawn();
            if !coordinator.apply_check_result(&task.token, result) {
                continue;
            }
            // Drawing that arrived while this check ran goes out right away
            if let Some(request) = coordinator.follow_up(time.elapsed()) {
                spawn_check(&mut commands, &collaborators, request);
            }
        }
    }
}

/// Announce every applied outcome, including ones resolved without the checker
pub fn emit_check_resolved(
    coordinator: Res<SessionCoordinator>,
    mut last_seen: Local<u64>,
    mut resolved_events: MessageWriter<CheckResolved>,
) {
    if coordinator.resolved_count() == *last_seen {
        return;
    }
    *last_seen = coordinator.resolved_count();
    if let Some(outcome) = coordinator.outcome() {
        resolved_events.write(CheckResolved {
            outcome: outcome.clone(),
        });
    }
}

pub fn handle_hint_requests(
    mut commands: Commands,
    mut events: MessageReader<HintRequested>,
    mut hint_panel: ResMut<HintPanel>,
    mut next_seq: Local<u64>,
    coordinator: Res<SessionCoordinator>,
    surface: Res<DrawingSurface>,
    collaborators: Res<Collaborators>,
    time: Res<Time>,
) {
    if events.read().count() == 0 {
        return;
    }
    let Some(question) = coordinator.question().cloned() else {
        debug!("Hint requested without an active question");
        return;
    };

    *next_seq += 1;
    let token = RequestToken {
        question_id: question.id.clone(),
        seq: *next_seq,
    };
    if !hint_panel.request(token.clone()) {
        debug!("Hint already being generated");
        return;
    }

    info!("Generating hint for question {}", question.id);
    let snapshot = surface.snapshot();
    let hints = Arc::clone(&collaborators.hints);
    let ready_at = time.elapsed() + hints.response_delay();
    let task = AsyncComputeTaskPool::get().spawn(async move { hints.generate_hint(&snapshot, &question) });
    commands.spawn(HintTask { token, ready_at, task });
}

pub fn poll_hint_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut HintTask)>,
    mut hint_panel: ResMut<HintPanel>,
    time: Res<Time>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if !response_due(task.ready_at, time.elapsed()) {
            continue;
        }
        if let Some(result) = future::block_on(future::poll_once(&mut task.task)) {
            if hint_panel.apply(&task.token, result) {
                debug!("Hint {} shown", task.token.seq);
            }
            commands.entity(entity).despawn();
        }
    }
}

pub fn tick_hint_panel(time: Res<Time>, mut hint_panel: ResMut<HintPanel>) {
    if hint_panel.is_expanded() {
        hint_panel.tick(time.delta());
    }
}

pub fn handle_listen_requests(
    mut commands: Commands,
    mut events: MessageReader<ListenRequested>,
    mut voice_status: ResMut<VoiceStatus>,
    collaborators: Res<Collaborators>,
    time: Res<Time>,
) {
    if events.read().count() == 0 || voice_status.is_listening {
        return;
    }
    voice_status.is_listening = true;

    let listener = Arc::clone(&collaborators.voice);
    let ready_at = time.elapsed() + listener.response_delay();
    let task = AsyncComputeTaskPool::get().spawn(async move { listener.listen() });
    commands.spawn(ListenTask { ready_at, task });
}

pub fn poll_listen_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut ListenTask)>,
    mut voice_status: ResMut<VoiceStatus>,
    mut check_events: MessageWriter<CheckRequested>,
    mut hint_events: MessageWriter<HintRequested>,
    time: Res<Time>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if !response_due(task.ready_at, time.elapsed()) {
            continue;
        }
        if let Some(result) = future::block_on(future::poll_once(&mut task.task)) {
            voice_status.is_listening = false;
            match result {
                Ok(transcript) => {
                    let intent = VoiceIntent::classify(&transcript);
                    info!("Heard {:?} -> {:?}", transcript, intent);
                    match intent {
                        VoiceIntent::CheckRequested => {
                            check_events.write(CheckRequested);
                        }
                        VoiceIntent::HintRequested => {
                            hint_events.write(HintRequested);
                        }
                        VoiceIntent::None => {}
                    }
                    voice_status.last_transcript = Some(transcript);
                    voice_status.last_intent = Some(intent);
                }
                Err(e) => {
                    warn!("Listening failed: {}", e);
                    voice_status.last_transcript = None;
                    voice_status.last_intent = None;
                }
            }
            commands.entity(entity).despawn();
        }
    }
}

/// Finished responses are held back until their collaborator's delay has passed
fn response_due(ready_at: Duration, now: Duration) -> bool {
    now >= ready_at
}

#[cfg(test)]
mod tests;
