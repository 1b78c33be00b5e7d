//! Study session: active question, check scheduling, hints and voice commands.

mod coordinator;
mod hint;
mod messages;
mod propagation;
mod resources;
mod tasks;
mod voice;

pub use coordinator::{CheckOutcome, SessionCoordinator};
pub use hint::{HintPanel, HintPhase};
pub use messages::{
    CheckRequested, CheckResolved, FetchQuestionsRequest, HintRequested, ListenRequested,
    LoadQuestionRequest, QuestionChanged, SelectQuestionRequest, UploadQuestionRequest,
};
pub use propagation::{DEFAULT_ERROR_MESSAGE, DEPENDENT_WARNING};
pub use resources::{QuestionList, VoiceStatus};
pub use voice::VoiceIntent;

use bevy::prelude::*;

use crate::canvas::CanvasInput;
use crate::collaborators::Collaborators;
use crate::config::ConfigLoaded;

/// Systems that apply collaborator results to session state
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionUpdate;

pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Collaborators>()
            .init_resource::<SessionCoordinator>()
            .init_resource::<HintPanel>()
            .init_resource::<QuestionList>()
            .init_resource::<VoiceStatus>()
            .add_message::<SelectQuestionRequest>()
            .add_message::<LoadQuestionRequest>()
            .add_message::<FetchQuestionsRequest>()
            .add_message::<UploadQuestionRequest>()
            .add_message::<CheckRequested>()
            .add_message::<HintRequested>()
            .add_message::<ListenRequested>()
            .add_message::<QuestionChanged>()
            .add_message::<CheckResolved>()
            .add_systems(Startup, tasks::start_session.after(ConfigLoaded))
            .add_systems(
                Update,
                (
                    tasks::handle_upload_requests,
                    tasks::load_question_system,
                    tasks::poll_load_question_tasks,
                    tasks::apply_question_selection,
                    tasks::fetch_questions_system,
                    tasks::poll_fetch_tasks,
                    tasks::start_recognition,
                    tasks::poll_recognition_tasks,
                    tasks::poll_check_schedule,
                    tasks::handle_listen_requests,
                    tasks::poll_listen_tasks,
                    tasks::handle_check_requests,
                    tasks::poll_check_tasks,
                    tasks::emit_check_resolved,
                    tasks::handle_hint_requests,
                    tasks::poll_hint_tasks,
                    tasks::tick_hint_panel,
                )
                    .chain()
                    .in_set(SessionUpdate)
                    .after(CanvasInput),
            );
    }
}
