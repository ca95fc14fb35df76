//! Interview application services.
//!
//! - `InterviewOrchestrator` - Runs the turn cycle against the AI and store ports
//! - `InterviewRepository` - Saves and restores an interview through `KeyValueStore`
//! - `ScheduledContinuation` - Cancellable pacing delay between turns

mod orchestrator;
mod repository;
mod scheduler;

pub use orchestrator::{
    AnswerOutcome, CycleOutcome, GenerationStart, GenerationTicket, InterviewOrchestrator,
    OrchestratorError, OrchestratorSettings, PresentedQuestion, QuestionSource,
    DEFAULT_FALLBACK_MESSAGE,
};
pub use repository::{
    InterviewRepository, RepositoryError, StoredInterview, COMPLETED_KEY, STATE_KEY, TURNS_KEY,
};
pub use scheduler::ScheduledContinuation;
