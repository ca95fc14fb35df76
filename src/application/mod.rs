//! Application layer - Use cases built on the domain and the ports.
//!
//! The interview orchestrator owns the live interview and is the only
//! writer of its state.

pub mod interview;

pub use interview::{
    AnswerOutcome, CycleOutcome, InterviewOrchestrator, InterviewRepository, OrchestratorError,
    OrchestratorSettings, PresentedQuestion,
};
