//! Error types for the interview domain

use crate::domain::foundation::{TopicId, ValidationError};

/// Curriculum construction errors
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CurriculumError {
    #[error("Invalid topic: {0}")]
    InvalidTopic(#[from] ValidationError),

    #[error("Duplicate topic id: {0}")]
    DuplicateTopic(TopicId),
}

/// Raised when a stored interview state does not fit the curriculum it is
/// being resumed against.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StateError {
    #[error("Topic index {index} exceeds curriculum length {len}")]
    TopicIndexOutOfRange { index: usize, len: usize },

    #[error("Topic history has {records} records but topic index is {index}")]
    HistoryLengthMismatch { records: usize, index: usize },

    #[error("Topic history entry {position} is {found}, expected {expected}")]
    HistoryOrderMismatch {
        position: usize,
        expected: TopicId,
        found: TopicId,
    },

    #[error("Turn count {turns} exceeds the ceiling of topic {topic} ({max_turns})")]
    TurnCountExceedsCeiling {
        topic: TopicId,
        turns: u32,
        max_turns: u32,
    },

    #[error("Terminal state carries a non-zero turn count ({0})")]
    TerminalTurnCount(u32),
}
