//! Interview domain module.
//!
//! Topic curriculum, prompt composition, reply parsing and the per-topic
//! progression state machine. Everything here is pure; I/O lives behind the
//! ports and is driven by the application layer.

mod curriculum;
mod errors;
mod message;
mod parser;
mod progress;
mod prompt;
mod state;
mod topic;
mod transcript;
mod turn;

pub use curriculum::Curriculum;
pub use errors::{CurriculumError, StateError};
pub use message::{Message, MessageRole};
pub use parser::{parse_response, ExtractionStrategy, ParseOutcome, ParsedQuestion, ResponseParser};
pub use progress::{InterviewProgress, TopicSummary, MINUTES_PER_TOPIC};
pub use prompt::{compose_system_prompt, topic_transition_message, INTERVIEWER_PERSONA};
pub use state::{should_advance, InterviewState, TopicRecord, MIN_SUBSTANTIVE_RESPONSE_CHARS};
pub use topic::{Topic, TopicCategory};
pub use transcript::render_transcript;
pub use turn::ConversationTurn;
