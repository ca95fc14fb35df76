//! Committed question/answer turns kept for display history.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, TopicId};

/// One answered question. Created once per committed answer and never
/// modified afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTurn {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub answer: String,
    pub timestamp: Timestamp,
    pub topic_id: TopicId,
}

impl ConversationTurn {
    pub fn new(
        topic_id: TopicId,
        question: impl Into<String>,
        options: Option<Vec<String>>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            options,
            answer: answer.into(),
            timestamp: Timestamp::now(),
            topic_id,
        }
    }

    /// True when the answer is one of the offered options verbatim.
    pub fn answered_with_option(&self) -> bool {
        self.options
            .as_ref()
            .is_some_and(|options| options.iter().any(|o| o == &self.answer))
    }
}
