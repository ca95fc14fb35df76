//! Interview progression state machine.
//!
//! Per topic the interview is `Active(turns)`. Each committed answer moves it
//! to `Active(turns + 1)`; when the advancement decision says so, the topic is
//! closed and the next one starts at `Active(0)`, or the interview becomes
//! terminal once the curriculum is exhausted. Terminal is absorbing.
//!
//! Transitions consume the state and return the next one, so a caller can
//! only ever hold one consistent value.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::TopicId;

use super::curriculum::Curriculum;
use super::errors::StateError;
use super::message::Message;
use super::topic::Topic;

/// Answers shorter than this (trimmed, in characters) are too sparse to
/// justify leaving a topic between its floor and ceiling.
pub const MIN_SUBSTANTIVE_RESPONSE_CHARS: usize = 20;

/// Summary of a completed topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicRecord {
    pub topic_id: TopicId,
    pub turns: u32,
    pub completed: bool,
}

/// Where the interview is within the curriculum.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewState {
    pub current_topic_index: usize,
    pub current_topic_turn_count: u32,
    /// Alternating interviewer questions and interviewee answers. Append-only.
    pub conversation_history: Vec<Message>,
    /// One record per completed topic, in curriculum order.
    pub topic_history: Vec<TopicRecord>,
}

impl InterviewState {
    /// Fresh state positioned at the first topic.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_complete(&self, curriculum: &Curriculum) -> bool {
        self.current_topic_index >= curriculum.len()
    }

    /// The topic being discussed, or `None` once terminal.
    pub fn current_topic<'a>(&self, curriculum: &'a Curriculum) -> Option<&'a Topic> {
        curriculum.get(self.current_topic_index)
    }

    /// Commits one question/answer exchange to the current topic.
    ///
    /// Appends the question as an assistant message and the answer as a user
    /// message, then increments the topic's turn count. Terminal states are
    /// returned unchanged.
    pub fn record_exchange(
        mut self,
        curriculum: &Curriculum,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        if self.is_complete(curriculum) {
            return self;
        }

        self.conversation_history.push(Message::assistant(question));
        self.conversation_history.push(Message::user(answer));
        self.current_topic_turn_count += 1;
        self
    }

    /// Closes the current topic and moves to the next one.
    ///
    /// Appends a completed `TopicRecord` carrying the current turn count,
    /// increments the index by one and resets the turn count. The
    /// conversation history is left as is. Terminal states are returned
    /// unchanged.
    pub fn advance_topic(mut self, curriculum: &Curriculum) -> Self {
        let Some(topic) = self.current_topic(curriculum) else {
            tracing::warn!(
                index = self.current_topic_index,
                "advance requested on a completed interview; ignoring"
            );
            return self;
        };

        self.topic_history.push(TopicRecord {
            topic_id: topic.id.clone(),
            turns: self.current_topic_turn_count,
            completed: true,
        });
        self.current_topic_index += 1;
        self.current_topic_turn_count = 0;
        self
    }

    /// Checks that a loaded state fits `curriculum`.
    ///
    /// # Errors
    ///
    /// Returns the first `StateError` found.
    pub fn validate(&self, curriculum: &Curriculum) -> Result<(), StateError> {
        let index = self.current_topic_index;

        if index > curriculum.len() {
            return Err(StateError::TopicIndexOutOfRange {
                index,
                len: curriculum.len(),
            });
        }

        if self.topic_history.len() != index {
            return Err(StateError::HistoryLengthMismatch {
                records: self.topic_history.len(),
                index,
            });
        }

        for (position, (record, topic)) in self.topic_history.iter().zip(curriculum.iter()).enumerate() {
            if record.topic_id != topic.id {
                return Err(StateError::HistoryOrderMismatch {
                    position,
                    expected: topic.id.clone(),
                    found: record.topic_id.clone(),
                });
            }
        }

        match self.current_topic(curriculum) {
            Some(topic) if self.current_topic_turn_count > topic.max_turns => {
                Err(StateError::TurnCountExceedsCeiling {
                    topic: topic.id.clone(),
                    turns: self.current_topic_turn_count,
                    max_turns: topic.max_turns,
                })
            }
            None if self.current_topic_turn_count != 0 => {
                Err(StateError::TerminalTurnCount(self.current_topic_turn_count))
            }
            _ => Ok(()),
        }
    }
}

/// Decides whether to leave `topic` after an answer.
///
/// `turn_count` is the topic's turn count including the answer just given.
/// The ceiling overrides everything, the floor overrides content, and only in
/// between does the length of the answer matter.
pub fn should_advance(turn_count: u32, topic: &Topic, user_response: &str) -> bool {
    if turn_count >= topic.max_turns {
        return true;
    }
    if turn_count < topic.min_turns {
        return false;
    }
    user_response.trim().chars().count() >= MIN_SUBSTANTIVE_RESPONSE_CHARS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::interview::message::MessageRole;
    use crate::domain::interview::topic::TopicCategory;
    use proptest::prelude::*;

    fn topic(id: &str, min: u32, max: u32) -> Topic {
        Topic::new(id, id, TopicCategory::Values, "prompt", min, max).unwrap()
    }

    fn curriculum() -> Curriculum {
        Curriculum::new(vec![topic("a", 1, 3), topic("b", 2, 2)]).unwrap()
    }

    const LONG_ANSWER: &str = "子どもの頃、祖母の家で過ごした夏休みのことをよく覚えています。";

    mod should_advance {
        use super::*;

        #[test]
        fn scenario_floor_then_length_heuristic() {
            let t = topic("t", 1, 3);

            assert!(!should_advance(0, &t, LONG_ANSWER));
            assert!(!should_advance(1, &t, "はい、そう"));
            assert!(should_advance(2, &t, &"あ".repeat(40)));
        }

        #[test]
        fn ceiling_ignores_empty_answer() {
            assert!(should_advance(3, &topic("t", 1, 3), ""));
        }

        #[test]
        fn surrounding_whitespace_is_not_counted() {
            let t = topic("t", 1, 3);
            let padded = format!("   {}   ", "a".repeat(19));

            assert!(!should_advance(1, &t, &padded));
            assert!(should_advance(1, &t, &"a".repeat(20)));
        }

        #[test]
        fn length_is_counted_in_characters_not_bytes() {
            let t = topic("t", 1, 3);
            // 19 characters, 57 bytes.
            assert!(!should_advance(1, &t, &"あ".repeat(19)));
        }
    }

    mod transitions {
        use super::*;

        #[test]
        fn new_state_starts_at_first_topic() {
            let state = InterviewState::new();
            let c = curriculum();

            assert_eq!(state.current_topic_index, 0);
            assert_eq!(state.current_topic_turn_count, 0);
            assert_eq!(state.current_topic(&c).unwrap().id.as_str(), "a");
            assert!(!state.is_complete(&c));
        }

        #[test]
        fn record_exchange_appends_question_then_answer() {
            let c = curriculum();
            let state = InterviewState::new().record_exchange(&c, "質問", "回答");

            assert_eq!(state.current_topic_turn_count, 1);
            assert_eq!(state.conversation_history.len(), 2);
            assert_eq!(state.conversation_history[0].role, MessageRole::Assistant);
            assert_eq!(state.conversation_history[0].content, "質問");
            assert_eq!(state.conversation_history[1].role, MessageRole::User);
            assert_eq!(state.conversation_history[1].content, "回答");
        }

        #[test]
        fn advance_closes_topic_and_keeps_history() {
            let c = curriculum();
            let state = InterviewState::new()
                .record_exchange(&c, "q1", "a1")
                .record_exchange(&c, "q2", "a2");
            let history_before = state.conversation_history.clone();

            let state = state.advance_topic(&c);

            assert_eq!(state.current_topic_index, 1);
            assert_eq!(state.current_topic_turn_count, 0);
            assert_eq!(
                state.topic_history,
                vec![TopicRecord {
                    topic_id: TopicId::new("a").unwrap(),
                    turns: 2,
                    completed: true,
                }]
            );
            assert_eq!(state.conversation_history, history_before);
        }

        #[test]
        fn completes_after_last_topic() {
            let c = curriculum();
            let state = InterviewState::new().advance_topic(&c).advance_topic(&c);

            assert!(state.is_complete(&c));
            assert_eq!(state.current_topic_index, c.len());
            assert!(state.current_topic(&c).is_none());
        }

        #[test]
        fn advance_at_terminal_is_noop() {
            let c = curriculum();
            let terminal = InterviewState::new().advance_topic(&c).advance_topic(&c);

            assert_eq!(terminal.clone().advance_topic(&c), terminal);
        }

        #[test]
        fn record_exchange_at_terminal_is_noop() {
            let c = curriculum();
            let terminal = InterviewState::new().advance_topic(&c).advance_topic(&c);

            assert_eq!(terminal.clone().record_exchange(&c, "q", "a"), terminal);
        }

        #[test]
        fn empty_curriculum_is_complete_immediately() {
            let c = Curriculum::new(Vec::new()).unwrap();
            assert!(InterviewState::new().is_complete(&c));
        }
    }

    mod validate {
        use super::*;

        #[test]
        fn states_built_by_transitions_are_valid() {
            let c = curriculum();
            let state = InterviewState::new()
                .record_exchange(&c, "q", "a")
                .advance_topic(&c)
                .record_exchange(&c, "q", "a");

            assert_eq!(state.validate(&c), Ok(()));
            assert_eq!(state.advance_topic(&c).validate(&c), Ok(()));
        }

        #[test]
        fn index_beyond_curriculum_is_rejected() {
            let state = InterviewState {
                current_topic_index: 5,
                ..Default::default()
            };
            assert!(matches!(
                state.validate(&curriculum()),
                Err(StateError::TopicIndexOutOfRange { index: 5, len: 2 })
            ));
        }

        #[test]
        fn missing_history_records_are_rejected() {
            let state = InterviewState {
                current_topic_index: 1,
                ..Default::default()
            };
            assert!(matches!(
                state.validate(&curriculum()),
                Err(StateError::HistoryLengthMismatch { records: 0, index: 1 })
            ));
        }

        #[test]
        fn history_from_another_curriculum_is_rejected() {
            let state = InterviewState {
                current_topic_index: 1,
                topic_history: vec![TopicRecord {
                    topic_id: TopicId::new("other").unwrap(),
                    turns: 1,
                    completed: true,
                }],
                ..Default::default()
            };
            assert!(matches!(
                state.validate(&curriculum()),
                Err(StateError::HistoryOrderMismatch { position: 0, .. })
            ));
        }

        #[test]
        fn turn_count_above_ceiling_is_rejected() {
            let state = InterviewState {
                current_topic_turn_count: 4,
                ..Default::default()
            };
            assert!(matches!(
                state.validate(&curriculum()),
                Err(StateError::TurnCountExceedsCeiling { turns: 4, max_turns: 3, .. })
            ));
        }
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let c = curriculum();
        let state = InterviewState::new()
            .record_exchange(&c, "q", "a")
            .advance_topic(&c);
        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json["currentTopicIndex"], 1);
        assert_eq!(json["currentTopicTurnCount"], 0);
        assert_eq!(json["topicHistory"][0]["topicId"], "a");
        assert_eq!(json["conversationHistory"][1]["role"], "user");

        let back: InterviewState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }

    proptest! {
        #[test]
        fn ceiling_always_advances(extra in 0u32..5, min in 1u32..4, span in 0u32..4, resp in ".{0,40}") {
            let t = topic("t", min, min + span);
            prop_assert!(should_advance(t.max_turns + extra, &t, &resp));
        }

        #[test]
        fn floor_never_advances(min in 1u32..6, span in 0u32..4, below in 1u32..6, resp in ".{0,60}") {
            let t = topic("t", min, min + span);
            let turn_count = min.saturating_sub(below);
            prop_assume!(turn_count < min);
            prop_assert!(!should_advance(turn_count, &t, &resp));
        }

        #[test]
        fn middle_band_follows_trimmed_length(len in 0usize..40) {
            let t = topic("t", 1, 5);
            let resp = "字".repeat(len);
            prop_assert_eq!(should_advance(2, &t, &resp), len >= MIN_SUBSTANTIVE_RESPONSE_CHARS);
        }

        #[test]
        fn advance_moves_exactly_one_topic(turns in 0u32..4) {
            let c = curriculum();
            let mut state = InterviewState::new();
            for _ in 0..turns {
                state = state.record_exchange(&c, "q", "a");
            }

            let next = state.clone().advance_topic(&c);

            prop_assert_eq!(next.current_topic_index, state.current_topic_index + 1);
            prop_assert_eq!(next.current_topic_turn_count, 0);
            prop_assert_eq!(next.topic_history.len(), state.topic_history.len() + 1);
            prop_assert_eq!(next.topic_history.last().map(|r| r.turns), Some(turns));
        }
    }
}
