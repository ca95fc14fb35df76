//! InterviewProgress value object - what the presentation layer shows
//! alongside the current question.

use serde::Serialize;

use super::curriculum::Curriculum;
use super::state::InterviewState;
use super::topic::TopicCategory;

/// Estimated interview minutes per remaining topic.
pub const MINUTES_PER_TOPIC: f64 = 2.5;

/// Display metadata for the topic being discussed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicSummary {
    pub id: String,
    pub name: String,
    pub category: TopicCategory,
    pub min_turns: u32,
    pub max_turns: u32,
}

/// A read-only snapshot of interview progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterviewProgress {
    pub current_topic_index: usize,
    pub current_topic_turn_count: u32,
    pub total_topics: usize,
    /// `None` once the interview is complete.
    pub current_topic: Option<TopicSummary>,
}

impl InterviewProgress {
    pub fn snapshot(state: &InterviewState, curriculum: &Curriculum) -> Self {
        let current_topic = state.current_topic(curriculum).map(|topic| TopicSummary {
            id: topic.id.to_string(),
            name: topic.name.clone(),
            category: topic.category,
            min_turns: topic.min_turns,
            max_turns: topic.max_turns,
        });

        Self {
            current_topic_index: state.current_topic_index.min(curriculum.len()),
            current_topic_turn_count: state.current_topic_turn_count,
            total_topics: curriculum.len(),
            current_topic,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.current_topic_index >= self.total_topics
    }

    pub fn completed_topics(&self) -> usize {
        self.current_topic_index
    }

    /// Share of topics completed (0-100).
    pub fn percentage(&self) -> u8 {
        if self.total_topics == 0 {
            return 100;
        }
        ((self.completed_topics() * 100) / self.total_topics) as u8
    }

    /// Rough minutes left, rounded up.
    pub fn estimated_minutes_remaining(&self) -> u32 {
        let remaining = self.total_topics.saturating_sub(self.completed_topics());
        (remaining as f64 * MINUTES_PER_TOPIC).ceil() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::interview::topic::Topic;

    fn curriculum(n: usize) -> Curriculum {
        let topics = (0..n)
            .map(|i| Topic::new(format!("t{}", i), format!("Topic {}", i), TopicCategory::Values, "", 1, 2).unwrap())
            .collect();
        Curriculum::new(topics).unwrap()
    }

    #[test]
    fn fresh_interview_is_at_zero_percent() {
        let c = curriculum(4);
        let progress = InterviewProgress::snapshot(&InterviewState::new(), &c);

        assert_eq!(progress.percentage(), 0);
        assert_eq!(progress.estimated_minutes_remaining(), 10);
        assert_eq!(progress.current_topic.as_ref().unwrap().id, "t0");
        assert!(!progress.is_complete());
    }

    #[test]
    fn partial_progress_rounds_minutes_up() {
        let c = curriculum(4);
        let state = InterviewState::new().advance_topic(&c);
        let progress = InterviewProgress::snapshot(&state, &c);

        assert_eq!(progress.percentage(), 25);
        // 3 * 2.5 = 7.5
        assert_eq!(progress.estimated_minutes_remaining(), 8);
        assert_eq!(progress.current_topic.unwrap().name, "Topic 1");
    }

    #[test]
    fn complete_interview_has_no_current_topic() {
        let c = curriculum(2);
        let state = InterviewState::new().advance_topic(&c).advance_topic(&c);
        let progress = InterviewProgress::snapshot(&state, &c);

        assert!(progress.is_complete());
        assert_eq!(progress.percentage(), 100);
        assert_eq!(progress.estimated_minutes_remaining(), 0);
        assert!(progress.current_topic.is_none());
    }

    #[test]
    fn turn_count_is_reported() {
        let c = curriculum(2);
        let state = InterviewState::new().record_exchange(&c, "q", "a");

        assert_eq!(InterviewProgress::snapshot(&state, &c).current_topic_turn_count, 1);
    }
}
