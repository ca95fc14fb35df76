//! Interview topics.
//!
//! A topic is one curriculum unit: the interviewer's instructions for it plus
//! the turn floor and ceiling that bound how long the interview stays there.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{TopicId, ValidationError};

/// Broad area a topic belongs to, used for progress display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicCategory {
    /// Background, upbringing, the shape of a life so far.
    LifeStory,
    /// What the interviewee holds important and why.
    Values,
    /// Conflicts, crises and turning points.
    CriticalEvents,
    /// Behavior toward family, friends and partners.
    Relationships,
    /// Simulated reactions to situations not yet lived.
    Hypothetical,
}

impl TopicCategory {
    /// Returns a short label suitable for UI display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::LifeStory => "人生の物語",
            Self::Values => "価値観",
            Self::CriticalEvents => "重要な出来事",
            Self::Relationships => "人間関係",
            Self::Hypothetical => "仮定の状況",
        }
    }

    /// Returns the emoji shown next to topics of this category.
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::LifeStory => "📖",
            Self::Values => "💎",
            Self::CriticalEvents => "⚡",
            Self::Relationships => "🤝",
            Self::Hypothetical => "🔮",
        }
    }
}

/// A single curriculum unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    pub name: String,
    pub category: TopicCategory,
    /// Topic-specific instructions appended to the interviewer persona.
    pub system_prompt: String,
    pub min_turns: u32,
    pub max_turns: u32,
}

impl Topic {
    /// Creates a topic, enforcing `0 < min_turns <= max_turns`.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: TopicCategory,
        system_prompt: impl Into<String>,
        min_turns: u32,
        max_turns: u32,
    ) -> Result<Self, ValidationError> {
        let id = TopicId::new(id)?;

        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }

        if min_turns == 0 {
            return Err(ValidationError::out_of_range("min_turns", 1, max_turns.max(1), 0));
        }
        if min_turns > max_turns {
            return Err(ValidationError::invalid_format(
                "min_turns",
                format!("min_turns ({}) exceeds max_turns ({})", min_turns, max_turns),
            ));
        }

        Ok(Self {
            id,
            name,
            category,
            system_prompt: system_prompt.into(),
            min_turns,
            max_turns,
        })
    }
}
