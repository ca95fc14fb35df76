//! Topic curriculum.
//!
//! The curriculum is the fixed, ordered list of topics an interview walks
//! through. Order defines sequencing only; topics are never reordered or
//! skipped based on what the interviewee says.

use std::collections::HashSet;

use crate::domain::foundation::TopicId;

use super::errors::CurriculumError;
use super::topic::{Topic, TopicCategory};

/// Ordered, immutable list of topics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Curriculum {
    topics: Vec<Topic>,
}

impl Curriculum {
    /// Creates a curriculum from already-validated topics.
    ///
    /// # Errors
    ///
    /// Returns `CurriculumError::DuplicateTopic` if two topics share an id.
    pub fn new(topics: Vec<Topic>) -> Result<Self, CurriculumError> {
        let mut seen = HashSet::new();
        for topic in &topics {
            if !seen.insert(topic.id.clone()) {
                return Err(CurriculumError::DuplicateTopic(topic.id.clone()));
            }
        }
        Ok(Self { topics })
    }

    /// The built-in persona interview curriculum.
    pub fn standard() -> Result<Self, CurriculumError> {
        let topics = STANDARD_TOPICS
            .iter()
            .map(|def| {
                Topic::new(
                    def.id,
                    def.name,
                    def.category,
                    def.system_prompt,
                    def.min_turns,
                    def.max_turns,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(topics)
    }

    pub fn get(&self, index: usize) -> Option<&Topic> {
        self.topics.get(index)
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Topic> {
        self.topics.iter()
    }

    /// Looks a topic up by id.
    pub fn find(&self, id: &TopicId) -> Option<&Topic> {
        self.topics.iter().find(|t| &t.id == id)
    }
}

struct TopicDefinition {
    id: &'static str,
    name: &'static str,
    category: TopicCategory,
    system_prompt: &'static str,
    min_turns: u32,
    max_turns: u32,
}

const STANDARD_TOPICS: &[TopicDefinition] = &[
    TopicDefinition {
        id: "life_chapters",
        name: "人生の章立て",
        category: TopicCategory::LifeStory,
        system_prompt: "相手の人生を一冊の本に見立て、いま何章目にいるのか、各章にどんな題名がつくのかを尋ねてください。\
章の切り替わりになった出来事を具体的に聞き出してください。",
        min_turns: 2,
        max_turns: 4,
    },
    TopicDefinition {
        id: "upbringing",
        name: "育った環境",
        category: TopicCategory::LifeStory,
        system_prompt: "家庭や育った土地、子どもの頃に繰り返し言われた言葉を尋ねてください。\
その言葉に今も従っているのか、反発しているのかを確かめてください。",
        min_turns: 1,
        max_turns: 3,
    },
    TopicDefinition {
        id: "core_values",
        name: "大切にしている価値観",
        category: TopicCategory::Values,
        system_prompt: "相手が大切にしている価値観を二者択一の形で尋ね、選んだ理由となった実体験を掘り下げてください。\
価値観同士が衝突した場面があれば必ず聞いてください。",
        min_turns: 2,
        max_turns: 4,
    },
    TopicDefinition {
        id: "conflict",
        name: "対立と葛藤",
        category: TopicCategory::CriticalEvents,
        system_prompt: "誰かと強く対立した場面を一つ選んでもらい、そのとき口に出した言葉と心の中で思っていたことを分けて聞いてください。",
        min_turns: 2,
        max_turns: 4,
    },
    TopicDefinition {
        id: "crisis",
        name: "危機への反応",
        category: TopicCategory::CriticalEvents,
        system_prompt: "大きな失敗や危機に直面したときの最初の反応、立て直すまでの行動、周囲に助けを求めたかどうかを尋ねてください。",
        min_turns: 1,
        max_turns: 3,
    },
    TopicDefinition {
        id: "close_relationships",
        name: "身近な人との関係",
        category: TopicCategory::Relationships,
        system_prompt: "家族や友人との関係で、相手に合わせた経験と譲れなかった経験をそれぞれ具体的に尋ねてください。",
        min_turns: 1,
        max_turns: 3,
    },
    TopicDefinition {
        id: "partnership",
        name: "恋愛とパートナーシップ",
        category: TopicCategory::Hypothetical,
        system_prompt: "パートナーとの関係で起こりうる状況（すれ違い、嫉妬、将来設計の食い違いなど）を仮定として示し、\
どう感じ、どう発言し、どう行動するかをシミュレーションしてもらってください。",
        min_turns: 2,
        max_turns: 4,
    },
    TopicDefinition {
        id: "betrayal",
        name: "裏切りへの反応",
        category: TopicCategory::Hypothetical,
        system_prompt: "信頼していた相手に裏切られたという仮定の状況を提示し、最初に湧く感情、相手に実際にかける言葉、\
その後の関係をどうするかを順に尋ねてください。",
        min_turns: 1,
        max_turns: 3,
    },
];
