//! Markdown transcript of a finished (or partial) interview.
//!
//! Turns are grouped under their topic in curriculum order. Turns whose topic
//! is not in the curriculum are listed last under their raw id.

use std::fmt::Write;

use crate::domain::foundation::TopicId;

use super::curriculum::Curriculum;
use super::turn::ConversationTurn;

pub fn render_transcript(curriculum: &Curriculum, turns: &[ConversationTurn]) -> String {
    let mut out = String::from("# インタビュー記録\n");

    for topic in curriculum.iter() {
        let topic_turns: Vec<&ConversationTurn> =
            turns.iter().filter(|t| t.topic_id == topic.id).collect();
        if topic_turns.is_empty() {
            continue;
        }

        let _ = write!(
            out,
            "\n## {} {}\n",
            topic.category.emoji(),
            topic.name
        );
        render_turns(&mut out, &topic_turns);
    }

    let mut orphans: Vec<(&TopicId, Vec<&ConversationTurn>)> = Vec::new();
    for turn in turns.iter().filter(|t| curriculum.find(&t.topic_id).is_none()) {
        match orphans.iter_mut().find(|(id, _)| *id == &turn.topic_id) {
            Some((_, group)) => group.push(turn),
            None => orphans.push((&turn.topic_id, vec![turn])),
        }
    }
    for (topic_id, group) in &orphans {
        let _ = write!(out, "\n## {}\n", topic_id);
        render_turns(&mut out, group);
    }

    out
}

fn render_turns(out: &mut String, turns: &[&ConversationTurn]) {
    for (number, turn) in turns.iter().enumerate() {
        let _ = write!(out, "\n### Q{}. {}\n", number + 1, turn.question.trim());
        if let Some(options) = turn.options.as_ref().filter(|o| !o.is_empty()) {
            let _ = writeln!(out, "\n選択肢: {}", options.join(" / "));
        }
        let _ = writeln!(out, "\n> {}", turn.answer.trim().replace('\n', "\n> "));
        let _ = writeln!(out, "\n<sub>{}</sub>", turn.timestamp.display_minute());
    }
}
