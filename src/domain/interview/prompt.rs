//! Prompt composition for the interviewer.
//!
//! The system prompt sent on every turn is the fixed interviewer persona,
//! followed by the current topic's own instructions and a status block that
//! tells the model where it is within the topic's turn budget.

use super::topic::Topic;

/// Fixed interviewer persona shared by every topic.
pub const INTERVIEWER_PERSONA: &str = r#"あなたは熟練した伝記作家であり、臨床心理学者です。
ユーザーの「属性」ではなく「物語」を聞き出してください。
ユーザーが抽象的な回答（例：「私は誠実だ」）をした場合は、必ず具体的なエピソード（例：「誠実であろうとして損をした経験は？」）を求めてください。
特に「口に出した言葉」と「心の中で思ったこと」の違いに焦点を当てて質問を重ねてください。

# 質問のルール
- 質問は一度に一つだけ行ってください。
- 前置きや要約は短くし、質問文で終えてください。
- 選択式で尋ねるときは、質問文の後に改行して「選択肢: [A] [B]」の形式で選択肢を並べてください。
- 自由に答えてほしいときは選択肢を付けないでください。"#;

/// Composes the system prompt for the given topic and turn count.
///
/// `turn_count` is the number of answers already given within the topic.
/// Same inputs always produce the same string.
pub fn compose_system_prompt(topic: &Topic, turn_count: u32) -> String {
    let mut prompt = String::with_capacity(INTERVIEWER_PERSONA.len() + topic.system_prompt.len() + 256);

    prompt.push_str(INTERVIEWER_PERSONA);

    prompt.push_str("\n\n# 現在のトピック: ");
    prompt.push_str(&topic.name);
    prompt.push('\n');
    prompt.push_str(&topic.system_prompt);

    prompt.push_str("\n\n# 進行状況\n");
    prompt.push_str(&format!("- 現在のターン: {}回目\n", turn_count + 1));
    prompt.push_str(&format!("- 最低ターン数: {}\n", topic.min_turns));
    prompt.push_str(&format!("- 最大ターン数: {}", topic.max_turns));

    if turn_count >= topic.min_turns {
        prompt.push_str("\n\n最低限の質問は済んでいます。十分に理解できたと判断したら、次のトピックに移って構いません。");
    }
    if turn_count >= topic.max_turns {
        prompt.push_str("\n\n最大ターン数に達しました。このターンでこのトピックを締めくくる質問をしてください。");
    }

    prompt
}

/// Hand-off note for when a topic is completed.
pub fn topic_transition_message(completed: &Topic, next: Option<&Topic>) -> String {
    match next {
        Some(next) => format!(
            "「{}」についてのお話、ありがとうございました。次は「{}」について伺います。",
            completed.name, next.name
        ),
        None => format!(
            "「{}」についてのお話、ありがとうございました。これですべてのトピックが終わりました。",
            completed.name
        ),
    }
}
