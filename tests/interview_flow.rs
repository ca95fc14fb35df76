//! Integration tests for the interview turn cycle.
//!
//! Drives the orchestrator end to end against the mock provider and real
//! store adapters:
//! 1. Questions are generated, parsed and answered until the curriculum ends
//! 2. A saved interview resumes with its history intact
//! 3. Failed generations and stale replies leave the interview untouched

use std::sync::Arc;
use std::time::Duration;

use persona_interview::adapters::ai::MockAIProvider;
use persona_interview::adapters::storage::{FileKeyValueStore, InMemoryKeyValueStore};
use persona_interview::application::interview::{
    CycleOutcome, GenerationStart, InterviewOrchestrator, InterviewRepository, OrchestratorError,
    OrchestratorSettings, COMPLETED_KEY,
};
use persona_interview::domain::interview::{
    render_transcript, Curriculum, MessageRole, Topic, TopicCategory,
};
use persona_interview::ports::{AIError, CompletionResponse, KeyValueStore};

// =============================================================================
// Test Infrastructure
// =============================================================================

const SUBSTANTIVE: &str = "上司と意見が割れたとき、会議では黙っていたけれど、帰り道でずっと悔しさを噛みしめていました。";

fn curriculum() -> Arc<Curriculum> {
    Arc::new(
        Curriculum::new(vec![
            Topic::new("values", "価値観", TopicCategory::Values, "価値観を尋ねる", 1, 2).unwrap(),
            Topic::new("crisis", "危機", TopicCategory::CriticalEvents, "危機を尋ねる", 1, 1)
                .unwrap(),
        ])
        .unwrap(),
    )
}

fn settings() -> OrchestratorSettings {
    OrchestratorSettings {
        pacing_delay: Duration::ZERO,
        ..Default::default()
    }
}

fn orchestrator(
    provider: &MockAIProvider,
    store: Arc<dyn KeyValueStore>,
) -> InterviewOrchestrator {
    InterviewOrchestrator::new(
        curriculum(),
        Arc::new(provider.clone()),
        InterviewRepository::new(store),
        settings(),
    )
}

// =============================================================================
// Full run
// =============================================================================

#[tokio::test]
async fn interview_runs_to_completion() {
    let provider = MockAIProvider::new()
        .with_response("「安定」と「挑戦」、どちらを大切にしますか？\n選択肢: [安定] [挑戦]")
        .with_response("挑戦を選んで後悔したことはありますか？")
        .with_response("最大の危機について教えてください。");
    let store = Arc::new(InMemoryKeyValueStore::new());
    let mut orch = orchestrator(&provider, store.clone());

    let CycleOutcome::Question(first) = orch.next_question().await.unwrap() else {
        panic!("expected a question");
    };
    assert_eq!(first.text, "「安定」と「挑戦」、どちらを大切にしますか？");
    assert_eq!(
        first.options,
        Some(vec!["安定".to_string(), "挑戦".to_string()])
    );

    // Short answer above the floor keeps the topic open
    let outcome = orch.submit_answer("挑戦").await.unwrap();
    assert!(outcome.completed_topic.is_none());
    assert_eq!(orch.state().current_topic_turn_count, 1);

    let CycleOutcome::Question(second) = orch.next_question().await.unwrap() else {
        panic!("expected a question");
    };
    assert!(second.options.is_none());

    let outcome = orch.submit_answer(SUBSTANTIVE).await.unwrap();
    assert_eq!(outcome.completed_topic.unwrap().as_str(), "values");
    assert!(outcome.transition_message.unwrap().contains("危機"));
    assert_eq!(orch.state().current_topic_index, 1);
    assert_eq!(orch.state().current_topic_turn_count, 0);

    assert!(matches!(
        orch.next_question().await.unwrap(),
        CycleOutcome::Question(_)
    ));
    let outcome = orch.submit_answer("取引先を失ったとき").await.unwrap();
    assert!(outcome.interview_complete);
    assert!(orch.is_complete());

    assert_eq!(orch.next_question().await.unwrap(), CycleOutcome::Complete);
    assert_eq!(provider.call_count(), 3);
    assert_eq!(store.get(COMPLETED_KEY).await.unwrap().as_deref(), Some("true"));

    assert_eq!(orch.turns().len(), 3);
    assert_eq!(orch.state().topic_history.len(), 2);
    assert_eq!(orch.state().conversation_history.len(), 6);

    let transcript = render_transcript(orch.curriculum(), orch.turns());
    assert!(transcript.contains("価値観"));
    assert!(transcript.contains("挑戦を選んで後悔したことはありますか？"));
    assert!(transcript.contains("取引先を失ったとき"));
}

#[tokio::test]
async fn each_request_carries_topic_prompt_and_history() {
    let provider = MockAIProvider::new()
        .with_response("最初の質問")
        .with_response("次の質問");
    let mut orch = orchestrator(&provider, Arc::new(InMemoryKeyValueStore::new()));

    orch.next_question().await.unwrap();
    orch.submit_answer("はい").await.unwrap();
    orch.next_question().await.unwrap();

    let calls = provider.get_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].messages.len(), 1);

    let request = &calls[1];
    assert_eq!(request.messages.len(), 3);
    assert_eq!(request.messages[0].role, MessageRole::System);
    assert!(request.messages[0].content.contains("価値観を尋ねる"));
    assert_eq!(request.messages[1].role, MessageRole::Assistant);
    assert_eq!(request.messages[1].content, "最初の質問");
    assert_eq!(request.messages[2].role, MessageRole::User);
    assert_eq!(request.messages[2].content, "はい");
}

// =============================================================================
// Resume
// =============================================================================

#[tokio::test]
async fn interview_resumes_from_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let provider = MockAIProvider::new().with_response("最初の質問");

    {
        let store = Arc::new(FileKeyValueStore::new(dir.path()));
        let mut orch = orchestrator(&provider, store);
        orch.next_question().await.unwrap();
        orch.submit_answer("はい").await.unwrap();
        orch.cancel_scheduled();
    }

    let resumed_provider = MockAIProvider::new().with_response("続きの質問");
    let store = Arc::new(FileKeyValueStore::new(dir.path()));
    let mut orch = InterviewOrchestrator::resume_or_start(
        curriculum(),
        Arc::new(resumed_provider.clone()),
        InterviewRepository::new(store),
        settings(),
    )
    .await;

    assert_eq!(orch.state().current_topic_index, 0);
    assert_eq!(orch.state().current_topic_turn_count, 1);
    assert_eq!(orch.turns().len(), 1);
    assert_eq!(orch.turns()[0].answer, "はい");

    orch.next_question().await.unwrap();
    let request = resumed_provider.last_call().unwrap();
    assert_eq!(request.messages.len(), 3);
    assert_eq!(request.messages[1].content, "最初の質問");
}

#[tokio::test]
async fn reset_clears_saved_interview() {
    let store = Arc::new(InMemoryKeyValueStore::new());
    let provider = MockAIProvider::new();
    let mut orch = orchestrator(&provider, store.clone());

    orch.next_question().await.unwrap();
    orch.submit_answer(SUBSTANTIVE).await.unwrap();
    assert!(!store.is_empty().await);

    orch.reset().await;

    assert!(store.is_empty().await);
    assert_eq!(orch.state().current_topic_index, 0);
    assert!(orch.turns().is_empty());
}

// =============================================================================
// Failures and stale replies
// =============================================================================

#[tokio::test]
async fn failed_generation_leaves_state_untouched() {
    let provider = MockAIProvider::new()
        .with_error(AIError::network("connection refused"))
        .with_response("やり直した質問");
    let store = Arc::new(InMemoryKeyValueStore::new());
    let mut orch = orchestrator(&provider, store.clone());
    let before = orch.state().clone();

    let outcome = orch.next_question().await.unwrap();
    let CycleOutcome::GenerationFailed { question, error } = outcome else {
        panic!("expected a failed generation");
    };
    assert!(question.is_failure_substitute());
    assert_eq!(error, AIError::network("connection refused"));
    assert_eq!(orch.state(), &before);
    assert!(!orch.is_busy());
    assert!(store.is_empty().await);

    assert_eq!(
        orch.submit_answer(SUBSTANTIVE).await,
        Err(OrchestratorError::FailureSubstitutePending)
    );

    let CycleOutcome::Question(question) = orch.next_question().await.unwrap() else {
        panic!("expected a question after retry");
    };
    assert_eq!(question.text, "やり直した質問");
}

#[tokio::test]
async fn stale_reply_is_discarded_after_reset() {
    let provider = MockAIProvider::new();
    let mut orch = orchestrator(&provider, Arc::new(InMemoryKeyValueStore::new()));

    let GenerationStart::Ticket(ticket) = orch.begin_generation().await.unwrap() else {
        panic!("expected a ticket");
    };
    assert!(orch.is_busy());

    orch.reset().await;

    let outcome = orch.complete_generation(ticket, Ok(CompletionResponse::new("mock", "古い質問")));
    assert_eq!(outcome, CycleOutcome::Discarded);
    assert!(orch.presented_question().is_none());
}
