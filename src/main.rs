//! Terminal interviewer.
//!
//! Presents one question at a time, accepts a numbered option or free text,
//! and writes a Markdown transcript into the data directory once every topic
//! is covered. `/retry` re-runs a failed generation, `/reset` starts over,
//! `/quit` ends the session (progress is kept).

use std::error::Error;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use persona_interview::adapters::ai::{
    AnthropicConfig, AnthropicProvider, OpenAICompatibleConfig, OpenAICompatibleProvider,
};
use persona_interview::adapters::storage::FileKeyValueStore;
use persona_interview::application::interview::{
    CycleOutcome, InterviewOrchestrator, InterviewRepository, OrchestratorError, PresentedQuestion,
};
use persona_interview::config::{AiConfig, AiProvider, AppConfig, LoggingConfig, StorageConfig};
use persona_interview::domain::interview::{render_transcript, Curriculum, InterviewProgress};
use persona_interview::ports::{AIError, AIProvider};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.logging);
    config.validate()?;

    let provider = build_provider(&config.ai)?;
    let info = provider.provider_info();
    tracing::info!(provider = %info.name, model = %info.model, "provider ready");

    let store = Arc::new(FileKeyValueStore::new(&config.storage.data_dir));
    let repository = InterviewRepository::new(store);
    let curriculum = Arc::new(Curriculum::standard()?);

    if repository.is_completed().await {
        tracing::info!("saved interview is already complete");
        println!("前回のインタビューは完了しています。記録を書き出します。");
    }

    let mut orchestrator = InterviewOrchestrator::resume_or_start(
        curriculum,
        provider,
        repository,
        config.orchestrator_settings(),
    )
    .await;

    let shutdown = orchestrator.shutdown_handle();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    run(&mut orchestrator, &mut input, &shutdown, &config.storage).await?;

    shutdown.cancel();
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let registry = tracing_subscriber::registry().with(logging.env_filter());

    if logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn build_provider(ai: &AiConfig) -> Result<Arc<dyn AIProvider>, AIError> {
    match ai.provider {
        AiProvider::Anthropic => {
            let mut config = AnthropicConfig::new()
                .with_model(ai.anthropic_model.clone())
                .with_timeout(ai.timeout());
            if let Some(key) = &ai.anthropic_api_key {
                config = config.with_api_key(key.clone());
            }
            Ok(Arc::new(AnthropicProvider::new(config)?))
        }
        AiProvider::OpenAICompatible => {
            let mut config = OpenAICompatibleConfig::new()
                .with_base_url(ai.openai_base_url.clone())
                .with_model(ai.openai_model.clone())
                .with_timeout(ai.timeout());
            if let Some(key) = &ai.openai_api_key {
                config = config.with_api_key(key.clone());
            }
            Ok(Arc::new(OpenAICompatibleProvider::new(config)?))
        }
    }
}

async fn run(
    orchestrator: &mut InterviewOrchestrator,
    input: &mut Lines<BufReader<Stdin>>,
    shutdown: &CancellationToken,
    storage: &StorageConfig,
) -> Result<(), Box<dyn Error>> {
    loop {
        print_progress(&orchestrator.progress());

        match orchestrator.next_question().await? {
            CycleOutcome::Question(question) => print_question(&question),
            CycleOutcome::GenerationFailed { question, .. } => {
                println!("\n{}", question.text);
                println!("(/retry で再試行、/quit で終了)");
            }
            CycleOutcome::Complete => {
                write_transcript(orchestrator, storage).await?;
                return Ok(());
            }
            CycleOutcome::Discarded => continue,
            CycleOutcome::Cancelled => return Ok(()),
        }

        loop {
            let line = tokio::select! {
                _ = shutdown.cancelled() => return Ok(()),
                line = input.next_line() => line?,
            };
            let Some(line) = line else {
                return Ok(());
            };

            let options = orchestrator
                .presented_question()
                .and_then(|q| q.options.clone())
                .unwrap_or_default();

            match interpret_input(&line, &options) {
                Command::Quit => return Ok(()),
                Command::Retry => {
                    if orchestrator
                        .presented_question()
                        .is_some_and(PresentedQuestion::is_failure_substitute)
                    {
                        break;
                    }
                    println!("再試行するものはありません。");
                }
                Command::Reset => {
                    orchestrator.reset().await;
                    println!("インタビューを最初からやり直します。");
                    break;
                }
                Command::Answer(answer) => match orchestrator.submit_answer(&answer).await {
                    Ok(outcome) => {
                        if let Some(message) = outcome.transition_message {
                            println!("\n{message}");
                        }
                        break;
                    }
                    Err(OrchestratorError::EmptyAnswer) => {}
                    Err(OrchestratorError::FailureSubstitutePending) => {
                        println!("/retry で質問を再生成してください。");
                    }
                    Err(e) => println!("{e}"),
                },
            }
        }
    }
}

/// What a line of user input asks for.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Answer(String),
    Retry,
    Reset,
    Quit,
}

/// A number within range picks that option; anything else is free text.
fn interpret_input(line: &str, options: &[String]) -> Command {
    let trimmed = line.trim();
    match trimmed {
        "/quit" | "/exit" => return Command::Quit,
        "/retry" => return Command::Retry,
        "/reset" => return Command::Reset,
        _ => {}
    }

    if let Ok(n) = trimmed.parse::<usize>() {
        if let Some(option) = n.checked_sub(1).and_then(|i| options.get(i)) {
            return Command::Answer(option.clone());
        }
    }

    Command::Answer(line.to_string())
}

fn print_progress(progress: &InterviewProgress) {
    let Some(topic) = &progress.current_topic else {
        return;
    };
    println!(
        "\n[{}/{}] {} {}: {} ({}%, 残り約{}分)",
        progress.current_topic_index + 1,
        progress.total_topics,
        topic.category.emoji(),
        topic.category.label(),
        topic.name,
        progress.percentage(),
        progress.estimated_minutes_remaining(),
    );
}

fn print_question(question: &PresentedQuestion) {
    println!("\n{}", question.text);
    if let Some(options) = &question.options {
        for (i, option) in options.iter().enumerate() {
            println!("  {}. {}", i + 1, option);
        }
        println!("(番号を選ぶか、自由に入力してください)");
    }
}

async fn write_transcript(
    orchestrator: &InterviewOrchestrator,
    storage: &StorageConfig,
) -> std::io::Result<()> {
    let markdown = render_transcript(orchestrator.curriculum(), orchestrator.turns());
    let path = storage.transcript_path();

    tokio::fs::create_dir_all(&storage.data_dir).await?;
    tokio::fs::write(&path, markdown).await?;

    tracing::info!(path = %path.display(), "transcript written");
    println!("\nインタビューが完了しました。記録: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<String> {
        vec!["はい".to_string(), "いいえ".to_string()]
    }

    #[test]
    fn number_picks_option() {
        assert_eq!(
            interpret_input("2", &options()),
            Command::Answer("いいえ".to_string())
        );
        assert_eq!(
            interpret_input(" 1 ", &options()),
            Command::Answer("はい".to_string())
        );
    }

    #[test]
    fn out_of_range_number_is_free_text() {
        assert_eq!(interpret_input("0", &options()), Command::Answer("0".to_string()));
        assert_eq!(interpret_input("3", &options()), Command::Answer("3".to_string()));
        assert_eq!(interpret_input("1", &[]), Command::Answer("1".to_string()));
    }

    #[test]
    fn commands_are_recognised() {
        assert_eq!(interpret_input("/retry", &[]), Command::Retry);
        assert_eq!(interpret_input("/reset", &[]), Command::Reset);
        assert_eq!(interpret_input("/quit\n", &[]), Command::Quit);
    }

    #[test]
    fn free_text_is_kept_as_typed() {
        assert_eq!(
            interpret_input("  自分で決めたい  ", &options()),
            Command::Answer("  自分で決めたい  ".to_string())
        );
    }
}
