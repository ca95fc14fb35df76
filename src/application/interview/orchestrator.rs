//! Interview orchestrator.
//!
//! Drives the turn cycle: compose the prompt for the current topic, ask the
//! provider for the next question, parse it, present it, take the answer,
//! run the state machine and persist. One orchestrator owns one interview;
//! every state-changing method takes `&mut self`, so only one turn cycle can
//! be active at a time.
//!
//! Generation can be split for event-loop callers:
//!
//! ```ignore
//! let GenerationStart::Ticket(ticket) = orchestrator.begin_generation().await? else { return };
//! let result = provider.complete(ticket.request().clone()).await;
//! let outcome = orchestrator.complete_generation(ticket, result);
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::domain::foundation::TopicId;
use crate::domain::interview::{
    compose_system_prompt, should_advance, topic_transition_message, ConversationTurn, Curriculum,
    InterviewProgress, InterviewState, Message, ResponseParser,
};
use crate::ports::{AIError, AIProvider, CompletionRequest, CompletionResponse};

use super::repository::{InterviewRepository, StoredInterview};
use super::scheduler::ScheduledContinuation;

/// Shown in place of a question when generation fails.
pub const DEFAULT_FALLBACK_MESSAGE: &str = "エラーが発生しました。LLMの接続を確認してください。";

/// Tunables for the turn cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorSettings {
    /// Pause between a committed answer and the next generation request.
    pub pacing_delay: Duration,
    pub fallback_message: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            pacing_delay: Duration::from_millis(500),
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
            max_tokens: Some(4096),
            temperature: Some(0.7),
        }
    }
}

/// Where a presented question came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSource {
    Generated,
    /// Fallback text shown after a failed generation. Not answerable.
    FailureSubstitute,
}

/// What the presentation layer shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresentedQuestion {
    pub text: String,
    pub options: Option<Vec<String>>,
    pub source: QuestionSource,
}

impl PresentedQuestion {
    pub fn has_options(&self) -> bool {
        self.options.as_ref().is_some_and(|o| !o.is_empty())
    }

    pub fn is_failure_substitute(&self) -> bool {
        self.source == QuestionSource::FailureSubstitute
    }
}

/// Result of one turn cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// A new question is being presented.
    Question(PresentedQuestion),
    /// Generation failed; the fallback text is being presented instead.
    GenerationFailed {
        question: PresentedQuestion,
        error: AIError,
    },
    /// The curriculum is exhausted. No request was sent.
    Complete,
    /// The reply belonged to a generation that is no longer current.
    Discarded,
    /// The pending continuation or the request was cancelled.
    Cancelled,
}

/// Identifies one generation request and the position it was made for.
#[derive(Debug, Clone)]
pub struct GenerationTicket {
    generation: u64,
    topic_index: usize,
    turn_count: u32,
    history_len: usize,
    request: CompletionRequest,
}

impl GenerationTicket {
    /// The request to send to the provider.
    pub fn request(&self) -> &CompletionRequest {
        &self.request
    }

    pub fn topic_index(&self) -> usize {
        self.topic_index
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }
}

#[derive(Debug, Clone)]
pub enum GenerationStart {
    Ticket(GenerationTicket),
    /// Nothing left to ask.
    Complete,
}

/// Result of a committed answer.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub turn: ConversationTurn,
    /// The topic that was closed by this answer, if any.
    pub completed_topic: Option<TopicId>,
    pub transition_message: Option<String>,
    pub interview_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    #[error("A generation request is already in flight")]
    Busy,

    #[error("No question is waiting for an answer")]
    NoPendingQuestion,

    #[error("The last generation failed; retry before answering")]
    FailureSubstitutePending,

    #[error("Answer cannot be empty")]
    EmptyAnswer,

    #[error("The interview is already complete")]
    InterviewComplete,
}

pub struct InterviewOrchestrator {
    curriculum: Arc<Curriculum>,
    provider: Arc<dyn AIProvider>,
    repository: InterviewRepository,
    parser: ResponseParser,
    settings: OrchestratorSettings,
    state: InterviewState,
    turns: Vec<ConversationTurn>,
    presented: Option<PresentedQuestion>,
    busy: bool,
    generation: u64,
    scheduled: Option<ScheduledContinuation>,
    shutdown: CancellationToken,
}

impl InterviewOrchestrator {
    /// Starts a fresh interview. Nothing is read from the store.
    pub fn new(
        curriculum: Arc<Curriculum>,
        provider: Arc<dyn AIProvider>,
        repository: InterviewRepository,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            curriculum,
            provider,
            repository,
            parser: ResponseParser::default(),
            settings,
            state: InterviewState::new(),
            turns: Vec::new(),
            presented: None,
            busy: false,
            generation: 0,
            scheduled: None,
            shutdown: CancellationToken::new(),
        }
    }

    /// Resumes the saved interview if one exists and fits `curriculum`,
    /// otherwise starts fresh.
    pub async fn resume_or_start(
        curriculum: Arc<Curriculum>,
        provider: Arc<dyn AIProvider>,
        repository: InterviewRepository,
        settings: OrchestratorSettings,
    ) -> Self {
        let stored = repository.load().await;
        let mut orchestrator = Self::new(curriculum, provider, repository, settings);

        if let Some(StoredInterview { state, turns }) = stored {
            match state.validate(&orchestrator.curriculum) {
                Ok(()) => {
                    tracing::info!(
                        topic_index = state.current_topic_index,
                        turn = state.current_topic_turn_count,
                        turns = turns.len(),
                        "resuming saved interview"
                    );
                    orchestrator.state = state;
                    orchestrator.turns = turns;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "saved interview does not fit the curriculum; starting fresh");
                }
            }
        }

        orchestrator
    }

    pub fn state(&self) -> &InterviewState {
        &self.state
    }

    /// Committed turns in answer order.
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn curriculum(&self) -> &Curriculum {
        &self.curriculum
    }

    pub fn presented_question(&self) -> Option<&PresentedQuestion> {
        self.presented.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_complete(&self) -> bool {
        self.state.is_complete(&self.curriculum)
    }

    pub fn progress(&self) -> InterviewProgress {
        InterviewProgress::snapshot(&self.state, &self.curriculum)
    }

    /// True while a paced continuation is waiting to run.
    pub fn has_scheduled(&self) -> bool {
        self.scheduled.as_ref().is_some_and(|s| !s.is_cancelled())
    }

    /// Token that ends the session: cancels any scheduled continuation and
    /// aborts an in-flight generation started by `next_question`.
    pub fn shutdown_handle(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Cancels the scheduled continuation, if any.
    pub fn cancel_scheduled(&mut self) {
        if let Some(scheduled) = self.scheduled.take() {
            scheduled.cancel();
            tracing::debug!("cancelled scheduled continuation");
        }
    }

    /// Runs one turn cycle: waits out any pacing delay, then generates and
    /// presents the next question.
    ///
    /// # Errors
    ///
    /// Returns `OrchestratorError::Busy` if a split generation is in flight.
    pub async fn next_question(&mut self) -> Result<CycleOutcome, OrchestratorError> {
        if self.busy {
            return Err(OrchestratorError::Busy);
        }

        if let Some(scheduled) = self.scheduled.take() {
            tracing::debug!(
                remaining_ms = scheduled.remaining().as_millis() as u64,
                "waiting for pacing delay"
            );
            if !scheduled.wait().await {
                tracing::debug!("scheduled continuation was cancelled");
                return Ok(CycleOutcome::Cancelled);
            }
        }
        if self.shutdown.is_cancelled() {
            return Ok(CycleOutcome::Cancelled);
        }

        let ticket = match self.begin_generation().await? {
            GenerationStart::Ticket(ticket) => ticket,
            GenerationStart::Complete => return Ok(CycleOutcome::Complete),
        };

        let provider = Arc::clone(&self.provider);
        let shutdown = self.shutdown.clone();
        let request = ticket.request.clone();

        let result = tokio::select! {
            biased;
            _ = shutdown.cancelled() => Err(AIError::Cancelled),
            result = provider.complete(request) => result,
        };

        Ok(self.complete_generation(ticket, result))
    }

    /// First half of a turn cycle: marks the orchestrator busy and builds the
    /// request for the current topic. When the interview is complete the
    /// completion flag is persisted and no request is built.
    ///
    /// # Errors
    ///
    /// Returns `OrchestratorError::Busy` if a generation is already in flight.
    pub async fn begin_generation(&mut self) -> Result<GenerationStart, OrchestratorError> {
        if self.busy {
            return Err(OrchestratorError::Busy);
        }

        let Some(topic) = self.state.current_topic(&self.curriculum) else {
            self.presented = None;
            if let Err(e) = self.repository.mark_completed().await {
                tracing::warn!(error = %e, "failed to persist completion flag");
            }
            tracing::info!(turns = self.turns.len(), "interview complete");
            return Ok(GenerationStart::Complete);
        };

        let system_prompt = compose_system_prompt(topic, self.state.current_topic_turn_count);
        let mut messages = Vec::with_capacity(self.state.conversation_history.len() + 1);
        messages.push(Message::system(system_prompt));
        messages.extend(self.state.conversation_history.iter().cloned());

        let mut request = CompletionRequest::new(messages);
        request.max_tokens = self.settings.max_tokens;
        request.temperature = self.settings.temperature;

        self.generation += 1;
        self.busy = true;

        tracing::debug!(
            topic_id = %topic.id,
            turn = self.state.current_topic_turn_count,
            generation = self.generation,
            "requesting next question"
        );

        Ok(GenerationStart::Ticket(GenerationTicket {
            generation: self.generation,
            topic_index: self.state.current_topic_index,
            turn_count: self.state.current_topic_turn_count,
            history_len: self.state.conversation_history.len(),
            request,
        }))
    }

    /// Second half of a turn cycle: applies the provider's result.
    ///
    /// A result whose ticket no longer matches the live interview is
    /// discarded without touching anything. A failure presents the fallback
    /// text and leaves the interview state as it was.
    pub fn complete_generation(
        &mut self,
        ticket: GenerationTicket,
        result: Result<CompletionResponse, AIError>,
    ) -> CycleOutcome {
        if !self.is_current(&ticket) {
            tracing::debug!(
                ticket_generation = ticket.generation,
                generation = self.generation,
                "discarding stale generation result"
            );
            return CycleOutcome::Discarded;
        }

        self.busy = false;

        match result {
            Ok(response) => {
                let outcome = self.parser.parse_detailed(&response.content);
                tracing::debug!(
                    strategy = outcome.strategy.map(|s| s.name()).unwrap_or("free_text"),
                    options = outcome.question.options.as_ref().map_or(0, Vec::len),
                    "parsed question"
                );

                let question = PresentedQuestion {
                    text: outcome.question.text,
                    options: outcome.question.options,
                    source: QuestionSource::Generated,
                };
                self.presented = Some(question.clone());
                CycleOutcome::Question(question)
            }
            Err(AIError::Cancelled) if self.shutdown.is_cancelled() => {
                tracing::debug!("generation cancelled");
                CycleOutcome::Cancelled
            }
            Err(error) => {
                if error.is_configuration() {
                    tracing::error!(error = %error, "generation failed: provider is misconfigured");
                } else {
                    tracing::warn!(error = %error, "generation failed");
                }

                let question = PresentedQuestion {
                    text: self.settings.fallback_message.clone(),
                    options: None,
                    source: QuestionSource::FailureSubstitute,
                };
                self.presented = Some(question.clone());
                CycleOutcome::GenerationFailed { question, error }
            }
        }
    }

    fn is_current(&self, ticket: &GenerationTicket) -> bool {
        self.busy
            && ticket.generation == self.generation
            && ticket.topic_index == self.state.current_topic_index
            && ticket.turn_count == self.state.current_topic_turn_count
            && ticket.history_len == self.state.conversation_history.len()
    }

    /// Commits the user's answer to the presented question.
    ///
    /// Records the turn, runs the advancement decision with the incremented
    /// turn count, persists, and schedules the next cycle after the pacing
    /// delay unless the interview is now complete.
    ///
    /// # Errors
    ///
    /// Rejects the answer while busy, when nothing answerable is presented,
    /// or when the answer is blank. Nothing changes on error.
    pub async fn submit_answer(&mut self, answer: &str) -> Result<AnswerOutcome, OrchestratorError> {
        if self.busy {
            return Err(OrchestratorError::Busy);
        }
        if self.is_complete() {
            return Err(OrchestratorError::InterviewComplete);
        }
        match &self.presented {
            None => return Err(OrchestratorError::NoPendingQuestion),
            Some(q) if q.is_failure_substitute() => {
                return Err(OrchestratorError::FailureSubstitutePending)
            }
            Some(_) => {}
        }
        if answer.trim().is_empty() {
            return Err(OrchestratorError::EmptyAnswer);
        }

        let Some(question) = self.presented.take() else {
            return Err(OrchestratorError::NoPendingQuestion);
        };
        let curriculum = Arc::clone(&self.curriculum);
        let Some(topic) = self.state.current_topic(&curriculum) else {
            return Err(OrchestratorError::InterviewComplete);
        };

        let turn = ConversationTurn::new(
            topic.id.clone(),
            question.text.clone(),
            question.options.clone(),
            answer,
        );

        let mut state = std::mem::take(&mut self.state).record_exchange(&curriculum, question.text, answer);
        let turn_count = state.current_topic_turn_count;

        let mut completed_topic = None;
        let mut transition_message = None;
        if should_advance(turn_count, topic, answer) {
            let next = curriculum.get(state.current_topic_index + 1);
            let message = topic_transition_message(topic, next);
            tracing::info!(topic_id = %topic.id, turns = turn_count, "{}", message);

            completed_topic = Some(topic.id.clone());
            transition_message = Some(message);
            state = state.advance_topic(&curriculum);
        } else {
            tracing::debug!(topic_id = %topic.id, turn = turn_count, "staying on topic");
        }

        self.state = state;
        self.turns.push(turn.clone());

        if let Err(e) = self.repository.save(&self.state, &self.turns).await {
            tracing::warn!(error = %e, "failed to persist interview");
        }

        let interview_complete = self.is_complete();
        if interview_complete {
            if let Err(e) = self.repository.mark_completed().await {
                tracing::warn!(error = %e, "failed to persist completion flag");
            }
            tracing::info!(turns = self.turns.len(), "interview complete");
        } else {
            self.scheduled = Some(ScheduledContinuation::schedule(
                self.settings.pacing_delay,
                &self.shutdown,
            ));
        }

        Ok(AnswerOutcome {
            turn,
            completed_topic,
            transition_message,
            interview_complete,
        })
    }

    /// Discards the interview and its saved copy and starts over. Any
    /// pending continuation is cancelled and any outstanding generation
    /// ticket becomes stale.
    pub async fn reset(&mut self) {
        self.cancel_scheduled();
        self.state = InterviewState::new();
        self.turns.clear();
        self.presented = None;
        self.busy = false;
        self.generation += 1;

        if let Err(e) = self.repository.clear().await {
            tracing::warn!(error = %e, "failed to clear saved interview");
        }
        tracing::info!("interview reset");
    }
}
