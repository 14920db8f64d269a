//! Timed quiz attempt: question loop, answer feedback, countdown and the
//! single end-of-attempt call shared by every finish trigger.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use shared::{
    domain::{
        strip_enum_prefix, AssessmentId, AttemptId, LearningPathId, LearningUnitId, Question,
        QuestionType, UserId,
    },
    protocol::{AttemptEndResult, AttemptScoreResult, NextQuestionResult, ProgressUpdateResult, SubmitAnswerResult},
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tracing::{debug, info, warn};

use super::{
    course_detail::{learning_path_for, learning_units},
    PageContext,
};
use crate::{
    error::QuizError,
    operations::{
        AnswerResponse, AnswerSubmission, AttemptEnd, AttemptIdVars, GetAttemptScore,
        GetNextQuestion, GetUserLearningUnits, Operation, Params, ProgressChange, SubmitAnswer,
        UpdateLearningUnitProgress, ATTEMPT_ROOT_FIELDS,
    },
    routes::Route,
    session::{QuizContext, SessionStore},
    timer::{Clock, Countdown},
    FetchPolicy, LearningClient,
};

const EVENT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizTimings {
    /// How long answer feedback stays up before the next question loads.
    pub feedback_delay: Duration,
    /// Pause between a last-second submission and ending the attempt.
    pub settle_delay: Duration,
    pub tick_interval: Duration,
    pub poll_interval: Duration,
    pub flash_duration: Duration,
}

impl Default for QuizTimings {
    fn default() -> Self {
        Self {
            feedback_delay: Duration::from_secs(2),
            settle_delay: Duration::from_secs(2),
            tick_interval: Duration::from_secs(1),
            poll_interval: Duration::from_secs(5),
            flash_duration: Duration::from_millis(1500),
        }
    }
}

impl QuizTimings {
    /// Default intervals with no artificial pauses.
    pub fn without_delays() -> Self {
        Self {
            feedback_delay: Duration::ZERO,
            settle_delay: Duration::ZERO,
            flash_duration: Duration::ZERO,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackStatus {
    Correct,
    Partial,
    Wrong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub status: FeedbackStatus,
    pub points: i64,
}

impl AnswerFeedback {
    fn wrong() -> Self {
        Self {
            status: FeedbackStatus::Wrong,
            points: 0,
        }
    }

    fn from_result(result: &SubmitAnswerResult, score_before: i64) -> Self {
        let SubmitAnswerResult::Submitted(answer) = result else {
            return Self::wrong();
        };
        match answer.is_correct.as_deref() {
            Some(raw) => {
                let status = match strip_enum_prefix(raw).as_str() {
                    "CORRECT" => FeedbackStatus::Correct,
                    "PARTIALLY_CORRECT" => FeedbackStatus::Partial,
                    _ => FeedbackStatus::Wrong,
                };
                Self {
                    status,
                    points: answer.points.unwrap_or(0),
                }
            }
            None => match answer.total_points {
                Some(total) if total > score_before => Self {
                    status: FeedbackStatus::Correct,
                    points: total - score_before,
                },
                _ => Self::wrong(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    LoadingQuestion,
    AnswerPending,
    AnswerSubmitted(AnswerFeedback),
    Finished,
}

/// Answer being composed for the current question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerDraft {
    pub single: Option<String>,
    pub multi: Vec<String>,
    pub text: String,
    pub true_false: Option<bool>,
    pub pairs: Vec<String>,
}

impl AnswerDraft {
    pub fn select(&mut self, option: impl Into<String>) {
        self.single = Some(option.into());
    }

    /// Adds the option to a multi-select answer, or removes it if present.
    pub fn toggle(&mut self, option: &str) {
        match self.multi.iter().position(|chosen| chosen == option) {
            Some(index) => {
                self.multi.remove(index);
            }
            None => self.multi.push(option.to_string()),
        }
    }

    pub fn response_for(&self, question: &Question) -> Result<AnswerResponse, &'static str> {
        let single = self.single.clone().filter(|choice| !choice.is_empty());
        let text = self.text.trim();
        match question.question_type {
            QuestionType::McqSingle => single
                .map(AnswerResponse::Text)
                .ok_or("Please select an option"),
            QuestionType::McqMulti if self.multi.is_empty() => {
                Err("Please select at least one option")
            }
            QuestionType::McqMulti => Ok(AnswerResponse::Choices(self.multi.clone())),
            QuestionType::TrueFalse => self
                .true_false
                .map(|value| AnswerResponse::Text(if value { "True" } else { "False" }.to_string()))
                .ok_or("Please select True or False"),
            QuestionType::FillBlank | QuestionType::ShortAnswer if text.is_empty() => {
                Err("Please type your answer")
            }
            QuestionType::FillBlank | QuestionType::ShortAnswer => {
                Ok(AnswerResponse::Text(text.to_string()))
            }
            QuestionType::MatchPairs if self.pairs.is_empty() => Err("Please match all pairs"),
            QuestionType::MatchPairs => Ok(AnswerResponse::Choices(self.pairs.clone())),
            QuestionType::Other(_) => {
                if question.has_options() {
                    if let Some(choice) = single {
                        return Ok(AnswerResponse::Text(choice));
                    }
                    if !self.multi.is_empty() {
                        return Ok(AnswerResponse::Choices(self.multi.clone()));
                    }
                }
                if !text.is_empty() {
                    return Ok(AnswerResponse::Text(text.to_string()));
                }
                Err("Please provide an answer")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishTrigger {
    LastQuestion,
    TimerExpired,
    Explicit,
    Unload,
    Unmount,
    BackNavigation,
}

impl FinishTrigger {
    /// Whether a successful end also completes the learning unit.
    pub fn updates_progress(&self) -> bool {
        matches!(
            self,
            Self::TimerExpired | Self::Explicit | Self::BackNavigation
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResults {
    pub total_score: i64,
    pub back_route: Route,
    pub back_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishOutcome {
    Ended(QuizResults),
    AlreadyFinished,
    AttemptNotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuizEvent {
    QuestionLoaded { number: u32, question: Question },
    Tick { remaining_secs: u64 },
    ScoreChanged { score: i64, gained: i64 },
    Feedback(AnswerFeedback),
    Finished(QuizResults),
    Message(String),
    Navigate(Route),
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizSnapshot {
    pub phase: QuizPhase,
    pub question: Option<Question>,
    pub question_number: u32,
    pub draft: AnswerDraft,
    pub score: i64,
    /// "+N" shortly after the score goes up.
    pub flash: Option<String>,
    pub remaining_secs: u64,
    pub clock: String,
    pub urgent: bool,
    pub results: Option<QuizResults>,
    pub closed: bool,
}

struct QuizState {
    phase: QuizPhase,
    question: Option<Question>,
    question_number: u32,
    draft: AnswerDraft,
    score: i64,
    flash: Option<(String, DateTime<Utc>)>,
    countdown: Countdown,
    submitting: bool,
    expiry_started: bool,
    closed: bool,
    results: Option<QuizResults>,
    learning_path_id: Option<LearningPathId>,
    learning_unit_id: Option<LearningUnitId>,
}

pub struct QuizAttemptController {
    client: Arc<LearningClient>,
    session: SessionStore,
    assessment_id: AssessmentId,
    attempt_id: AttemptId,
    user_id: Option<UserId>,
    context: QuizContext,
    clock: Arc<dyn Clock>,
    timings: QuizTimings,
    state: Mutex<QuizState>,
    finished: AtomicBool,
    events: broadcast::Sender<QuizEvent>,
}

impl QuizAttemptController {
    /// Reads the stored session and quiz context and records the attempt as
    /// active. Call [`mount`](Self::mount) to load the first question.
    pub async fn open(
        ctx: &PageContext,
        assessment_id: AssessmentId,
        attempt_id: AttemptId,
        clock: Arc<dyn Clock>,
        timings: QuizTimings,
    ) -> anyhow::Result<Arc<Self>> {
        let user_id = ctx.session.user_id().await?;
        let context = ctx.session.quiz_context().await?;
        ctx.session.mark_active_attempt(&attempt_id).await?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Arc::new(Self {
            client: Arc::clone(&ctx.client),
            session: ctx.session.clone(),
            state: Mutex::new(QuizState {
                phase: QuizPhase::LoadingQuestion,
                question: None,
                question_number: 1,
                draft: AnswerDraft::default(),
                score: 0,
                flash: None,
                countdown: Countdown::new(context.duration_minutes),
                submitting: false,
                expiry_started: false,
                closed: false,
                results: None,
                learning_path_id: None,
                learning_unit_id: None,
            }),
            assessment_id,
            attempt_id,
            user_id,
            context,
            clock,
            timings,
            finished: AtomicBool::new(false),
            events,
        }))
    }

    pub fn attempt_id(&self) -> &AttemptId {
        &self.attempt_id
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QuizEvent> {
        self.events.subscribe()
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    fn emit(&self, event: QuizEvent) {
        // No subscribers is fine; the snapshot carries the same state.
        let _ = self.events.send(event);
    }

    pub fn back_route(&self) -> Route {
        match (&self.context.course_id, &self.context.topic_id) {
            (Some(course_id), Some(topic_id)) => Route::Topic {
                course_id: course_id.clone(),
                topic_id: topic_id.clone(),
            },
            (Some(course_id), None) => Route::Course {
                course_id: course_id.clone(),
            },
            (None, _) => Route::Dashboard,
        }
    }

    fn back_label(&self) -> &'static str {
        if self.context.topic_id.is_some() {
            "Back to Topic"
        } else {
            "Back to Course"
        }
    }

    pub async fn snapshot(&self) -> QuizSnapshot {
        let now = self.clock.now();
        let state = self.state.lock().await;
        QuizSnapshot {
            phase: state.phase,
            question: state.question.clone(),
            question_number: state.question_number,
            draft: state.draft.clone(),
            score: state.score,
            flash: state
                .flash
                .as_ref()
                .filter(|(_, until)| now < *until)
                .map(|(text, _)| text.clone()),
            remaining_secs: state.countdown.remaining(),
            clock: state.countdown.display(),
            urgent: state.countdown.is_urgent(),
            results: state.results.clone(),
            closed: state.closed,
        }
    }

    /// Applies `edit` to the draft while an answer can still be given.
    pub async fn edit_draft<F>(&self, edit: F) -> bool
    where
        F: FnOnce(&mut AnswerDraft),
    {
        let mut state = self.state.lock().await;
        if state.phase != QuizPhase::AnswerPending || state.submitting {
            return false;
        }
        edit(&mut state.draft);
        true
    }

    pub async fn mount(&self) -> Result<(), QuizError> {
        self.resolve_learning_unit().await;
        self.refresh_score().await?;
        self.refresh_question().await?;

        let remaining = self.state.lock().await.countdown.remaining();
        if remaining == 0 && !self.is_finished() {
            info!(attempt_id = %self.attempt_id, "time already expired on load");
            self.on_timer_expired().await?;
        }
        Ok(())
    }

    async fn resolve_learning_unit(&self) {
        let (Some(user_id), Some(course_id)) = (&self.user_id, &self.context.course_id) else {
            return;
        };
        let Some(path_id) = learning_path_for(&self.client, user_id, course_id).await else {
            debug!(attempt_id = %self.attempt_id, "no learning path for quiz course");
            return;
        };
        let topic_id = self.context.topic_id.as_ref();
        let unit_id = learning_units(&self.client, &path_id, FetchPolicy::CacheFirst)
            .await
            .into_iter()
            .find(|unit| {
                Some(&unit.topic_id) == topic_id
                    || unit.assessment_id.as_ref() == Some(&self.assessment_id)
            })
            .map(|unit| unit.user_learning_unit_id);
        if unit_id.is_none() {
            debug!(attempt_id = %self.attempt_id, "no learning unit matches the quiz");
        }

        let mut state = self.state.lock().await;
        state.learning_path_id = Some(path_id);
        state.learning_unit_id = unit_id;
    }

    async fn refresh_score(&self) -> Result<(), QuizError> {
        let variables = Params::new(AttemptIdVars {
            attempt_id: self.attempt_id.clone(),
        });
        let result = self
            .client
            .query::<GetAttemptScore>(&variables, FetchPolicy::NetworkOnly)
            .await?;
        let score = match result {
            AttemptScoreResult::Score(score) => score,
            other => {
                debug!(attempt_id = %self.attempt_id, result = ?other, "score unavailable");
                return Ok(());
            }
        };

        let now = self.clock.now();
        let mut state = self.state.lock().await;
        if state.phase == QuizPhase::Finished {
            return Ok(());
        }
        if let Some(started_at) = score.started_at {
            state.countdown.resync(started_at, now);
        }
        if let Some(new_score) = score.score {
            let gained = new_score - state.score;
            state.score = new_score;
            if gained > 0 {
                let until = now
                    + chrono::Duration::from_std(self.timings.flash_duration)
                        .unwrap_or_else(|_| chrono::Duration::zero());
                state.flash = Some((format!("+{gained}"), until));
                drop(state);
                self.emit(QuizEvent::ScoreChanged {
                    score: new_score,
                    gained,
                });
            }
        }
        Ok(())
    }

    async fn refresh_question(&self) -> Result<(), QuizError> {
        if self.is_finished() {
            return Ok(());
        }
        let variables = AttemptIdVars {
            attempt_id: self.attempt_id.clone(),
        };
        let result = self
            .client
            .query::<GetNextQuestion>(&variables, FetchPolicy::NetworkOnly)
            .await?;

        match result {
            NextQuestionResult::Question(question) => {
                let mut state = self.state.lock().await;
                if state.phase == QuizPhase::Finished {
                    return Ok(());
                }
                let unchanged = state.phase == QuizPhase::AnswerPending
                    && state
                        .question
                        .as_ref()
                        .map(|current| current.question_id == question.question_id)
                        .unwrap_or(false);
                if unchanged {
                    return Ok(());
                }
                state.question = Some(question.clone());
                state.draft = AnswerDraft::default();
                state.submitting = false;
                state.phase = QuizPhase::AnswerPending;
                let number = state.question_number;
                drop(state);
                debug!(attempt_id = %self.attempt_id, question_id = %question.question_id, "question loaded");
                self.emit(QuizEvent::QuestionLoaded { number, question });
                Ok(())
            }
            NextQuestionResult::Exhausted { .. } => {
                info!(attempt_id = %self.attempt_id, "no questions left");
                self.finish(FinishTrigger::LastQuestion).await.map(|_| ())
            }
            NextQuestionResult::AttemptNotFound { .. } => {
                warn!(attempt_id = %self.attempt_id, "attempt not found while loading question");
                self.state.lock().await.closed = true;
                self.emit(QuizEvent::Message(QuizError::AttemptNotFound.to_string()));
                self.emit(QuizEvent::Navigate(self.back_route()));
                Err(QuizError::AttemptNotFound)
            }
            NextQuestionResult::Unrecognized => {
                warn!(attempt_id = %self.attempt_id, "unrecognized next-question result");
                Ok(())
            }
        }
    }

    pub async fn submit_answer(&self) -> Result<AnswerFeedback, QuizError> {
        let (question_id, response, score_before) = {
            let mut state = self.state.lock().await;
            if self.is_finished() || state.phase == QuizPhase::Finished {
                return Err(QuizError::Finished);
            }
            if state.submitting || state.phase != QuizPhase::AnswerPending {
                return Err(QuizError::Busy);
            }
            let Some(question) = state.question.as_ref() else {
                return Err(QuizError::Busy);
            };
            let response = state
                .draft
                .response_for(question)
                .map_err(QuizError::Validation)?;
            let question_id = question.question_id.clone();
            state.submitting = true;
            (question_id, response, state.score)
        };

        let variables = Params::new(AnswerSubmission {
            attempt_id: self.attempt_id.clone(),
            assessment_id: self.assessment_id.clone(),
            question_id: question_id.clone(),
            response,
        });
        let result = match self.client.mutate::<SubmitAnswer>(&variables).await {
            Ok(result) => result,
            Err(err) => {
                warn!(attempt_id = %self.attempt_id, %question_id, error = %err, "answer submission failed");
                self.state.lock().await.submitting = false;
                self.emit(QuizEvent::Message(format!("Failed to submit: {err}")));
                return Err(err.into());
            }
        };

        let feedback = AnswerFeedback::from_result(&result, score_before);
        {
            let mut state = self.state.lock().await;
            state.submitting = false;
            if state.phase != QuizPhase::Finished {
                state.phase = QuizPhase::AnswerSubmitted(feedback);
            }
        }
        debug!(attempt_id = %self.attempt_id, %question_id, status = ?feedback.status, points = feedback.points, "answer graded");
        self.emit(QuizEvent::Feedback(feedback));

        tokio::time::sleep(self.timings.feedback_delay).await;
        if self.is_finished() {
            return Ok(feedback);
        }

        if let Err(err) = self.refresh_score().await {
            warn!(attempt_id = %self.attempt_id, error = %err, "score refresh failed");
        }
        {
            let mut state = self.state.lock().await;
            if state.phase == QuizPhase::Finished {
                return Ok(feedback);
            }
            state.phase = QuizPhase::LoadingQuestion;
            state.question_number += 1;
        }
        self.refresh_question().await?;
        Ok(feedback)
    }

    /// Per-second countdown step.
    pub async fn tick(&self) -> Result<(), QuizError> {
        let remaining = {
            let mut state = self.state.lock().await;
            if state.phase == QuizPhase::Finished || state.closed {
                return Ok(());
            }
            state.countdown.tick(self.clock.now())
        };
        self.emit(QuizEvent::Tick {
            remaining_secs: remaining,
        });
        if remaining == 0 {
            self.on_timer_expired().await?;
        }
        Ok(())
    }

    pub async fn poll(&self) -> Result<(), QuizError> {
        if self.is_done().await {
            return Ok(());
        }
        self.refresh_score().await
    }

    /// The front-end regained focus: refresh everything and resync the
    /// countdown from the server start time.
    pub async fn on_foreground(&self) -> Result<(), QuizError> {
        if self.is_finished() || self.is_done().await {
            return Ok(());
        }
        self.refresh_score().await?;
        // Feedback is still showing; submit_answer loads the next question.
        let showing_feedback = matches!(
            self.state.lock().await.phase,
            QuizPhase::AnswerSubmitted(_)
        );
        if !showing_feedback {
            self.refresh_question().await?;
        }
        let remaining = self.state.lock().await.countdown.remaining();
        if remaining == 0 {
            info!(attempt_id = %self.attempt_id, "time expired while in background");
            self.on_timer_expired().await?;
        }
        Ok(())
    }

    async fn on_timer_expired(&self) -> Result<FinishOutcome, QuizError> {
        let pending = {
            let mut state = self.state.lock().await;
            if state.expiry_started || self.is_finished() {
                return Ok(FinishOutcome::AlreadyFinished);
            }
            state.expiry_started = true;
            if state.phase == QuizPhase::AnswerPending && !state.submitting {
                let drafted = state
                    .question
                    .as_ref()
                    .and_then(|question| {
                        state
                            .draft
                            .response_for(question)
                            .ok()
                            .map(|response| (question.question_id.clone(), response))
                    });
                if drafted.is_some() {
                    state.submitting = true;
                }
                drafted
            } else {
                None
            }
        };

        match pending {
            Some((question_id, response)) => {
                info!(attempt_id = %self.attempt_id, %question_id, "time up; submitting drafted answer");
                let variables = Params::new(AnswerSubmission {
                    attempt_id: self.attempt_id.clone(),
                    assessment_id: self.assessment_id.clone(),
                    question_id,
                    response,
                });
                let submitted = self.client.mutate::<SubmitAnswer>(&variables).await;
                self.state.lock().await.submitting = false;
                match submitted {
                    Ok(_) => {
                        if let Err(err) = self.refresh_score().await {
                            warn!(attempt_id = %self.attempt_id, error = %err, "score refresh failed");
                        }
                        if let Err(err) = self.refresh_question().await {
                            warn!(attempt_id = %self.attempt_id, error = %err, "question refresh failed");
                        }
                        tokio::time::sleep(self.timings.settle_delay).await;
                    }
                    Err(err) => {
                        warn!(attempt_id = %self.attempt_id, error = %err, "last-second submission failed");
                    }
                }
            }
            None => {
                debug!(attempt_id = %self.attempt_id, "time up with no drafted answer");
            }
        }

        let outcome = self.finish(FinishTrigger::TimerExpired).await;
        if outcome.is_err() {
            self.state.lock().await.expiry_started = false;
        }
        outcome
    }

    /// Ends the attempt once. Concurrent and repeated calls after the
    /// first report [`FinishOutcome::AlreadyFinished`]; a transport
    /// failure re-arms the guard.
    pub async fn finish(&self, trigger: FinishTrigger) -> Result<FinishOutcome, QuizError> {
        if self
            .finished
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(attempt_id = %self.attempt_id, ?trigger, "attempt already finishing");
            return Ok(FinishOutcome::AlreadyFinished);
        }

        info!(attempt_id = %self.attempt_id, ?trigger, "ending attempt");
        let variables = Params::new(AttemptIdVars {
            attempt_id: self.attempt_id.clone(),
        });
        let result = match self.client.mutate::<AttemptEnd>(&variables).await {
            Ok(result) => result,
            Err(err) => {
                self.finished.store(false, Ordering::Release);
                warn!(attempt_id = %self.attempt_id, ?trigger, error = %err, "ending attempt failed");
                return Err(err.into());
            }
        };

        match result {
            AttemptEndResult::Ended(summary) => {
                let evicted = self.client.evict_fields(&ATTEMPT_ROOT_FIELDS).await;
                let collected = self.client.gc().await;
                debug!(attempt_id = %summary.attempt_id, evicted, collected, "attempt caches dropped");
                if trigger.updates_progress() {
                    self.complete_learning_unit().await;
                }
                Ok(FinishOutcome::Ended(self.show_results().await))
            }
            AttemptEndResult::AttemptNotFound { .. } => {
                warn!(attempt_id = %self.attempt_id, "attempt not found on end");
                self.state.lock().await.closed = true;
                self.emit(QuizEvent::Message(QuizError::AttemptNotFound.to_string()));
                Ok(FinishOutcome::AttemptNotFound)
            }
            AttemptEndResult::Unrecognized => {
                warn!(attempt_id = %self.attempt_id, "unrecognized attempt-end result");
                Ok(FinishOutcome::Ended(self.show_results().await))
            }
        }
    }

    async fn complete_learning_unit(&self) {
        let ids = {
            let state = self.state.lock().await;
            state.learning_path_id.clone().zip(state.learning_unit_id.clone())
        };
        let Some((path_id, unit_id)) = ids else {
            debug!(attempt_id = %self.attempt_id, "learning unit unknown; skipping progress update");
            return;
        };

        let variables = Params::new(ProgressChange::complete(path_id, unit_id.clone()));
        match self
            .client
            .mutate::<UpdateLearningUnitProgress>(&variables)
            .await
        {
            Ok(ProgressUpdateResult::Updated(_)) => {
                self.client
                    .evict_fields(&[GetUserLearningUnits::ROOT_FIELD])
                    .await;
                info!(attempt_id = %self.attempt_id, %unit_id, "learning unit completed");
            }
            Ok(other) => {
                warn!(attempt_id = %self.attempt_id, %unit_id, result = ?other, "learning unit update rejected");
            }
            Err(err) => {
                warn!(attempt_id = %self.attempt_id, %unit_id, error = %err, "learning unit update failed");
            }
        }
    }

    async fn show_results(&self) -> QuizResults {
        let results = {
            let mut state = self.state.lock().await;
            let results = QuizResults {
                total_score: state.score,
                back_route: self.back_route(),
                back_label: self.back_label(),
            };
            state.phase = QuizPhase::Finished;
            state.results = Some(results.clone());
            results
        };
        if let Err(err) = self.session.clear_active_attempt().await {
            warn!(attempt_id = %self.attempt_id, error = %err, "failed to clear active attempt");
        }
        self.emit(QuizEvent::Finished(results.clone()));
        results
    }

    pub async fn on_unload(&self) -> Result<FinishOutcome, QuizError> {
        self.finish(FinishTrigger::Unload).await
    }

    /// Ends the attempt when its view goes away without having finished.
    pub async fn on_unmount(&self) -> Result<FinishOutcome, QuizError> {
        if self.is_finished() {
            return Ok(FinishOutcome::AlreadyFinished);
        }
        let active = self.session.active_attempt().await.unwrap_or_else(|err| {
            warn!(error = %err, "failed to read active attempt");
            None
        });
        if active.as_ref() != Some(&self.attempt_id) {
            return Ok(FinishOutcome::AlreadyFinished);
        }
        self.finish(FinishTrigger::Unmount).await
    }

    /// Finishes if needed and returns where to go next.
    pub async fn go_back(&self) -> Route {
        if !self.is_finished() {
            if let Err(err) = self.finish(FinishTrigger::BackNavigation).await {
                warn!(attempt_id = %self.attempt_id, error = %err, "ending attempt on back navigation failed");
            }
        }
        let route = self.back_route();
        self.emit(QuizEvent::Navigate(route.clone()));
        route
    }

    async fn is_done(&self) -> bool {
        let state = self.state.lock().await;
        state.phase == QuizPhase::Finished || state.closed
    }

    /// Runs the countdown and score polling until the attempt is over.
    pub fn spawn_driver(self: &Arc<Self>) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(controller.timings.tick_interval);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut poll = tokio::time::interval(controller.timings.poll_interval);
            poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // Both intervals fire immediately; mount has just loaded everything.
            tick.tick().await;
            poll.tick().await;

            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        if let Err(err) = controller.tick().await {
                            warn!(attempt_id = %controller.attempt_id, error = %err, "countdown step failed");
                        }
                    }
                    _ = poll.tick() => {
                        if let Err(err) = controller.poll().await {
                            warn!(attempt_id = %controller.attempt_id, error = %err, "score poll failed");
                        }
                    }
                }
                if controller.is_done().await {
                    debug!(attempt_id = %controller.attempt_id, "quiz driver stopped");
                    break;
                }
            }
        })
    }
}

#[cfg(test)]
#[path = "../tests/quiz_attempt_tests.rs"]
mod tests;
