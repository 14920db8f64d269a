//! Interactive quiz session on stdin/stdout.

use std::sync::Arc;

use anyhow::Result;
use client_core::{
    pages::{
        AnswerDraft, FinishOutcome, FinishTrigger, QuizAttemptController, QuizEvent, QuizTimings,
    },
    timer::SystemClock,
    PageContext, QuizError,
};
use futures::StreamExt;
use shared::domain::{AssessmentId, AttemptId, Question, QuestionType};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tracing::{info, warn};

use crate::render;

const HELP: &str = "Answer with an option number (or several, comma separated), t/f, or text.\n\
Commands: :status  :finish  :back  :help";

/// What a line typed during the quiz asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Answer(String),
    Status,
    Finish,
    Back,
    Help,
    Empty,
}

pub fn parse_input(line: &str) -> Input {
    match line.trim() {
        "" => Input::Empty,
        ":status" | ":s" => Input::Status,
        ":finish" | ":f" => Input::Finish,
        ":back" | ":b" => Input::Back,
        ":help" | ":h" | "?" => Input::Help,
        answer => Input::Answer(answer.to_string()),
    }
}

fn option_at(question: &Question, token: &str) -> Option<String> {
    let token = token.trim();
    match token.parse::<usize>() {
        Ok(index) if index >= 1 => question.options.get(index - 1).cloned(),
        _ => question
            .options
            .iter()
            .find(|option| option.eq_ignore_ascii_case(token))
            .cloned(),
    }
}

/// Fills the draft from typed input for `question`.
pub fn apply_answer(draft: &mut AnswerDraft, question: &Question, input: &str) {
    *draft = AnswerDraft::default();
    match question.question_type {
        QuestionType::McqSingle => draft.single = option_at(question, input),
        QuestionType::McqMulti => {
            for token in input.split(',') {
                if let Some(option) = option_at(question, token) {
                    draft.toggle(&option);
                }
            }
        }
        QuestionType::TrueFalse => {
            draft.true_false = match input.trim().to_ascii_lowercase().as_str() {
                "t" | "true" | "1" => Some(true),
                "f" | "false" | "2" => Some(false),
                _ => None,
            };
        }
        QuestionType::MatchPairs => {
            draft.pairs = input
                .split(',')
                .map(str::trim)
                .filter(|pair| !pair.is_empty())
                .map(str::to_string)
                .collect();
        }
        QuestionType::FillBlank | QuestionType::ShortAnswer => draft.text = input.to_string(),
        QuestionType::Other(_) => match option_at(question, input) {
            Some(option) => draft.single = Some(option),
            None => draft.text = input.to_string(),
        },
    }
}

pub async fn run(ctx: &PageContext, assessment_id: AssessmentId, attempt_id: AttemptId) -> Result<()> {
    let quiz = QuizAttemptController::open(
        ctx,
        assessment_id,
        attempt_id,
        Arc::new(SystemClock),
        QuizTimings::default(),
    )
    .await?;
    let mut events = BroadcastStream::new(quiz.subscribe());

    match quiz.mount().await {
        Ok(()) => {}
        Err(QuizError::AttemptNotFound) => {
            drain_pending(&mut events);
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    }
    println!("{HELP}");
    let driver = quiz.spawn_driver();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            event = events.next() => match event {
                Some(Ok(event)) => {
                    if let Some(text) = render::quiz_event(&event) {
                        println!("{text}");
                    }
                    if matches!(event, QuizEvent::Finished(_) | QuizEvent::Navigate(_)) {
                        break;
                    }
                }
                Some(Err(BroadcastStreamRecvError::Lagged(skipped))) => {
                    warn!(skipped, "quiz display fell behind");
                }
                None => break,
            },
            line = lines.next_line() => match line? {
                Some(line) => {
                    if !handle_line(&quiz, &line).await {
                        break;
                    }
                }
                None => {
                    info!("input closed; ending attempt");
                    report(quiz.on_unload().await);
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted; ending attempt");
                report(quiz.on_unload().await);
                break;
            }
        }
    }

    driver.abort();
    drain_pending(&mut events);
    Ok(())
}

/// Returns false once the session should stop reading input.
async fn handle_line(quiz: &QuizAttemptController, line: &str) -> bool {
    match parse_input(line) {
        Input::Empty => true,
        Input::Help => {
            println!("{HELP}");
            true
        }
        Input::Status => {
            println!("{}", render::status(&quiz.snapshot().await));
            true
        }
        Input::Finish => {
            report(quiz.finish(FinishTrigger::Explicit).await);
            !quiz.is_finished()
        }
        Input::Back => {
            quiz.go_back().await;
            false
        }
        Input::Answer(answer) => {
            let Some(question) = quiz.snapshot().await.question else {
                println!("Loading question...");
                return true;
            };
            if !quiz
                .edit_draft(|draft| apply_answer(draft, &question, &answer))
                .await
            {
                println!("Please wait for the next question.");
                return true;
            }
            match quiz.submit_answer().await {
                Ok(_) | Err(QuizError::Transport(_)) => {}
                Err(err) => println!("{err}"),
            }
            !quiz.is_finished()
        }
    }
}

fn report(outcome: Result<FinishOutcome, QuizError>) {
    if let Err(err) = outcome {
        println!("error: Failed to finish quiz: {err}");
    }
}

fn drain_pending(events: &mut BroadcastStream<QuizEvent>) {
    while let Some(Some(Ok(event))) = futures::FutureExt::now_or_never(events.next()) {
        if let Some(text) = render::quiz_event(&event) {
            println!("{text}");
        }
    }
}

#[cfg(test)]
#[path = "tests/quiz_tests.rs"]
mod tests;
