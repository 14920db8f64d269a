//! Plain-text rendering of page view models.

use std::fmt::Write as _;

use client_core::pages::{
    course_detail::CourseDetailView,
    dashboard::DashboardView,
    profile::ProfileView,
    topic_detail::{TopicBody, TopicDetailView},
    ActionOutcome, AnswerFeedback, FeedbackStatus, Notice, QuizEvent, QuizResults, QuizSnapshot,
};
use shared::domain::Question;

pub fn notice(notice: &Notice) -> String {
    if notice.is_error() {
        format!("error: {}", notice.text())
    } else {
        notice.text().to_string()
    }
}

pub fn outcome(outcome: &ActionOutcome) -> String {
    let mut out = String::new();
    if let Some(n) = &outcome.notice {
        let _ = writeln!(out, "{}", notice(n));
    }
    if let Some(route) = &outcome.route {
        let _ = writeln!(out, "-> {route}");
    }
    out
}

pub fn dashboard(view: &DashboardView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Welcome back, {}!", view.greeting);
    let _ = writeln!(out, "\nMy courses ({})", view.enrollment_count);
    if view.enrollments.is_empty() {
        let _ = writeln!(out, "  You are not enrolled in any course yet.");
    }
    for card in &view.enrollments {
        let _ = writeln!(
            out,
            "  [{}] {}  {:.0}%  {}  ({})",
            card.initial, card.title, card.percentage, card.status_label, card.course_id
        );
    }

    let _ = writeln!(out, "\nRecommended for you ({})", view.recommended_count);
    for card in &view.recommended {
        let _ = writeln!(out, "  {} [{}]  ({})", card.title, card.category, card.course_id);
        if !card.description.is_empty() {
            let _ = writeln!(out, "    {}", card.description);
        }
        if let Some(minutes) = card.estimated_duration {
            let _ = writeln!(out, "    {minutes} min");
        }
    }
    out
}

pub fn course(view: &CourseDetailView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", view.course.title);
    if let Some(description) = &view.course.description {
        let _ = writeln!(out, "{description}");
    }
    if view.is_enrolled() {
        let stats = &view.stats;
        let _ = writeln!(
            out,
            "Progress {}%  completed {}  in progress {}  started {}  of {} topics  ({} min)",
            stats.percentage,
            stats.completed,
            stats.half_completed,
            stats.started,
            stats.total,
            view.total_duration_mins
        );
    } else {
        let _ = writeln!(out, "Not enrolled. Run `learner enroll {}` to start.", view.course.course_id);
    }

    for module in &view.modules {
        let _ = writeln!(out, "\nModule {}: {}", module.display_order, module.title);
        for topic in &module.topics {
            let _ = writeln!(
                out,
                "  {:<9} {} ({} min, {:.0}%)  [{}]",
                topic.action.label(),
                topic.title,
                topic.minutes,
                topic.percentage,
                topic.topic_id
            );
        }
    }
    out
}

pub fn topic(view: &TopicDetailView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", view.topic.title);
    if let Some(description) = &view.topic.description {
        let _ = writeln!(out, "{description}");
    }
    let _ = writeln!(
        out,
        "Status: {} ({:.0}%)",
        if view.is_completed() { "Completed" } else { "Not completed" },
        view.percentage()
    );

    match &view.body {
        TopicBody::Locked => {
            let _ = writeln!(out, "This topic is locked. Finish the previous topics first.");
        }
        TopicBody::Lesson { video: Some(video) } => {
            let title = video.title.as_deref().unwrap_or("Video");
            let link = video.embed_url.as_deref().or(video.url.as_deref()).unwrap_or("-");
            let _ = writeln!(out, "{title}: {link}");
        }
        TopicBody::Lesson { video: None } => {
            let _ = writeln!(out, "No video for this topic.");
        }
        TopicBody::Assessment(panel) => {
            let assessment = &panel.assessment;
            let _ = writeln!(
                out,
                "{}: {} questions, {} points, pass mark {}",
                assessment.assessment_title.as_deref().unwrap_or("Assessment"),
                assessment.no_of_questions.unwrap_or(0),
                panel.total_points,
                panel.pass_mark_points
            );
            let _ = writeln!(
                out,
                "Mix: {} easy / {} medium / {} hard",
                assessment.easy_count.unwrap_or(0),
                assessment.medium_count.unwrap_or(0),
                assessment.hard_count.unwrap_or(0)
            );
            if let Some(latest) = &panel.latest {
                let verdict = if latest.passed { "Passed" } else { "Failed" };
                let _ = writeln!(
                    out,
                    "Latest: {} points ({}%) {verdict}",
                    latest.points, latest.percentage
                );
                if !latest.passed {
                    let _ = writeln!(out, "You need {} more points to pass.", latest.points_needed);
                }
            }
        }
        TopicBody::AssessmentUnavailable => {
            let _ = writeln!(out, "Assessment not available.");
        }
    }
    out
}

pub fn profile(view: &ProfileView) -> String {
    let form = &view.form;
    let mut out = String::new();
    let _ = writeln!(out, "Name:     {}", form.name);
    let _ = writeln!(out, "Username: {}", form.username);
    let _ = writeln!(out, "Email:    {}", form.email);
    let _ = writeln!(out, "Phone:    {}", form.phone_number);
    let _ = writeln!(out, "Gender:   {}", form.gender);
    out
}

pub fn question(number: u32, question: &Question) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "\nQ{number}. {}  [{}]",
        question.question_text,
        question.question_type.label()
    );
    for (index, option) in question.options.iter().enumerate() {
        let _ = writeln!(out, "  {}) {option}", index + 1);
    }
    out
}

pub fn feedback(feedback: &AnswerFeedback) -> String {
    match feedback.status {
        FeedbackStatus::Correct => format!("Correct! +{}", feedback.points),
        FeedbackStatus::Partial => format!("Partially correct. +{}", feedback.points),
        FeedbackStatus::Wrong => "Incorrect.".to_string(),
    }
}

pub fn results(results: &QuizResults) -> String {
    format!(
        "\nQuiz finished. Total score: {}\n{}: {}",
        results.total_score, results.back_label, results.back_route
    )
}

pub fn status(snapshot: &QuizSnapshot) -> String {
    let urgent = if snapshot.urgent { " !" } else { "" };
    let flash = snapshot
        .flash
        .as_deref()
        .map(|flash| format!(" {flash}"))
        .unwrap_or_default();
    format!(
        "[{}{urgent}] score {}{flash}",
        snapshot.clock, snapshot.score
    )
}

/// Line to print for a controller event, if any.
pub fn quiz_event(event: &QuizEvent) -> Option<String> {
    match event {
        QuizEvent::QuestionLoaded { number, question: q } => Some(question(*number, q)),
        QuizEvent::Feedback(fb) => Some(feedback(fb)),
        QuizEvent::ScoreChanged { score, gained } => Some(format!("+{gained} (score {score})")),
        QuizEvent::Finished(r) => Some(results(r)),
        QuizEvent::Message(message) => Some(format!("error: {message}")),
        QuizEvent::Navigate(route) => Some(format!("-> {route}")),
        QuizEvent::Tick { .. } => None,
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
