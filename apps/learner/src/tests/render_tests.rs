use super::*;
use client_core::{
    pages::dashboard::{EnrollmentCard, RecommendedCard},
    Route,
};
use shared::domain::{CourseId, TopicId};

#[test]
fn empty_dashboard_still_lists_recommendations() {
    let view = DashboardView {
        greeting: "Ada".into(),
        enrollments: Vec::new(),
        enrollment_count: 0,
        recommended: vec![RecommendedCard {
            course_id: CourseId::new("c9"),
            title: "Rust Basics".into(),
            category: "General".into(),
            description: String::new(),
            estimated_duration: Some(90),
        }],
        recommended_count: 7,
    };

    let text = dashboard(&view);

    assert!(text.contains("Welcome back, Ada!"));
    assert!(text.contains("not enrolled in any course yet"));
    assert!(text.contains("Recommended for you (7)"));
    assert!(text.contains("Rust Basics [General]  (c9)"));
}

#[test]
fn enrollment_cards_show_status_and_percentage() {
    let view = DashboardView {
        greeting: "Ada".into(),
        enrollments: vec![EnrollmentCard {
            course_id: CourseId::new("c1"),
            initial: "R".into(),
            title: "Rust".into(),
            percentage: 100.0,
            status_label: "Completed".into(),
        }],
        enrollment_count: 1,
        recommended: Vec::new(),
        recommended_count: 0,
    };

    assert!(dashboard(&view).contains("[R] Rust  100%  Completed  (c1)"));
}

#[test]
fn outcome_prints_notice_then_route() {
    let text = outcome(
        &ActionOutcome::notice(Notice::error("Please login first!")).then(Route::Login),
    );
    assert_eq!(text, "error: Please login first!\n-> /login\n");
}

#[test]
fn quiz_events_render_feedback_and_results() {
    assert_eq!(
        quiz_event(&QuizEvent::Feedback(AnswerFeedback {
            status: FeedbackStatus::Partial,
            points: 4
        }))
        .as_deref(),
        Some("Partially correct. +4")
    );
    assert_eq!(quiz_event(&QuizEvent::Tick { remaining_secs: 12 }), None);

    let finished = quiz_event(&QuizEvent::Finished(QuizResults {
        total_score: 30,
        back_route: Route::Topic {
            course_id: CourseId::new("c1"),
            topic_id: TopicId::new("t1"),
        },
        back_label: "Back to Topic",
    }))
    .expect("rendered");
    assert!(finished.contains("Total score: 30"));
    assert!(finished.ends_with("Back to Topic: /course/c1/topic/t1"));
}

#[test]
fn questions_number_their_options() {
    let question: Question = serde_json::from_value(serde_json::json!({
        "questionId": "q1", "questionText": "Pick", "questionType": "MCQ_SINGLE", "options": ["A", "B"]
    }))
    .expect("question");

    assert_eq!(
        super::question(3, &question),
        "\nQ3. Pick  [MCQ SINGLE]\n  1) A\n  2) B\n"
    );
}
