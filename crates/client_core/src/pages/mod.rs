//! Page controllers. Each one runs a page's queries and mutations and
//! hands back a view model plus the messages and navigation the page
//! would show.

use std::sync::Arc;

use crate::{routes::Route, session::SessionStore, LearningClient};

pub mod course_detail;
pub mod dashboard;
pub mod login;
pub mod profile;
pub mod quiz_attempt;
pub mod signup;
pub mod topic_detail;

pub use course_detail::{CourseDetailPage, CourseDetailView};
pub use dashboard::{DashboardPage, DashboardView};
pub use login::LoginPage;
pub use profile::{ProfileForm, ProfilePage};
pub use quiz_attempt::{
    AnswerDraft, AnswerFeedback, FeedbackStatus, FinishOutcome, FinishTrigger,
    QuizAttemptController, QuizEvent, QuizPhase, QuizResults, QuizSnapshot, QuizTimings,
};
pub use signup::{SignupForm, SignupPage};
pub use topic_detail::{TopicDetailPage, TopicDetailView};

#[derive(Clone)]
pub struct PageContext {
    pub client: Arc<LearningClient>,
    pub session: SessionStore,
}

impl PageContext {
    pub fn new(client: Arc<LearningClient>, session: SessionStore) -> Self {
        Self { client, session }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self::Success(text.into())
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::Error(text.into())
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Success(text) | Self::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// What a page action leaves behind: a message to show and where to go.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionOutcome {
    pub notice: Option<Notice>,
    pub route: Option<Route>,
}

impl ActionOutcome {
    pub fn notice(notice: Notice) -> Self {
        Self {
            notice: Some(notice),
            route: None,
        }
    }

    pub fn redirect(route: Route) -> Self {
        Self {
            notice: None,
            route: Some(route),
        }
    }

    pub fn then(mut self, route: Route) -> Self {
        self.route = Some(route);
        self
    }
}
