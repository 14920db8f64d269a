use shared::{
    domain::{Course, CourseId, Enrollment},
    protocol::{EnrollmentsResult, RecommendedCoursesResult, UserResult},
};
use tracing::{info, warn};

use super::{ActionOutcome, Notice, PageContext};
use crate::{
    operations::{GetUser, GetUserEnrollments, GetUserRecommendedCourses, UserIdVars},
    progress::{clip_description, enrollment_status_label, initial, CARD_DESCRIPTION_CHARS},
    routes::Route,
    FetchPolicy,
};

pub const RECOMMENDED_CARD_LIMIT: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct EnrollmentCard {
    pub course_id: CourseId,
    pub initial: String,
    pub title: String,
    pub percentage: f64,
    pub status_label: String,
}

impl EnrollmentCard {
    fn from_enrollment(enrollment: &Enrollment) -> Self {
        let title = enrollment.course_title.clone().unwrap_or_default();
        let percentage = enrollment.course_percentage.unwrap_or(0.0);
        let initial = match initial(&title) {
            letter if letter.is_empty() => "C".to_string(),
            letter => letter,
        };
        Self {
            course_id: enrollment.course_id.clone(),
            initial,
            status_label: enrollment_status_label(enrollment.course_status.as_deref(), percentage),
            title,
            percentage,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendedCard {
    pub course_id: CourseId,
    pub title: String,
    pub category: String,
    pub description: String,
    pub estimated_duration: Option<i64>,
}

impl RecommendedCard {
    fn from_course(course: &Course) -> Self {
        Self {
            course_id: course.course_id.clone(),
            title: course.title.clone(),
            category: course
                .category
                .clone()
                .filter(|category| !category.is_empty())
                .unwrap_or_else(|| "General".to_string()),
            description: clip_description(
                course.description.as_deref().unwrap_or_default(),
                CARD_DESCRIPTION_CHARS,
            ),
            estimated_duration: course.estimated_duration,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub greeting: String,
    pub enrollments: Vec<EnrollmentCard>,
    pub enrollment_count: usize,
    /// At most [`RECOMMENDED_CARD_LIMIT`] cards.
    pub recommended: Vec<RecommendedCard>,
    pub recommended_count: usize,
}

pub struct DashboardPage {
    ctx: PageContext,
}

impl DashboardPage {
    pub fn new(ctx: PageContext) -> Self {
        Self { ctx }
    }

    /// Signed-out visitors and failed loads come back as `Err` with the
    /// route to take.
    pub async fn load(&self) -> Result<DashboardView, ActionOutcome> {
        let user_id = match self.ctx.session.user_id().await {
            Ok(Some(user_id)) => user_id,
            Ok(None) => return Err(ActionOutcome::redirect(Route::Login)),
            Err(err) => {
                warn!(error = %err, "failed to read session");
                return Err(ActionOutcome::redirect(Route::Login));
            }
        };

        let variables = UserIdVars { user_id };
        let client = &self.ctx.client;
        let (user, enrollments, recommended) = futures::join!(
            client.query::<GetUser>(&variables, FetchPolicy::NetworkOnly),
            client.query::<GetUserEnrollments>(&variables, FetchPolicy::NetworkOnly),
            client.query::<GetUserRecommendedCourses>(&variables, FetchPolicy::NetworkOnly),
        );

        let failure = |err: crate::TransportError| {
            warn!(user_id = %variables.user_id, error = %err, "dashboard load failed");
            Err(ActionOutcome::notice(Notice::error(err.to_string())).then(Route::Login))
        };
        let user = match user {
            Ok(user) => user,
            Err(err) => return failure(err),
        };
        let enrollments = match enrollments {
            Ok(EnrollmentsResult::Enrollments { enrollments }) => enrollments,
            Ok(_) => Vec::new(),
            Err(err) => return failure(err),
        };
        let recommended = match recommended {
            Ok(RecommendedCoursesResult::Courses { courses }) => courses,
            Ok(_) => Vec::new(),
            Err(err) => return failure(err),
        };

        let greeting = match &user {
            UserResult::User(user) => user.display_name().to_string(),
            _ => "Learner".to_string(),
        };

        Ok(DashboardView {
            greeting,
            enrollment_count: enrollments.len(),
            enrollments: enrollments.iter().map(EnrollmentCard::from_enrollment).collect(),
            recommended_count: recommended.len(),
            recommended: recommended
                .iter()
                .take(RECOMMENDED_CARD_LIMIT)
                .map(RecommendedCard::from_course)
                .collect(),
        })
    }

    pub async fn logout(&self) -> ActionOutcome {
        if let Err(err) = self.ctx.session.clear().await {
            warn!(error = %err, "failed to clear session");
        }
        self.ctx.client.set_auth_token(None).await;
        self.ctx.client.reset_cache().await;
        info!("signed out");
        ActionOutcome::redirect(Route::Login)
    }
}

#[cfg(test)]
#[path = "../tests/dashboard_tests.rs"]
mod tests;
