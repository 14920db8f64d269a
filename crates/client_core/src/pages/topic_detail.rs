use shared::{
    domain::{
        Assessment, Attempt, AttemptStatus, CourseId, LearningPathId, LearningUnit, Topic,
        TopicId, UnitStatus, UserId,
    },
    protocol::{
        AssessmentResult, LatestAttemptResult, Outcome, ProgressUpdateResult, StartAttemptResult,
        TopicVideoResult, TopicsResult,
    },
};
use tracing::{debug, info, warn};

use super::{
    course_detail::{learning_path_for, learning_units},
    ActionOutcome, Notice, PageContext,
};
use crate::{
    operations::{
        AttemptRequest, CreateAttempt, GetAssessmentByTopic, GetLatestAttempt, GetTopic,
        GetTopicVideo, GetUserLearningUnits, Operation, Params, ProgressChange, TopicIdVars,
        UpdateLearningUnitProgress,
    },
    routes::Route,
    FetchPolicy, TransportError,
};

/// Embed URL for YouTube watch, short and embed links; `None` otherwise.
pub fn youtube_embed_url(url: &str) -> Option<String> {
    if let Some(start) = url.find("v=") {
        let id = url[start + 2..].split('&').next().unwrap_or_default();
        if !id.is_empty() {
            return Some(format!("https://www.youtube.com/embed/{id}"));
        }
    }
    if let Some(start) = url.find("youtu.be/") {
        let id = url[start + "youtu.be/".len()..]
            .split('?')
            .next()
            .unwrap_or_default();
        if !id.is_empty() {
            return Some(format!("https://www.youtube.com/embed/{id}"));
        }
    }
    url.contains("youtube.com/embed").then(|| url.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoPanel {
    pub title: Option<String>,
    pub url: Option<String>,
    pub embed_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LatestResult {
    pub attempt: Attempt,
    pub points: i64,
    pub percentage: u32,
    pub passed: bool,
    /// Points still missing to reach the pass mark; zero once passed.
    pub points_needed: i64,
}

impl LatestResult {
    fn new(attempt: Attempt, total_points: i64, pass_mark_points: i64) -> Self {
        let points = attempt.total_points.unwrap_or(0);
        let percentage = if total_points > 0 {
            (points as f64 / total_points as f64 * 100.0).round().max(0.0) as u32
        } else {
            0
        };
        Self {
            attempt,
            points,
            percentage,
            passed: points >= pass_mark_points,
            points_needed: (pass_mark_points - points).max(0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentPanel {
    pub assessment: Assessment,
    pub total_points: i64,
    pub pass_mark_points: i64,
    pub latest: Option<LatestResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TopicBody {
    /// Non-assessment topic the learner has not unlocked.
    Locked,
    Lesson { video: Option<VideoPanel> },
    Assessment(AssessmentPanel),
    /// Assessment topic whose assessment could not be loaded.
    AssessmentUnavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopicDetailView {
    pub topic: Topic,
    pub learning_path_id: Option<LearningPathId>,
    pub unit: Option<LearningUnit>,
    pub body: TopicBody,
}

impl TopicDetailView {
    pub fn is_completed(&self) -> bool {
        self.unit
            .as_ref()
            .map(|unit| unit.status == UnitStatus::Complete)
            .unwrap_or(false)
    }

    pub fn percentage(&self) -> f64 {
        self.unit
            .as_ref()
            .map(LearningUnit::display_percentage)
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuizStart {
    Started(Route),
    AttemptsExhausted {
        attempts_limit: Option<i64>,
        attempted: Option<i64>,
    },
    Failed(Notice),
}

pub struct TopicDetailPage {
    ctx: PageContext,
    course_id: CourseId,
    topic_id: TopicId,
}

impl TopicDetailPage {
    pub fn new(ctx: PageContext, course_id: CourseId, topic_id: TopicId) -> Self {
        Self {
            ctx,
            course_id,
            topic_id,
        }
    }

    fn course_route(&self) -> Route {
        Route::Course {
            course_id: self.course_id.clone(),
        }
    }

    fn topic_vars(&self) -> TopicIdVars {
        TopicIdVars {
            topic_id: self.topic_id.clone(),
        }
    }

    async fn user_id(&self) -> Option<UserId> {
        self.ctx.session.user_id().await.unwrap_or_else(|err| {
            warn!(error = %err, "failed to read session");
            None
        })
    }

    /// Learning path and this topic's unit, read fresh from the server.
    async fn progress(&self, user_id: Option<&UserId>) -> (Option<LearningPathId>, Option<LearningUnit>) {
        let Some(user_id) = user_id else {
            return (None, None);
        };
        let Some(path_id) = learning_path_for(&self.ctx.client, user_id, &self.course_id).await
        else {
            return (None, None);
        };
        let unit = learning_units(&self.ctx.client, &path_id, FetchPolicy::NetworkOnly)
            .await
            .into_iter()
            .find(|unit| unit.topic_id == self.topic_id);
        (Some(path_id), unit)
    }

    pub async fn load(&self) -> Result<TopicDetailView, ActionOutcome> {
        let topic = match self
            .ctx
            .client
            .query::<GetTopic>(&self.topic_vars(), FetchPolicy::CacheFirst)
            .await
        {
            Ok(TopicsResult::Topics { topics }) => topics.into_iter().next(),
            Ok(_) => None,
            Err(err) => {
                warn!(topic_id = %self.topic_id, error = %err, "topic load failed");
                return Err(ActionOutcome::notice(Notice::error(format!("Error: {err}")))
                    .then(self.course_route()));
            }
        };
        let Some(topic) = topic else {
            return Err(ActionOutcome::notice(Notice::error("Topic not found")).then(self.course_route()));
        };

        let user_id = self.user_id().await;
        let (learning_path_id, mut unit) = self.progress(user_id.as_ref()).await;

        let body = if topic.is_assessment() {
            match self.assessment_panel(user_id.as_ref()).await {
                Some(panel) => {
                    let synced = self
                        .sync_completed_attempt(&panel, learning_path_id.as_ref(), unit.as_ref())
                        .await;
                    if synced {
                        unit = self.progress(user_id.as_ref()).await.1;
                    }
                    TopicBody::Assessment(panel)
                }
                None => TopicBody::AssessmentUnavailable,
            }
        } else if unit.as_ref().map(LearningUnit::locked).unwrap_or(true) {
            TopicBody::Locked
        } else {
            TopicBody::Lesson {
                video: self.video().await,
            }
        };

        Ok(TopicDetailView {
            topic,
            learning_path_id,
            unit,
            body,
        })
    }

    async fn video(&self) -> Option<VideoPanel> {
        match self
            .ctx
            .client
            .query::<GetTopicVideo>(&self.topic_vars(), FetchPolicy::NetworkOnly)
            .await
        {
            Ok(TopicVideoResult::Video(video)) => Some(VideoPanel {
                embed_url: video.video_url.as_deref().and_then(youtube_embed_url),
                title: video.title,
                url: video.video_url,
            }),
            Ok(_) => None,
            Err(err) => {
                warn!(topic_id = %self.topic_id, error = %err, "video load failed");
                None
            }
        }
    }

    async fn assessment(&self, policy: FetchPolicy) -> Result<Option<Assessment>, TransportError> {
        match self
            .ctx
            .client
            .query::<GetAssessmentByTopic>(&self.topic_vars(), policy)
            .await?
        {
            AssessmentResult::Assessment(assessment) => Ok(Some(assessment)),
            other => {
                debug!(topic_id = %self.topic_id, result = ?other, "no assessment for topic");
                Ok(None)
            }
        }
    }

    async fn assessment_panel(&self, user_id: Option<&UserId>) -> Option<AssessmentPanel> {
        let assessment = match self.assessment(FetchPolicy::NetworkOnly).await {
            Ok(assessment) => assessment?,
            Err(err) => {
                warn!(topic_id = %self.topic_id, error = %err, "assessment load failed");
                return None;
            }
        };
        let total_points = assessment.total_points();
        let pass_mark_points = assessment.pass_mark_points();

        let latest = match user_id {
            Some(user_id) => {
                let variables = Params::new(AttemptRequest {
                    user_id: user_id.clone(),
                    assessment_id: assessment.assessment_id.clone(),
                });
                match self
                    .ctx
                    .client
                    .query::<GetLatestAttempt>(&variables, FetchPolicy::NetworkOnly)
                    .await
                {
                    Ok(LatestAttemptResult::Attempt(attempt)) => {
                        Some(LatestResult::new(attempt, total_points, pass_mark_points))
                    }
                    Ok(_) => None,
                    Err(err) => {
                        warn!(assessment_id = %assessment.assessment_id, error = %err, "latest attempt load failed");
                        None
                    }
                }
            }
            None => None,
        };

        Some(AssessmentPanel {
            assessment,
            total_points,
            pass_mark_points,
            latest,
        })
    }

    /// A finished attempt completes the unit whether or not it passed.
    async fn sync_completed_attempt(
        &self,
        panel: &AssessmentPanel,
        path_id: Option<&LearningPathId>,
        unit: Option<&LearningUnit>,
    ) -> bool {
        let Some(latest) = &panel.latest else {
            return false;
        };
        if latest.attempt.status != AttemptStatus::Complete {
            return false;
        }
        let (Some(path_id), Some(unit)) = (path_id, unit) else {
            return false;
        };
        if unit.status == UnitStatus::Complete {
            return false;
        }
        info!(
            attempt_id = %latest.attempt.attempt_id,
            unit_id = %unit.user_learning_unit_id,
            passed = latest.passed,
            "completing learning unit after finished attempt"
        );
        self.complete_unit(path_id, unit).await.is_ok()
    }

    async fn complete_unit(
        &self,
        path_id: &LearningPathId,
        unit: &LearningUnit,
    ) -> Result<(), String> {
        let variables = Params::new(ProgressChange::complete(
            path_id.clone(),
            unit.user_learning_unit_id.clone(),
        ));
        match self
            .ctx
            .client
            .mutate::<UpdateLearningUnitProgress>(&variables)
            .await
        {
            Ok(ProgressUpdateResult::Updated(_)) => {
                self.ctx
                    .client
                    .evict_fields(&[GetUserLearningUnits::ROOT_FIELD])
                    .await;
                Ok(())
            }
            Ok(other) => {
                let message = other
                    .api_error()
                    .map(|err| err.message)
                    .unwrap_or_else(|| "progress update rejected".to_string());
                warn!(unit_id = %unit.user_learning_unit_id, %message, "progress update rejected");
                Err(message)
            }
            Err(err) => {
                warn!(unit_id = %unit.user_learning_unit_id, error = %err, "progress update failed");
                Err(err.to_string())
            }
        }
    }

    pub async fn mark_complete(&self) -> ActionOutcome {
        let user_id = self.user_id().await;
        let (path_id, unit) = self.progress(user_id.as_ref()).await;
        let (Some(path_id), Some(unit)) = (path_id, unit) else {
            return ActionOutcome::notice(Notice::error("Please enroll in this course first!"))
                .then(self.course_route());
        };

        match self.complete_unit(&path_id, &unit).await {
            Ok(()) => ActionOutcome::notice(Notice::success("Topic marked as completed!"))
                .then(self.course_route()),
            Err(message) => ActionOutcome::notice(Notice::error(format!(
                "Failed to mark as completed: {message}"
            ))),
        }
    }

    pub async fn start_quiz(&self) -> QuizStart {
        let unable = || QuizStart::Failed(Notice::error("Unable to start quiz. Please try again."));
        let Some(user_id) = self.user_id().await else {
            return unable();
        };
        let assessment = match self.assessment(FetchPolicy::CacheFirst).await {
            Ok(Some(assessment)) => assessment,
            Ok(None) => return unable(),
            Err(err) => {
                warn!(topic_id = %self.topic_id, error = %err, "assessment load failed");
                return unable();
            }
        };

        let variables = Params::new(AttemptRequest {
            user_id,
            assessment_id: assessment.assessment_id.clone(),
        });
        match self.ctx.client.mutate::<CreateAttempt>(&variables).await {
            Ok(StartAttemptResult::Started(attempt)) => {
                if let Err(err) = self
                    .ctx
                    .session
                    .save_quiz_context(
                        &self.course_id,
                        &self.topic_id,
                        assessment.estimate_duration_in_mins,
                    )
                    .await
                {
                    warn!(error = %err, "failed to store quiz context");
                }
                info!(
                    assessment_id = %assessment.assessment_id,
                    attempt_id = %attempt.attempt_id,
                    "attempt started"
                );
                QuizStart::Started(Route::QuizAttempt {
                    assessment_id: assessment.assessment_id,
                    attempt_id: attempt.attempt_id,
                })
            }
            Ok(StartAttemptResult::AttemptsCompleted {
                attempts_limit,
                user_attempted_count,
                ..
            }) => QuizStart::AttemptsExhausted {
                attempts_limit,
                attempted: user_attempted_count,
            },
            Ok(StartAttemptResult::AssessmentNotFound { .. }) => {
                QuizStart::Failed(Notice::error("Assessment not found"))
            }
            Ok(other) => QuizStart::Failed(Notice::error(
                other
                    .api_error()
                    .map(|err| err.message)
                    .unwrap_or_else(|| "Unable to start quiz. Please try again.".to_string()),
            )),
            Err(err) => {
                warn!(assessment_id = %assessment.assessment_id, error = %err, "attempt start failed");
                QuizStart::Failed(Notice::error(format!("Failed to start quiz: {err}")))
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/topic_detail_tests.rs"]
mod tests;
