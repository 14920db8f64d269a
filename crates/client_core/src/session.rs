use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shared::domain::{AttemptId, CourseId, TopicId, UserId};
use storage::{keys, KeyValueStore};
use tracing::warn;

pub const DEFAULT_ASSESSMENT_MINUTES: u32 = 30;

/// Record kept under the `user` key while someone is signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub user_id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

/// Course, topic and time limit of the quiz being taken, written when an
/// attempt starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizContext {
    pub course_id: Option<CourseId>,
    pub topic_id: Option<TopicId>,
    pub duration_minutes: u32,
}

impl Default for QuizContext {
    fn default() -> Self {
        Self {
            course_id: None,
            topic_id: None,
            duration_minutes: DEFAULT_ASSESSMENT_MINUTES,
        }
    }
}

#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn load(&self) -> Result<Option<StoredSession>> {
        let Some(raw) = self.store.get(keys::USER).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                warn!(error = %err, "ignoring unreadable session record");
                Ok(None)
            }
        }
    }

    pub async fn user_id(&self) -> Result<Option<UserId>> {
        Ok(self.load().await?.map(|session| session.user_id))
    }

    pub async fn save(&self, session: &StoredSession) -> Result<()> {
        let raw = serde_json::to_string(session).context("failed to encode session")?;
        self.store.set(keys::USER, &raw).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.remove(keys::USER).await
    }

    pub async fn save_quiz_context(
        &self,
        course_id: &CourseId,
        topic_id: &TopicId,
        duration_minutes: Option<i64>,
    ) -> Result<()> {
        self.store
            .set(keys::CURRENT_COURSE_ID, course_id.as_str())
            .await?;
        self.store
            .set(keys::CURRENT_TOPIC_ID, topic_id.as_str())
            .await?;
        match duration_minutes {
            Some(minutes) if minutes > 0 => {
                self.store
                    .set(keys::ASSESSMENT_DURATION, &minutes.to_string())
                    .await
            }
            _ => self.store.remove(keys::ASSESSMENT_DURATION).await,
        }
    }

    pub async fn quiz_context(&self) -> Result<QuizContext> {
        let course_id = self.store.get(keys::CURRENT_COURSE_ID).await?;
        let topic_id = self.store.get(keys::CURRENT_TOPIC_ID).await?;
        let duration_minutes = self
            .store
            .get(keys::ASSESSMENT_DURATION)
            .await?
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|minutes| *minutes > 0)
            .unwrap_or(DEFAULT_ASSESSMENT_MINUTES);
        Ok(QuizContext {
            course_id: course_id.filter(|id| !id.is_empty()).map(CourseId::new),
            topic_id: topic_id.filter(|id| !id.is_empty()).map(TopicId::new),
            duration_minutes,
        })
    }

    pub async fn mark_active_attempt(&self, attempt_id: &AttemptId) -> Result<()> {
        self.store
            .set(keys::ACTIVE_QUIZ_ATTEMPT, attempt_id.as_str())
            .await
    }

    pub async fn active_attempt(&self) -> Result<Option<AttemptId>> {
        Ok(self
            .store
            .get(keys::ACTIVE_QUIZ_ATTEMPT)
            .await?
            .map(AttemptId::new))
    }

    pub async fn clear_active_attempt(&self) -> Result<()> {
        self.store.remove(keys::ACTIVE_QUIZ_ATTEMPT).await
    }
}
