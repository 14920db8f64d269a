use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(CourseId);
id_newtype!(ModuleId);
id_newtype!(TopicId);
id_newtype!(LearningPathId);
id_newtype!(LearningUnitId);
id_newtype!(AssessmentId);
id_newtype!(AttemptId);
id_newtype!(QuestionId);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Enum values can arrive with their server-side class prefix
/// (`QuestionTypeDTO.MCQ_SINGLE`); only the last segment is significant.
pub fn strip_enum_prefix(raw: &str) -> String {
    raw.rsplit('.').next().unwrap_or(raw).trim().to_ascii_uppercase()
}

macro_rules! wire_enum {
    ($name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                match strip_enum_prefix(raw).as_str() {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

wire_enum!(UnitStatus {
    Locked => "LOCKED",
    Start => "START",
    HalfCompleted => "HALF_COMPLETED",
    Complete => "COMPLETE",
});

wire_enum!(AttemptStatus {
    Created => "CREATED",
    InProgress => "IN_PROGRESS",
    Complete => "COMPLETE",
});

wire_enum!(Gender {
    Male => "MALE",
    Female => "FEMALE",
    Other => "OTHER",
});

impl Default for UnitStatus {
    fn default() -> Self {
        Self::Locked
    }
}

impl Default for AttemptStatus {
    fn default() -> Self {
        Self::Created
    }
}

impl UnitStatus {
    /// Weight of a unit in the course completion percentage.
    pub fn contribution(&self) -> u32 {
        match self {
            Self::Complete => 100,
            Self::HalfCompleted => 50,
            Self::Start => 10,
            Self::Locked => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QuestionType {
    McqSingle,
    McqMulti,
    TrueFalse,
    FillBlank,
    ShortAnswer,
    MatchPairs,
    Other(String),
}

impl QuestionType {
    pub fn parse(raw: &str) -> Self {
        match strip_enum_prefix(raw).as_str() {
            "MCQ_SINGLE" => Self::McqSingle,
            "MCQ_MULTI" => Self::McqMulti,
            "TRUE_FALSE" => Self::TrueFalse,
            "FILL_BLANK" => Self::FillBlank,
            "SHORT_ANSWER" => Self::ShortAnswer,
            "MATCH_PAIRS" => Self::MatchPairs,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::McqSingle => "MCQ_SINGLE",
            Self::McqMulti => "MCQ_MULTI",
            Self::TrueFalse => "TRUE_FALSE",
            Self::FillBlank => "FILL_BLANK",
            Self::ShortAnswer => "SHORT_ANSWER",
            Self::MatchPairs => "MATCH_PAIRS",
            Self::Other(raw) => raw,
        }
    }

    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl Serialize for QuestionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for QuestionType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(Self::parse(raw.as_deref().unwrap_or_default()))
    }
}

/// Timestamps are RFC 3339 when the server includes an offset; naive
/// values are read as UTC.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        let raw = raw.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Ok(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => serializer.serialize_str(&value.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) if !raw.trim().is_empty() => super::parse(&raw)
                    .map(Some)
                    .map_err(serde::de::Error::custom),
                _ => Ok(None),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: UserId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub otp_count: Option<i64>,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or(self.username.as_deref().filter(|name| !name.is_empty()))
            .unwrap_or("Learner")
    }
}

/// Null, missing or unlisted statuses decode as the type's default.
fn status_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
{
    Ok(known_status(deserializer)?.unwrap_or_default())
}

/// Null or unlisted statuses decode as `None`.
fn known_status<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    Ok(lenient_string(deserializer)?.and_then(|raw| raw.parse().ok()))
}

/// Accepts strings, numbers and booleans, keeping their JSON text.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(raw)) => Some(raw),
        Some(other) => Some(other.to_string()),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub user_id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub course_id: CourseId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub estimated_duration: Option<i64>,
    #[serde(default)]
    pub average_rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseModule {
    pub module_id: ModuleId,
    #[serde(default)]
    pub course_id: Option<CourseId>,
    pub module_title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default)]
    pub estimated_duration_in_mins: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicSummary {
    pub topic_id: TopicId,
    pub topic_title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub estimated_duration_in_mins: Option<i64>,
    #[serde(default)]
    pub module_id: Option<ModuleId>,
    #[serde(default)]
    pub topic_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub topic_id: TopicId,
    #[serde(default)]
    pub module_id: Option<ModuleId>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub topic_type: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default)]
    pub estimated_duration_in_mins: Option<i64>,
}

impl Topic {
    pub fn is_assessment(&self) -> bool {
        self.topic_type
            .as_deref()
            .map(|kind| strip_enum_prefix(kind) == "ASSESSMENT")
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicVideo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    pub topic_id: TopicId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: String,
    pub user_id: UserId,
    pub course_id: CourseId,
    #[serde(default)]
    pub course_title: Option<String>,
    #[serde(default)]
    pub course_status: Option<String>,
    #[serde(default)]
    pub course_percentage: Option<f64>,
    #[serde(default)]
    pub user_learning_path_id: Option<LearningPathId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningUnit {
    pub user_learning_unit_id: LearningUnitId,
    pub topic_id: TopicId,
    #[serde(default)]
    pub module_id: Option<ModuleId>,
    #[serde(default)]
    pub assessment_id: Option<AssessmentId>,
    #[serde(default)]
    pub is_locked: Option<bool>,
    #[serde(default)]
    pub percentage: Option<f64>,
    #[serde(default, deserialize_with = "status_or_default")]
    pub status: UnitStatus,
}

impl LearningUnit {
    /// A COMPLETE unit always displays as 100%, whatever percentage the
    /// server last recorded.
    pub fn display_percentage(&self) -> f64 {
        if self.status == UnitStatus::Complete {
            100.0
        } else {
            self.percentage.unwrap_or(0.0)
        }
    }

    pub fn locked(&self) -> bool {
        self.is_locked.unwrap_or(true)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub assessment_id: AssessmentId,
    #[serde(default)]
    pub assessment_title: Option<String>,
    #[serde(default)]
    pub assessment_type: Option<String>,
    #[serde(default)]
    pub topic_id: Option<TopicId>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub pass_marks: Option<i64>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub no_of_questions: Option<i64>,
    #[serde(default)]
    pub marks: Option<i64>,
    #[serde(default)]
    pub pass_percentage: Option<f64>,
    #[serde(default)]
    pub easy_count: Option<i64>,
    #[serde(default)]
    pub medium_count: Option<i64>,
    #[serde(default)]
    pub hard_count: Option<i64>,
    #[serde(default)]
    pub attempts_limit: Option<i64>,
    #[serde(default)]
    pub estimate_duration_in_mins: Option<i64>,
}

impl Assessment {
    pub fn total_points(&self) -> i64 {
        match self.marks {
            Some(marks) if marks > 0 => marks,
            _ => self.no_of_questions.unwrap_or(0) * 10,
        }
    }

    pub fn pass_mark_points(&self) -> i64 {
        match self.pass_marks {
            Some(pass_marks) if pass_marks > 0 => pass_marks,
            _ => {
                let percentage = self.pass_percentage.unwrap_or(0.0);
                (percentage / 100.0 * self.total_points() as f64).round() as i64
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub attempt_id: AttemptId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub assessment_id: Option<AssessmentId>,
    #[serde(default)]
    pub total_points: Option<i64>,
    #[serde(default)]
    pub question_ids: Vec<QuestionId>,
    #[serde(default, deserialize_with = "status_or_default")]
    pub status: AttemptStatus,
    #[serde(default, with = "timestamp::option")]
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question_id: QuestionId,
    pub question_text: String,
    pub question_type: QuestionType,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub options: Vec<String>,
}

impl Question {
    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    #[serde(default)]
    pub attempt_id: Option<AttemptId>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub assessment_id: Option<AssessmentId>,
    #[serde(default)]
    pub total_points: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub is_correct: Option<String>,
    #[serde(default)]
    pub points: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptScore {
    pub attempt_id: AttemptId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default, with = "timestamp::option")]
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptSummary {
    pub attempt_id: AttemptId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub assessment_id: Option<AssessmentId>,
    #[serde(default)]
    pub total_points: Option<i64>,
    #[serde(default, deserialize_with = "known_status")]
    pub status: Option<AttemptStatus>,
    #[serde(default, with = "timestamp::option")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    #[serde(default)]
    pub next_unit_id: Option<LearningUnitId>,
    #[serde(default)]
    pub next_unit_unlocked: Option<bool>,
    #[serde(default)]
    pub overall_path_percentage: Option<f64>,
    #[serde(default)]
    pub updated_percentage: Option<f64>,
    #[serde(default, deserialize_with = "known_status")]
    pub updated_status: Option<UnitStatus>,
    #[serde(default)]
    pub user_learning_path_id: Option<LearningPathId>,
    #[serde(default)]
    pub user_learning_unit_id: Option<LearningUnitId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_server_enum_prefixes() {
        assert_eq!(
            "UnitStatus.HALF_COMPLETED".parse::<UnitStatus>().expect("status"),
            UnitStatus::HalfCompleted
        );
        assert_eq!(QuestionType::parse("QuestionTypeDTO.MCQ_SINGLE"), QuestionType::McqSingle);
        assert_eq!(
            QuestionType::parse("ESSAY"),
            QuestionType::Other("ESSAY".to_string())
        );
        assert!("FINISHED".parse::<AttemptStatus>().is_err());
    }

    #[test]
    fn naive_timestamps_are_read_as_utc() {
        let parsed = timestamp::parse("2025-03-01T10:00:00.250000").expect("naive");
        assert_eq!(parsed.to_rfc3339(), "2025-03-01T10:00:00.250+00:00");
        let offset = timestamp::parse("2025-03-01T12:00:00+02:00").expect("offset");
        assert_eq!(offset, parsed - chrono::Duration::milliseconds(250));
    }

    #[test]
    fn unit_and_attempt_statuses_fall_back_when_unrecognized() {
        let units: Vec<LearningUnit> = serde_json::from_value(serde_json::json!([
            {"userLearningUnitId": "lu1", "topicId": "t1", "status": null},
            {"userLearningUnitId": "lu2", "topicId": "t2"},
            {"userLearningUnitId": "lu3", "topicId": "t3", "status": "ARCHIVED"},
            {"userLearningUnitId": "lu4", "topicId": "t4", "status": "UnitStatus.COMPLETE"}
        ]))
        .expect("units");
        let statuses: Vec<_> = units.iter().map(|unit| unit.status).collect();
        assert_eq!(
            statuses,
            [UnitStatus::Locked, UnitStatus::Locked, UnitStatus::Locked, UnitStatus::Complete]
        );

        let attempt: Attempt = serde_json::from_value(serde_json::json!({
            "attemptId": "at1",
            "status": "PAUSED"
        }))
        .expect("attempt");
        assert_eq!(attempt.status, AttemptStatus::Created);

        let update: ProgressUpdate =
            serde_json::from_value(serde_json::json!({"updatedStatus": "SKIPPED"})).expect("update");
        assert_eq!(update.updated_status, None);
    }

    #[test]
    fn complete_unit_displays_full_percentage() {
        let unit = LearningUnit {
            user_learning_unit_id: LearningUnitId::new("u1"),
            topic_id: TopicId::new("t1"),
            module_id: None,
            assessment_id: None,
            is_locked: Some(false),
            percentage: Some(40.0),
            status: UnitStatus::Complete,
        };
        assert_eq!(unit.display_percentage(), 100.0);
    }

    #[test]
    fn assessment_points_fall_back_to_question_count_and_percentage() {
        let assessment: Assessment = serde_json::from_value(serde_json::json!({
            "assessmentId": "a1",
            "noOfQuestions": 7,
            "passPercentage": 45.0
        }))
        .expect("assessment");
        assert_eq!(assessment.total_points(), 70);
        assert_eq!(assessment.pass_mark_points(), 32);
    }

    #[test]
    fn user_display_name_prefers_name_then_username() {
        let mut user: User = serde_json::from_value(serde_json::json!({
            "userId": "u1",
            "username": "ada",
            "phoneNumber": 5551234
        }))
        .expect("user");
        assert_eq!(user.display_name(), "ada");
        assert_eq!(user.phone_number.as_deref(), Some("5551234"));
        user.username = None;
        assert_eq!(user.display_name(), "Learner");
    }
}
