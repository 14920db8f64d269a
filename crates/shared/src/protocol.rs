//! Result unions returned by the GraphQL API, discriminated by `__typename`.

use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        Assessment, Attempt, AttemptScore, AttemptSummary, Course, CourseModule, Enrollment,
        LearningUnit, ProgressUpdate, Question, SessionUser, SubmittedAnswer, Topic, TopicSummary,
        TopicVideo, User,
    },
    error::{ApiError, ErrorCode},
};

/// Implemented by every result union so callers can branch on the error
/// taxonomy without matching each variant.
pub trait Outcome {
    /// `None` for the success variant.
    fn api_error(&self) -> Option<ApiError>;

    fn is_success(&self) -> bool {
        self.api_error().is_none()
    }
}

fn unrecognized() -> Option<ApiError> {
    Some(ApiError::new(
        ErrorCode::Internal,
        "unrecognized result variant",
    ))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum UserResult {
    #[serde(rename = "UserType")]
    User(User),
    #[serde(rename = "UserNotFoundType", rename_all = "camelCase")]
    UserNotFound {
        #[serde(default)]
        user_id: Option<String>,
    },
    #[serde(other)]
    Unrecognized,
}

impl Outcome for UserResult {
    fn api_error(&self) -> Option<ApiError> {
        match self {
            Self::User(_) => None,
            Self::UserNotFound { .. } => Some(ApiError::new(ErrorCode::NotFound, "User not found")),
            Self::Unrecognized => unrecognized(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum UpdateUserResult {
    #[serde(rename = "UserType")]
    Updated(User),
    #[serde(rename = "UserNotFoundType", rename_all = "camelCase")]
    UserNotFound {
        #[serde(default)]
        user_id: Option<String>,
    },
    #[serde(rename = "ExistedUsernameFoundType")]
    UsernameTaken {
        #[serde(default)]
        username: Option<String>,
    },
    #[serde(rename = "ExistedEmailFoundType")]
    EmailTaken {
        #[serde(default)]
        email: Option<String>,
    },
    #[serde(rename = "ExistedPhoneNumberFoundType", rename_all = "camelCase")]
    PhoneNumberTaken {
        #[serde(default)]
        phone_number: Option<String>,
    },
    #[serde(other)]
    Unrecognized,
}

impl Outcome for UpdateUserResult {
    fn api_error(&self) -> Option<ApiError> {
        match self {
            Self::Updated(_) => None,
            Self::UserNotFound { .. } => Some(ApiError::new(ErrorCode::NotFound, "User not found")),
            Self::UsernameTaken { .. } => Some(ApiError::new(
                ErrorCode::AlreadyExists,
                "Username already exists",
            )),
            Self::EmailTaken { .. } => {
                Some(ApiError::new(ErrorCode::AlreadyExists, "Email already exists"))
            }
            Self::PhoneNumberTaken { .. } => Some(ApiError::new(
                ErrorCode::AlreadyExists,
                "Phone number already exists",
            )),
            Self::Unrecognized => unrecognized(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum CreateUserResult {
    #[serde(rename = "UserType")]
    Created(User),
    #[serde(rename = "ExistingEmail")]
    ExistingEmail {
        #[serde(default)]
        email: Option<String>,
    },
    #[serde(rename = "ExistingUserName")]
    ExistingUsername {
        #[serde(default)]
        username: Option<String>,
    },
    #[serde(rename = "ExistingPhoneNumber", rename_all = "camelCase")]
    ExistingPhoneNumber {
        #[serde(default)]
        phone_number: Option<String>,
    },
    #[serde(other)]
    Unrecognized,
}

impl Outcome for CreateUserResult {
    fn api_error(&self) -> Option<ApiError> {
        match self {
            Self::Created(_) => None,
            Self::ExistingEmail { .. } => {
                Some(ApiError::new(ErrorCode::AlreadyExists, "Email already exists"))
            }
            Self::ExistingUsername { .. } => Some(ApiError::new(
                ErrorCode::AlreadyExists,
                "Username already exists",
            )),
            Self::ExistingPhoneNumber { .. } => Some(ApiError::new(
                ErrorCode::AlreadyExists,
                "Phone number already exists",
            )),
            Self::Unrecognized => unrecognized(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum LoginResult {
    #[serde(rename = "UserLoginResponseType")]
    LoggedIn { token: String, user: SessionUser },
    #[serde(rename = "ExistingEmail")]
    ExistingEmail {
        #[serde(default)]
        email: Option<String>,
    },
    #[serde(rename = "NotExistedEmailFoundType")]
    UnknownEmail {
        #[serde(default)]
        email: Option<String>,
    },
    #[serde(rename = "WrongPasswordFoundType")]
    WrongPassword {
        #[serde(default)]
        password: Option<String>,
    },
    #[serde(other)]
    Unrecognized,
}

impl Outcome for LoginResult {
    fn api_error(&self) -> Option<ApiError> {
        match self {
            Self::LoggedIn { .. } => None,
            Self::ExistingEmail { .. } | Self::UnknownEmail { .. } | Self::WrongPassword { .. } => {
                Some(ApiError::new(
                    ErrorCode::InvalidCredentials,
                    "Invalid email or password",
                ))
            }
            Self::Unrecognized => unrecognized(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum CoursesResult {
    #[serde(rename = "CoursesType")]
    Courses {
        #[serde(default)]
        courses: Vec<Course>,
    },
    #[serde(rename = "CourseIdsNotFound", rename_all = "camelCase")]
    CoursesNotFound {
        #[serde(default)]
        course_ids: Vec<String>,
    },
    #[serde(other)]
    Unrecognized,
}

impl Outcome for CoursesResult {
    fn api_error(&self) -> Option<ApiError> {
        match self {
            Self::Courses { .. } => None,
            Self::CoursesNotFound { .. } => {
                Some(ApiError::new(ErrorCode::NotFound, "Course not found"))
            }
            Self::Unrecognized => unrecognized(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum RecommendedCoursesResult {
    #[serde(rename = "CoursesType")]
    Courses {
        #[serde(default)]
        courses: Vec<Course>,
    },
    #[serde(rename = "UserNotFoundType", rename_all = "camelCase")]
    UserNotFound {
        #[serde(default)]
        user_id: Option<String>,
    },
    #[serde(other)]
    Unrecognized,
}

impl Outcome for RecommendedCoursesResult {
    fn api_error(&self) -> Option<ApiError> {
        match self {
            Self::Courses { .. } => None,
            Self::UserNotFound { .. } => Some(ApiError::new(ErrorCode::NotFound, "User not found")),
            Self::Unrecognized => unrecognized(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum ModulesResult {
    #[serde(rename = "ModuleList")]
    Modules {
        #[serde(default)]
        modules: Vec<CourseModule>,
    },
    #[serde(other)]
    Unrecognized,
}

impl Outcome for ModulesResult {
    fn api_error(&self) -> Option<ApiError> {
        match self {
            Self::Modules { .. } => None,
            Self::Unrecognized => unrecognized(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum CourseTopicsResult {
    #[serde(rename = "TopicsListType")]
    Topics {
        #[serde(default)]
        topics: Vec<TopicSummary>,
    },
    #[serde(rename = "CourseNotFoundType", rename_all = "camelCase")]
    CourseNotFound {
        #[serde(default)]
        course_id: Option<String>,
    },
    #[serde(other)]
    Unrecognized,
}

impl Outcome for CourseTopicsResult {
    fn api_error(&self) -> Option<ApiError> {
        match self {
            Self::Topics { .. } => None,
            Self::CourseNotFound { .. } => {
                Some(ApiError::new(ErrorCode::NotFound, "Course not found"))
            }
            Self::Unrecognized => unrecognized(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum TopicsResult {
    #[serde(rename = "TopicsType")]
    Topics {
        #[serde(default)]
        topics: Vec<Topic>,
    },
    #[serde(rename = "TopicIdsNotFound", rename_all = "camelCase")]
    TopicsNotFound {
        #[serde(default)]
        topic_ids: Vec<String>,
    },
    #[serde(other)]
    Unrecognized,
}

impl Outcome for TopicsResult {
    fn api_error(&self) -> Option<ApiError> {
        match self {
            Self::Topics { .. } => None,
            Self::TopicsNotFound { .. } => {
                Some(ApiError::new(ErrorCode::NotFound, "Topic not found"))
            }
            Self::Unrecognized => unrecognized(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum TopicVideoResult {
    #[serde(rename = "TopicVideoType")]
    Video(TopicVideo),
    #[serde(rename = "TopicNotFound", rename_all = "camelCase")]
    TopicNotFound {
        #[serde(default)]
        topic_id: Option<String>,
    },
    #[serde(other)]
    Unrecognized,
}

impl Outcome for TopicVideoResult {
    fn api_error(&self) -> Option<ApiError> {
        match self {
            Self::Video(_) => None,
            Self::TopicNotFound { .. } => {
                Some(ApiError::new(ErrorCode::NotFound, "Topic not found"))
            }
            Self::Unrecognized => unrecognized(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum EnrollmentsResult {
    #[serde(rename = "EnrollmentListType")]
    Enrollments {
        #[serde(default)]
        enrollments: Vec<Enrollment>,
    },
    #[serde(rename = "UserNotFoundType", rename_all = "camelCase")]
    UserNotFound {
        #[serde(default)]
        user_id: Option<String>,
    },
    #[serde(other)]
    Unrecognized,
}

impl Outcome for EnrollmentsResult {
    fn api_error(&self) -> Option<ApiError> {
        match self {
            Self::Enrollments { .. } => None,
            Self::UserNotFound { .. } => Some(ApiError::new(ErrorCode::NotFound, "User not found")),
            Self::Unrecognized => unrecognized(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum EnrollResult {
    #[serde(rename = "EnrollmentType")]
    Enrolled(Enrollment),
    #[serde(rename = "CourseNotFoundType", rename_all = "camelCase")]
    CourseNotFound {
        #[serde(default)]
        course_id: Option<String>,
    },
    #[serde(rename = "UserNotFoundType", rename_all = "camelCase")]
    UserNotFound {
        #[serde(default)]
        user_id: Option<String>,
    },
    #[serde(rename = "CourseInProgressExceptionType", rename_all = "camelCase")]
    CourseInProgress {
        #[serde(default)]
        user_id: Option<String>,
    },
    #[serde(other)]
    Unrecognized,
}

impl Outcome for EnrollResult {
    fn api_error(&self) -> Option<ApiError> {
        match self {
            Self::Enrolled(_) => None,
            Self::CourseNotFound { .. } => {
                Some(ApiError::new(ErrorCode::NotFound, "Course not found"))
            }
            Self::UserNotFound { .. } => Some(ApiError::new(ErrorCode::NotFound, "User not found")),
            Self::CourseInProgress { .. } => Some(ApiError::new(
                ErrorCode::Conflict,
                "Another course is already in progress",
            )),
            Self::Unrecognized => unrecognized(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum LearningUnitsResult {
    #[serde(rename = "UserLearningUnitsProgressType")]
    Units {
        #[serde(default)]
        units: Vec<LearningUnit>,
    },
    #[serde(rename = "UserLearningPathIdNotFoundType", rename_all = "camelCase")]
    PathNotFound {
        #[serde(default)]
        user_learning_path_id: Option<String>,
    },
    #[serde(other)]
    Unrecognized,
}

impl Outcome for LearningUnitsResult {
    fn api_error(&self) -> Option<ApiError> {
        match self {
            Self::Units { .. } => None,
            Self::PathNotFound { .. } => Some(ApiError::new(
                ErrorCode::NotFound,
                "Learning path not found",
            )),
            Self::Unrecognized => unrecognized(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum ProgressUpdateResult {
    #[serde(rename = "UpdateLearningUnitProgressType")]
    Updated(ProgressUpdate),
    #[serde(rename = "UserLearningUnitIdNotFoundType", rename_all = "camelCase")]
    UnitNotFound {
        #[serde(default)]
        user_learning_unit_id: Option<String>,
    },
    #[serde(rename = "LearningUnitLockedExceptionType", rename_all = "camelCase")]
    UnitLocked {
        #[serde(default)]
        user_learning_unit_id: Option<String>,
    },
    #[serde(other)]
    Unrecognized,
}

impl Outcome for ProgressUpdateResult {
    fn api_error(&self) -> Option<ApiError> {
        match self {
            Self::Updated(_) => None,
            Self::UnitNotFound { .. } => Some(ApiError::new(
                ErrorCode::NotFound,
                "Learning unit not found",
            )),
            Self::UnitLocked { .. } => {
                Some(ApiError::new(ErrorCode::Locked, "This unit is locked"))
            }
            Self::Unrecognized => unrecognized(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum AssessmentResult {
    #[serde(rename = "AssessmentType")]
    Assessment(Assessment),
    #[serde(rename = "TopicNotFound", rename_all = "camelCase")]
    TopicNotFound {
        #[serde(default)]
        topic_id: Option<String>,
    },
    #[serde(other)]
    Unrecognized,
}

impl Outcome for AssessmentResult {
    fn api_error(&self) -> Option<ApiError> {
        match self {
            Self::Assessment(_) => None,
            Self::TopicNotFound { .. } => {
                Some(ApiError::new(ErrorCode::NotFound, "Topic not found"))
            }
            Self::Unrecognized => unrecognized(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum StartAttemptResult {
    #[serde(rename = "AssessmentAttemptType")]
    Started(Attempt),
    #[serde(rename = "AttemptsCompletedType", rename_all = "camelCase")]
    AttemptsCompleted {
        #[serde(default)]
        user_id: Option<String>,
        #[serde(default)]
        assessment_id: Option<String>,
        #[serde(default)]
        attempts_limit: Option<i64>,
        #[serde(default)]
        user_attempted_count: Option<i64>,
    },
    #[serde(rename = "AssessmentNotFoundType", rename_all = "camelCase")]
    AssessmentNotFound {
        #[serde(default)]
        assessment_id: Option<String>,
    },
    #[serde(rename = "AssessmentUserNotFoundType", rename_all = "camelCase")]
    UserNotFound {
        #[serde(default)]
        user_id: Option<String>,
    },
    #[serde(other)]
    Unrecognized,
}

impl Outcome for StartAttemptResult {
    fn api_error(&self) -> Option<ApiError> {
        match self {
            Self::Started(_) => None,
            Self::AttemptsCompleted { .. } => Some(ApiError::new(
                ErrorCode::LimitExceeded,
                "Attempts limit reached",
            )),
            Self::AssessmentNotFound { .. } => {
                Some(ApiError::new(ErrorCode::NotFound, "Assessment not found"))
            }
            Self::UserNotFound { .. } => Some(ApiError::new(ErrorCode::NotFound, "User not found")),
            Self::Unrecognized => unrecognized(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum LatestAttemptResult {
    #[serde(rename = "AssessmentAttemptType")]
    Attempt(Attempt),
    #[serde(rename = "AssessmentNotFoundType", rename_all = "camelCase")]
    AssessmentNotFound {
        #[serde(default)]
        assessment_id: Option<String>,
    },
    #[serde(rename = "AssessmentUserNotFoundType", rename_all = "camelCase")]
    UserNotFound {
        #[serde(default)]
        user_id: Option<String>,
    },
    #[serde(other)]
    Unrecognized,
}

impl Outcome for LatestAttemptResult {
    fn api_error(&self) -> Option<ApiError> {
        match self {
            Self::Attempt(_) => None,
            Self::AssessmentNotFound { .. } => {
                Some(ApiError::new(ErrorCode::NotFound, "Assessment not found"))
            }
            Self::UserNotFound { .. } => Some(ApiError::new(ErrorCode::NotFound, "User not found")),
            Self::Unrecognized => unrecognized(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum NextQuestionResult {
    #[serde(rename = "DisplayQuestionType")]
    Question(Question),
    /// The attempt has no questions left.
    #[serde(rename = "AssessmentAttemptProgressType", rename_all = "camelCase")]
    Exhausted {
        #[serde(default)]
        attempt_id: Option<String>,
        #[serde(default)]
        status: Option<String>,
    },
    #[serde(rename = "AttemptNotFoundType", rename_all = "camelCase")]
    AttemptNotFound {
        #[serde(default)]
        attempt_id: Option<String>,
    },
    #[serde(other)]
    Unrecognized,
}

impl Outcome for NextQuestionResult {
    fn api_error(&self) -> Option<ApiError> {
        match self {
            Self::Question(_) | Self::Exhausted { .. } => None,
            Self::AttemptNotFound { .. } => {
                Some(ApiError::new(ErrorCode::NotFound, "Attempt not found!"))
            }
            Self::Unrecognized => unrecognized(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum SubmitAnswerResult {
    #[serde(rename = "SubmitAnswerType")]
    Submitted(SubmittedAnswer),
    #[serde(rename = "AlreadyAttemptedExistType", rename_all = "camelCase")]
    AlreadyAnswered {
        #[serde(default)]
        question_id: Option<String>,
    },
    #[serde(other)]
    Unrecognized,
}

impl Outcome for SubmitAnswerResult {
    fn api_error(&self) -> Option<ApiError> {
        match self {
            Self::Submitted(_) => None,
            Self::AlreadyAnswered { .. } => Some(ApiError::new(
                ErrorCode::AlreadyExists,
                "Question already answered",
            )),
            Self::Unrecognized => unrecognized(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum AttemptScoreResult {
    #[serde(rename = "AttemptScoreType")]
    Score(AttemptScore),
    #[serde(rename = "AttemptNotFoundType", rename_all = "camelCase")]
    AttemptNotFound {
        #[serde(default)]
        attempt_id: Option<String>,
    },
    #[serde(other)]
    Unrecognized,
}

impl Outcome for AttemptScoreResult {
    fn api_error(&self) -> Option<ApiError> {
        match self {
            Self::Score(_) => None,
            Self::AttemptNotFound { .. } => {
                Some(ApiError::new(ErrorCode::NotFound, "Attempt not found!"))
            }
            Self::Unrecognized => unrecognized(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum AttemptEndResult {
    #[serde(rename = "AttemptEndType")]
    Ended(AttemptSummary),
    #[serde(rename = "AttemptNotFoundType", rename_all = "camelCase")]
    AttemptNotFound {
        #[serde(default)]
        attempt_id: Option<String>,
    },
    #[serde(other)]
    Unrecognized,
}

impl Outcome for AttemptEndResult {
    fn api_error(&self) -> Option<ApiError> {
        match self {
            Self::Ended(_) => None,
            Self::AttemptNotFound { .. } => {
                Some(ApiError::new(ErrorCode::NotFound, "Attempt not found!"))
            }
            Self::Unrecognized => unrecognized(),
        }
    }
}
