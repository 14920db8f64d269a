//! Typed catalog of the GraphQL operations the client issues.
//!
//! Every selection set requests `__typename` so results can be decoded
//! into tagged unions and normalized by the cache.

use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{
        AssessmentId, AttemptId, CourseId, Gender, LearningPathId, LearningUnitId, QuestionId,
        TopicId, UnitStatus, UserId,
    },
    protocol::{
        AssessmentResult, AttemptEndResult, AttemptScoreResult, CourseTopicsResult,
        CoursesResult, CreateUserResult, EnrollResult, EnrollmentsResult, LatestAttemptResult,
        LearningUnitsResult, LoginResult, ModulesResult, NextQuestionResult, Outcome,
        ProgressUpdateResult, RecommendedCoursesResult, StartAttemptResult, SubmitAnswerResult,
        TopicVideoResult, TopicsResult, UpdateUserResult, UserResult,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
}

pub trait Operation {
    const NAME: &'static str;
    const ROOT_FIELD: &'static str;
    const KIND: OperationKind;
    const DOCUMENT: &'static str;

    type Variables: Serialize + Send + Sync;
    type Output: DeserializeOwned + Outcome + Send;
}

macro_rules! operation {
    ($op:ident, $kind:ident, $root:literal, $vars:ty => $output:ty, $document:expr) => {
        pub struct $op;

        impl Operation for $op {
            const NAME: &'static str = stringify!($op);
            const ROOT_FIELD: &'static str = $root;
            const KIND: OperationKind = OperationKind::$kind;
            const DOCUMENT: &'static str = $document;

            type Variables = $vars;
            type Output = $output;
        }
    };
}

/// Wraps an input object passed as the single `params` argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Params<T> {
    pub params: T,
}

impl<T> Params<T> {
    pub fn new(params: T) -> Self {
        Self { params }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdVars {
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseIdsVars {
    pub course_ids: Vec<CourseId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseIdVars {
    pub course_id: CourseId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicIdVars {
    pub topic_id: TopicId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollVars {
    pub user_id: UserId,
    pub course_id: CourseId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPathVars {
    pub user_learning_path_id: LearningPathId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptIdVars {
    pub attempt_id: AttemptId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub password: String,
    pub gender: Gender,
    pub email: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateUserVars {
    pub user: NewUser,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub user_id: UserId,
    pub name: String,
    pub gender: Gender,
    pub username: String,
    pub password: String,
    pub email: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressChange {
    pub user_learning_path_id: LearningPathId,
    pub user_learning_unit_id: LearningUnitId,
    pub status: UnitStatus,
    pub percentage: u32,
}

impl ProgressChange {
    pub fn complete(path_id: LearningPathId, unit_id: LearningUnitId) -> Self {
        Self {
            user_learning_path_id: path_id,
            user_learning_unit_id: unit_id,
            status: UnitStatus::Complete,
            percentage: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRequest {
    pub user_id: UserId,
    pub assessment_id: AssessmentId,
}

/// Answer payload: a single string, or a list for multi-select and
/// match-pairs questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AnswerResponse {
    Text(String),
    Choices(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSubmission {
    pub attempt_id: AttemptId,
    pub assessment_id: AssessmentId,
    pub question_id: QuestionId,
    pub response: AnswerResponse,
}

operation!(GetUser, Query, "getUser", UserIdVars => UserResult, concat!(
    "query GetUser($userId: String!) { getUser(params: {userId: $userId}) { __typename ",
    "... on UserType { userId name gender username email phoneNumber isActive otpCount } ",
    "... on UserNotFoundType { userId } } }"
));

operation!(UpdateUser, Mutation, "updateUser", Params<UserUpdate> => UpdateUserResult, concat!(
    "mutation UpdateUser($params: UpdateUserReqParams!) { updateUser(params: $params) { __typename ",
    "... on UserType { userId name gender username email phoneNumber isActive otpCount } ",
    "... on UserNotFoundType { userId } ",
    "... on ExistedUsernameFoundType { username } ",
    "... on ExistedEmailFoundType { email } ",
    "... on ExistedPhoneNumberFoundType { phoneNumber } } }"
));

operation!(CreateUser, Mutation, "createUser", CreateUserVars => CreateUserResult, concat!(
    "mutation CreateUser($user: CreateUserInput!) { createUser(user: $user) { __typename ",
    "... on UserType { userId name email username gender phoneNumber isActive } ",
    "... on ExistingEmail { email } ",
    "... on ExistingUserName { username } ",
    "... on ExistingPhoneNumber { phoneNumber } } }"
));

operation!(UserLogin, Mutation, "userLogin", Params<Credentials> => LoginResult, concat!(
    "mutation UserLogin($params: UserLogInReqParams!) { userLogin(params: $params) { __typename ",
    "... on UserLoginResponseType { token user { __typename userId email name } } ",
    "... on ExistingEmail { email } ",
    "... on NotExistedEmailFoundType { email } ",
    "... on WrongPasswordFoundType { password } } }"
));

operation!(GetCourses, Query, "getCourses", CourseIdsVars => CoursesResult, concat!(
    "query GetCourses($courseIds: [String]!) { getCourses(params: {courseIds: $courseIds}) { __typename ",
    "... on CoursesType { courses { __typename courseId title description category level estimatedDuration averageRating } } ",
    "... on CourseIdsNotFound { courseIds } } }"
));

operation!(GetModules, Query, "getModules", CourseIdsVars => ModulesResult, concat!(
    "query GetModules($courseIds: [String]!) { getModules(params: {courseIds: $courseIds}) { __typename ",
    "... on ModuleList { modules { __typename moduleId courseId moduleTitle description order estimatedDurationInMins } } } }"
));

operation!(GetTopicsForCourse, Query, "getTopicsForCourse", CourseIdVars => CourseTopicsResult, concat!(
    "query GetTopicsForCourse($courseId: String!) { getTopicsForCourse(params: {courseId: $courseId}) { __typename ",
    "... on TopicsListType { topics { __typename topicId topicTitle description estimatedDurationInMins moduleId topicType } } ",
    "... on CourseNotFoundType { courseId } } }"
));

operation!(GetTopic, Query, "getTopics", TopicIdVars => TopicsResult, concat!(
    "query GetTopic($topicId: String!) { getTopics(params: {topicIds: [$topicId]}) { __typename ",
    "... on TopicsType { topics { __typename topicId moduleId title description topicType content order estimatedDurationInMins } } ",
    "... on TopicIdsNotFound { topicIds } } }"
));

operation!(GetTopicVideo, Query, "getTopicVideo", TopicIdVars => TopicVideoResult, concat!(
    "query GetTopicVideo($topicId: String!) { getTopicVideo(params: {topicId: $topicId}) { __typename ",
    "... on TopicVideoType { title videoId videoUrl topicId } ",
    "... on TopicNotFound { topicId } } }"
));

operation!(GetUserEnrollments, Query, "getUserEnrollments", UserIdVars => EnrollmentsResult, concat!(
    "query GetUserEnrollments($userId: String!) { getUserEnrollments(params: {userId: $userId}) { __typename ",
    "... on EnrollmentListType { enrollments { __typename id userId courseId courseTitle courseStatus coursePercentage userLearningPathId } } ",
    "... on UserNotFoundType { userId } } }"
));

operation!(GetUserRecommendedCourses, Query, "getUserRecommendedCourses", UserIdVars => RecommendedCoursesResult, concat!(
    "query GetUserRecommendedCourses($userId: String!) { getUserRecommendedCourses(params: {userId: $userId}) { __typename ",
    "... on CoursesType { courses { __typename courseId title description category level averageRating estimatedDuration } } ",
    "... on UserNotFoundType { userId } } }"
));

operation!(EnrollUserForCourse, Mutation, "enrollUserForCourse", EnrollVars => EnrollResult, concat!(
    "mutation EnrollUserForCourse($userId: String!, $courseId: String!) { enrollUserForCourse(params: {userId: $userId, courseId: $courseId}) { __typename ",
    "... on EnrollmentType { id userId courseId courseTitle courseStatus coursePercentage userLearningPathId } ",
    "... on CourseNotFoundType { courseId } ",
    "... on UserNotFoundType { userId } ",
    "... on CourseInProgressExceptionType { userId } } }"
));

operation!(GetUserLearningUnits, Query, "getUserLearningUnits", LearningPathVars => LearningUnitsResult, concat!(
    "query GetUserLearningUnits($userLearningPathId: String!) { getUserLearningUnits(params: {userLearningPathId: $userLearningPathId}) { __typename ",
    "... on UserLearningUnitsProgressType { units { __typename userLearningUnitId topicId moduleId assessmentId isLocked percentage status } } ",
    "... on UserLearningPathIdNotFoundType { userLearningPathId } } }"
));

operation!(UpdateLearningUnitProgress, Mutation, "updateLearningUnitProgress", Params<ProgressChange> => ProgressUpdateResult, concat!(
    "mutation UpdateLearningUnitProgress($params: UpdateLearningUnitProgressInput!) { updateLearningUnitProgress(params: $params) { __typename ",
    "... on UpdateLearningUnitProgressType { nextUnitId nextUnitUnlocked overallPathPercentage updatedPercentage updatedStatus userLearningPathId userLearningUnitId } ",
    "... on UserLearningUnitIdNotFoundType { userLearningUnitId } ",
    "... on LearningUnitLockedExceptionType { userLearningUnitId } } }"
));

operation!(GetAssessmentByTopic, Query, "getAssessmentByTopic", TopicIdVars => AssessmentResult, concat!(
    "query GetAssessmentByTopic($topicId: String!) { getAssessmentByTopic(params: {topicId: $topicId}) { __typename ",
    "... on AssessmentType { assessmentId assessmentTitle assessmentType topicId description passMarks icon noOfQuestions marks ",
    "passPercentage easyCount mediumCount hardCount attemptsLimit estimateDurationInMins } ",
    "... on TopicNotFound { topicId } } }"
));

operation!(CreateAttempt, Mutation, "createAttempt", Params<AttemptRequest> => StartAttemptResult, concat!(
    "mutation CreateAttempt($params: StartAttemptReqParams!) { createAttempt(params: $params) { __typename ",
    "... on AssessmentAttemptType { attemptId userId assessmentId totalPoints questionIds status startedAt } ",
    "... on AttemptsCompletedType { userId assessmentId attemptsLimit userAttemptedCount } ",
    "... on AssessmentNotFoundType { assessmentId } ",
    "... on AssessmentUserNotFoundType { userId } } }"
));

operation!(GetLatestAttempt, Query, "getLatestAttempt", Params<AttemptRequest> => LatestAttemptResult, concat!(
    "query GetLatestAttempt($params: GetLatestAttemptReqParams!) { getLatestAttempt(params: $params) { __typename ",
    "... on AssessmentAttemptType { attemptId userId assessmentId totalPoints questionIds status startedAt } ",
    "... on AssessmentNotFoundType { assessmentId } ",
    "... on AssessmentUserNotFoundType { userId } } }"
));

operation!(GetNextQuestion, Query, "getNextQuestion", AttemptIdVars => NextQuestionResult, concat!(
    "query GetNextQuestion($attemptId: String!) { getNextQuestion(params: {attemptId: $attemptId}) { __typename ",
    "... on DisplayQuestionType { questionId questionText questionType options } ",
    "... on AssessmentAttemptProgressType { attemptId status } ",
    "... on AttemptNotFoundType { attemptId } } }"
));

operation!(SubmitAnswer, Mutation, "submitAnswer", Params<AnswerSubmission> => SubmitAnswerResult, concat!(
    "mutation SubmitAnswer($params: SubmitQuestionReqParams!) { submitAnswer(params: $params) { __typename ",
    "... on SubmitAnswerType { attemptId userId assessmentId totalPoints isCorrect points } ",
    "... on AlreadyAttemptedExistType { questionId } } }"
));

operation!(GetAttemptScore, Query, "getAttemptScore", Params<AttemptIdVars> => AttemptScoreResult, concat!(
    "query GetAttemptScore($params: GetAttemptScoreReqParams!) { getAttemptScore(params: $params) { __typename ",
    "... on AttemptScoreType { attemptId userId score startedAt } ",
    "... on AttemptNotFoundType { attemptId } } }"
));

operation!(AttemptEnd, Mutation, "attemptEnd", Params<AttemptIdVars> => AttemptEndResult, concat!(
    "mutation AttemptEnd($params: EndAnAttemptReqParams!) { attemptEnd(params: $params) { __typename ",
    "... on AttemptEndType { attemptId userId assessmentId totalPoints status startedAt completedAt } ",
    "... on AttemptNotFoundType { attemptId } } }"
));

/// Root fields holding attempt data; dropped from the cache once an
/// attempt ends.
pub const ATTEMPT_ROOT_FIELDS: [&str; 4] = [
    "getLatestAttempt",
    "getUserAttempts",
    "getAssessmentAttempts",
    "getAttemptHistory",
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const USER_FIELDS: &str = "userId name gender username email phoneNumber isActive otpCount";
    const COURSE_FIELDS: &str =
        "__typename courseId title description category level estimatedDuration averageRating";
    const ATTEMPT_FIELDS: &str =
        "attemptId userId assessmentId totalPoints questionIds status startedAt";

    fn every_document() -> Vec<(&'static str, &'static str)> {
        vec![
            (GetUser::ROOT_FIELD, GetUser::DOCUMENT),
            (UpdateUser::ROOT_FIELD, UpdateUser::DOCUMENT),
            (CreateUser::ROOT_FIELD, CreateUser::DOCUMENT),
            (UserLogin::ROOT_FIELD, UserLogin::DOCUMENT),
            (GetCourses::ROOT_FIELD, GetCourses::DOCUMENT),
            (GetModules::ROOT_FIELD, GetModules::DOCUMENT),
            (GetTopicsForCourse::ROOT_FIELD, GetTopicsForCourse::DOCUMENT),
            (GetTopic::ROOT_FIELD, GetTopic::DOCUMENT),
            (GetTopicVideo::ROOT_FIELD, GetTopicVideo::DOCUMENT),
            (GetUserEnrollments::ROOT_FIELD, GetUserEnrollments::DOCUMENT),
            (GetUserRecommendedCourses::ROOT_FIELD, GetUserRecommendedCourses::DOCUMENT),
            (EnrollUserForCourse::ROOT_FIELD, EnrollUserForCourse::DOCUMENT),
            (GetUserLearningUnits::ROOT_FIELD, GetUserLearningUnits::DOCUMENT),
            (UpdateLearningUnitProgress::ROOT_FIELD, UpdateLearningUnitProgress::DOCUMENT),
            (GetAssessmentByTopic::ROOT_FIELD, GetAssessmentByTopic::DOCUMENT),
            (CreateAttempt::ROOT_FIELD, CreateAttempt::DOCUMENT),
            (GetLatestAttempt::ROOT_FIELD, GetLatestAttempt::DOCUMENT),
            (GetNextQuestion::ROOT_FIELD, GetNextQuestion::DOCUMENT),
            (SubmitAnswer::ROOT_FIELD, SubmitAnswer::DOCUMENT),
            (GetAttemptScore::ROOT_FIELD, GetAttemptScore::DOCUMENT),
            (AttemptEnd::ROOT_FIELD, AttemptEnd::DOCUMENT),
        ]
    }

    #[test]
    fn documents_select_typename_on_their_root_field() {
        for (root, document) in every_document() {
            let selection = format!("{root}(params: ");
            let fallback = format!("{root}(user: ");
            assert!(
                document.contains(&selection) || document.contains(&fallback),
                "{root} missing from document"
            );
            assert!(
                document.contains("{ __typename ..."),
                "{root} does not request __typename"
            );
            assert_eq!(
                document.matches('{').count(),
                document.matches('}').count(),
                "{root} has unbalanced braces"
            );
        }
    }

    fn declares_itself<O: Operation>() -> bool {
        let keyword = match O::KIND {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
        };
        O::DOCUMENT.starts_with(&format!("{keyword} {}(", O::NAME))
    }

    #[test]
    fn operation_name_matches_document_header() {
        assert!(declares_itself::<GetUser>());
        assert!(declares_itself::<GetCourses>());
        assert!(declares_itself::<GetTopic>());
        assert!(declares_itself::<CreateAttempt>());
        assert!(declares_itself::<GetLatestAttempt>());
        assert!(declares_itself::<AttemptEnd>());
        assert!(declares_itself::<UpdateLearningUnitProgress>());
    }

    #[test]
    fn nested_lists_request_typename_for_normalization() {
        assert!(GetUserEnrollments::DOCUMENT.contains("enrollments { __typename id"));
        assert!(GetCourses::DOCUMENT.contains(COURSE_FIELDS));
        assert!(GetUser::DOCUMENT.contains(USER_FIELDS));
        assert!(CreateAttempt::DOCUMENT.contains(ATTEMPT_FIELDS));
    }

    #[test]
    fn answer_payload_serializes_as_string_or_list() {
        let single = Params::new(AnswerSubmission {
            attempt_id: AttemptId::new("at1"),
            assessment_id: AssessmentId::new("a1"),
            question_id: QuestionId::new("q1"),
            response: AnswerResponse::Text("Paris".to_string()),
        });
        assert_eq!(
            serde_json::to_value(&single).expect("json"),
            json!({"params": {"attemptId": "at1", "assessmentId": "a1", "questionId": "q1", "response": "Paris"}})
        );

        let multi = AnswerResponse::Choices(vec!["a".to_string(), "c".to_string()]);
        assert_eq!(serde_json::to_value(&multi).expect("json"), json!(["a", "c"]));
    }

    #[test]
    fn progress_change_marks_complete() {
        let change = ProgressChange::complete(LearningPathId::new("p1"), LearningUnitId::new("lu1"));
        assert_eq!(
            serde_json::to_value(&change).expect("json"),
            json!({"userLearningPathId": "p1", "userLearningUnitId": "lu1", "status": "COMPLETE", "percentage": 100})
        );
    }
}
