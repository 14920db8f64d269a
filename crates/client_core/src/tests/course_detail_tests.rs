use super::*;
use crate::test_support::{context, signed_in_context, ScriptedTransport};
use serde_json::{json, Value};

fn unit(id: &str, topic: &str, module: &str, status: &str, locked: bool, percentage: f64) -> Value {
    json!({
        "__typename": "UserLearningUnitType",
        "userLearningUnitId": id,
        "topicId": topic,
        "moduleId": module,
        "isLocked": locked,
        "percentage": percentage,
        "status": status
    })
}

async fn script_catalog(transport: &ScriptedTransport) {
    transport
        .always(
            "getCourses",
            json!({"__typename": "CoursesType", "courses": [
                {"__typename": "CourseType", "courseId": "c1", "title": "Rust", "description": "Ownership"}
            ]}),
        )
        .await;
    transport
        .always(
            "getModules",
            json!({"__typename": "ModuleList", "modules": [
                {"__typename": "ModuleType", "moduleId": "m2", "courseId": "c1", "moduleTitle": "Traits", "order": 2},
                {"__typename": "ModuleType", "moduleId": "m1", "courseId": "c1", "moduleTitle": "Basics", "order": 1},
                {"__typename": "ModuleType", "moduleId": "m3", "courseId": "c1", "moduleTitle": "Unsafe", "order": null}
            ]}),
        )
        .await;
    transport
        .always(
            "getTopicsForCourse",
            json!({"__typename": "TopicsListType", "topics": [
                {"__typename": "TopicSummaryType", "topicId": "t1", "topicTitle": "Intro", "moduleId": "m1", "estimatedDurationInMins": 10},
                {"__typename": "TopicSummaryType", "topicId": "t2", "topicTitle": "Borrowing", "moduleId": "m1", "estimatedDurationInMins": 25},
                {"__typename": "TopicSummaryType", "topicId": "t3", "topicTitle": "Traits", "moduleId": "m2", "estimatedDurationInMins": null},
                {"__typename": "TopicSummaryType", "topicId": "t4", "topicTitle": "Raw pointers", "moduleId": "m3", "estimatedDurationInMins": 40}
            ]}),
        )
        .await;
}

async fn script_enrollment(transport: &ScriptedTransport) {
    transport
        .always(
            "getUserEnrollments",
            json!({"__typename": "EnrollmentListType", "enrollments": [
                {"__typename": "EnrollmentType", "id": "e1", "userId": "u1", "courseId": "c1", "userLearningPathId": "p1"}
            ]}),
        )
        .await;
    transport
        .always(
            "getUserLearningUnits",
            json!({"__typename": "UserLearningUnitsProgressType", "units": [
                unit("lu1", "t1", "m1", "COMPLETE", false, 40.0),
                unit("lu2", "t2", "m1", "HALF_COMPLETED", false, 50.0),
                unit("lu3", "t3", "m2", "LOCKED", true, 0.0)
            ]}),
        )
        .await;
}

#[tokio::test]
async fn visitor_sees_every_module_in_order() {
    let transport = ScriptedTransport::new();
    script_catalog(&transport).await;
    let page = CourseDetailPage::new(context(transport).await, CourseId::new("c1"));

    let view = page.load().await.expect("view");

    assert!(!view.is_enrolled());
    let titles: Vec<&str> = view.modules.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, ["Unsafe", "Basics", "Traits"]);
    assert_eq!(view.modules[1].display_order, 2);
    assert_eq!(view.modules[1].topics.len(), 2);
    assert!(view.modules[1].topics.iter().all(|row| row.action == TopicAction::Locked));
    assert_eq!(view.total_duration_mins, 0);
    assert_eq!(view.stats, CompletionStats::default());
}

#[tokio::test]
async fn enrolled_learner_sees_only_path_topics_with_progress() {
    let transport = ScriptedTransport::new();
    script_catalog(&transport).await;
    script_enrollment(&transport).await;
    let page = CourseDetailPage::new(signed_in_context(transport).await, CourseId::new("c1"));

    let view = page.load().await.expect("view");

    assert_eq!(view.learning_path_id, Some(LearningPathId::new("p1")));
    let titles: Vec<&str> = view.modules.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, ["Basics", "Traits"]);

    let intro = &view.modules[0].topics[0];
    assert_eq!(intro.status, UnitStatus::Complete);
    assert_eq!(intro.percentage, 100.0);
    assert_eq!(intro.action.label(), "Review");
    assert_eq!(view.modules[0].topics[1].action.label(), "Continue");
    assert_eq!(view.modules[1].topics[0].action.label(), "Locked");

    assert_eq!(view.total_duration_mins, 35);
    assert_eq!(view.stats.total, 3);
    assert_eq!(view.stats.completed, 1);
    assert_eq!(view.stats.half_completed, 1);
    // (100 + 50 + 0) / 3
    assert_eq!(view.stats.percentage, 50);
}

#[tokio::test]
async fn unit_without_a_status_counts_as_locked() {
    let transport = ScriptedTransport::new();
    script_catalog(&transport).await;
    transport
        .always(
            "getUserEnrollments",
            json!({"__typename": "EnrollmentListType", "enrollments": [
                {"__typename": "EnrollmentType", "id": "e1", "userId": "u1", "courseId": "c1", "userLearningPathId": "p1"}
            ]}),
        )
        .await;
    transport
        .always(
            "getUserLearningUnits",
            json!({"__typename": "UserLearningUnitsProgressType", "units": [
                unit("lu1", "t1", "m1", "COMPLETE", false, 40.0),
                {"__typename": "UserLearningUnitType", "userLearningUnitId": "lu2", "topicId": "t2",
                 "moduleId": "m1", "isLocked": null, "percentage": null, "status": null}
            ]}),
        )
        .await;
    let page = CourseDetailPage::new(signed_in_context(transport).await, CourseId::new("c1"));

    let view = page.load().await.expect("view");

    assert_eq!(view.modules.len(), 1);
    let topics = &view.modules[0].topics;
    assert_eq!(topics.len(), 2);
    assert_eq!(topics[0].status, UnitStatus::Complete);
    assert_eq!(topics[0].percentage, 100.0);
    assert_eq!(topics[1].status, UnitStatus::Locked);
    assert_eq!(topics[1].percentage, 0.0);
    assert_eq!(view.stats.total, 2);
    assert_eq!(view.stats.completed, 1);
    assert_eq!(view.stats.percentage, 50);
}

#[tokio::test]
async fn catalog_queries_are_served_from_cache_on_reload() {
    let transport = ScriptedTransport::new();
    script_catalog(&transport).await;
    let page = CourseDetailPage::new(context(transport.clone()).await, CourseId::new("c1"));

    page.load().await.expect("first");
    page.load().await.expect("second");

    assert_eq!(transport.calls_to("GetCourses").await.len(), 1);
    assert_eq!(transport.calls_to("GetModules").await.len(), 1);
}

#[tokio::test]
async fn enroll_requires_a_session() {
    let transport = ScriptedTransport::new();
    let page = CourseDetailPage::new(context(transport.clone()).await, CourseId::new("c1"));

    let outcome = page.enroll().await;

    assert_eq!(outcome.notice, Some(Notice::error("Please login first!")));
    assert_eq!(outcome.route, Some(Route::Login));
    assert!(transport.calls().await.is_empty());
}

#[tokio::test]
async fn enrolling_evicts_cached_enrollments() {
    let transport = ScriptedTransport::new();
    transport
        .push(
            "getUserEnrollments",
            json!({"__typename": "EnrollmentListType", "enrollments": []}),
        )
        .await;
    transport
        .push(
            "enrollUserForCourse",
            json!({"__typename": "EnrollmentType", "id": "e1", "userId": "u1", "courseId": "c1", "userLearningPathId": "p1"}),
        )
        .await;
    let ctx = signed_in_context(transport.clone()).await;
    let page = CourseDetailPage::new(ctx.clone(), CourseId::new("c1"));

    let user_id = UserId::new("u1");
    assert_eq!(learning_path_for(&ctx.client, &user_id, &CourseId::new("c1")).await, None);

    let outcome = page.enroll().await;
    assert_eq!(outcome.notice, Some(Notice::success("Enrolled successfully!")));
    assert_eq!(
        outcome.route,
        Some(Route::Course {
            course_id: CourseId::new("c1")
        })
    );
    assert!(ctx
        .client
        .cached_root("getUserEnrollments", &json!({"userId": "u1"}))
        .await
        .is_none());
}

#[tokio::test]
async fn enroll_error_variants_map_to_messages() {
    let transport = ScriptedTransport::new();
    transport
        .push(
            "enrollUserForCourse",
            json!({"__typename": "CourseInProgressExceptionType", "userId": "u1"}),
        )
        .await;
    let page = CourseDetailPage::new(signed_in_context(transport).await, CourseId::new("c1"));

    let outcome = page.enroll().await;

    assert_eq!(
        outcome.notice,
        Some(Notice::error("Another course is already in progress"))
    );
    assert_eq!(outcome.route, None);
}
