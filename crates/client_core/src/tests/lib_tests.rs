use super::*;
use crate::{
    operations::{EnrollUserForCourse, EnrollVars, GetUser, GetUserEnrollments, UserIdVars},
    test_support::ScriptedTransport,
};
use serde_json::json;
use shared::{
    domain::{CourseId, UserId},
    protocol::{EnrollResult, UserResult},
};

fn user_vars() -> UserIdVars {
    UserIdVars {
        user_id: UserId::new("u1"),
    }
}

fn user(name: &str) -> Value {
    json!({"__typename": "UserType", "userId": "u1", "name": name, "email": "ada@example.com"})
}

#[tokio::test]
async fn cache_first_serves_repeat_queries_from_cache() {
    let transport = ScriptedTransport::new();
    transport.always("getUser", user("Ada")).await;
    let client = LearningClient::new(transport.clone());

    let first = client
        .query::<GetUser>(&user_vars(), FetchPolicy::CacheFirst)
        .await
        .expect("first");
    let second = client
        .query::<GetUser>(&user_vars(), FetchPolicy::CacheFirst)
        .await
        .expect("second");

    assert_eq!(first, second);
    assert_eq!(transport.calls_to("GetUser").await.len(), 1);
}

#[tokio::test]
async fn network_only_refetches_and_refreshes_cache() {
    let transport = ScriptedTransport::new();
    transport.push("getUser", user("Ada")).await;
    transport.always("getUser", user("Ada L.")).await;
    let client = LearningClient::new(transport.clone());

    client
        .query::<GetUser>(&user_vars(), FetchPolicy::CacheFirst)
        .await
        .expect("warm");
    let fresh = client
        .query::<GetUser>(&user_vars(), FetchPolicy::NetworkOnly)
        .await
        .expect("fresh");
    let cached = client
        .query::<GetUser>(&user_vars(), FetchPolicy::CacheFirst)
        .await
        .expect("cached");

    let UserResult::User(fresh) = fresh else {
        panic!("expected user");
    };
    assert_eq!(fresh.name.as_deref(), Some("Ada L."));
    assert_eq!(cached, UserResult::User(fresh));
    assert_eq!(transport.calls_to("GetUser").await.len(), 2);
}

#[tokio::test]
async fn null_root_is_an_empty_result() {
    let transport = ScriptedTransport::new();
    transport.always("getUser", Value::Null).await;
    let client = LearningClient::new(transport);

    let err = client
        .query::<GetUser>(&user_vars(), FetchPolicy::NetworkOnly)
        .await
        .expect_err("empty");

    assert!(matches!(err, TransportError::EmptyResult("getUser")));
}

#[tokio::test]
async fn offline_client_reports_missing_transport() {
    let err = LearningClient::offline()
        .query::<GetUser>(&user_vars(), FetchPolicy::CacheFirst)
        .await
        .expect_err("offline");

    assert!(matches!(err, TransportError::Unavailable));
}

#[tokio::test]
async fn mutation_results_merge_into_cached_entities() {
    let transport = ScriptedTransport::new();
    transport.always("getUser", user("Ada")).await;
    transport
        .push(
            "enrollUserForCourse",
            json!({"__typename": "EnrollmentType", "id": "e1", "userId": "u1", "courseId": "c1",
                   "userLearningPathId": "p1"}),
        )
        .await;
    let client = LearningClient::new(transport.clone());
    client
        .query::<GetUser>(&user_vars(), FetchPolicy::CacheFirst)
        .await
        .expect("user");

    let enrolled = client
        .mutate::<EnrollUserForCourse>(&EnrollVars {
            user_id: UserId::new("u1"),
            course_id: CourseId::new("c1"),
        })
        .await
        .expect("enroll");

    assert!(matches!(enrolled, EnrollResult::Enrolled(_)));
    assert_eq!(transport.calls_to("EnrollUserForCourse").await.len(), 1);
    assert!(client
        .cached_root("getUser", &json!({"userId": "u1"}))
        .await
        .is_some());
}

#[tokio::test]
async fn evicted_fields_are_fetched_again() {
    let transport = ScriptedTransport::new();
    transport
        .always(
            "getUserEnrollments",
            json!({"__typename": "EnrollmentListType", "enrollments": []}),
        )
        .await;
    let client = LearningClient::new(transport.clone());

    client
        .query::<GetUserEnrollments>(&user_vars(), FetchPolicy::CacheFirst)
        .await
        .expect("first");
    assert_eq!(
        client.evict_fields(&[GetUserEnrollments::ROOT_FIELD]).await,
        1
    );
    client
        .query::<GetUserEnrollments>(&user_vars(), FetchPolicy::CacheFirst)
        .await
        .expect("second");

    assert_eq!(transport.calls_to("GetUserEnrollments").await.len(), 2);
}

#[tokio::test]
async fn reset_drops_everything() {
    let transport = ScriptedTransport::new();
    transport.always("getUser", user("Ada")).await;
    let client = LearningClient::new(transport.clone());
    client
        .query::<GetUser>(&user_vars(), FetchPolicy::CacheFirst)
        .await
        .expect("user");

    client.reset_cache().await;

    assert!(client
        .cached_root("getUser", &json!({"userId": "u1"}))
        .await
        .is_none());
}

#[tokio::test]
async fn auth_token_reaches_the_transport() {
    let transport = ScriptedTransport::new();
    let client = LearningClient::new(transport.clone());

    client.set_auth_token(Some("tok-9".to_string())).await;
    assert_eq!(transport.token().await.as_deref(), Some("tok-9"));

    client.set_auth_token(None).await;
    assert_eq!(transport.token().await, None);
}
