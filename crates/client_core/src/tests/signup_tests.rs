use super::*;
use crate::test_support::{context, ScriptedTransport};
use serde_json::json;

fn form() -> SignupForm {
    SignupForm {
        name: "Ada".to_string(),
        username: "ada".to_string(),
        password: "secret".to_string(),
        gender: Gender::Female,
        email: "ada@example.com".to_string(),
        phone_number: "5551234".to_string(),
    }
}

#[tokio::test]
async fn created_account_routes_to_login() {
    let transport = ScriptedTransport::new();
    transport
        .push(
            "createUser",
            json!({"__typename": "UserType", "userId": "u1", "name": "Ada", "email": "ada@example.com"}),
        )
        .await;
    let page = SignupPage::new(context(transport.clone()).await);

    let outcome = page.submit(form()).await;

    assert_eq!(outcome.notice, Some(Notice::success("Account created successfully!")));
    assert_eq!(outcome.route, Some(Route::Login));
    let calls = transport.calls_to("CreateUser").await;
    assert_eq!(calls[0].variables["user"]["gender"], "FEMALE");
    assert_eq!(calls[0].variables["user"]["phoneNumber"], "5551234");
}

#[tokio::test]
async fn duplicate_fields_map_to_messages() {
    let cases = [
        ("ExistingEmail", "Email already exists"),
        ("ExistingUserName", "Username already exists"),
        ("ExistingPhoneNumber", "Phone number already exists"),
    ];
    for (typename, message) in cases {
        let transport = ScriptedTransport::new();
        transport
            .push("createUser", json!({"__typename": typename}))
            .await;
        let page = SignupPage::new(context(transport).await);

        let outcome = page.submit(form()).await;

        assert_eq!(outcome.notice, Some(Notice::error(message)));
        assert_eq!(outcome.route, None);
    }
}
