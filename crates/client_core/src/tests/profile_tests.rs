use super::*;
use crate::test_support::{context, signed_in_context, ScriptedTransport};
use serde_json::json;

fn user_json(name: &str) -> serde_json::Value {
    json!({
        "__typename": "UserType",
        "userId": "u1",
        "name": name,
        "username": "ada",
        "email": "ada@example.com",
        "phoneNumber": 5551234,
        "gender": null
    })
}

#[tokio::test]
async fn profile_requires_session() {
    let transport = ScriptedTransport::new();
    let outcome = ProfilePage::new(context(transport).await)
        .load()
        .await
        .expect_err("redirect");
    assert_eq!(outcome.route, Some(Route::Login));
}

#[tokio::test]
async fn form_is_prefilled_and_cancel_restores_it() {
    let transport = ScriptedTransport::new();
    transport.always("getUser", user_json("Ada")).await;
    let mut view = ProfilePage::new(signed_in_context(transport).await)
        .load()
        .await
        .expect("view");

    assert_eq!(view.form.phone_number, "5551234");
    assert_eq!(view.form.gender, Gender::Other);

    view.toggle_edit();
    view.form.name = "Changed".to_string();
    view.toggle_edit();
    assert!(!view.editing);
    assert_eq!(view.form.name, "Ada");
}

#[tokio::test]
async fn save_sends_full_update_and_refreshes_view() {
    let transport = ScriptedTransport::new();
    transport.always("getUser", user_json("Ada")).await;
    transport.push("updateUser", user_json("Ada L.")).await;
    let page = ProfilePage::new(signed_in_context(transport.clone()).await);
    let mut view = page.load().await.expect("view");

    view.toggle_edit();
    view.form.name = "Ada L.".to_string();
    view.form.password = "new-secret".to_string();
    let notice = page.save(&mut view).await;

    assert_eq!(notice, Notice::success("Profile updated successfully!"));
    assert!(!view.editing);
    assert_eq!(view.user.name.as_deref(), Some("Ada L."));
    let calls = transport.calls_to("UpdateUser").await;
    assert_eq!(
        calls[0].variables["params"],
        json!({
            "userId": "u1",
            "name": "Ada L.",
            "gender": "OTHER",
            "username": "ada",
            "password": "new-secret",
            "email": "ada@example.com",
            "phoneNumber": "5551234"
        })
    );
}

#[tokio::test]
async fn taken_username_is_reported() {
    let transport = ScriptedTransport::new();
    transport.always("getUser", user_json("Ada")).await;
    transport
        .push(
            "updateUser",
            json!({"__typename": "ExistedUsernameFoundType", "username": "ada"}),
        )
        .await;
    let page = ProfilePage::new(signed_in_context(transport).await);
    let mut view = page.load().await.expect("view");

    let notice = page.save(&mut view).await;

    assert_eq!(notice, Notice::error("Username already exists"));
    assert_eq!(view.user.name.as_deref(), Some("Ada"));
}
