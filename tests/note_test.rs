mod common;

use serde_json::Value;

async fn create_note(app: &common::TestApp, token: &str, body: Value) -> reqwest::Response {
    app.client
        .post(app.url("/notes"))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn create_and_list_notes() {
    let app = common::spawn_app().await;
    let token = app.create_verified_user("notes@example.com").await;

    let resp = create_note(
        &app,
        &token,
        serde_json::json!({
            "title": "Groceries",
            "content": "- [ ] milk\n- [x] **eggs**",
            "folder": "Home"
        }),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Note added.");
    assert_eq!(body["data"]["folder"], "Home");
    assert!(body["data"]["content_html"]
        .as_str()
        .unwrap()
        .contains("<strong>eggs</strong>"));

    create_note(
        &app,
        &token,
        serde_json::json!({ "title": "Standup", "content": "notes" }),
    )
    .await;

    let resp = app
        .client
        .get(app.url("/notes"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let notes = body["data"].as_array().unwrap();
    assert_eq!(notes.len(), 2);
    // Newest first.
    assert_eq!(notes[0]["title"], "Standup");
    assert!(notes[0]["folder"].is_null());
}

#[tokio::test]
async fn list_filters_by_folder() {
    let app = common::spawn_app().await;
    let token = app.create_verified_user("folders@example.com").await;

    for (title, folder) in [("a", "Work"), ("b", "Home"), ("c", "Work")] {
        create_note(
            &app,
            &token,
            serde_json::json!({ "title": title, "content": "x", "folder": folder }),
        )
        .await;
    }

    let resp = app
        .client
        .get(app.url("/notes?folder=Work"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["c", "a"]);
}

#[tokio::test]
async fn note_html_is_sanitized() {
    let app = common::spawn_app().await;
    let token = app.create_verified_user("xss@example.com").await;

    let resp = create_note(
        &app,
        &token,
        serde_json::json!({
            "title": "sneaky",
            "content": "<script>alert(1)</script>\n\n[x](javascript:alert(2)) and [ok](https://example.com)"
        }),
    )
    .await;
    let body: Value = resp.json().await.unwrap();
    let html = body["data"]["content_html"].as_str().unwrap();
    assert!(!html.contains("<script"));
    assert!(!html.contains("javascript:"));
    assert!(html.contains("href=\"https://example.com\""));
    // The source is returned untouched.
    assert!(body["data"]["content"].as_str().unwrap().contains("<script>"));
}

#[tokio::test]
async fn notes_are_scoped_per_user() {
    let app = common::spawn_app().await;
    let alice = app.create_verified_user("alice@example.com").await;
    let bob = app.create_verified_user("bob@example.com").await;

    create_note(
        &app,
        &alice,
        serde_json::json!({ "title": "private", "content": "alice only" }),
    )
    .await;

    let resp = app
        .client
        .get(app.url("/notes"))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn notes_require_session() {
    let app = common::spawn_app().await;

    let resp = app.client.get(app.url("/notes")).send().await.unwrap();
    assert_eq!(resp.status(), 401);

    let resp = app
        .client
        .post(app.url("/notes"))
        .json(&serde_json::json!({ "title": "t", "content": "c" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn empty_title_is_rejected() {
    let app = common::spawn_app().await;
    let token = app.create_verified_user("empty@example.com").await;

    let resp = create_note(
        &app,
        &token,
        serde_json::json!({ "title": "", "content": "c" }),
    )
    .await;
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn blank_title_is_rejected() {
    let app = common::spawn_app().await;
    let token = app.create_verified_user("blank@example.com").await;

    let resp = create_note(
        &app,
        &token,
        serde_json::json!({ "title": "   ", "content": "c" }),
    )
    .await;
    assert_eq!(resp.status(), 400);

    let resp = create_note(
        &app,
        &token,
        serde_json::json!({ "title": "t", "content": " \n " }),
    )
    .await;
    assert_eq!(resp.status(), 400);
}
