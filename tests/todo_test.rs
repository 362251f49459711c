mod common;

use serde_json::Value;

async fn create_todo(
    app: &common::TestApp,
    token: &str,
    task: &str,
    parent_id: Option<i64>,
) -> reqwest::Response {
    app.client
        .post(app.url("/todos"))
        .bearer_auth(token)
        .json(&serde_json::json!({ "task": task, "parent_id": parent_id }))
        .send()
        .await
        .unwrap()
}

async fn create_todo_id(
    app: &common::TestApp,
    token: &str,
    task: &str,
    parent_id: Option<i64>,
) -> i64 {
    let resp = create_todo(app, token, task, parent_id).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    body["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn subtasks_are_nested_under_parents() {
    let app = common::spawn_app().await;
    let token = app.create_verified_user("tasks@example.com").await;

    let chores = create_todo_id(&app, &token, "Chores", None).await;
    let errands = create_todo_id(&app, &token, "Errands", None).await;
    create_todo_id(&app, &token, "Dishes", Some(chores)).await;
    create_todo_id(&app, &token, "Laundry", Some(chores)).await;

    let resp = app
        .client
        .get(app.url("/todos"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let tree = body["data"].as_array().unwrap();

    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0]["id"].as_i64().unwrap(), chores);
    assert_eq!(tree[0]["completed"], false);
    let subtasks: Vec<&str> = tree[0]["subtasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["task"].as_str().unwrap())
        .collect();
    assert_eq!(subtasks, vec!["Dishes", "Laundry"]);
    assert_eq!(tree[1]["id"].as_i64().unwrap(), errands);
    assert!(tree[1]["subtasks"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn subtask_of_subtask_is_rejected() {
    let app = common::spawn_app().await;
    let token = app.create_verified_user("deep@example.com").await;

    let parent = create_todo_id(&app, &token, "Parent", None).await;
    let child = create_todo_id(&app, &token, "Child", Some(parent)).await;

    let resp = create_todo(&app, &token, "Grandchild", Some(child)).await;
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn missing_parent_is_not_found() {
    let app = common::spawn_app().await;
    let token = app.create_verified_user("orphan@example.com").await;

    let resp = create_todo(&app, &token, "Orphan", Some(9999)).await;
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Parent task not found");
}

#[tokio::test]
async fn cannot_attach_to_another_users_task() {
    let app = common::spawn_app().await;
    let alice = app.create_verified_user("alice@example.com").await;
    let bob = app.create_verified_user("bob@example.com").await;

    let alices = create_todo_id(&app, &alice, "Alice's", None).await;
    let resp = create_todo(&app, &bob, "Sneaky", Some(alices)).await;
    assert_eq!(resp.status(), 404);

    let resp = app
        .client
        .get(app.url("/todos"))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn task_text_is_validated() {
    let app = common::spawn_app().await;
    let token = app.create_verified_user("long@example.com").await;

    let resp = create_todo(&app, &token, "", None).await;
    assert_eq!(resp.status(), 400);

    let resp = create_todo(&app, &token, "   ", None).await;
    assert_eq!(resp.status(), 400);

    let resp = create_todo(&app, &token, &"x".repeat(151), None).await;
    assert_eq!(resp.status(), 400);
}
