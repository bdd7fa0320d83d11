//! Authentication boundary tests.
//!
//! Every route below /api/v1 except /health must reject requests without a
//! valid caller identity with 401 UNAUTHENTICATED before touching anything
//! else.

mod common;

use common::TestApp;

async fn assert_unauthenticated(response: reqwest::Response) {
    assert_eq!(response.status(), 401);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_workspaces_require_authentication() {
    let app = TestApp::new().await;

    let response = app
        .client
        .get(app.url("/api/v1/workspaces"))
        .send()
        .await
        .unwrap();
    assert_unauthenticated(response).await;

    let response = app
        .client
        .post(app.url("/api/v1/workspaces"))
        .json(&serde_json::json!({ "name": "Test", "is_personal": true }))
        .send()
        .await
        .unwrap();
    assert_unauthenticated(response).await;
}

#[tokio::test]
async fn test_tasks_require_authentication() {
    let app = TestApp::new().await;

    let response = app
        .client
        .get(app.url("/api/v1/tasks"))
        .send()
        .await
        .unwrap();
    assert_unauthenticated(response).await;

    let response = app
        .client
        .delete(app.url(
            "/api/v1/tasks/123e4567-e89b-12d3-a456-426614174000",
        ))
        .send()
        .await
        .unwrap();
    assert_unauthenticated(response).await;
}

#[tokio::test]
async fn test_profile_requires_authentication() {
    let app = TestApp::new().await;

    let response = app.client.get(app.url("/api/v1/me")).send().await.unwrap();
    assert_unauthenticated(response).await;
}

#[tokio::test]
async fn test_malformed_bearer_token_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .client
        .get(app.url("/api/v1/workspaces"))
        .header("Authorization", "Bearer not-a-real-token")
        .send()
        .await
        .unwrap();
    assert_unauthenticated(response).await;
}

#[tokio::test]
async fn test_token_signed_with_wrong_secret_is_rejected() {
    let app = TestApp::new().await;

    let token = questline::services::jwt::generate_jwt(
        uuid::Uuid::now_v7(),
        "attacker@example.com",
        None,
        "not-the-server-secret",
        15,
    )
    .unwrap();

    let response = app
        .client
        .get(app.url("/api/v1/workspaces"))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_unauthenticated(response).await;
}
