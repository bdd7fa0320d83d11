mod common;

use common::TestApp;

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let app = TestApp::new().await;

    let response = app
        .client
        .get(app.url("/api/v1/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_health_does_not_require_authentication() {
    let app = TestApp::new().await;

    // No Authorization header at all
    let response = app
        .client
        .get(app.url("/api/v1/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}
