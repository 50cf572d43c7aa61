//! Health Check API Tests

use axum::http::StatusCode;

use crate::common::TestApp;

#[tokio::test]
async fn health_check_reports_healthy() {
    let app = TestApp::new();

    let response = app.get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert_eq!(response.body["database"], "connected");
    assert!(response.body["timestamp"].is_string());
}
