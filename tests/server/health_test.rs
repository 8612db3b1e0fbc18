use crate::common::TestContext;

#[tokio::test]
async fn health_reports_connected_database() {
    let ctx = TestContext::new().await;

    let response = ctx.server.get("/api/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Server is running!");
    assert_eq!(body["database"], "Connected");
    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn health_follows_database_connectivity() {
    let ctx = TestContext::new().await;

    ctx.health.set_connected(false);
    let body: serde_json::Value = ctx.server.get("/api/health").await.json();
    assert_eq!(body["database"], "Disconnected");

    ctx.health.set_connected(true);
    let body: serde_json::Value = ctx.server.get("/api/health").await.json();
    assert_eq!(body["database"], "Connected");
}
