//! Category routing through the HTTP surface.

#[path = "../helpers/mod.rs"]
mod helpers;

use async_trait::async_trait;
use axum::http::StatusCode;
use helpers::app::TestAppBuilder;
use helpers::{body_string, oneshot, post_json, test_state, HIGH_CPU_ALERT};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use webhook_receiver::config::CategoryRoute;
use webhook_receiver::notification::{CategoryHandler, HandlerTable, MarkerLevel};
use webhook_receiver::sink::AlertSink;
use webhook_receiver::{AlertSummary, Category};

const GENERAL: &str = "General alert — default handling";

async fn markers_for(path: &str) -> (String, Vec<String>) {
    let (state, sink) = test_state(HandlerTable::builtin());
    let response = oneshot(state, post_json(path, HIGH_CPU_ALERT)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let lines = sink.lines();
    let category = lines[0].category.clone();
    (category, vec![lines.last().unwrap().message.clone()])
}

#[tokio::test]
async fn each_known_category_selects_its_handler() {
    let cases = [
        ("/webhook/critical", "CRITICAL ALERT — immediate attention required"),
        ("/webhook/database", "Database alert — notifying database team"),
        ("/webhook/security", "Security alert — notifying security team"),
        ("/webhook/development", "Development alert — notifying dev team"),
        ("/webhook/operations", "Operations alert — notifying ops team"),
    ];
    for (path, marker) in cases {
        let (_, markers) = markers_for(path).await;
        assert_eq!(markers, vec![marker.to_string()], "path {}", path);
    }
}

#[tokio::test]
async fn category_is_the_final_path_segment() {
    assert_eq!(markers_for("/webhook/critical").await.0, "critical");
    assert_eq!(markers_for("/webhook").await, ("webhook".to_string(), vec![GENERAL.to_string()]));
    assert_eq!(markers_for("/").await, ("default".to_string(), vec![GENERAL.to_string()]));
    assert_eq!(markers_for("/webhook/").await.0, "default");
    assert_eq!(markers_for("/a/b/critical?team=x").await.0, "critical");
}

#[tokio::test]
async fn post_to_health_is_an_intake_request() {
    let (state, sink) = test_state(HandlerTable::builtin());

    let response = oneshot(state, post_json("/health", r#"{"alerts": []}"#)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, r#"{"status": "ok"}"#);
    assert_eq!(sink.messages(), vec!["Received health alert".to_string()]);
}

struct CountingHandler {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl CategoryHandler for CountingHandler {
    fn name(&self) -> &str {
        "counting"
    }

    async fn handle(
        &self,
        _category: &Category,
        _alert: &AlertSummary,
        _sink: &dyn AlertSink,
    ) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FailingHandler;

#[async_trait]
impl CategoryHandler for FailingHandler {
    fn name(&self) -> &str {
        "failing"
    }

    async fn handle(
        &self,
        _category: &Category,
        alert: &AlertSummary,
        _sink: &dyn AlertSink,
    ) -> anyhow::Result<()> {
        if alert.alert_name == "Boom" {
            anyhow::bail!("cannot notify for {}", alert.alert_name);
        }
        Ok(())
    }
}

#[tokio::test]
async fn every_alert_in_a_request_goes_to_the_same_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut table = HandlerTable::builtin();
    table.set_fallback(Arc::new(CountingHandler {
        calls: calls.clone(),
    }));
    let (state, _sink) = test_state(table);
    let body = r#"{"alerts": [
        {"labels": {"severity": "critical"}},
        {"labels": {"severity": "info", "service": "database"}}
    ]}"#;

    let response = oneshot(state, post_json("/webhook/unrouted", body)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn handler_fault_fails_request_after_earlier_lines() {
    let mut table = HandlerTable::builtin();
    table.register("paging", Arc::new(FailingHandler));
    let (state, sink) = test_state(table);
    let body = r#"{"alerts": [
        {"labels": {"alertname": "Fine"}},
        {"labels": {"alertname": "Boom"}},
        {"labels": {"alertname": "Never"}}
    ]}"#;

    let response = oneshot(state, post_json("/webhook/paging", body)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_string(response).await, r#"{"status": "error"}"#);
    assert!(sink.contains("Alert: Fine"));
    assert!(sink.contains("Alert: Boom"));
    assert!(!sink.contains("Alert: Never"));
}

#[tokio::test]
async fn configured_categories_are_routed() {
    let app = TestAppBuilder::new()
        .with_config(|config| {
            config.categories = vec![
                CategoryRoute {
                    name: "network".to_string(),
                    message: "Network alert — notifying netops".to_string(),
                    level: MarkerLevel::Warn,
                },
                CategoryRoute {
                    name: "critical".to_string(),
                    message: "Paging the on-call engineer".to_string(),
                    level: MarkerLevel::Error,
                },
            ];
        })
        .start()
        .await
        .unwrap();

    let response = app.post("/webhook/network", HIGH_CPU_ALERT).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert!(app.sink.contains("Network alert — notifying netops"));

    let response = app.post("/webhook/critical", HIGH_CPU_ALERT).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert!(app.sink.contains("Paging the on-call engineer"));
    assert!(!app.sink.contains("CRITICAL ALERT — immediate attention required"));

    app.shutdown(Duration::from_secs(5)).await.unwrap();
}
