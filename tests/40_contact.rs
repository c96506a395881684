mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;

use common::{data, TestApp};
use site_cms_api::mailer::{MailError, MailProvider, Mailer, OutboundEmail, SEND_FAILED_MESSAGE, SENT_MESSAGE};

#[derive(Default)]
struct CountingProvider {
    sent: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl MailProvider for CountingProvider {
    async fn send(&self, _email: &OutboundEmail) -> Result<(), MailError> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(MailError::Rejected { status: 500, body: "provider down".to_string() });
        }
        Ok(())
    }
}

fn mailer(provider: Arc<CountingProvider>) -> Mailer {
    Mailer::new(Some(provider as Arc<dyn MailProvider>), "site@test", "inbox@test", Duration::from_millis(20))
}

#[tokio::test]
async fn short_messages_never_reach_the_provider() -> Result<()> {
    let provider = Arc::new(CountingProvider::default());
    let app = TestApp::spawn_with_mailer(mailer(provider.clone())).await?;

    let (status, body) = app
        .post("/api/contact", None, json!({ "name": "A", "email": "x@x.com", "message": "short" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["message"].is_string());
    assert_eq!(provider.sent.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn unconfigured_mail_is_a_labelled_simulation() -> Result<()> {
    let app = TestApp::spawn().await?;

    let started = Instant::now();
    let (status, body) = app
        .post(
            "/api/contact",
            None,
            json!({
                "name": "Jane Doe",
                "email": "jane@co.com",
                "message": "This is a sufficiently long message."
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert!(started.elapsed() >= Duration::from_millis(20));
    assert_eq!(data(&body)["simulated"], true);
    assert_eq!(data(&body)["outcome"], "simulated");
    assert!(data(&body)["message"].as_str().unwrap_or_default().contains("[SIMULATED]"));
    Ok(())
}

#[tokio::test]
async fn configured_mail_is_sent_once() -> Result<()> {
    let provider = Arc::new(CountingProvider::default());
    let app = TestApp::spawn_with_mailer(mailer(provider.clone())).await?;

    let (status, body) = app
        .post(
            "/api/contact",
            None,
            json!({
                "name": "Jane Doe",
                "email": "jane@co.com",
                "company": "Co",
                "message": "We would like a quote for a site survey."
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(data(&body)["simulated"], false);
    assert_eq!(data(&body)["message"], SENT_MESSAGE);
    assert_eq!(provider.sent.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn provider_failures_surface_a_generic_message() -> Result<()> {
    let provider = Arc::new(CountingProvider { fail: true, ..Default::default() });
    let app = TestApp::spawn_with_mailer(mailer(provider.clone())).await?;

    let (status, body) = app
        .post(
            "/api/contact",
            None,
            json!({
                "name": "Jane Doe",
                "email": "jane@co.com",
                "message": "This is a sufficiently long message."
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["message"], SEND_FAILED_MESSAGE);
    assert!(!body.to_string().contains("provider down"));
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_rejected() -> Result<()> {
    let app = TestApp::spawn().await?;

    let response = app
        .client
        .post(app.url("/api/contact"))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{ not json")
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
