#![cfg(feature = "webhook")]

use std::sync::Arc;

use mockito::{Matcher, Server};
use tokio::time::{timeout, Duration};
use tracing_mattermost::sink::WebhookSink;
use tracing_mattermost::webhook::WebhookClient;
use tracing_mattermost::{
    DeliveryOutcome, HookSettings, Level, LogEntry, MattermostHook, MattermostLayer,
    PipelineConfig,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

#[tokio::test]
async fn posts_json_payload_and_returns_body() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/hooks/abc")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Exact(r#"{"text":"hi"}"#.to_string()))
        .with_status(200)
        .with_body("ok")
        .create_async()
        .await;

    let client = WebhookClient::new().unwrap();
    let body = client
        .send(&format!("{}/hooks/abc", server.url()), br#"{"text":"hi"}"#.to_vec())
        .await
        .unwrap();

    assert_eq!(body, "ok");
    mock.assert_async().await;
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/hooks/abc")
        .with_status(400)
        .with_body("Unable to parse incoming data")
        .create_async()
        .await;

    let client = WebhookClient::new().unwrap();
    let err = client
        .send(&format!("{}/hooks/abc", server.url()), b"{".to_vec())
        .await
        .unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("400"), "{}", msg);
    assert!(msg.contains("Unable to parse incoming data"), "{}", msg);
}

#[tokio::test]
async fn hook_delivers_through_http_client() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/hooks/abc")
        .match_body(Matcher::Exact(
            r#"{"channel":"log_alpha","username":"app-name","text":":exclamation: k1=v1 k2=v2 msg=Test error"}"#
                .to_string(),
        ))
        .with_status(200)
        .with_body("ok")
        .create_async()
        .await;

    let hook = MattermostHook::new(
        HookSettings::new(format!("{}/hooks/abc", server.url()))
            .channel("log_alpha")
            .username("app-name"),
        Arc::new(WebhookClient::new().unwrap()),
        PipelineConfig::default(),
    )
    .unwrap();
    let mut outcomes = hook.subscribe();

    hook.fire(
        &LogEntry::new(Level::Error, "Test error")
            .with_field("k1", "v1")
            .with_field("k2", "v2"),
    )
    .unwrap();

    let outcome = timeout(Duration::from_secs(5), outcomes.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(outcome, DeliveryOutcome::Delivered("ok".to_string()));

    hook.stop().await;
    mock.assert_async().await;
}

#[tokio::test]
async fn unreachable_endpoint_is_reported_as_failure() {
    let hook = MattermostHook::new(
        HookSettings::new("http://127.0.0.1:1/hooks/none").username("app-name"),
        Arc::new(WebhookClient::new().unwrap()),
        PipelineConfig::default(),
    )
    .unwrap();
    let mut outcomes = hook.subscribe();

    hook.fire(&LogEntry::new(Level::Panic, "nobody listens")).unwrap();

    let outcome = timeout(Duration::from_secs(10), outcomes.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(outcome, DeliveryOutcome::Failed(_)));

    hook.stop().await;
}

#[tokio::test]
async fn transport_logs_are_not_posted_back_at_trace_level() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/hooks/abc")
        .match_body(Matcher::Exact(
            r#"{"username":"svc","text":":exclamation: msg=checkout failed"}"#.to_string(),
        ))
        .with_status(200)
        .with_body("ok")
        .expect(1)
        .create_async()
        .await;
    let chatter = server
        .mock("POST", "/hooks/abc")
        .match_body(Matcher::Regex(":mag_right:|:black_circle:|:white_circle:".to_string()))
        .expect(0)
        .create_async()
        .await;

    let hook = MattermostHook::new(
        HookSettings::new(format!("{}/hooks/abc", server.url()))
            .username("svc")
            .min_level(Level::Trace),
        Arc::new(WebhookClient::new().unwrap()),
        PipelineConfig::default(),
    )
    .unwrap();

    let subscriber = Registry::default().with(MattermostLayer::new(hook.clone()));
    let _guard = tracing::subscriber::set_default(subscriber);

    tracing::error!(target: "checkout", "checkout failed");
    timeout(Duration::from_secs(10), hook.stop()).await.unwrap();

    mock.assert_async().await;
    chatter.assert_async().await;
}
