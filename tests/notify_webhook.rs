// tests/notify_webhook.rs
// Delivers through each channel to a local axum server standing in for the webhook.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Form, Json, Router,
};
use index_watch::notify::discord::DiscordNotifier;
use index_watch::notify::line::LineNotifier;
use index_watch::notify::slack::SlackNotifier;
use index_watch::{Notification, Notifier, NotifierMux, Priority};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct Captured {
    json: Arc<Mutex<Vec<serde_json::Value>>>,
    forms: Arc<Mutex<Vec<(Option<String>, HashMap<String, String>)>>>,
}

async fn take_json(State(c): State<Captured>, Json(body): Json<serde_json::Value>) -> StatusCode {
    c.json.lock().unwrap().push(body);
    StatusCode::NO_CONTENT
}

async fn take_form(
    State(c): State<Captured>,
    headers: HeaderMap,
    Form(body): Form<HashMap<String, String>>,
) -> StatusCode {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    c.forms.lock().unwrap().push((auth, body));
    StatusCode::OK
}

async fn spawn_server() -> (String, Captured) {
    let captured = Captured::default();
    let app = Router::new()
        .route("/discord", post(take_json))
        .route("/slack", post(take_json))
        .route("/line", post(take_form))
        .route("/broken", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .with_state(captured.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), captured)
}

#[tokio::test]
async fn discord_posts_content_with_priority_marker() {
    let (base, cap) = spawn_server().await;
    let d = DiscordNotifier::new(format!("{base}/discord"), reqwest::Client::new()).with_timeout(2);

    d.send(&Notification::new("S&P 500 changed", Priority::High))
        .await
        .expect("discord delivery");

    let got = cap.json.lock().unwrap().clone();
    assert_eq!(got.len(), 1);
    assert_eq!(got[0]["content"], "🚨 S&P 500 changed");
}

#[tokio::test]
async fn slack_posts_text() {
    let (base, cap) = spawn_server().await;
    let s = SlackNotifier::new(format!("{base}/slack"), reqwest::Client::new());

    s.send(&Notification::new("hello", Priority::Normal)).await.unwrap();
    assert_eq!(cap.json.lock().unwrap()[0]["text"], "hello");
}

#[tokio::test]
async fn line_posts_form_with_bearer_token() {
    let (base, cap) = spawn_server().await;
    let l = LineNotifier::new(format!("{base}/line"), "tok123", reqwest::Client::new());

    l.send(&Notification::new("quiet one", Priority::Normal)).await.unwrap();
    l.send(&Notification::new("loud one", Priority::High)).await.unwrap();

    let forms = cap.forms.lock().unwrap().clone();
    assert_eq!(forms.len(), 2);
    assert_eq!(forms[0].0.as_deref(), Some("Bearer tok123"));
    assert_eq!(forms[0].1["message"], "\nquiet one");
    assert_eq!(forms[0].1.get("notificationDisabled").map(String::as_str), Some("true"));
    assert!(!forms[1].1.contains_key("notificationDisabled"));
}

#[tokio::test]
async fn http_error_is_reported_not_raised_by_mux() {
    let (base, cap) = spawn_server().await;
    let client = reqwest::Client::new();
    let broken = DiscordNotifier::new(format!("{base}/broken"), client.clone());
    assert!(broken
        .send(&Notification::new("x", Priority::Normal))
        .await
        .is_err());

    let channels: Vec<Box<dyn Notifier>> = vec![
        Box::new(broken),
        Box::new(SlackNotifier::new(format!("{base}/slack"), client.clone())),
    ];
    let mux = NotifierMux::new(channels);
    assert!(mux.notify(&Notification::new("x", Priority::Normal)).await);
    assert_eq!(cap.json.lock().unwrap().len(), 1);

    let only_broken = NotifierMux::new(vec![Box::new(DiscordNotifier::new(
        format!("{base}/broken"),
        client,
    ))]);
    assert!(!only_broken.notify(&Notification::new("x", Priority::Normal)).await);
}
