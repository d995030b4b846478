//! Integration tests for the chat REST API.
//!
//! Each test spins up an Axum server on a random port and drives it with
//! reqwest.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::net::TcpListener;

use bmi_assist::chart::InMemoryChartStore;
use bmi_assist::chat::{ChatRouteState, SessionStore, chat_routes};
use bmi_assist::intake::{FixedChooser, IntakeMachine, Sex};
use bmi_assist::percentile::{PercentileTable, StaticTableProvider, Thresholds};

fn table() -> PercentileTable {
    let mut table = PercentileTable::default();
    for sex in [Sex::Male, Sex::Female] {
        for age in 1..=18u8 {
            let base = 13.0 + f64::from(age) * 0.3;
            table.insert(
                sex,
                age,
                Thresholds {
                    p5: base,
                    p85: base + 3.0,
                    p95: base + 5.0,
                },
            );
        }
    }
    table
}

/// Start an Axum server on a random port, return its base URL.
async fn start_server() -> String {
    let charts = Arc::new(InMemoryChartStore::new(16));
    let machine = IntakeMachine::new(
        Arc::new(StaticTableProvider::new(table())),
        charts.clone(),
    )
    .with_chooser(Arc::new(FixedChooser(0)));

    let app = chat_routes(ChatRouteState {
        machine: Arc::new(machine),
        sessions: SessionStore::new(),
        charts,
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    format!("http://127.0.0.1:{port}")
}

async fn send(client: &reqwest::Client, base: &str, session: &str, text: &str) -> Value {
    client
        .post(format!("{base}/api/message"))
        .json(&json!({"session_id": session, "text": text}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn health_endpoint() {
    let base = start_server().await;
    let body: Value = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn welcome_returns_greeting() {
    let base = start_server().await;
    let body: Value = reqwest::get(format!("{base}/api/welcome?session_id=s1"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(body["response"].as_str().unwrap().contains("¡Hola!"));
    assert_eq!(body["show_chart"], false);
    assert!(body["chart_id"].is_null());
}

#[tokio::test]
async fn full_conversation_and_chart_lookup() {
    let base = start_server().await;
    let client = reqwest::Client::new();

    for text in ["Ana", "6", "niña", "18"] {
        let body = send(&client, &base, "s1", text).await;
        assert_eq!(body["show_chart"], false);
    }
    let body = send(&client, &base, "s1", "1,10 m").await;
    assert_eq!(body["show_chart"], true);
    assert!(body["response"].as_str().unwrap().contains("14.88"));
    let chart_id = body["chart_id"].as_str().unwrap().to_string();

    let resp = client
        .get(format!("{base}/api/charts/{chart_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let chart: Value = resp.json().await.unwrap();
    assert_eq!(chart["id"], chart_id.as_str());
    assert_eq!(chart["sex"], "female");
    assert_eq!(chart["point"]["age"], 6);
    assert_eq!(chart["curves"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn unknown_chart_is_404() {
    let base = start_server().await;
    let resp = reqwest::get(format!("{base}/api/charts/does-not-exist"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Gráfico no disponible.");
}

#[tokio::test]
async fn sessions_do_not_leak_into_each_other() {
    let base = start_server().await;
    let client = reqwest::Client::new();

    send(&client, &base, "a", "Ana").await;
    let body = send(&client, &base, "b", "7").await;
    // Session b is still waiting for a name, so "7" becomes the name
    assert!(body["response"].as_str().unwrap().contains("7"));

    let body = send(&client, &base, "a", "niña").await;
    assert!(body["response"].as_str().unwrap().contains("Edad no válida"));
}

#[tokio::test]
async fn reset_endpoint_restarts_conversation() {
    let base = start_server().await;
    let client = reqwest::Client::new();

    send(&client, &base, "r", "Ana").await;
    send(&client, &base, "r", "6").await;

    let resp = client
        .post(format!("{base}/api/reset"))
        .json(&json!({"session_id": "r"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Back at the name stage: "Luis" is taken as the name
    let body = send(&client, &base, "r", "Luis").await;
    assert!(body["response"].as_str().unwrap().contains("Luis"));
    assert!(body["response"].as_str().unwrap().contains("edad"));
}
