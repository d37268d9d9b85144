use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use device_link::DeviceCommand;
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct CommandBody {
    command: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AckBody {
    ack: Option<bool>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/listen", get(listen).post(listen_text))
        .route("/slots", get(slots))
        .route("/command", get(poll_command))
        .route("/set_command", post(set_command))
        .route("/ack", post(ack))
        .route("/metrics", get(metrics))
        .with_state(state)
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "result": "fail", "message": message })),
    )
        .into_response()
}

/// Non-blank `command` field of a JSON body.
fn command_of(body: Result<Json<CommandBody>, JsonRejection>) -> Option<String> {
    let Json(body) = body.ok()?;
    body.command
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

async fn status(State(state): State<AppState>) -> Json<serde_json::Value> {
    let dispatcher = state.dispatcher();
    Json(json!({
        "service": "cardslot-daemon",
        "transport": dispatcher.transport_name(),
        "occupied_slots": dispatcher.slots().await.len(),
    }))
}

async fn listen(State(state): State<AppState>) -> Response {
    Json(state.session.listen_once().await).into_response()
}

async fn listen_text(
    State(state): State<AppState>,
    body: Result<Json<CommandBody>, JsonRejection>,
) -> Response {
    let Some(text) = command_of(body) else {
        return bad_request("명령어가 없습니다.");
    };
    Json(state.session.submit_text(&text).await).into_response()
}

async fn slots(State(state): State<AppState>) -> Json<BTreeMap<String, u32>> {
    Json(state.dispatcher().slots().await)
}

async fn poll_command(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "command": state.mailbox.poll() }))
}

async fn set_command(
    State(state): State<AppState>,
    body: Result<Json<CommandBody>, JsonRejection>,
) -> Response {
    let Some(command) = command_of(body) else {
        return bad_request("command is required");
    };
    if let Some(prev) = state.mailbox.set(DeviceCommand::new(command.clone())) {
        warn!(%prev, "pending command replaced before delivery");
    }
    info!(%command, "command queued for polling");
    Json(json!({ "status": "ok", "command": command })).into_response()
}

async fn ack(State(state): State<AppState>, body: Result<Json<AckBody>, JsonRejection>) -> Response {
    match body {
        Ok(Json(AckBody { ack: Some(true) })) => {
            state.mailbox.ack();
            info!("device acknowledged command");
            Json(json!({ "status": "ack received" })).into_response()
        }
        _ => bad_request("ack must be true"),
    }
}

async fn metrics(State(state): State<AppState>) -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.encode_text(),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DaemonConfig, TransportConfig};
    use crate::state;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn app(phrases: &[&str]) -> (Router, AppState) {
        let mut cfg = DaemonConfig {
            pacing_ms: 0,
            transport: TransportConfig::Mailbox,
            ..DaemonConfig::default()
        };
        cfg.voice.phrases = phrases.iter().map(|p| p.to_string()).collect();
        let state = state::build(&cfg).await.unwrap();
        (router(state.clone()), state)
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(b) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn text_command_updates_slots() {
        let (app, _) = app(&[]).await;
        let (status, body) = call(&app, "POST", "/listen", Some(r#"{"command":"저장 롯데카드 3"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], "success");
        assert_eq!(body["message"], "롯데카드 슬롯을 3번 위치에 저장했습니다.");

        let (_, slots) = call(&app, "GET", "/slots", None).await;
        assert_eq!(slots, json!({ "롯데카드": 3 }));
    }

    #[tokio::test]
    async fn missing_command_is_rejected() {
        let (app, _) = app(&[]).await;
        let (status, _) = call(&app, "POST", "/listen", Some("{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = call(&app, "POST", "/set_command", Some(r#"{"command":"  "}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = call(&app, "POST", "/ack", Some(r#"{"ack":false}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = call(&app, "POST", "/ack", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn voice_listen_uses_the_recognizer() {
        let (app, _) = app(&["저장 삼성 2"]).await;
        let (_, body) = call(&app, "GET", "/listen", None).await;
        assert_eq!(body["result"], "success");
        assert_eq!(body["intent"], "save");

        // Script exhausted: recognition failure is reported, not an HTTP error.
        let (status, body) = call(&app, "GET", "/listen", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], "fail");
        assert_eq!(body["error"], "recognition_failure");
    }

    #[tokio::test]
    async fn mailbox_delivers_dispatched_commands_once() {
        let (app, state) = app(&[]).await;
        call(&app, "POST", "/listen", Some(r#"{"command":"저장 민증 2"}"#)).await;
        call(&app, "POST", "/listen", Some(r#"{"command":"이동 민증"}"#)).await;

        let (_, body) = call(&app, "GET", "/command", None).await;
        assert_eq!(body["command"], "M2000;");
        let (_, body) = call(&app, "GET", "/command", None).await;
        assert_eq!(body["command"], "none");

        let (status, _) = call(&app, "POST", "/set_command", Some(r#"{"command":"R1000;"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!state.mailbox.is_acknowledged());
        let (status, _) = call(&app, "POST", "/ack", Some(r#"{"ack":true}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(state.mailbox.is_acknowledged());
        let (_, body) = call(&app, "GET", "/command", None).await;
        assert_eq!(body["command"], "none");
    }

    #[tokio::test]
    async fn metrics_are_exposed_as_text() {
        let (app, _) = app(&[]).await;
        call(&app, "POST", "/listen", Some(r#"{"command":"삭제 롯데카드"}"#)).await;
        let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("cardslot_failures_total{kind=\"slot_not_found\"} 1"));
    }
}
