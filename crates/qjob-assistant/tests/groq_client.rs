//! GroqClient against an in-process chat-completions endpoint.

use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use qjob_assistant::{
    Assistant, AssistantError, AssistantSettings, ChatBackend, GroqClient, QuickAction,
};
use serde_json::{Value, json};

const BELL_REPLY: &str = "Here is a Bell state:\n\nOPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[2];\ncreg c[2];\nh q[0];\ncx q[0],q[1];\nmeasure q -> c;\n\nIt entangles both qubits.";

async fn completions(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if auth != "Bearer good-key" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"message": "Invalid API Key", "type": "invalid_request_error"}})),
        );
    }

    let user = body["messages"][1]["content"].as_str().unwrap_or_default();
    let content = if user.contains("Bell") {
        BELL_REPLY.to_string()
    } else if user == "empty" {
        String::new()
    } else {
        format!("model={} echo={user}", body["model"].as_str().unwrap_or_default())
    };

    (
        StatusCode::OK,
        Json(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}]
        })),
    )
}

async fn spawn_server() -> String {
    let app = Router::new().route("/openai/v1/chat/completions", post(completions));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/openai/v1/chat/completions")
}

fn assistant(endpoint: String) -> Assistant {
    Assistant::groq(AssistantSettings {
        endpoint,
        ..AssistantSettings::default()
    })
}

#[tokio::test]
async fn test_ask_round_trip() {
    let assistant = assistant(spawn_server().await);
    let reply = assistant.ask("hello", "good-key").await.unwrap();
    assert_eq!(reply, "model=llama-3.1-8b-instant echo=hello");
}

#[tokio::test]
async fn test_quick_action_reply_yields_circuit() {
    let assistant = assistant(spawn_server().await);
    let reply = assistant
        .quick_action(QuickAction::BellState, "good-key")
        .await
        .unwrap();
    let qasm = assistant.extract_circuit(&reply).unwrap();
    assert!(qasm.starts_with("OPENQASM 2.0;"));
    assert!(qasm.ends_with("measure q -> c;"));
    assert!(!qasm.contains("entangles"));
}

#[tokio::test]
async fn test_bad_key_is_tagged_api_error() {
    let assistant = assistant(spawn_server().await);
    let err = assistant.ask("hello", "bad-key").await.unwrap_err();
    assert!(
        matches!(&err, AssistantError::Api { status: 401, message } if message == "Invalid API Key"),
        "{err}"
    );
}

#[tokio::test]
async fn test_empty_content_is_an_error() {
    let client = GroqClient::with_endpoint(spawn_server().await).unwrap();
    let request = assistant(client.endpoint().to_string()).request("empty");
    assert!(matches!(
        client.complete(&request, "good-key").await,
        Err(AssistantError::EmptyResponse)
    ));
}

#[tokio::test]
async fn test_unreachable_service_is_http_error() {
    let assistant = assistant("http://127.0.0.1:9/v1/chat/completions".to_string());
    assert!(matches!(
        assistant.ask("hello", "good-key").await,
        Err(AssistantError::Http(_))
    ));
}
