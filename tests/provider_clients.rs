//! Provider clients against local fake APIs.

use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

use quiz_generator::clients::{
    ClaudeClient, ClaudeConfig, GeminiClient, GeminiConfig, OpenAIClient, OpenAIConfig,
};
use quiz_generator::core::{LowLevelClient, MediaClient};
use quiz_generator::error::{AIError, ClaudeError, GeminiError, OpenAIError};

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn failing(status: StatusCode) -> Router {
    let handler = move || async move { (status, "boom") };
    Router::new()
        .route("/v1/messages", post(handler.clone()))
        .route("/v1/chat/completions", post(handler.clone()))
        .route("/v1beta/models/:action", post(handler))
}

#[tokio::test]
async fn claude_joins_text_blocks_and_sends_system() {
    let app = Router::new().route(
        "/v1/messages",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            let key = headers["x-api-key"].to_str().unwrap_or_default().to_string();
            let version = headers["anthropic-version"].to_str().unwrap_or_default().to_string();
            Json(json!({
                "content": [
                    { "type": "text", "text": format!("{key}/{version}/") },
                    { "type": "tool_use", "id": "t1", "name": "noop", "input": {} },
                    { "type": "text", "text": body["system"].as_str().unwrap_or("none") }
                ]
            }))
        }),
    );
    let base = spawn(app).await;
    let client = ClaudeClient::new(ClaudeConfig::new("k-claude").with_base_url(base));

    let reply = client.ask_with_system("be terse", "hi".into()).await.unwrap();
    assert_eq!(reply, "k-claude/2023-06-01/be terse");

    let reply = client.ask_raw("hi".into()).await.unwrap();
    assert_eq!(reply, "k-claude/2023-06-01/none");
}

#[tokio::test]
async fn gemini_reads_first_candidate() {
    let app = Router::new().route(
        "/v1beta/models/:action",
        post(|Path(action): Path<String>, Json(body): Json<Value>| async move {
            let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or_default().to_string();
            let system = body["systemInstruction"]["parts"][0]["text"].as_str().unwrap_or("none").to_string();
            Json(json!({
                "candidates": [
                    { "content": { "role": "model", "parts": [{ "text": format!("{action}|") }, { "text": format!("{system}|{prompt}") }] } },
                    { "content": { "role": "model", "parts": [{ "text": "ignored" }] } }
                ]
            }))
        }),
    );
    let base = spawn(app).await;
    let client = GeminiClient::new(GeminiConfig::new("k-gemini").with_base_url(base));

    let reply = client.ask_with_system("sys", "question".into()).await.unwrap();
    assert_eq!(reply, "gemini-2.0-flash:generateContent|sys|question");
}

#[tokio::test]
async fn openai_chat_and_media() {
    let app = Router::new()
        .route(
            "/v1/chat/completions",
            post(|Json(body): Json<Value>| async move {
                let roles: Vec<String> = body["messages"]
                    .as_array()
                    .map(|m| m.iter().filter_map(|m| m["role"].as_str().map(str::to_string)).collect())
                    .unwrap_or_default();
                Json(json!({ "choices": [{ "message": { "role": "assistant", "content": roles.join(",") } }] }))
            }),
        )
        .route(
            "/v1/audio/speech",
            post(|Json(body): Json<Value>| async move {
                format!("{}:{}", body["model"].as_str().unwrap_or_default(), body["voice"].as_str().unwrap_or_default())
            }),
        )
        .route(
            "/v1/images/generations",
            post(|| async { Json(json!({ "data": [{ "url": "https://img.test/1.png" }] })) }),
        );
    let base = spawn(app).await;
    let client = OpenAIClient::new(OpenAIConfig::new("k-openai").with_base_url(base));

    assert_eq!(client.ask_with_system("sys", "q".into()).await.unwrap(), "system,user");
    assert_eq!(client.ask_raw("q".into()).await.unwrap(), "user");

    let audio = client.speech("hello", "nova").await.unwrap();
    assert_eq!(&audio[..], b"tts-1:nova");
    assert_eq!(client.generate_image("a wave").await.unwrap(), "https://img.test/1.png");
}

#[tokio::test]
async fn status_codes_map_to_provider_errors() {
    let base = spawn(failing(StatusCode::TOO_MANY_REQUESTS)).await;
    let err = ClaudeClient::new(ClaudeConfig::new("k").with_base_url(base.clone()))
        .ask_raw("hi".into())
        .await
        .unwrap_err();
    assert!(matches!(err, AIError::Claude(ClaudeError::RateLimit)));
    assert!(err.is_rate_limit());

    let err = GeminiClient::new(GeminiConfig::new("k").with_base_url(base))
        .ask_raw("hi".into())
        .await
        .unwrap_err();
    assert!(matches!(err, AIError::Gemini(GeminiError::RateLimit)));

    let base = spawn(failing(StatusCode::UNAUTHORIZED)).await;
    let err = OpenAIClient::new(OpenAIConfig::new("k").with_base_url(base))
        .ask_raw("hi".into())
        .await
        .unwrap_err();
    assert!(err.is_authentication());

    let base = spawn(failing(StatusCode::INTERNAL_SERVER_ERROR)).await;
    let err = OpenAIClient::new(OpenAIConfig::new("k").with_base_url(base))
        .ask_raw("hi".into())
        .await
        .unwrap_err();
    match err {
        AIError::OpenAI(OpenAIError::Api(message)) => assert!(message.contains("boom")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_provider_is_http_error() {
    // bind then drop so nothing listens on the port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = ClaudeClient::new(ClaudeConfig::new("k").with_base_url(format!("http://{addr}")))
        .ask_raw("hi".into())
        .await
        .unwrap_err();
    assert!(matches!(err, AIError::Claude(ClaudeError::Http(_))));
}
