//! End-to-end dispatch tests: the gateway against mock backend servers.
//!
//! Every backend endpoint is pointed at a mockito server, so no test ever
//! touches a real vendor API; call-count expectations on the mocks assert
//! the short-circuit and no-fallback properties directly.

use ai_gateway::{
    BackendError, BackendKind, CallerMode, DispatchMode, Gateway, GatewayBuilder, Message,
};
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::json;

/// Tests must not inherit real credentials from the host environment.
fn scrub_env() {
    for var in ["GEMINI_API_KEY", "OPENAI_API_KEY", "ANTHROPIC_API_KEY"] {
        std::env::remove_var(var);
    }
}

/// Builder with every backend pointed at the mock server.
fn sandboxed(server: &ServerGuard) -> GatewayBuilder {
    scrub_env();
    Gateway::builder()
        .endpoint_override(BackendKind::Gemini, server.url())
        .endpoint_override(BackendKind::OpenAi, server.url())
        .endpoint_override(BackendKind::Anthropic, server.url())
        .endpoint_override(BackendKind::Ollama, server.url())
}

/// Un-created mock for the Gemini completion route; chain expectations
/// before `create_async`.
fn mock_gemini(server: &mut ServerGuard, status: usize, body: &str) -> Mock {
    server
        .mock("POST", "/v1beta/models/gemini-2.0-flash:generateContent")
        .match_query(Matcher::Any)
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
}

fn mock_openai(server: &mut ServerGuard, status: usize, body: &str) -> Mock {
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
}

fn mock_ollama_tags(server: &mut ServerGuard) -> Mock {
    server
        .mock("GET", "/api/tags")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "models": [{ "name": "llama3:8b" }] }).to_string())
}

fn gemini_reply(text: &str) -> String {
    json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] }).to_string()
}

fn openai_reply(text: &str) -> String {
    json!({ "choices": [{ "message": { "content": text } }] }).to_string()
}

#[tokio::test]
async fn test_offline_floor_when_nothing_is_configured() {
    let server = mockito::Server::new_async().await;
    let gateway = sandboxed(&server).build().unwrap();

    let reply = gateway.chat("explain kubernetes", &[], None).await;
    assert!(reply.success);
    assert_eq!(reply.origin, BackendKind::Offline);
    assert!(!reply.content.is_empty());
    // Nothing was attempted, so nothing is annotated.
    assert!(!reply.content.contains("remote backends failed"));
}

#[tokio::test]
async fn test_automatic_dispatch_short_circuits_on_first_success() {
    let mut server = mockito::Server::new_async().await;
    let gemini = mock_gemini(&mut server, 200, &gemini_reply("from gemini"))
        .create_async()
        .await;
    let openai = mock_openai(&mut server, 200, &openai_reply("from openai"))
        .expect(0)
        .create_async()
        .await;

    let gateway = sandboxed(&server)
        .credential(BackendKind::Gemini, "g-key")
        .credential(BackendKind::OpenAi, "sk-key")
        .build()
        .unwrap();

    let reply = gateway.chat("hello", &[], None).await;
    assert!(reply.success);
    assert_eq!(reply.origin, BackendKind::Gemini);
    assert_eq!(reply.content, "from gemini");

    gemini.assert_async().await;
    openai.assert_async().await;
}

#[tokio::test]
async fn test_automatic_dispatch_falls_through_to_next_backend() {
    let mut server = mockito::Server::new_async().await;
    mock_gemini(&mut server, 500, "upstream exploded")
        .create_async()
        .await;
    mock_openai(&mut server, 200, &openai_reply("from openai"))
        .create_async()
        .await;

    let gateway = sandboxed(&server)
        .credential(BackendKind::Gemini, "g-key")
        .credential(BackendKind::OpenAi, "sk-key")
        .build()
        .unwrap();

    let reply = gateway.chat("hello", &[], None).await;
    assert!(reply.success);
    assert_eq!(reply.origin, BackendKind::OpenAi);
    assert_eq!(reply.content, "from openai");
}

#[tokio::test]
async fn test_exhausted_backends_fall_back_to_annotated_offline_answer() {
    let mut server = mockito::Server::new_async().await;
    mock_gemini(&mut server, 429, r#"{"error":{"message":"quota"}}"#)
        .create_async()
        .await;

    let gateway = sandboxed(&server)
        .credential(BackendKind::Gemini, "g-key")
        .build()
        .unwrap();

    let reply = gateway.chat("explain terraform", &[], None).await;
    assert!(reply.success);
    assert_eq!(reply.origin, BackendKind::Offline);
    assert!(reply.content.contains("(local fallback)"));
    assert!(reply.content.contains("gemini"));
    assert!(reply.content.contains("rate limited"));
}

#[tokio::test]
async fn test_rate_limit_classifies_distinctly_from_generic_http_errors() {
    let mut server = mockito::Server::new_async().await;
    mock_openai(&mut server, 429, "slow down").create_async().await;

    let gateway = sandboxed(&server)
        .credential(BackendKind::OpenAi, "sk-key")
        .build()
        .unwrap();
    assert!(gateway.switch("openai").await);

    let limited = gateway.chat("hello", &[], None).await;
    assert!(!limited.success);
    assert_eq!(limited.origin, BackendKind::OpenAi);
    assert!(matches!(
        limited.error,
        Some(BackendError::RateLimited { .. })
    ));
}

#[tokio::test]
async fn test_malformed_success_payload_is_classified() {
    let mut server = mockito::Server::new_async().await;
    mock_openai(&mut server, 200, r#"{"object":"chat.completion"}"#)
        .create_async()
        .await;

    let gateway = sandboxed(&server)
        .credential(BackendKind::OpenAi, "sk-key")
        .build()
        .unwrap();
    assert!(gateway.switch("openai").await);

    let reply = gateway.chat("hello", &[], None).await;
    assert!(!reply.success);
    assert_eq!(reply.error, Some(BackendError::MalformedResponse));
}

#[tokio::test]
async fn test_pinned_failure_is_returned_verbatim_with_no_fallback() {
    let mut server = mockito::Server::new_async().await;
    mock_openai(&mut server, 503, "overloaded").create_async().await;
    let gemini = mock_gemini(&mut server, 200, &gemini_reply("never me"))
        .expect(0)
        .create_async()
        .await;

    let gateway = sandboxed(&server)
        .credential(BackendKind::Gemini, "g-key")
        .credential(BackendKind::OpenAi, "sk-key")
        .build()
        .unwrap();
    assert!(gateway.switch("openai").await);

    let reply = gateway.chat("hello", &[], None).await;
    assert!(!reply.success);
    assert_eq!(reply.origin, BackendKind::OpenAi);
    assert_eq!(
        reply.error,
        Some(BackendError::Http {
            status: 503,
            detail: "overloaded".into()
        })
    );
    // Pinned mode never substitutes another backend.
    assert!(!reply.content.contains("local fallback"));
    gemini.assert_async().await;
}

#[tokio::test]
async fn test_pinned_backend_going_dark_surfaces_pinned_unavailable() {
    let mut server = mockito::Server::new_async().await;
    let tags = mock_ollama_tags(&mut server).create_async().await;
    let gemini = mock_gemini(&mut server, 200, &gemini_reply("never me"))
        .expect(0)
        .create_async()
        .await;

    let gateway = sandboxed(&server)
        .credential(BackendKind::Gemini, "g-key")
        .build()
        .unwrap();
    assert!(gateway.switch("ollama").await);

    // The daemon disappears after pinning: availability changed at runtime.
    tags.remove_async().await;

    let reply = gateway.chat("hello", &[], None).await;
    assert!(!reply.success);
    assert_eq!(reply.origin, BackendKind::Ollama);
    assert_eq!(
        reply.error,
        Some(BackendError::PinnedUnavailable(BackendKind::Ollama))
    );
    gemini.assert_async().await;
}

#[tokio::test]
async fn test_local_poll_serves_without_fallback_annotation() {
    let mut server = mockito::Server::new_async().await;
    mock_ollama_tags(&mut server).create_async().await;
    server
        .mock("POST", "/api/chat")
        .match_body(Matcher::PartialJson(json!({ "model": "llama3:8b" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "message": { "content": "local says hi" } }).to_string())
        .create_async()
        .await;

    let gateway = sandboxed(&server).build().unwrap();

    let reply = gateway.chat("explain X", &[], None).await;
    assert!(reply.success);
    assert_eq!(reply.origin, BackendKind::Ollama);
    assert_eq!(reply.content, "local says hi");
    assert!(!reply.content.contains("local fallback"));
}

#[tokio::test]
async fn test_probe_tolerates_malformed_tags_payload() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/tags")
        .with_status(200)
        .with_body("not json at all")
        .create_async()
        .await;

    let gateway = sandboxed(&server).build().unwrap();
    assert_eq!(gateway.status().await["ollama"], false);
}

#[tokio::test]
async fn test_daemon_with_no_models_pulled_is_unavailable() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/tags")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "models": [] }).to_string())
        .create_async()
        .await;

    let gateway = sandboxed(&server).build().unwrap();
    assert_eq!(gateway.status().await["ollama"], false);
}

#[tokio::test]
async fn test_configure_reports_available_and_pins() {
    let server = mockito::Server::new_async().await;
    let gateway = sandboxed(&server).build().unwrap();

    assert!(gateway.configure("openai", "sk-key").await);
    assert_eq!(gateway.status().await["openai"], true);
    assert_eq!(gateway.mode(), DispatchMode::Pinned(BackendKind::OpenAi));
}

#[tokio::test]
async fn test_configure_pin_policy_can_be_disabled() {
    let server = mockito::Server::new_async().await;
    let gateway = sandboxed(&server).pin_on_configure(false).build().unwrap();

    assert!(gateway.configure("openai", "sk-key").await);
    assert_eq!(gateway.mode(), DispatchMode::Automatic);
}

#[tokio::test]
async fn test_switch_to_unconfigured_backend_fails_and_mode_is_unchanged() {
    let server = mockito::Server::new_async().await;
    let gateway = sandboxed(&server).build().unwrap();

    assert!(!gateway.switch("openai").await);
    assert_eq!(gateway.mode(), DispatchMode::Automatic);
}

#[tokio::test]
async fn test_status_is_idempotent_between_mutations() {
    let server = mockito::Server::new_async().await;
    let gateway = sandboxed(&server)
        .credential(BackendKind::Anthropic, "sk-ant")
        .build()
        .unwrap();

    let first = gateway.status().await;
    let second = gateway.status().await;
    assert_eq!(first, second);
    assert_eq!(first["anthropic"], true);
    assert_eq!(first["offline"], true);
    assert_eq!(first["gemini"], false);
}

#[tokio::test]
async fn test_anthropic_auth_and_response_extraction() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/messages")
        .match_header("x-api-key", "sk-ant-test")
        .match_header("anthropic-version", "2023-06-01")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({ "content": [{ "type": "text", "text": "claude here" }] }).to_string(),
        )
        .create_async()
        .await;

    let gateway = sandboxed(&server).build().unwrap();
    assert!(gateway.configure("anthropic", "sk-ant-test").await);

    let history = vec![Message::user("earlier"), Message::assistant("noted")];
    let reply = gateway.chat("hello", &history, None).await;
    assert!(reply.success);
    assert_eq!(reply.origin, BackendKind::Anthropic);
    assert_eq!(reply.content, "claude here");
}

#[tokio::test]
async fn test_directive_synthesis_flavors_the_offline_answer() {
    let server = mockito::Server::new_async().await;
    let beginner = sandboxed(&server)
        .caller_mode(CallerMode::Beginner)
        .build()
        .unwrap();
    let architect = sandboxed(&server)
        .caller_mode(CallerMode::Architect)
        .build()
        .unwrap();

    let from_beginner = beginner.chat("hello there", &[], None).await;
    let from_architect = architect.chat("hello there", &[], None).await;
    assert_ne!(from_beginner.content, from_architect.content);
}

#[tokio::test]
async fn test_is_online_tracks_networked_backends_only() {
    let server = mockito::Server::new_async().await;
    let gateway = sandboxed(&server).build().unwrap();
    // Offline alone does not make the gateway "online".
    assert!(!gateway.is_online().await);

    assert!(gateway.configure("gemini", "g-key").await);
    assert!(gateway.is_online().await);
}
