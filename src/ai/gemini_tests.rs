use super::*;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClient::new(Some("test-key".into()))
        .unwrap()
        .with_base_url(server.uri())
}

fn text_reply(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": text }], "role": "model" } }]
    })
}

#[test]
fn blank_key_counts_as_missing() {
    let client = GeminiClient::new(Some("   ".into())).unwrap();
    assert!(!client.has_credentials());
    assert!(GeminiClient::new(Some("abc".into())).unwrap().has_credentials());
}

#[test]
fn inline_data_serializes_in_camel_case() {
    let part = Part::InlineData {
        inline_data: InlineData {
            mime_type: "image/png".into(),
            data: "AAAA".into(),
        },
    };
    let json = serde_json::to_value(&part).unwrap();
    assert_eq!(json["inlineData"]["mimeType"], "image/png");
}

#[tokio::test]
async fn generate_returns_first_candidate_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/models/{DEFAULT_MODEL}:generateContent")))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(serde_json::json!({
            "contents": [{ "parts": [{ "text": "Say hi" }] }],
            "generationConfig": { "maxOutputTokens": 2000 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("hi")))
        .expect(1)
        .mount(&server)
        .await;

    let text = client_for(&server).generate("Say hi").await.unwrap();
    assert_eq!(text, "hi");
}

#[tokio::test]
async fn describe_image_sends_inline_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "contents": [{ "parts": [
                { "text": "Describe" },
                { "inlineData": { "mimeType": "image/jpeg", "data": "Zm9v" } }
            ] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("Image of a fox")))
        .mount(&server)
        .await;

    let text = client_for(&server)
        .describe_image("Describe", "image/jpeg", "Zm9v")
        .await
        .unwrap();
    assert_eq!(text, "Image of a fox");
}

#[tokio::test]
async fn api_errors_carry_the_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error": { "code": 429, "message": "Resource exhausted" }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).generate("x").await.unwrap_err();
    match err {
        AiError::Api { status, message } => {
            assert_eq!(status, 429);
            assert_eq!(message, "Resource exhausted");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn empty_candidates_are_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "candidates": [] })),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).generate("x").await.unwrap_err();
    assert!(matches!(err, AiError::EmptyResponse));
}

#[tokio::test]
async fn missing_key_never_hits_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = GeminiClient::new(None).unwrap().with_base_url(server.uri());
    let err = client.generate("x").await.unwrap_err();
    assert!(matches!(err, AiError::MissingApiKey));
}
