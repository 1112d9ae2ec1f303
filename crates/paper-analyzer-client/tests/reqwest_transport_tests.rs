//! Tests the HTTP transport against a mock generate-content endpoint.

use paper_analyzer_client::{
    ApiCredential, DEFAULT_MODEL_ID, GenerativeTransport, ReqwestTransport, TransportError,
    validate_api_base,
};
use paper_analyzer_core::{AnalysisRequest, ImagePart};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT_PATH: &str = "/v1beta/models/gemini-2.5-pro:generateContent";

fn transport(server: &MockServer) -> ReqwestTransport {
    let base = validate_api_base(&server.uri()).expect("mock server is loopback");
    let credential =
        ApiCredential::from_value(Some("test-key".to_string())).expect("credential is set");
    ReqwestTransport::new(base, credential).expect("transport should build")
}

fn request() -> AnalysisRequest {
    AnalysisRequest::new("Compare.", vec![ImagePart::new("image/png", "iVBO")])
        .expect("request should build")
}

#[tokio::test]
async fn reqwest_transport_tests_posts_contract_body_with_key_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{
                "parts": [
                    {"text": "Compare."},
                    {"inlineData": {"mimeType": "image/png", "data": "iVBO"}}
                ]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "# Result"}]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = transport(&server)
        .generate(DEFAULT_MODEL_ID, &request())
        .await
        .expect("generate should succeed");
    assert_eq!(text, "# Result");
}

#[tokio::test]
async fn reqwest_transport_tests_maps_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .expect(1)
        .mount(&server)
        .await;

    let error = transport(&server)
        .generate(DEFAULT_MODEL_ID, &request())
        .await
        .expect_err("generate should fail");
    assert!(matches!(
        error,
        TransportError::Status { status: 503, ref body } if body == "overloaded"
    ));
}

#[tokio::test]
async fn reqwest_transport_tests_rejects_malformed_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let error = transport(&server)
        .generate(DEFAULT_MODEL_ID, &request())
        .await
        .expect_err("generate should fail");
    assert!(matches!(error, TransportError::Contract(_)));
}
