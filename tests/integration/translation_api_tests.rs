/*!
 * Integration tests for the translation HTTP client
 */

use config_spider::errors::ProviderError;
use config_spider::providers::baidu::{Credentials, TranslationRequest};
use config_spider::providers::{BaiduTranslator, Translator};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{EchoResponder, init_logging};

const TRANSLATE_PATH: &str = "/api/trans/vip/translate";

fn client_for(server: &MockServer) -> BaiduTranslator {
    BaiduTranslator::new(
        Credentials::new("app-1", "secret-1"),
        format!("{}{}", server.uri(), TRANSLATE_PATH),
        Duration::from_secs(5),
    )
}

async fn mount_json(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path(TRANSLATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_translate_withSegmentList_shouldConcatenateDst() {
    init_logging();
    let server = MockServer::start().await;
    mount_json(
        &server,
        json!({"from": "en", "to": "zh", "trans_result": [{"src": "a", "dst": "A"}, {"src": "b", "dst": "B"}]}),
    )
    .await;

    let result = client_for(&server).translate("a\nb", "zh").await.unwrap();
    assert_eq!(result, Some("AB".to_string()));
}

#[tokio::test]
async fn test_translate_withObjectMissingDst_shouldReturnNone() {
    let server = MockServer::start().await;
    mount_json(&server, json!({"trans_result": {"src": "Hello"}})).await;

    let result = client_for(&server).translate("Hello", "zh").await.unwrap();
    assert_eq!(result, None);
}

#[tokio::test]
async fn test_translate_withSingleObject_shouldReadDst() {
    let server = MockServer::start().await;
    mount_json(&server, json!({"trans_result": {"src": "Hello", "dst": "你好"}})).await;

    let result = client_for(&server).translate("Hello", "zh").await.unwrap();
    assert_eq!(result, Some("你好".to_string()));
}

#[tokio::test]
async fn test_translate_withErrorPayload_shouldReturnNone() {
    let server = MockServer::start().await;
    mount_json(&server, json!({"error_code": "54001", "error_msg": "Invalid Sign"})).await;

    let result = client_for(&server).translate("Hello", "zh").await.unwrap();
    assert_eq!(result, None);
}

#[tokio::test]
async fn test_translate_shouldPostSignedForm() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TRANSLATE_PATH))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("appid=app-1"))
        .and(body_string_contains("from=auto"))
        .and(body_string_contains("to=de"))
        .and(body_string_contains("q=Hello"))
        .and(body_string_contains("sign="))
        .and(body_string_contains("salt="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"trans_result": [{"dst": "Hallo"}]})))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server).translate("Hello", "de").await.unwrap();
    assert_eq!(result, Some("Hallo".to_string()));
}

#[tokio::test]
async fn test_send_withKnownSalt_shouldCarryMatchingSignature() {
    let server = MockServer::start().await;
    let credentials = Credentials::new("app-1", "secret-1");
    let request = TranslationRequest::signed(&credentials, "Hello", "zh", 40000);
    let expected_sign = config_spider::hashing::fingerprint_text("app-1Hello40000secret-1");
    assert_eq!(request.sign, expected_sign);

    Mock::given(method("POST"))
        .and(body_string_contains(format!("sign={}", expected_sign)))
        .and(body_string_contains("salt=40000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"trans_result": [{"dst": "你好"}]})))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server).send(&request).await.unwrap();
    assert_eq!(response.text(), Some("你好".to_string()));
}

#[tokio::test]
async fn test_translate_withServerError_shouldReturnApiError() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = client_for(&server).translate("Hello", "zh").await.unwrap_err();
    match err {
        ProviderError::ApiError { status_code, message } => {
            assert_eq!(status_code, 500);
            assert_eq!(message, "upstream down");
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_translate_withNonJsonBody_shouldReturnParseError() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).translate("Hello", "zh").await.unwrap_err();
    assert!(matches!(err, ProviderError::ParseError(_)));
}

#[tokio::test]
async fn test_translate_withSlowServer_shouldTimeOut() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"trans_result": [{"dst": "late"}]}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = BaiduTranslator::new(
        Credentials::new("app-1", "secret-1"),
        server.uri(),
        Duration::from_millis(300),
    );
    let err = client.translate("Hello", "zh").await.unwrap_err();
    assert!(matches!(err, ProviderError::Timeout(_)));
}

#[tokio::test]
async fn test_translate_withEchoServer_shouldReturnInput() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TRANSLATE_PATH))
        .respond_with(EchoResponder)
        .mount(&server)
        .await;

    let result = client_for(&server).translate("Hello|SEP|World", "zh").await.unwrap();
    assert_eq!(result, Some("Hello|SEP|World".to_string()));
}
