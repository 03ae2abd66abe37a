//! Request/response contract of [`EmailDelivery`] against a mock email API.

use restyle_events::{EmailConfig, EmailDelivery, EmailError, Notifier};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn delivery_for(server: &MockServer) -> EmailDelivery {
    let mut config = EmailConfig::new("re_test");
    config.api_url = format!("{}/emails", server.uri());
    config.from = "Restyle <bot@example.com>".into();
    config.subject = "Your illustration is ready!".into();
    EmailDelivery::new(config).unwrap()
}

// ---------------------------------------------------------------------------
// Test: the message is POSTed as JSON with a bearer key
// ---------------------------------------------------------------------------

#[tokio::test]
async fn send_posts_json_message_with_bearer_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(header("authorization", "Bearer re_test"))
        .and(body_partial_json(json!({
            "from": "Restyle <bot@example.com>",
            "to": "u1@example.com",
            "subject": "Your illustration is ready!",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "msg_1" })))
        .expect(1)
        .mount(&server)
        .await;

    delivery_for(&server)
        .send_preview("u1@example.com", "https://cdn.example.com/p/u/j.png")
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let html = body["html"].as_str().unwrap();
    assert!(html.contains(r#"src="https://cdn.example.com/p/u/j.png""#));
}

// ---------------------------------------------------------------------------
// Test: a rejected message maps to HttpStatus with the body
// ---------------------------------------------------------------------------

#[tokio::test]
async fn non_success_status_is_http_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(422).set_body_string("invalid from"))
        .mount(&server)
        .await;

    let err = delivery_for(&server)
        .send_preview("u1@example.com", "https://cdn.example.com/p/u/j.png")
        .await
        .unwrap_err();

    match err {
        EmailError::HttpStatus { status, body } => {
            assert_eq!(status, 422);
            assert_eq!(body, "invalid from");
        }
        other => panic!("expected HttpStatus error, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test: an unusable recipient never reaches the API
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_recipient_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = delivery_for(&server)
        .send_preview("not-an-address", "https://cdn.example.com/p/u/j.png")
        .await
        .unwrap_err();

    assert!(matches!(err, EmailError::InvalidRecipient(_)));
}
