use incident_chat_core::{ChatError, ChatReply, ChatTransport, HttpTransport, TicketRecord};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport_for(server: &MockServer) -> HttpTransport {
    HttpTransport::new(format!("{}/chat", server.uri()))
}

#[tokio::test]
async fn test_posts_message_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"message": "how many open tickets?"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reply": "Total tickets: 3"})))
        .expect(1)
        .mount(&server)
        .await;

    let reply = transport_for(&server)
        .send_message("how many open tickets?")
        .await
        .unwrap();

    assert_eq!(reply, ChatReply::Text("Total tickets: 3".to_string()));
}

#[tokio::test]
async fn test_ticket_list_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reply": [
                {"ticket_id": "T1", "company": "Acme", "status": "open", "created_date": "2024-01-01"},
                {"ticket_id": "T2", "company": "Globex", "status": "closed", "created_date": "2024-02-11", "priority": "low"}
            ]
        })))
        .mount(&server)
        .await;

    let reply = transport_for(&server).send_message("list tickets").await.unwrap();

    assert_eq!(
        reply,
        ChatReply::Tickets(vec![
            TicketRecord::new("T1", "Acme", "open", "2024-01-01"),
            TicketRecord::new("T2", "Globex", "closed", "2024-02-11"),
        ])
    );
}

#[tokio::test]
async fn test_grouped_reply_is_kept_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"reply": {"Acme": 2, "Globex": 1}})),
        )
        .mount(&server)
        .await;

    let reply = transport_for(&server).send_message("group by company").await.unwrap();

    assert_eq!(reply, ChatReply::Other(json!({"Acme": 2, "Globex": 1})));
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let err = transport_for(&server).send_message("hi").await.unwrap_err();

    match err {
        ChatError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "Internal Server Error");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = transport_for(&server).send_message("hi").await.unwrap_err();
    assert!(matches!(err, ChatError::Decode(_)));
}

#[tokio::test]
async fn test_empty_message_issues_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reply": "x"})))
        .expect(0)
        .mount(&server)
        .await;

    let err = transport_for(&server).send_message("").await.unwrap_err();
    assert!(matches!(err, ChatError::EmptyMessage));
}

#[tokio::test]
async fn test_unreachable_service_is_an_error() {
    let transport = HttpTransport::new("http://127.0.0.1:1/chat");
    let err = transport.send_message("hi").await.unwrap_err();
    assert!(matches!(err, ChatError::Http(_)));
}
