use chrono::Utc;
use payments_relay::domain::payment::ProcessorPayment;
use payments_relay::gateways::http::HttpProcessor;
use payments_relay::gateways::{AttemptOutcome, PaymentProcessor};
use payments_relay::health::refresher::{HealthRefresher, LeaderRefresher};
use payments_relay::store::memory::MemoryStore;
use payments_relay::store::HealthBoard;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn processor() -> HttpProcessor {
    HttpProcessor::new(reqwest::Client::new(), 500)
}

fn payment(id: &str) -> ProcessorPayment {
    ProcessorPayment {
        correlation_id: id.to_string(),
        amount: 19.9,
        requested_at: Utc::now(),
    }
}

async fn server_answering(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/payments"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn status_codes_map_to_outcomes() {
    let ok = server_answering(200).await;
    let down = server_answering(500).await;
    let rejected = server_answering(422).await;
    let p = processor();

    assert_eq!(p.submit(&ok.uri(), &payment("o-1")).await, AttemptOutcome::Success);
    assert_eq!(
        p.submit(&down.uri(), &payment("o-2")).await,
        AttemptOutcome::RetryableFailure { status: 500 }
    );
    assert_eq!(
        p.submit(&rejected.uri(), &payment("o-3")).await,
        AttemptOutcome::FatalFailure {
            reason: "HTTP_422".to_string()
        }
    );
}

#[tokio::test]
async fn request_body_uses_processor_field_names() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/payments"))
        .and(body_partial_json(serde_json::json!({
            "correlationId": "b-1",
            "amount": 19.9
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let out = processor().submit(&server.uri(), &payment("b-1")).await;
    assert_eq!(out, AttemptOutcome::Success);

    let received = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert!(body["requestedAt"].as_str().is_some());
}

#[tokio::test]
async fn unreachable_processor_is_a_transport_failure() {
    let out = processor().submit("http://127.0.0.1:1", &payment("u-1")).await;
    match out {
        AttemptOutcome::FatalFailure { reason } => assert!(reason.starts_with("NETWORK_ERROR")),
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[tokio::test]
async fn slow_processor_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/payments"))
        .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(2)))
        .mount(&server)
        .await;

    let out = HttpProcessor::new(reqwest::Client::new(), 50)
        .submit(&server.uri(), &payment("t-1"))
        .await;
    assert_eq!(
        out,
        AttemptOutcome::FatalFailure {
            reason: "TIMEOUT".to_string()
        }
    );
}

#[tokio::test]
async fn service_health_is_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/payments/service-health"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"failing": true, "minResponseTime": 120})),
        )
        .mount(&server)
        .await;

    let health = processor().service_health(&server.uri()).await.unwrap();
    assert!(health.failing);
    assert_eq!(health.min_response_time, 120);
}

#[tokio::test]
async fn rate_limited_probe_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/payments/service-health"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    assert!(processor().service_health(&server.uri()).await.is_err());
}

#[tokio::test]
async fn leader_publishes_a_failing_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/payments/service-health"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"failing": true, "minResponseTime": 0})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let board = Arc::new(MemoryStore::new());
    let leader = LeaderRefresher::new(Arc::new(processor()), server.uri(), board.clone());

    assert!(!leader.refresh().await);
    // second call inside the probe window reuses the cached verdict
    assert!(!leader.refresh().await);
    assert_eq!(board.read_default_up().await.unwrap(), Some(false));
}

#[tokio::test]
async fn response_bodies_are_consumed_across_repeated_submits() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/payments"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(64 * 1024)))
        .expect(25)
        .mount(&server)
        .await;

    let p = processor();
    for i in 0..25 {
        let out = p.submit(&server.uri(), &payment(&format!("k-{}", i))).await;
        assert_eq!(out, AttemptOutcome::Success);
    }
}
