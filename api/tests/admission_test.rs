//! Integration tests for the admission middleware: throttling and routing

mod common;

use std::net::SocketAddr;

use actix_web::http::{header, StatusCode};
use actix_web::test::{self, TestRequest};
use serde_json::Value;

use common::{test_app_with_config, test_app_with_limit, test_config};
use ts_api::create_app;

const PROXY: &str = "10.0.0.1";

fn peer(ip: &str) -> SocketAddr {
    SocketAddr::new(ip.parse().unwrap(), 40000)
}

fn health_from(ip: &str) -> TestRequest {
    TestRequest::get().uri("/health").peer_addr(peer(ip))
}

#[actix_web::test]
async fn test_quota_per_client_and_window() {
    let fixture = test_app_with_limit(2);
    let app = test::init_service(create_app(fixture.state.clone())).await;

    let resp = test::call_service(&app, health_from("203.0.113.1").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("x-ratelimit-limit").unwrap(), "2");
    assert_eq!(resp.headers().get("x-ratelimit-remaining").unwrap(), "1");

    let resp = test::call_service(&app, health_from("203.0.113.1").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("x-ratelimit-remaining").unwrap(), "0");

    let resp = test::call_service(&app, health_from("203.0.113.1").to_request()).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = resp
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .expect("Retry-After header");
    assert!((1..=60).contains(&retry_after));
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "RATE_LIMIT_EXCEEDED");
    assert_eq!(body["details"]["retry_after_seconds"], retry_after);

    // Another client has its own quota
    let resp = test::call_service(&app, health_from("203.0.113.2").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // The next window starts fresh
    fixture.clock.advance(chrono::Duration::seconds(60));
    let resp = test::call_service(&app, health_from("203.0.113.1").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_route_classes_have_separate_quotas() {
    let fixture = test_app_with_limit(1);
    let app = test::init_service(create_app(fixture.state.clone())).await;

    let resp = test::call_service(&app, health_from("203.0.113.9").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Same client, different route class: rejected by the token gate, not the quota
    let req = TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .peer_addr(peer("203.0.113.9"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_header_rejection_consumes_no_quota() {
    let fixture = test_app_with_limit(1);
    let app = test::init_service(create_app(fixture.state.clone())).await;

    for _ in 0..3 {
        let req = TestRequest::post()
            .uri("/api/v1/auth/login")
            .peer_addr(peer("198.51.100.4"))
            .insert_header((header::CONTENT_TYPE, "text/plain"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_ACCEPTABLE);
    }

    let req = TestRequest::post()
        .uri("/api/v1/auth/login")
        .peer_addr(peer("198.51.100.4"))
        .set_json(serde_json::json!({ "email": common::EMAIL, "password": common::PASSWORD }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_forwarded_for_from_untrusted_peer_shares_its_quota() {
    let fixture = test_app_with_limit(2);
    let app = test::init_service(create_app(fixture.state.clone())).await;

    let mut statuses = Vec::new();
    for spoofed in ["198.51.100.1", "198.51.100.2", "198.51.100.3"] {
        let req = health_from("203.0.113.50")
            .insert_header(("X-Forwarded-For", spoofed))
            .insert_header(("X-Real-IP", spoofed))
            .to_request();
        statuses.push(test::call_service(&app, req).await.status());
    }

    assert_eq!(
        statuses,
        vec![StatusCode::OK, StatusCode::OK, StatusCode::TOO_MANY_REQUESTS]
    );
}

#[actix_web::test]
async fn test_trusted_proxy_forwards_client_address() {
    let mut config = test_config(1);
    config.server.trusted_proxies = vec![PROXY.parse().unwrap()];
    let fixture = test_app_with_config(config);
    let app = test::init_service(create_app(fixture.state.clone())).await;

    let via_proxy = |client: &str| {
        health_from(PROXY)
            .insert_header(("X-Forwarded-For", format!("6.6.6.6, {}", client)))
            .to_request()
    };

    let resp = test::call_service(&app, via_proxy("203.0.113.1")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = test::call_service(&app, via_proxy("203.0.113.2")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // The forged leftmost hop does not buy a fresh quota
    let resp = test::call_service(&app, via_proxy("203.0.113.1")).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[actix_web::test]
async fn test_malformed_json_uses_error_envelope() {
    let fixture = test_app_with_limit(10);
    let app = test::init_service(create_app(fixture.state.clone())).await;

    let req = TestRequest::post()
        .uri("/api/v1/auth/login")
        .peer_addr(peer("198.51.100.8"))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{\"email\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "BAD_REQUEST");
    assert_eq!(body["message"], "Invalid JSON body");
}

#[actix_web::test]
async fn test_unknown_route_is_not_found() {
    let fixture = test_app_with_limit(10);
    let app = test::init_service(create_app(fixture.state.clone())).await;

    let req = TestRequest::get().uri("/api/v1/nope").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "NOT_FOUND");
}
