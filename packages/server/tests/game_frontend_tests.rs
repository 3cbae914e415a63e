//! Game front door HTTP API.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use matchmaker_core::domains::auth::{AccessClaims, TokenSigner};
use matchmaker_core::kernel::MockFrontend;
use matchmaker_core::server::{build_app, AppState};
use serde_json::Value;
use tonic::Code;
use tower::ServiceExt;

use crate::common::{init_test_tracing, TEST_BEARER_TOKEN, TEST_JWT_SECRET, TEST_RSA_KEY};

fn app(frontend: &Arc<MockFrontend>, signer: TokenSigner) -> Router {
    init_test_tracing();
    build_app(AppState::new(
        frontend.clone(),
        signer,
        TEST_BEARER_TOKEN,
        Duration::from_secs(60),
    ))
}

fn hs256() -> TokenSigner {
    TokenSigner::hs256(TEST_JWT_SECRET, 60)
}

async fn get(app: Router, uri: &str, auth: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().uri(uri);
    if let Some(auth) = auth {
        request = request.header("authorization", auth);
    }

    let response = app
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, body)
}

fn bearer() -> String {
    format!("Bearer {}", TEST_BEARER_TOKEN)
}

#[tokio::test]
async fn test_health() {
    let frontend = Arc::new(MockFrontend::new());
    let (status, body) = get(app(&frontend, hs256()), "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_play_without_auth_creates_no_ticket() {
    let frontend = Arc::new(MockFrontend::new().with_assignment("10.0.0.5:7777"));

    let (status, body) = get(app(&frontend, hs256()), "/play/us-east", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = get(
        app(&frontend, hs256()),
        "/play/us-east",
        Some("Bearer wrong-token"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get(
        app(&frontend, hs256()),
        "/play/us-east",
        Some(TEST_BEARER_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert!(frontend.created().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_play_timeout_echoes_ticket_id() {
    let frontend = Arc::new(MockFrontend::new());

    let (status, body) = get(app(&frontend, hs256()), "/play/us-east", Some(&bearer())).await;

    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body["status"], "timeout");
    assert_eq!(body["ticket_id"], "ticket-1");
    assert_eq!(body["message"], "No match found within timeout period");
    assert_eq!(frontend.created().len(), 1);
}

#[tokio::test]
async fn test_play_round_trip() {
    let frontend = Arc::new(MockFrontend::new().with_assignment("10.0.0.5:7777"));

    let (status, body) = get(
        app(&frontend, hs256()),
        "/play/us-east",
        Some("bearer test-token-abc"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "matched");
    assert_eq!(body["ticket_id"], "ticket-1");
    assert_eq!(body["server"]["connection"], "10.0.0.5:7777");
    assert_eq!(body["server"]["ip"], "10.0.0.5");
    assert_eq!(body["server"]["port"], "7777");

    // Player attributes are the ones the ticket was created with
    let created = frontend.created();
    let fields = created[0].search_fields.as_ref().unwrap();
    assert_eq!(fields.tags, vec!["mode.session"]);
    assert_eq!(fields.string_args["region"], "us-east");
    assert_eq!(body["player"]["region"], "us-east");
    assert_eq!(body["player"]["skill"].as_f64().unwrap(), fields.double_args["skill"]);
    assert_eq!(
        body["player"]["latency"].as_f64().unwrap(),
        fields.double_args["latency"]
    );

    let token = body["jwt"].as_str().unwrap();
    let claims = decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .unwrap()
    .claims;
    assert_eq!(claims.ticket_id, "ticket-1");
    assert_eq!(claims.server.connection, "10.0.0.5:7777");
    assert_eq!(claims.player.region, "us-east");
}

#[tokio::test]
async fn test_play_create_failure_is_500() {
    let frontend =
        Arc::new(MockFrontend::new().with_create_error(Code::Unavailable, "frontend down"));

    let (status, body) = get(app(&frontend, hs256()), "/play/us-east", Some(&bearer())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "gRPC error: frontend down");
}

#[tokio::test]
async fn test_jwks_not_published_for_hs256() {
    let frontend = Arc::new(MockFrontend::new());
    let (status, _) = get(app(&frontend, hs256()), "/.well-known/jwks.json", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rs256_token_verifies_with_published_jwks() {
    let frontend = Arc::new(MockFrontend::new().with_assignment("10.0.0.5:7777"));
    let signer = TokenSigner::rs256_from_pem(TEST_RSA_KEY, 60).unwrap();

    let (status, jwks) = get(app(&frontend, signer.clone()), "/.well-known/jwks.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(jwks["keys"][0]["kty"], "RSA");
    assert_eq!(jwks["keys"][0]["alg"], "RS256");

    let (status, body) = get(app(&frontend, signer), "/play/eu-west", Some(&bearer())).await;
    assert_eq!(status, StatusCode::OK);

    let jwks: JwkSet = serde_json::from_value(jwks).unwrap();
    let key = DecodingKey::from_jwk(&jwks.keys[0]).unwrap();
    let claims = decode::<AccessClaims>(
        body["jwt"].as_str().unwrap(),
        &key,
        &Validation::new(Algorithm::RS256),
    )
    .unwrap()
    .claims;
    assert_eq!(claims.player.region, "eu-west");
}
