//! Parse endpoint handlers, called directly.

use axum::body::Body;
use axum::extract::{FromRequest, State};
use axum::http::{header, Request, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use tripvoice::config::ServerConfig;
use tripvoice::server::{
    parse_expense_handler, parse_trip_handler, router, ApiError, AppState, ParseRequest,
};
use tripvoice::types::{Confidence, ExpenseCategory};

fn state() -> AppState {
    AppState::new(3).with_today(NaiveDate::from_ymd_opt(2025, 6, 11).expect("valid date"))
}

fn body(text: &str) -> Result<Json<ParseRequest>, axum::extract::rejection::JsonRejection> {
    Ok(Json(ParseRequest {
        text: text.to_owned(),
    }))
}

async fn malformed() -> Result<Json<ParseRequest>, axum::extract::rejection::JsonRejection> {
    let request = Request::builder()
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"text\":"))
        .expect("should build request");
    Json::<ParseRequest>::from_request(request, &()).await
}

async fn error_json(err: ApiError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("should read body");
    let json = serde_json::from_slice(&bytes).expect("body should be JSON");
    (status, json)
}

#[tokio::test]
async fn trip_endpoint_wraps_intent() {
    let Json(response) = parse_trip_handler(State(state()), body("我想去日本，5天，预算1万元"))
        .await
        .expect("should parse");
    assert!(response.success);
    let intent = response.data.expect("should carry data");
    assert_eq!(intent.destination, "日本");
    assert_eq!(intent.duration_days, 5);
    assert_eq!(intent.confidence, Confidence::High);
}

#[tokio::test]
async fn expense_endpoint_wraps_intent() {
    let Json(response) = parse_expense_handler(State(state()), body("最近一周吃饭花了多少"))
        .await
        .expect("should parse");
    assert!(response.success);
    let intent = response.data.expect("should carry data");
    assert_eq!(intent.category, Some(ExpenseCategory::Meals));
    assert!(intent.date_range_recognized);
}

#[tokio::test]
async fn empty_text_is_bad_request() {
    let err = parse_trip_handler(State(state()), body("   "))
        .await
        .expect_err("empty text should be rejected");
    let (status, json) = error_json(err).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "text must not be empty");
    assert!(json.get("data").is_none());
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let payload = malformed().await;
    assert!(payload.is_err());
    let err = parse_expense_handler(State(state()), payload)
        .await
        .expect_err("malformed body should be rejected");
    let (status, json) = error_json(err).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
}

#[test]
fn router_builds_with_origin_list() {
    let server = ServerConfig {
        addr: "127.0.0.1:0".to_owned(),
        allowed_origins: vec!["http://localhost:5173".to_owned()],
    };
    let _app = router(state(), &server);
}
