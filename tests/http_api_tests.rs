#![cfg(feature = "http_api")]

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use pricing_tool::calculations::PlanCostSummary;
use pricing_tool::http_api;
use pricing_tool::{
    BidPlan, MixEntry, RateCard, RateMappingPeriod, TeamMember, Tow, TowKind,
};
use serde_json::json;
use tower::util::ServiceExt;

fn sample_plan() -> BidPlan {
    let mut plan = BidPlan::default();
    plan.metadata.tender_name = "HTTP Tender".to_string();
    plan.params.duration_months = 12;
    plan.params.base_amount = 500_000.0;
    plan.tows
        .push(Tow::new("tow-a", "Development", TowKind::Task));
    plan.team
        .push(TeamMember::new("dev", 1.0).with_allocation("tow-a", 100.0));
    plan.profile_mappings.insert(
        "dev".to_string(),
        vec![RateMappingPeriod::new(
            1,
            12,
            vec![MixEntry::new("apps:dev", 100.0)],
        )],
    );
    plan
}

fn sample_card() -> RateCard {
    RateCard::new().with_rate("apps:dev", 300.0)
}

fn new_router() -> axum::Router {
    let state = http_api::AppState::new(sample_plan(), sample_card());
    http_api::router(state)
}

#[tokio::test]
async fn health_endpoint_responds() {
    let response = new_router()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn plan_round_trips_via_http_api() {
    let app = new_router();

    let mut updated = sample_plan();
    updated.metadata.tender_name = "Updated Tender".to_string();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/plan")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&updated).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/plan")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let fetched: BidPlan = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(fetched.metadata.tender_name, "Updated Tender");
}

#[tokio::test]
async fn invalid_plan_update_is_rejected() {
    let mut broken = sample_plan();
    broken.params.duration_months = 0;
    let response = new_router()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/plan")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&broken).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], json!("invalid_request"));
}

#[tokio::test]
async fn compute_endpoint_prices_the_stored_plan() {
    let response = new_router()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/compute")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let summary: PlanCostSummary = serde_json::from_slice(&bytes).unwrap();
    // 220 days at 300/day
    assert_eq!(summary.team.total, 66_000.0);
}

#[tokio::test]
async fn scenarios_endpoint_returns_three_variants() {
    let response = new_router()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/scenarios")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let scenarios: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(scenarios.as_array().map(|a| a.len()), Some(3));
}

#[tokio::test]
async fn discount_endpoint_solves_for_target_margin() {
    let payload = json!({ "target_margin_pct": 20.0 });
    let response = new_router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/discount")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let solution: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(solution["discount_pct"].as_f64().unwrap() > 0.0);
    assert!(solution["discount_pct"].as_f64().unwrap() < 100.0);
}

#[tokio::test]
async fn impossible_margin_target_is_rejected() {
    let payload = json!({ "target_margin_pct": 150.0 });
    let response = new_router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/discount")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
