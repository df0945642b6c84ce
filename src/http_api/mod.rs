use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::calculations::catalog::CatalogResult;
use crate::calculations::team_cost::TeamCostResult;
use crate::calculations::totals::Scenario;
use crate::calculations::{self, PlanCostSummary};
use crate::plan::BidPlan;
use crate::rates::RateCard;
use crate::validation::{PlanValidationError, validate_plan};

/// The mutable state behind the API: one plan and its rate card.
#[derive(Debug, Clone, Default)]
pub struct PlanState {
    pub plan: BidPlan,
    pub rate_card: RateCard,
}

#[derive(Clone)]
pub struct AppState {
    state: Arc<RwLock<PlanState>>,
}

impl AppState {
    pub fn new(plan: BidPlan, rate_card: RateCard) -> Self {
        Self {
            state: Arc::new(RwLock::new(PlanState { plan, rate_card })),
        }
    }

    pub fn with_shared(state: Arc<RwLock<PlanState>>) -> Self {
        Self { state }
    }

    fn state(&self) -> Arc<RwLock<PlanState>> {
        self.state.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    Invalid(String),
}

impl ApiError {
    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<PlanValidationError> for ApiError {
    fn from(value: PlanValidationError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Invalid(message) => {
                let body = Json(ErrorBody {
                    error: "invalid_request",
                    message,
                });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/plan", get(get_plan).put(update_plan))
        .route("/rates", get(get_rates).put(update_rates))
        .route("/compute", get(compute))
        .route("/compute/team", get(compute_team))
        .route("/compute/catalog", get(compute_catalog))
        .route("/scenarios", get(scenarios))
        .route("/discount", post(solve_discount))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, plan: BidPlan, rate_card: RateCard) -> std::io::Result<()> {
    let state = AppState::new(plan, rate_card);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_plan(State(state): State<AppState>) -> Json<BidPlan> {
    let shared = state.state();
    let plan = {
        let guard = shared.read();
        guard.plan.clone()
    };
    Json(plan)
}

async fn update_plan(
    State(state): State<AppState>,
    Json(plan): Json<BidPlan>,
) -> Result<Json<BidPlan>, ApiError> {
    validate_plan(&plan)?;
    let shared = state.state();
    {
        let mut guard = shared.write();
        guard.plan = plan.clone();
    }
    Ok(Json(plan))
}

async fn get_rates(State(state): State<AppState>) -> Json<RateCard> {
    let shared = state.state();
    let card = {
        let guard = shared.read();
        guard.rate_card.clone()
    };
    Json(card)
}

async fn update_rates(
    State(state): State<AppState>,
    Json(card): Json<RateCard>,
) -> Result<Json<RateCard>, ApiError> {
    let shared = state.state();
    {
        let mut guard = shared.write();
        guard.rate_card = card.clone();
    }
    Ok(Json(card))
}

async fn compute(State(state): State<AppState>) -> Result<Json<PlanCostSummary>, ApiError> {
    let shared = state.state();
    let summary = {
        let guard = shared.read();
        calculations::compute_plan(&guard.plan, &guard.rate_card)?
    };
    Ok(Json(summary))
}

async fn compute_team(State(state): State<AppState>) -> Result<Json<TeamCostResult>, ApiError> {
    let shared = state.state();
    let result = {
        let guard = shared.read();
        validate_plan(&guard.plan)?;
        calculations::team_cost::compute_team_cost(&guard.plan, &guard.rate_card)
    };
    Ok(Json(result))
}

async fn compute_catalog(State(state): State<AppState>) -> Result<Json<CatalogResult>, ApiError> {
    let shared = state.state();
    let result = {
        let guard = shared.read();
        validate_plan(&guard.plan)?;
        calculations::catalog::compute_catalog_cost(
            &guard.plan.tows,
            &guard.rate_card,
            &guard.plan.params,
        )
    };
    Ok(Json(result))
}

async fn scenarios(State(state): State<AppState>) -> Result<Json<Vec<Scenario>>, ApiError> {
    let shared = state.state();
    let scenarios = {
        let guard = shared.read();
        validate_plan(&guard.plan)?;
        let catalog = calculations::catalog::compute_catalog_cost(
            &guard.plan.tows,
            &guard.rate_card,
            &guard.plan.params,
        );
        calculations::totals::generate_scenarios(&guard.plan, &guard.rate_card, catalog.total)
    };
    Ok(Json(scenarios))
}

#[derive(Debug, Deserialize)]
struct DiscountPayload {
    target_margin_pct: f64,
}

#[derive(Debug, Serialize)]
struct DiscountSolution {
    target_margin_pct: f64,
    discount_pct: f64,
    total_cost: f64,
}

/// Solves the tender discount that hits a target margin at the current
/// plan's cost.
async fn solve_discount(
    State(state): State<AppState>,
    Json(payload): Json<DiscountPayload>,
) -> Result<Json<DiscountSolution>, ApiError> {
    if !payload.target_margin_pct.is_finite() || payload.target_margin_pct >= 100.0 {
        return Err(ApiError::invalid(format!(
            "target margin {} must be a finite percentage below 100",
            payload.target_margin_pct
        )));
    }
    let shared = state.state();
    let solution = {
        let guard = shared.read();
        let summary = calculations::compute_plan(&guard.plan, &guard.rate_card)?;
        let discount_pct = calculations::totals::discount_for_margin(
            guard.plan.params.base_amount,
            summary.costs.total,
            payload.target_margin_pct,
            guard.plan.params.rti_quota,
        );
        DiscountSolution {
            target_margin_pct: payload.target_margin_pct,
            discount_pct,
            total_cost: summary.costs.total,
        }
    };
    Ok(Json(solution))
}
