//! # REST API for Household Balances

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::{error, info};

use crate::domain::session::SessionContext;
use crate::io::rest::error::ApiError;
use crate::io::rest::mappers::bill_mapper::BillMapper;
use crate::AppState;
use shared::HouseholdBalancesResponse;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(household_balances))
}

/// Outstanding amounts per member, from unpaid shares
pub async fn household_balances(State(state): State<AppState>, session: SessionContext) -> impl IntoResponse {
    info!("GET /api/balances - household {}", session.household_id);

    match state.balance_service.household_balances(&session).await {
        Ok(result) => {
            let response = HouseholdBalancesResponse {
                balances: result.balances.into_iter().map(BillMapper::balance_to_dto).collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to calculate balances: {}", e);
            ApiError::from(e).into_response()
        }
    }
}
