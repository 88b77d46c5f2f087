//! # REST API for Bills
//!
//! Endpoints for creating, listing, fetching and settling shared bills.
//! Every call is scoped to the caller's household.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use tracing::{error, info};

use crate::domain::commands::bills::{BillListQuery, CreateBillCommand, SettleShareCommand};
use crate::domain::session::SessionContext;
use crate::io::rest::error::ApiError;
use crate::io::rest::mappers::bill_mapper::BillMapper;
use crate::io::rest::mappers::split_mapper::SplitMapper;
use crate::AppState;
use shared::{
    BillListRequest, BillListResponse, CreateBillRequest, CreateBillResponse, PaginationInfo,
    SettleShareResponse,
};

/// Create a router for bill related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bills).post(create_bill))
        .route("/:bill_id", get(get_bill))
        .route("/:bill_id/shares/:member_id/settle", post(settle_share))
}

/// Validate, split and save a new bill
pub async fn create_bill(
    State(state): State<AppState>,
    session: SessionContext,
    Json(request): Json<CreateBillRequest>,
) -> impl IntoResponse {
    info!("POST /api/bills - user {} request: {:?}", session.user_id, request);

    let command = match to_create_command(request) {
        Ok(command) => command,
        Err(e) => return e.into_response(),
    };

    match state.bill_service.create_bill(&session, command).await {
        Ok(result) => {
            let response = CreateBillResponse {
                bill: BillMapper::to_dto(result.bill),
                success_message: result.success_message,
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to create bill: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// List bills newest first
pub async fn list_bills(
    State(state): State<AppState>,
    session: SessionContext,
    Query(request): Query<BillListRequest>,
) -> impl IntoResponse {
    info!("GET /api/bills - household {} query: {:?}", session.household_id, request);

    let query = BillListQuery {
        search: request.search,
        limit: request.limit,
        after: request.after,
    };

    match state.bill_service.list_bills(&session, query).await {
        Ok(result) => {
            let response = BillListResponse {
                bills: result.bills.into_iter().map(BillMapper::to_dto).collect(),
                pagination: PaginationInfo {
                    has_more: result.pagination.has_more,
                    next_cursor: result.pagination.next_cursor,
                },
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to list bills: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn get_bill(
    State(state): State<AppState>,
    session: SessionContext,
    Path(bill_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/bills/{}", bill_id);

    match state.bill_service.get_bill(&session, &bill_id).await {
        Ok(bill) => (StatusCode::OK, Json(BillMapper::to_dto(bill))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Mark one member's share as paid
pub async fn settle_share(
    State(state): State<AppState>,
    session: SessionContext,
    Path((bill_id, member_id)): Path<(String, String)>,
) -> impl IntoResponse {
    info!(
        "POST /api/bills/{}/shares/{}/settle - user {}",
        bill_id, member_id, session.user_id
    );

    let command = SettleShareCommand { bill_id, member_id };

    match state.bill_service.settle_share(&session, command).await {
        Ok(result) => {
            let response = SettleShareResponse {
                bill: BillMapper::to_dto(result.bill),
                success_message: result.success_message,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to settle share: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

fn to_create_command(request: CreateBillRequest) -> Result<CreateBillCommand, ApiError> {
    let total = request
        .total
        .map(|total| SplitMapper::money_from_dto(total, "Total"))
        .transpose()?;
    Ok(CreateBillCommand {
        description: request.description,
        payer_id: request.payer_id,
        total,
        split: SplitMapper::to_domain(request.split)?,
    })
}
