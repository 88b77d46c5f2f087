//! # REST API for Split Previews
//!
//! Stateless calculation endpoint used by the bill form on every edit.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::post,
    Router,
};
use tracing::{error, info};

use crate::domain::commands::splits::PreviewSplitCommand;
use crate::domain::session::SessionContext;
use crate::io::rest::error::ApiError;
use crate::io::rest::mappers::split_mapper::SplitMapper;
use crate::AppState;
use shared::{SplitPreviewRequest, SplitPreviewResponse};

/// Create a router for split related APIs
pub fn router() -> Router<AppState> {
    Router::new().route("/preview", post(preview_split))
}

/// Compute each member's share without saving anything
pub async fn preview_split(
    State(state): State<AppState>,
    session: SessionContext,
    Json(request): Json<SplitPreviewRequest>,
) -> impl IntoResponse {
    info!("POST /api/splits/preview - user {} request: {:?}", session.user_id, request);

    let command = match to_command(request) {
        Ok(command) => command,
        Err(e) => return e.into_response(),
    };

    match state.bill_service.preview_split(command) {
        Ok(result) => {
            let currency_symbol = &state.bill_service.settings().currency_symbol;
            let response = SplitPreviewResponse {
                total: result.total().to_major(),
                shares: SplitMapper::to_share_amounts(&result, currency_symbol),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to preview split: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

fn to_command(request: SplitPreviewRequest) -> Result<PreviewSplitCommand, ApiError> {
    let total = request
        .total
        .map(|total| SplitMapper::money_from_dto(total, "Total"))
        .transpose()?;
    Ok(PreviewSplitCommand {
        total,
        split: SplitMapper::to_domain(request.split)?,
    })
}
