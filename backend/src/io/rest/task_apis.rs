//! # REST API for Chore Assignment

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::post,
    Router,
};
use tracing::info;

use crate::domain::session::SessionContext;
use crate::domain::task_assignment;
use crate::io::rest::error::ApiError;
use crate::AppState;
use shared::{AssignTasksRequest, AssignTasksResponse, TaskAssignment};

pub fn router() -> Router<AppState> {
    Router::new().route("/assign", post(assign_tasks))
}

/// Deal tasks out to shuffled members, round-robin
pub async fn assign_tasks(session: SessionContext, Json(request): Json<AssignTasksRequest>) -> impl IntoResponse {
    info!("POST /api/tasks/assign - user {} request: {:?}", session.user_id, request);

    let plan = {
        let mut rng = rand::thread_rng();
        task_assignment::assign_round_robin(&request.task_ids, &request.member_ids, &mut rng)
    };

    match plan {
        Ok(assignments) => {
            let response = AssignTasksResponse {
                assignments: assignments
                    .into_iter()
                    .map(|a| TaskAssignment {
                        task_id: a.task_id,
                        member_id: a.member_id,
                    })
                    .collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => ApiError::from(anyhow::Error::new(e)).into_response(),
    }
}
