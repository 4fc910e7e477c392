//! Role management endpoints (owner-only).

use api_types::role::{RoleGrant, RoleListResponse, RoleView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{RoleAssignment, User};
use uuid::Uuid;

use crate::{ServerError, budgets::map_role, server::ServerState};

fn map_assignment(assignment: RoleAssignment) -> RoleView {
    RoleView {
        budget_id: assignment.budget_id,
        user_id: assignment.user_id,
        role: map_role(assignment.role),
        display_name: assignment.role.display_name().to_string(),
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
) -> Result<Json<RoleListResponse>, ServerError> {
    let roles = state
        .engine
        .list_roles(budget_id, user.id)
        .await?
        .into_iter()
        .map(map_assignment)
        .collect();

    Ok(Json(RoleListResponse { roles }))
}

pub async fn add(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<RoleGrant>,
) -> Result<(StatusCode, Json<RoleView>), ServerError> {
    let assignment = state
        .engine
        .add_role(user.id, budget_id, payload.user_id, &payload.role)
        .await?;
    Ok((StatusCode::CREATED, Json(map_assignment(assignment))))
}

pub async fn remove(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((budget_id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .remove_role(budget_id, member_id, user.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
