//! Budget API endpoints

use api_types::budget::{AccessLevel, BudgetListResponse, BudgetNew, BudgetView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{BudgetAccess, BudgetRole, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub(crate) fn map_role(role: BudgetRole) -> AccessLevel {
    match role {
        BudgetRole::Owner => AccessLevel::Owner,
        BudgetRole::Admin => AccessLevel::Admin,
        BudgetRole::Viewer => AccessLevel::Viewer,
    }
}

fn map_budget(access: BudgetAccess) -> BudgetView {
    BudgetView {
        id: access.budget.id,
        name: access.budget.name,
        owner_id: access.budget.owner_id,
        access: map_role(access.role),
    }
}

/// Budgets the caller owns or holds a role on.
pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<BudgetListResponse>, ServerError> {
    let budgets = state
        .engine
        .list_budgets(user.id)
        .await?
        .into_iter()
        .map(map_budget)
        .collect();

    Ok(Json(BudgetListResponse { budgets }))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetNew>,
) -> Result<(StatusCode, Json<BudgetView>), ServerError> {
    let budget = state.engine.create_budget(&payload.name, user.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(map_budget(BudgetAccess {
            budget,
            role: BudgetRole::Owner,
        })),
    ))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_budget(budget_id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
