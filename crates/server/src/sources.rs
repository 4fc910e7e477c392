//! Budget transaction source endpoints

use api_types::source::{SourceListResponse, SourceNew, SourceView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::User;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
) -> Result<Json<SourceListResponse>, ServerError> {
    let sources = state
        .engine
        .list_sources(budget_id, user.id)
        .await?
        .into_iter()
        .map(|source| SourceView {
            id: source.id,
            budget_id: source.budget_id,
            external_account_id: source.external_account_id,
            account_name: source.account_name,
        })
        .collect();

    Ok(Json(SourceListResponse { sources }))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<SourceNew>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .create_source(budget_id, payload.external_account_id, user.id)
        .await?;
    Ok(StatusCode::CREATED)
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(source_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_source(source_id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
