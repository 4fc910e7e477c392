//! Categories API endpoints.

use api_types::category::{
    Categorize, CategoryListResponse, CategoryMappingListResponse, CategoryMappingView,
    CategoryNew, CategoryView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::User;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_category(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        budget_id: category.budget_id,
        name: category.name,
    }
}

fn map_mapping(mapping: engine::CategoryMapping) -> CategoryMappingView {
    CategoryMappingView {
        id: mapping.id,
        category_id: mapping.category_id,
        transaction_name: mapping.transaction_name,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
) -> Result<Json<CategoryListResponse>, ServerError> {
    let categories = state
        .engine
        .list_categories(budget_id, user.id)
        .await?
        .into_iter()
        .map(map_category)
        .collect();

    Ok(Json(CategoryListResponse { categories }))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let category = state
        .engine
        .create_category(budget_id, &payload.name, user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(map_category(category))))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(category_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_category(category_id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn categorize(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<Categorize>,
) -> Result<Json<CategoryMappingView>, ServerError> {
    let mapping = state
        .engine
        .categorize_transaction(
            budget_id,
            &payload.transaction_name,
            &payload.category_name,
            user.id,
        )
        .await?;
    Ok(Json(map_mapping(mapping)))
}

pub async fn list_mappings(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
) -> Result<Json<CategoryMappingListResponse>, ServerError> {
    let mappings = state
        .engine
        .list_category_mappings(budget_id, user.id)
        .await?
        .into_iter()
        .map(map_mapping)
        .collect();

    Ok(Json(CategoryMappingListResponse { mappings }))
}
