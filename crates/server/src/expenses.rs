//! Expense API endpoints

use api_types::expense::{
    ChargeCycleListResponse, ChargeCycleView, ExpenseListResponse, ExpenseNew, ExpenseUpdate,
    ExpenseView, ExpensesDeleted,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{ChargeCycle, Expense, MoneyCents, NewExpense, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_cycle(cycle: ChargeCycle) -> ChargeCycleView {
    ChargeCycleView {
        id: cycle.id,
        unit: cycle.unit,
        days: cycle.days,
    }
}

pub(crate) fn map_expense(expense: Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        budget_id: expense.budget_id,
        name: expense.name,
        value: expense.value.to_string(),
        value_minor: expense.value.cents(),
        description: expense.description,
        expense_charge_cycle: map_cycle(expense.charge_cycle),
        category_id: expense.category_id,
        categories: expense.categories,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
) -> Result<Json<ExpenseListResponse>, ServerError> {
    let expenses = state
        .engine
        .list_expenses_for_budget(budget_id, user.id)
        .await?
        .into_iter()
        .map(map_expense)
        .collect();

    Ok(Json(ExpenseListResponse { expenses }))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let value: MoneyCents = payload.value.parse()?;
    let expense = state
        .engine
        .add_expense(
            NewExpense {
                budget_id,
                name: payload.name,
                value,
                description: payload.description,
                charge_cycle: payload.expense_charge_cycle,
                category_id: payload.category_id,
                categories: payload.categories,
            },
            user.id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(map_expense(expense))))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state
        .engine
        .get_expense_for_user(expense_id, user.id)
        .await?;
    Ok(Json(map_expense(expense)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
    Json(payload): Json<ExpenseUpdate>,
) -> Result<Json<ExpenseView>, ServerError> {
    let value: MoneyCents = payload.value.parse()?;
    let expense = state
        .engine
        .update_expense(
            engine::ExpenseUpdate {
                id: expense_id,
                name: payload.name,
                value,
                description: payload.description,
                charge_cycle: payload.expense_charge_cycle,
                categories: payload.categories,
            },
            user.id,
        )
        .await?;
    Ok(Json(map_expense(expense)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path((budget_id, expense_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_expense(expense_id, budget_id, user.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete every expense of a budget (owner-only).
pub async fn delete_all(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
) -> Result<Json<ExpensesDeleted>, ServerError> {
    let deleted = state
        .engine
        .delete_all_expenses_for_budget(budget_id, user.id)
        .await?;
    Ok(Json(ExpensesDeleted { deleted }))
}

pub async fn charge_cycles(
    Extension(_user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<ChargeCycleListResponse>, ServerError> {
    let charge_cycles = state
        .engine
        .list_cycles()
        .await?
        .into_iter()
        .map(map_cycle)
        .collect();
    Ok(Json(ChargeCycleListResponse { charge_cycles }))
}
