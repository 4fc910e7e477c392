//! Expense summary endpoint

use api_types::summary::{BankTransactionView, CategorySummaryView, ExpenseSummaryResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::Local;
use engine::{CategorySummary, ProviderTransaction, User};
use uuid::Uuid;

use crate::{ServerError, expenses::map_expense, server::ServerState};

pub(crate) fn map_transaction(tx: ProviderTransaction) -> BankTransactionView {
    BankTransactionView {
        transaction_id: tx.transaction_id,
        account_id: tx.account_id,
        name: tx.name,
        amount: tx.amount.to_string(),
        amount_minor: tx.amount.cents(),
        date: tx.date,
        category: tx.category,
    }
}

fn map_bucket(bucket: CategorySummary) -> CategorySummaryView {
    CategorySummaryView {
        category_name: bucket.category_name,
        running_total: bucket.running_total.to_string(),
        running_total_minor: bucket.running_total.cents(),
        transactions: bucket.transactions.into_iter().map(map_transaction).collect(),
    }
}

/// Spend of the last 30 days per category, plus the declared expenses.
pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
) -> Result<Json<ExpenseSummaryResponse>, ServerError> {
    let today = Local::now().date_naive();
    let summary = state
        .engine
        .budget_expense_summary(budget_id, user.id, today)
        .await?;

    Ok(Json(ExpenseSummaryResponse {
        categories: summary.categories.into_iter().map(map_bucket).collect(),
        expenses: summary.expenses.into_iter().map(map_expense).collect(),
    }))
}
