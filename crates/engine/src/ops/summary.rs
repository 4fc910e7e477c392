use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate};
use sea_orm::TransactionTrait;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    EngineError, Expense, MoneyCents, ProviderTransaction, ResultEngine, external_accounts,
    provider::bounded,
};

use super::{
    Engine, categories::mapping_lookup, expenses::expenses_in_budget, sources::source_accounts,
    with_tx,
};

/// Bucket collecting every spend transaction without a mapping.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Length of the provider window ending today.
pub const SUMMARY_WINDOW_DAYS: i64 = 30;

/// Provider primary categories that move money without spending it.
const NON_SPEND_CATEGORIES: [&str; 2] = ["Payment", "Transfer"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub category_name: String,
    pub running_total: MoneyCents,
    pub transactions: Vec<ProviderTransaction>,
}

impl CategorySummary {
    fn empty(category_name: &str) -> Self {
        Self {
            category_name: category_name.to_string(),
            running_total: MoneyCents::ZERO,
            transactions: Vec::new(),
        }
    }
}

/// Spend per category over the last [`SUMMARY_WINDOW_DAYS`] days plus the
/// budget's declared expenses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExpenseSummary {
    /// Sorted by category name. Always contains [`UNCATEGORIZED`].
    pub categories: Vec<CategorySummary>,
    pub expenses: Vec<Expense>,
}

struct SummaryInputs {
    accounts: Vec<external_accounts::Model>,
    mappings: HashMap<String, String>,
    expenses: Vec<Expense>,
}

impl Engine {
    /// Summarize live bank spend for a budget (owner or admin).
    ///
    /// Transactions are fetched from every linked source for the window
    /// `[today - 30 days, today]`, one source at a time. Any provider failure
    /// aborts the whole summary.
    pub async fn budget_expense_summary(
        &self,
        budget_id: Uuid,
        user_id: Uuid,
        today: NaiveDate,
    ) -> ResultEngine<ExpenseSummary> {
        let inputs = self.summary_inputs(budget_id, user_id).await?;

        let start = today - Duration::days(SUMMARY_WINDOW_DAYS);
        let accounts = self.open_tokens(inputs.accounts)?;
        let mut transactions = Vec::new();
        if !accounts.is_empty() {
            let provider = self.provider()?;
            for (account, access_token) in &accounts {
                let fetched = bounded(
                    self.provider_timeout,
                    "get_transactions",
                    provider.get_transactions(access_token, start, today),
                )
                .await?;
                transactions.extend(
                    fetched
                        .into_iter()
                        .filter(|tx| tx.account_id == account.institutional_id),
                );
            }
        }
        tracing::debug!(
            "summarizing {} transactions from {} sources for budget {budget_id}",
            transactions.len(),
            accounts.len()
        );

        Ok(ExpenseSummary {
            categories: categorize(transactions, &inputs.mappings)?,
            expenses: inputs.expenses,
        })
    }

    /// Everything the summary needs from the store, read in one DB
    /// transaction that is committed before the provider is called.
    async fn summary_inputs(&self, budget_id: Uuid, user_id: Uuid) -> ResultEngine<SummaryInputs> {
        with_tx!(self, |db_tx| {
            self.require_budget_write(&db_tx, budget_id, user_id, EngineError::Forbidden)
                .await?;
            Ok(SummaryInputs {
                accounts: source_accounts(&db_tx, budget_id).await?,
                mappings: mapping_lookup(&db_tx, budget_id).await?,
                expenses: expenses_in_budget(&db_tx, budget_id).await?,
            })
        })
    }
}

fn counts_as_spend(tx: &ProviderTransaction) -> bool {
    if !tx.amount.is_positive() {
        return false;
    }
    !tx.category
        .first()
        .is_some_and(|primary| NON_SPEND_CATEGORIES.contains(&primary.as_str()))
}

/// Bucket spend transactions by mapped category name.
fn categorize(
    transactions: Vec<ProviderTransaction>,
    mappings: &HashMap<String, String>,
) -> ResultEngine<Vec<CategorySummary>> {
    let mut buckets: BTreeMap<String, CategorySummary> = BTreeMap::new();
    buckets.insert(
        UNCATEGORIZED.to_string(),
        CategorySummary::empty(UNCATEGORIZED),
    );

    for tx in transactions.into_iter().filter(counts_as_spend) {
        let name = mappings
            .get(tx.name.trim())
            .map_or(UNCATEGORIZED, String::as_str);
        let bucket = buckets
            .entry(name.to_string())
            .or_insert_with(|| CategorySummary::empty(name));
        bucket.running_total = bucket
            .running_total
            .checked_add(tx.amount)
            .ok_or_else(|| {
                EngineError::DependencyUnavailable(format!(
                    "running total of {name} overflows at transaction {}",
                    tx.transaction_id
                ))
            })?;
        bucket.transactions.push(tx);
    }

    Ok(buckets.into_values().collect())
}
