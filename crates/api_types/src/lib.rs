use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserRegister {
        pub first_name: String,
        pub last_name: String,
        pub email: String,
        pub phone: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub first_name: String,
        pub last_name: String,
        pub email: String,
        pub phone: Option<String>,
        pub registration_date: DateTime<Utc>,
    }
}

pub mod budget {
    use super::*;

    /// Access level of the caller on a budget.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AccessLevel {
        Owner,
        Admin,
        Viewer,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetView {
        pub id: Uuid,
        pub name: String,
        pub owner_id: Uuid,
        pub access: AccessLevel,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetListResponse {
        pub budgets: Vec<BudgetView>,
    }
}

pub mod role {
    use super::*;

    /// Request body for granting a role.
    ///
    /// `role` is matched case-insensitively: "Full Rights" grants admin, any
    /// other value grants view rights.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoleGrant {
        pub user_id: Uuid,
        pub role: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoleView {
        pub budget_id: Uuid,
        pub user_id: Uuid,
        pub role: crate::budget::AccessLevel,
        /// "Owner", "Full Rights" or "View Rights".
        pub display_name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoleListResponse {
        pub roles: Vec<RoleView>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ChargeCycleView {
        pub id: i32,
        pub unit: String,
        pub days: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ChargeCycleListResponse {
        pub charge_cycles: Vec<ChargeCycleView>,
    }

    /// Values are decimal strings in major units, e.g. `"12.34"`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub name: String,
        pub value: String,
        pub description: Option<String>,
        pub expense_charge_cycle: String,
        pub category_id: Option<Uuid>,
        #[serde(default)]
        pub categories: Vec<String>,
    }

    /// Full replacement of an expense. `categories: null` keeps the current
    /// tags, a list replaces them.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub name: String,
        pub value: String,
        pub description: Option<String>,
        pub expense_charge_cycle: String,
        pub categories: Option<Vec<String>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub budget_id: Uuid,
        pub name: String,
        pub value: String,
        pub value_minor: i64,
        pub description: Option<String>,
        pub expense_charge_cycle: ChargeCycleView,
        pub category_id: Option<Uuid>,
        pub categories: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseListResponse {
        pub expenses: Vec<ExpenseView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpensesDeleted {
        pub deleted: u64,
    }
}

pub mod source {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SourceNew {
        pub external_account_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SourceView {
        pub id: Uuid,
        pub budget_id: Uuid,
        pub external_account_id: Uuid,
        pub account_name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SourceListResponse {
        pub sources: Vec<SourceView>,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub budget_id: Uuid,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryListResponse {
        pub categories: Vec<CategoryView>,
    }

    /// Map a literal bank-transaction description to a category name.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Categorize {
        pub transaction_name: String,
        pub category_name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryMappingView {
        pub id: Uuid,
        pub category_id: Uuid,
        pub transaction_name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryMappingListResponse {
        pub mappings: Vec<CategoryMappingView>,
    }
}

pub mod summary {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BankTransactionView {
        pub transaction_id: String,
        pub account_id: String,
        pub name: String,
        pub amount: String,
        pub amount_minor: i64,
        pub date: String,
        pub category: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategorySummaryView {
        pub category_name: String,
        pub running_total: String,
        pub running_total_minor: i64,
        pub transactions: Vec<BankTransactionView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseSummaryResponse {
        pub categories: Vec<CategorySummaryView>,
        pub expenses: Vec<crate::expense::ExpenseView>,
    }
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountLink {
        pub public_token: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: Uuid,
        pub institutional_id: String,
        pub account_name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountListResponse {
        pub accounts: Vec<AccountView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LinkTokenView {
        pub link_token: String,
    }

    /// Amounts are decimal strings in major units, with the matching
    /// `*_minor` integer cents.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalancesView {
        pub available: Option<String>,
        pub available_minor: Option<i64>,
        pub current: Option<String>,
        pub current_minor: Option<i64>,
        pub limit: Option<String>,
        pub limit_minor: Option<i64>,
        pub iso_currency_code: Option<String>,
    }

    /// Live provider view of a linked account.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountDetailsView {
        pub id: Uuid,
        pub institutional_id: String,
        pub name: String,
        pub official_name: Option<String>,
        pub mask: Option<String>,
        pub account_type: Option<String>,
        pub subtype: Option<String>,
        pub balances: BalancesView,
    }

    /// Both bounds are `YYYY-MM-DD` and inclusive. A missing `end` means
    /// today, a missing `start` means 30 days before `end`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionWindow {
        pub start: Option<NaiveDate>,
        pub end: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountTransactionsResponse {
        pub transactions: Vec<crate::summary::BankTransactionView>,
    }
}
