//! Budget access control and expense reconciliation engine.
//!
//! The [`Engine`] owns the database connection and, optionally, a
//! [`TransactionProvider`]. Every operation takes the acting user's id and
//! authorizes it against the budget's role model before touching data.

pub use budget_roles::RoleAssignment;
pub use budgets::{Budget, BudgetAccess};
pub use categories::Category;
pub use category_mappings::CategoryMapping;
pub use charge_cycles::ChargeCycle;
pub use crypto::{TOKEN_KEY_SIZE, TokenCipher};
pub use error::EngineError;
pub use expenses::{Expense, ExpenseUpdate, NewExpense};
pub use external_accounts::ExternalAccount;
pub use money::MoneyCents;
pub use ops::{
    BudgetRole, CategorySummary, Engine, EngineBuilder, ExpenseSummary, SUMMARY_WINDOW_DAYS,
    UNCATEGORIZED,
};
pub use provider::{
    AccountBalances, ProviderAccount, ProviderError, ProviderTransaction, TransactionProvider,
};
pub use sources::{Source, SourceView};
pub use users::{User, UserProfile};

mod budget_roles;
mod budgets;
mod categories;
mod category_mappings;
mod charge_cycles;
mod crypto;
mod error;
mod expense_categories;
mod expenses;
mod external_accounts;
mod money;
mod ops;
mod provider;
mod sources;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
