//! Seam between the engine and the external financial-data provider.
//!
//! The engine never talks HTTP itself: an implementation of
//! [`TransactionProvider`] is injected through
//! [`EngineBuilder::provider`](crate::EngineBuilder::provider). Amounts are
//! converted to [`MoneyCents`] by the implementation before they reach the
//! engine.

use std::{future::Future, time::Duration};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::{EngineError, MoneyCents, ResultEngine};

/// Failure reported by a provider implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Request(String),
    #[error("provider rejected the request: {0}")]
    Rejected(String),
    #[error("provider returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// Balances of an account. Amounts the provider does not report stay `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AccountBalances {
    pub available: Option<MoneyCents>,
    pub current: Option<MoneyCents>,
    /// Credit limit, for credit accounts.
    pub limit: Option<MoneyCents>,
    pub iso_currency_code: Option<String>,
}

/// A bank account as reported by the provider.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProviderAccount {
    /// Provider-side account id, matched against
    /// [`ProviderTransaction::account_id`].
    pub account_id: String,
    pub name: String,
    pub official_name: Option<String>,
    /// Last digits of the account number.
    pub mask: Option<String>,
    pub account_type: Option<String>,
    pub subtype: Option<String>,
    pub balances: AccountBalances,
}

impl ProviderAccount {
    /// Display name stored on the external account: official name followed
    /// by the short name.
    pub fn display_name(&self) -> String {
        match self.official_name.as_deref().map(str::trim) {
            Some(official) if !official.is_empty() => {
                format!("{official} {}", self.name.trim()).trim().to_string()
            }
            _ => self.name.trim().to_string(),
        }
    }
}

/// A bank transaction as reported by the provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProviderTransaction {
    pub transaction_id: String,
    pub account_id: String,
    /// Literal description, the key used by category mappings.
    pub name: String,
    /// Positive values are money leaving the account.
    pub amount: MoneyCents,
    /// Posting date, `YYYY-MM-DD`.
    pub date: String,
    /// Provider category hierarchy, most general first.
    pub category: Vec<String>,
}

#[async_trait]
pub trait TransactionProvider: Send + Sync {
    /// Create the short-lived token a client needs to open the provider's
    /// account-linking flow. `client_user_id` identifies the end user.
    async fn create_link_token(&self, client_user_id: &str) -> Result<String, ProviderError>;

    /// Exchange a client-side public token for a long-lived access token.
    async fn exchange_public_token(&self, public_token: &str) -> Result<String, ProviderError>;

    async fn get_accounts(&self, access_token: &str)
    -> Result<Vec<ProviderAccount>, ProviderError>;

    /// Like [`get_accounts`](Self::get_accounts), with balances fetched live
    /// from the institution.
    async fn get_balances(&self, access_token: &str)
    -> Result<Vec<ProviderAccount>, ProviderError>;

    /// Transactions posted between `start` and `end`, both inclusive.
    async fn get_transactions(
        &self,
        access_token: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ProviderTransaction>, ProviderError>;
}

/// Await a provider call, bounding it by `timeout`. Both a timeout and a
/// provider failure surface as [`EngineError::DependencyUnavailable`].
pub(crate) async fn bounded<T, F>(timeout: Duration, call: &str, fut: F) -> ResultEngine<T>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            tracing::warn!("provider call {call} failed: {err}");
            Err(EngineError::DependencyUnavailable(err.to_string()))
        }
        Err(_) => {
            tracing::warn!("provider call {call} timed out after {timeout:?}");
            Err(EngineError::DependencyUnavailable(format!(
                "{call} timed out"
            )))
        }
    }
}
