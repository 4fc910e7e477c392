use std::{sync::Arc, time::Duration};

use sea_orm::DatabaseConnection;

use crate::{EngineError, ResultEngine, TokenCipher, TransactionProvider};

mod access;
mod accounts;
mod budgets;
mod categories;
mod charge_cycles;
mod expenses;
mod roles;
mod sources;
mod summary;
mod users;

pub use access::BudgetRole;
pub use summary::{CategorySummary, ExpenseSummary, SUMMARY_WINDOW_DAYS, UNCATEGORIZED};

const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

pub struct Engine {
    database: DatabaseConnection,
    provider: Option<Arc<dyn TransactionProvider>>,
    provider_timeout: Duration,
    token_cipher: Option<TokenCipher>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    fn provider(&self) -> ResultEngine<&dyn TransactionProvider> {
        self.provider.as_deref().ok_or_else(|| {
            EngineError::DependencyUnavailable("no transaction provider configured".to_string())
        })
    }

    fn token_cipher(&self) -> ResultEngine<&TokenCipher> {
        self.token_cipher.as_ref().ok_or_else(|| {
            EngineError::DependencyUnavailable("no access token key configured".to_string())
        })
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    provider: Option<Arc<dyn TransactionProvider>>,
    provider_timeout: Option<Duration>,
    token_cipher: Option<TokenCipher>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Pass the financial-data provider used for account linking and
    /// summaries.
    pub fn provider(mut self, provider: Arc<dyn TransactionProvider>) -> EngineBuilder {
        self.provider = Some(provider);
        self
    }

    /// Upper bound for every single provider call. Defaults to 10 seconds.
    pub fn provider_timeout(mut self, timeout: Duration) -> EngineBuilder {
        self.provider_timeout = Some(timeout);
        self
    }

    /// Cipher sealing provider access tokens before they are stored.
    pub fn token_cipher(mut self, cipher: TokenCipher) -> EngineBuilder {
        self.token_cipher = Some(cipher);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        if self.provider.is_none() {
            tracing::warn!("engine built without a transaction provider");
        }
        if self.provider.is_some() && self.token_cipher.is_none() {
            tracing::warn!("engine built without an access token key, linking is disabled");
        }
        Ok(Engine {
            database: self.database,
            provider: self.provider,
            provider_timeout: self.provider_timeout.unwrap_or(DEFAULT_PROVIDER_TIMEOUT),
            token_cipher: self.token_cipher,
        })
    }
}
