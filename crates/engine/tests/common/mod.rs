#![allow(dead_code)]

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};

use engine::{
    AccountBalances, Engine, MoneyCents, ProviderAccount, ProviderError, ProviderTransaction,
    TOKEN_KEY_SIZE, TokenCipher, TransactionProvider, User, UserProfile,
};
use migration::MigratorTrait;

/// In-memory provider returning canned accounts and transactions.
#[derive(Default)]
pub struct FakeProvider {
    pub accounts: Vec<ProviderAccount>,
    pub transactions: Vec<ProviderTransaction>,
    pub failing: AtomicBool,
    pub delay: Option<Duration>,
    pub transaction_calls: AtomicUsize,
    pub last_window: Mutex<Option<(NaiveDate, NaiveDate)>>,
    /// Access token of the latest account, balance or transaction call.
    pub last_access_token: Mutex<Option<String>>,
}

impl FakeProvider {
    fn seen(&self, access_token: &str) {
        *self.last_access_token.lock().unwrap() = Some(access_token.to_string());
    }
}

#[async_trait]
impl TransactionProvider for FakeProvider {
    async fn create_link_token(&self, client_user_id: &str) -> Result<String, ProviderError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ProviderError::Request("connection reset".to_string()));
        }
        Ok(format!("link-sandbox-{client_user_id}"))
    }

    async fn exchange_public_token(&self, public_token: &str) -> Result<String, ProviderError> {
        if public_token == "public-invalid" {
            return Err(ProviderError::Rejected("INVALID_PUBLIC_TOKEN".to_string()));
        }
        Ok(format!("access-{public_token}"))
    }

    async fn get_accounts(&self, access_token: &str) -> Result<Vec<ProviderAccount>, ProviderError> {
        self.seen(access_token);
        Ok(self.accounts.clone())
    }

    async fn get_balances(&self, access_token: &str) -> Result<Vec<ProviderAccount>, ProviderError> {
        self.seen(access_token);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ProviderError::Request("connection reset".to_string()));
        }
        Ok(self
            .accounts
            .iter()
            .cloned()
            .map(|account| ProviderAccount {
                balances: AccountBalances {
                    available: Some(MoneyCents::new(100_00)),
                    current: Some(MoneyCents::new(110_00)),
                    limit: None,
                    iso_currency_code: Some("USD".to_string()),
                },
                ..account
            })
            .collect())
    }

    async fn get_transactions(
        &self,
        access_token: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ProviderTransaction>, ProviderError> {
        self.seen(access_token);
        self.transaction_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_window.lock().unwrap() = Some((start, end));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(ProviderError::Request("connection reset".to_string()));
        }
        Ok(self.transactions.clone())
    }
}

pub fn account(account_id: &str, name: &str, official_name: Option<&str>) -> ProviderAccount {
    ProviderAccount {
        account_id: account_id.to_string(),
        name: name.to_string(),
        official_name: official_name.map(ToString::to_string),
        ..ProviderAccount::default()
    }
}

pub fn bank_tx(account_id: &str, name: &str, cents: i64, category: &[&str]) -> ProviderTransaction {
    ProviderTransaction {
        transaction_id: format!("{account_id}-{name}-{cents}"),
        account_id: account_id.to_string(),
        name: name.to_string(),
        amount: MoneyCents::new(cents),
        date: "2024-05-10".to_string(),
        category: category.iter().map(ToString::to_string).collect(),
    }
}

pub async fn database() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

pub async fn engine() -> Engine {
    Engine::builder()
        .database(database().await)
        .build()
        .await
        .unwrap()
}

pub fn token_cipher() -> TokenCipher {
    TokenCipher::new(&[42; TOKEN_KEY_SIZE])
}

pub async fn engine_with_provider(provider: Arc<FakeProvider>) -> Engine {
    engine_on(database().await, provider).await
}

/// Engine sharing `db` with the test, so the test can inspect or sabotage
/// the tables directly.
pub async fn engine_on(db: DatabaseConnection, provider: Arc<FakeProvider>) -> Engine {
    Engine::builder()
        .database(db)
        .provider(provider)
        .provider_timeout(Duration::from_millis(200))
        .token_cipher(token_cipher())
        .build()
        .await
        .unwrap()
}

/// Make every DELETE on `table` fail.
pub async fn block_deletes(db: &DatabaseConnection, table: &str) {
    db.execute_unprepared(&format!(
        "CREATE TRIGGER block_{table}_deletes BEFORE DELETE ON {table} \
         BEGIN SELECT RAISE(ABORT, 'deletes on {table} are blocked'); END;"
    ))
    .await
    .unwrap();
}

pub async fn register(engine: &Engine, name: &str) -> User {
    engine
        .register_user(
            &format!("ext-{name}"),
            UserProfile {
                first_name: name.to_string(),
                last_name: "Tester".to_string(),
                email: format!("{name}@example.com"),
                phone: None,
            },
        )
        .await
        .unwrap()
}
