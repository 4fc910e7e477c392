use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use engine::{ProviderAccount, ProviderError, ProviderTransaction, TransactionProvider};
use reqwest::{Client, StatusCode};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    PlaidEnvironment,
    wire::{
        AccountsGet, AccountsGetResponse, ErrorBody, LinkTokenCreate, LinkTokenCreateResponse,
        LinkTokenUser, PublicTokenExchange, PublicTokenExchangeResponse, TransactionsGet,
        TransactionsGetOptions, TransactionsGetResponse,
    },
};

/// Largest page `/transactions/get` serves.
const PAGE_SIZE: u32 = 500;

#[derive(Debug, thiserror::Error)]
pub enum PlaidError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{status}: {code}: {message}")]
    Api {
        status: StatusCode,
        code: String,
        message: String,
    },
    #[error("unreadable amount {amount} in transaction {transaction_id}")]
    Amount { transaction_id: String, amount: f64 },
}

impl From<PlaidError> for ProviderError {
    fn from(err: PlaidError) -> Self {
        match err {
            PlaidError::Network(err) => ProviderError::Request(err.to_string()),
            PlaidError::Api { code, message, .. } => {
                ProviderError::Rejected(format!("{code}: {message}"))
            }
            err @ PlaidError::Amount { .. } => ProviderError::InvalidResponse(err.to_string()),
        }
    }
}

/// What Link shows and asks for when a user connects a bank.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkConfig {
    pub client_name: String,
    pub products: Vec<String>,
    pub country_codes: Vec<String>,
    pub language: String,
    pub redirect_uri: Option<String>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            client_name: "Finlit".to_string(),
            products: vec!["transactions".to_string()],
            country_codes: vec!["US".to_string()],
            language: "en".to_string(),
            redirect_uri: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PlaidClient {
    client: Client,
    base_url: String,
    client_id: String,
    secret: String,
    link: LinkConfig,
}

impl PlaidClient {
    pub fn new(
        environment: PlaidEnvironment,
        client_id: String,
        secret: String,
        timeout: Duration,
    ) -> Result<Self, PlaidError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: environment.base_url(),
            client_id,
            secret,
            link: LinkConfig::default(),
        })
    }

    pub fn with_link_config(mut self, link: LinkConfig) -> Self {
        self.link = link;
        self
    }

    /// Point the client at another host, e.g. a local mock.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn post_json<TReq: Serialize + ?Sized, TResp: DeserializeOwned>(
        &self,
        path: &str,
        body: &TReq,
    ) -> Result<TResp, PlaidError> {
        let resp = self.client.post(self.url(path)).json(body).send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json::<TResp>().await?);
        }

        let (code, message) = match resp.json::<ErrorBody>().await {
            Ok(err) => (err.error_code, err.error_message),
            Err(_) => ("UNKNOWN".to_string(), "plaid error".to_string()),
        };
        tracing::warn!("plaid {path} failed with {status}: {code}");
        Err(PlaidError::Api {
            status,
            code,
            message,
        })
    }

    pub async fn exchange_token(&self, public_token: &str) -> Result<String, PlaidError> {
        let resp: PublicTokenExchangeResponse = self
            .post_json(
                "/item/public_token/exchange",
                &PublicTokenExchange {
                    client_id: &self.client_id,
                    secret: &self.secret,
                    public_token,
                },
            )
            .await?;
        Ok(resp.access_token)
    }

    pub async fn link_token(&self, client_user_id: &str) -> Result<String, PlaidError> {
        let resp: LinkTokenCreateResponse = self
            .post_json(
                "/link/token/create",
                &LinkTokenCreate {
                    client_id: &self.client_id,
                    secret: &self.secret,
                    client_name: &self.link.client_name,
                    user: LinkTokenUser { client_user_id },
                    products: &self.link.products,
                    country_codes: &self.link.country_codes,
                    language: &self.link.language,
                    redirect_uri: self.link.redirect_uri.as_deref(),
                },
            )
            .await?;
        Ok(resp.link_token)
    }

    pub async fn accounts(&self, access_token: &str) -> Result<Vec<ProviderAccount>, PlaidError> {
        self.accounts_from("/accounts/get", access_token).await
    }

    /// Accounts with balances Plaid fetches live from the institution.
    pub async fn balances(&self, access_token: &str) -> Result<Vec<ProviderAccount>, PlaidError> {
        self.accounts_from("/accounts/balance/get", access_token).await
    }

    async fn accounts_from(
        &self,
        path: &str,
        access_token: &str,
    ) -> Result<Vec<ProviderAccount>, PlaidError> {
        let resp: AccountsGetResponse = self
            .post_json(
                path,
                &AccountsGet {
                    client_id: &self.client_id,
                    secret: &self.secret,
                    access_token,
                },
            )
            .await?;
        Ok(resp.accounts.into_iter().map(ProviderAccount::from).collect())
    }

    /// Every transaction of the item dated within `[start, end]`, following
    /// pagination until `total_transactions` rows were read.
    pub async fn transactions(
        &self,
        access_token: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ProviderTransaction>, PlaidError> {
        let mut out = Vec::new();
        loop {
            let offset = u32::try_from(out.len()).unwrap_or(u32::MAX);
            let resp: TransactionsGetResponse = self
                .post_json(
                    "/transactions/get",
                    &TransactionsGet {
                        client_id: &self.client_id,
                        secret: &self.secret,
                        access_token,
                        start_date: start.format("%Y-%m-%d").to_string(),
                        end_date: end.format("%Y-%m-%d").to_string(),
                        options: TransactionsGetOptions {
                            count: PAGE_SIZE,
                            offset,
                        },
                    },
                )
                .await?;

            let page_len = resp.transactions.len();
            for tx in resp.transactions {
                let (transaction_id, amount) = (tx.transaction_id.clone(), tx.amount);
                out.push(
                    tx.into_provider()
                        .ok_or(PlaidError::Amount {
                            transaction_id,
                            amount,
                        })?,
                );
            }

            if page_len == 0 || out.len() >= resp.total_transactions as usize {
                break;
            }
        }
        tracing::debug!("fetched {} plaid transactions", out.len());
        Ok(out)
    }
}

#[async_trait]
impl TransactionProvider for PlaidClient {
    async fn create_link_token(&self, client_user_id: &str) -> Result<String, ProviderError> {
        Ok(self.link_token(client_user_id).await?)
    }

    async fn exchange_public_token(&self, public_token: &str) -> Result<String, ProviderError> {
        Ok(self.exchange_token(public_token).await?)
    }

    async fn get_accounts(&self, access_token: &str) -> Result<Vec<ProviderAccount>, ProviderError> {
        Ok(self.accounts(access_token).await?)
    }

    async fn get_balances(&self, access_token: &str) -> Result<Vec<ProviderAccount>, ProviderError> {
        Ok(self.balances(access_token).await?)
    }

    async fn get_transactions(
        &self,
        access_token: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ProviderTransaction>, ProviderError> {
        Ok(self.transactions(access_token, start, end).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> PlaidClient {
        PlaidClient::new(
            PlaidEnvironment::Sandbox,
            "client".to_string(),
            "secret".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn urls_join_without_double_slashes() {
        let client = client().with_base_url("http://localhost:9000/");
        assert_eq!(
            client.url("/accounts/get"),
            "http://localhost:9000/accounts/get"
        );
    }

    #[test]
    fn link_config_defaults_to_us_transactions() {
        let link = LinkConfig::default();
        assert_eq!(link.products, vec!["transactions"]);
        assert_eq!(link.country_codes, vec!["US"]);
        assert_eq!(link.redirect_uri, None);

        let custom = LinkConfig {
            redirect_uri: Some("https://app.example.com/oauth".to_string()),
            ..LinkConfig::default()
        };
        let client = client().with_link_config(custom.clone());
        assert_eq!(client.link, custom);
    }

    #[test]
    fn api_errors_become_rejections() {
        let err = PlaidError::Api {
            status: StatusCode::BAD_REQUEST,
            code: "INVALID_PUBLIC_TOKEN".to_string(),
            message: "provided public token is in an invalid format".to_string(),
        };
        assert_eq!(
            ProviderError::from(err),
            ProviderError::Rejected(
                "INVALID_PUBLIC_TOKEN: provided public token is in an invalid format".to_string()
            )
        );

        let err = PlaidError::Amount {
            transaction_id: "t".to_string(),
            amount: f64::NAN,
        };
        assert!(matches!(
            ProviderError::from(err),
            ProviderError::InvalidResponse(_)
        ));
    }
}
