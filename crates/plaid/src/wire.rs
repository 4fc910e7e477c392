//! Request and response bodies of the Plaid endpoints we call.

use engine::{AccountBalances, MoneyCents, ProviderAccount, ProviderTransaction};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct PublicTokenExchange<'a> {
    pub client_id: &'a str,
    pub secret: &'a str,
    pub public_token: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PublicTokenExchangeResponse {
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct LinkTokenCreate<'a> {
    pub client_id: &'a str,
    pub secret: &'a str,
    pub client_name: &'a str,
    pub user: LinkTokenUser<'a>,
    pub products: &'a [String],
    pub country_codes: &'a [String],
    pub language: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LinkTokenUser<'a> {
    pub client_user_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LinkTokenCreateResponse {
    pub link_token: String,
}

/// Body of both `/accounts/get` and `/accounts/balance/get`.
#[derive(Debug, Serialize)]
pub(crate) struct AccountsGet<'a> {
    pub client_id: &'a str,
    pub secret: &'a str,
    pub access_token: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccountsGetResponse {
    pub accounts: Vec<Account>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Account {
    pub account_id: String,
    pub name: String,
    #[serde(default)]
    pub official_name: Option<String>,
    #[serde(default)]
    pub mask: Option<String>,
    #[serde(default, rename = "type")]
    pub account_type: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub balances: Balances,
}

/// Major units, as Plaid reports them.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Balances {
    #[serde(default)]
    pub available: Option<f64>,
    #[serde(default)]
    pub current: Option<f64>,
    #[serde(default)]
    pub limit: Option<f64>,
    #[serde(default)]
    pub iso_currency_code: Option<String>,
}

impl From<Balances> for AccountBalances {
    fn from(balances: Balances) -> Self {
        Self {
            available: balances.available.and_then(MoneyCents::from_major),
            current: balances.current.and_then(MoneyCents::from_major),
            limit: balances.limit.and_then(MoneyCents::from_major),
            iso_currency_code: balances.iso_currency_code,
        }
    }
}

impl From<Account> for ProviderAccount {
    fn from(account: Account) -> Self {
        Self {
            account_id: account.account_id,
            name: account.name,
            official_name: account.official_name,
            mask: account.mask,
            account_type: account.account_type,
            subtype: account.subtype,
            balances: account.balances.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TransactionsGet<'a> {
    pub client_id: &'a str,
    pub secret: &'a str,
    pub access_token: &'a str,
    pub start_date: String,
    pub end_date: String,
    pub options: TransactionsGetOptions,
}

#[derive(Debug, Serialize)]
pub(crate) struct TransactionsGetOptions {
    pub count: u32,
    pub offset: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransactionsGetResponse {
    pub transactions: Vec<Transaction>,
    pub total_transactions: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Transaction {
    pub transaction_id: String,
    pub account_id: String,
    pub name: String,
    /// Major units; positive values are money leaving the account.
    pub amount: f64,
    pub date: String,
    #[serde(default)]
    pub category: Option<Vec<String>>,
}

impl Transaction {
    pub(crate) fn into_provider(self) -> Option<ProviderTransaction> {
        let amount = MoneyCents::from_major(self.amount)?;
        Some(ProviderTransaction {
            transaction_id: self.transaction_id,
            account_id: self.account_id,
            name: self.name,
            amount,
            date: self.date,
            category: self.category.unwrap_or_default(),
        })
    }
}

/// Error body Plaid returns with every non-2xx status.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error_code: String,
    pub error_message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_amounts_become_cents() {
        let tx: Transaction = serde_json::from_str(
            r#"{
                "transaction_id": "lPNjeW1nR6CDn5okmGQ6hEpMo4lLNoSrzqDje",
                "account_id": "BxBXxLj1m4HMXBm9WZZmCWVbPjX16EHwv99vp",
                "name": "Uber 063015 SF**POOL**",
                "amount": 5.4,
                "date": "2024-05-10",
                "category": ["Travel", "Taxi"],
                "pending": false
            }"#,
        )
        .unwrap();
        let tx = tx.into_provider().unwrap();
        assert_eq!(tx.amount, MoneyCents::new(540));
        assert_eq!(tx.category, vec!["Travel", "Taxi"]);
    }

    #[test]
    fn missing_category_is_empty() {
        let tx: Transaction = serde_json::from_str(
            r#"{"transaction_id": "t", "account_id": "a", "name": "Deposit",
                "amount": -500, "date": "2024-05-01", "category": null}"#,
        )
        .unwrap();
        let tx = tx.into_provider().unwrap();
        assert!(tx.category.is_empty());
        assert_eq!(tx.amount, MoneyCents::new(-50_000));
    }

    #[test]
    fn accounts_without_official_name_parse() {
        let body: AccountsGetResponse = serde_json::from_str(
            r#"{"accounts": [{"account_id": "a", "name": "Plaid Saving", "mask": "1111"}],
                "request_id": "r"}"#,
        )
        .unwrap();
        let account = ProviderAccount::from(body.accounts.into_iter().next().unwrap());
        assert_eq!(account.display_name(), "Plaid Saving");
    }

    #[test]
    fn balances_become_cents() {
        let body: AccountsGetResponse = serde_json::from_str(
            r#"{"accounts": [{
                    "account_id": "a", "name": "Plaid Credit Card", "mask": "3333",
                    "type": "credit", "subtype": "credit card",
                    "balances": {"available": null, "current": 410.5, "limit": 2000,
                                 "iso_currency_code": "USD"}
                }],
                "request_id": "r"}"#,
        )
        .unwrap();
        let account = ProviderAccount::from(body.accounts.into_iter().next().unwrap());
        assert_eq!(account.account_type.as_deref(), Some("credit"));
        assert_eq!(account.mask.as_deref(), Some("3333"));
        assert_eq!(account.balances.available, None);
        assert_eq!(account.balances.current, Some(MoneyCents::new(41_050)));
        assert_eq!(account.balances.limit, Some(MoneyCents::new(200_000)));
    }

    #[test]
    fn link_token_request_omits_missing_redirect() {
        let products = vec!["transactions".to_string()];
        let country_codes = vec!["US".to_string(), "CA".to_string()];
        let body = LinkTokenCreate {
            client_id: "id",
            secret: "secret",
            client_name: "Finlit",
            user: LinkTokenUser {
                client_user_id: "user-1",
            },
            products: &products,
            country_codes: &country_codes,
            language: "en",
            redirect_uri: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["user"]["client_user_id"], "user-1");
        assert_eq!(json["country_codes"][1], "CA");
        assert!(json.get("redirect_uri").is_none());
    }

    #[test]
    fn transactions_request_serializes_dates_and_paging() {
        let body = TransactionsGet {
            client_id: "id",
            secret: "secret",
            access_token: "access-sandbox",
            start_date: "2024-05-01".to_string(),
            end_date: "2024-05-31".to_string(),
            options: TransactionsGetOptions {
                count: 500,
                offset: 0,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["start_date"], "2024-05-01");
        assert_eq!(json["options"]["count"], 500);
    }
}
