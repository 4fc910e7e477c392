use chrono::NaiveDate;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, ExternalAccount, ProviderAccount, ProviderTransaction, ResultEngine,
    external_accounts, provider::bounded, sources,
};

use super::{Engine, with_tx};

impl Engine {
    /// Create a link token so the user's client can start the provider's
    /// account-linking flow. The flow ends with the public token consumed by
    /// [`link_external_accounts`](Self::link_external_accounts).
    pub async fn create_link_token(&self, user_id: Uuid) -> ResultEngine<String> {
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;
            Ok::<_, EngineError>(())
        })?;

        let provider = self.provider()?;
        bounded(
            self.provider_timeout,
            "create_link_token",
            provider.create_link_token(&user_id.to_string()),
        )
        .await
    }

    /// Exchange a provider public token and register every account it grants
    /// access to.
    ///
    /// Provider calls happen before the DB transaction is opened. The access
    /// token is sealed before it is stored.
    pub async fn link_external_accounts(
        &self,
        user_id: Uuid,
        public_token: &str,
    ) -> ResultEngine<Vec<ExternalAccount>> {
        let public_token = public_token.trim();
        if public_token.is_empty() {
            return Err(EngineError::InvalidId(
                "public token must not be empty".to_string(),
            ));
        }

        let provider = self.provider()?;
        let cipher = self.token_cipher()?;
        let access_token = bounded(
            self.provider_timeout,
            "exchange_public_token",
            provider.exchange_public_token(public_token),
        )
        .await?;
        let accounts = bounded(
            self.provider_timeout,
            "get_accounts",
            provider.get_accounts(&access_token),
        )
        .await?;

        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;

            let mut linked = Vec::with_capacity(accounts.len());
            for account in &accounts {
                let model = external_accounts::ActiveModel {
                    id: ActiveValue::Set(Uuid::new_v4()),
                    user_id: ActiveValue::Set(user_id),
                    institutional_id: ActiveValue::Set(account.account_id.clone()),
                    access_token: ActiveValue::Set(cipher.seal(&access_token)?),
                    account_name: ActiveValue::Set(account.display_name()),
                }
                .insert(&db_tx)
                .await?;
                linked.push(ExternalAccount::from(model));
            }
            tracing::info!("linked {} external accounts for {user_id}", linked.len());

            Ok(linked)
        })
    }

    pub async fn list_external_accounts(&self, user_id: Uuid) -> ResultEngine<Vec<ExternalAccount>> {
        Ok(external_accounts::Entity::find()
            .filter(external_accounts::Column::UserId.eq(user_id))
            .order_by_asc(external_accounts::Column::AccountName)
            .all(&self.database)
            .await?
            .into_iter()
            .map(ExternalAccount::from)
            .collect())
    }

    /// Live provider details of one of the user's accounts.
    pub async fn account_information(
        &self,
        account_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<ProviderAccount> {
        let (account, access_token) = self.owned_account_token(account_id, user_id).await?;
        let provider = self.provider()?;
        let reported = bounded(
            self.provider_timeout,
            "get_accounts",
            provider.get_accounts(&access_token),
        )
        .await?;
        matching_account(reported, &account)
    }

    /// Like [`account_information`](Self::account_information), with
    /// balances refreshed by the institution.
    pub async fn account_balances(
        &self,
        account_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<ProviderAccount> {
        let (account, access_token) = self.owned_account_token(account_id, user_id).await?;
        let provider = self.provider()?;
        let reported = bounded(
            self.provider_timeout,
            "get_balances",
            provider.get_balances(&access_token),
        )
        .await?;
        matching_account(reported, &account)
    }

    /// Transactions of one of the user's accounts posted between `start` and
    /// `end`, both inclusive.
    pub async fn account_transactions(
        &self,
        account_id: Uuid,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ResultEngine<Vec<ProviderTransaction>> {
        if start > end {
            return Err(EngineError::InvalidDateRange(format!(
                "start {start} is after end {end}"
            )));
        }
        let (account, access_token) = self.owned_account_token(account_id, user_id).await?;
        let provider = self.provider()?;
        let fetched = bounded(
            self.provider_timeout,
            "get_transactions",
            provider.get_transactions(&access_token, start, end),
        )
        .await?;
        Ok(fetched
            .into_iter()
            .filter(|tx| tx.account_id == account.institutional_id)
            .collect())
    }

    /// Delete an external account owned by the user, unlinking it from every
    /// budget.
    pub async fn delete_external_account(
        &self,
        account_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            require_owned_account(&db_tx, account_id, user_id).await?;

            sources::Entity::delete_many()
                .filter(sources::Column::ExternalAccountId.eq(account_id))
                .exec(&db_tx)
                .await?;
            external_accounts::Entity::delete_by_id(account_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// The user's account and its opened access token. The DB transaction is
    /// committed before the caller goes to the provider.
    async fn owned_account_token(
        &self,
        account_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<(external_accounts::Model, String)> {
        let account = with_tx!(self, |db_tx| {
            require_owned_account(&db_tx, account_id, user_id).await
        })?;
        let access_token = self.token_cipher()?.open(&account.access_token)?;
        Ok((account, access_token))
    }

    /// Open the access tokens of the given accounts.
    pub(super) fn open_tokens(
        &self,
        accounts: Vec<external_accounts::Model>,
    ) -> ResultEngine<Vec<(external_accounts::Model, String)>> {
        if accounts.is_empty() {
            return Ok(Vec::new());
        }
        let cipher = self.token_cipher()?;
        accounts
            .into_iter()
            .map(|account| {
                cipher
                    .open(&account.access_token)
                    .map(|token| (account, token))
            })
            .collect()
    }
}

async fn require_owned_account(
    db: &DatabaseTransaction,
    account_id: Uuid,
    user_id: Uuid,
) -> ResultEngine<external_accounts::Model> {
    let account = external_accounts::Entity::find_by_id(account_id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("external account not exists".to_string()))?;
    if account.user_id != user_id {
        return Err(EngineError::Forbidden(
            "external account belongs to another user".to_string(),
        ));
    }
    Ok(account)
}

fn matching_account(
    reported: Vec<ProviderAccount>,
    account: &external_accounts::Model,
) -> ResultEngine<ProviderAccount> {
    reported
        .into_iter()
        .find(|candidate| candidate.account_id == account.institutional_id)
        .ok_or_else(|| {
            EngineError::KeyNotFound(format!(
                "account {} no longer reported by the provider",
                account.institutional_id
            ))
        })
}
