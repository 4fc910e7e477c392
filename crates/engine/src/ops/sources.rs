use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Source, SourceView, external_accounts, sources,
};

use super::{Engine, with_tx};

impl Engine {
    /// Link an external account to a budget (owner or admin).
    ///
    /// The account's owner must also be owner or admin of the budget, so a
    /// budget admin cannot attach somebody else's bank account.
    pub async fn create_source(
        &self,
        budget_id: Uuid,
        external_account_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Source> {
        with_tx!(self, |db_tx| {
            let budget = self
                .require_budget_write(&db_tx, budget_id, user_id, EngineError::Forbidden)
                .await?;

            let account = external_accounts::Entity::find_by_id(external_account_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound("external account not exists".to_string())
                })?;
            let account_owner_can_write = self
                .budget_role(&db_tx, &budget, account.user_id)
                .await?
                .is_some_and(|role| role.can_write());
            if !account_owner_can_write {
                return Err(EngineError::Forbidden(
                    "account owner has no write access to budget".to_string(),
                ));
            }

            let exists = sources::Entity::find()
                .filter(sources::Column::BudgetId.eq(budget_id))
                .filter(sources::Column::ExternalAccountId.eq(external_account_id))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(external_account_id.to_string()));
            }

            let model = sources::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                budget_id: ActiveValue::Set(budget_id),
                external_account_id: ActiveValue::Set(external_account_id),
            }
            .insert(&db_tx)
            .await?;

            Ok(Source::from(model))
        })
    }

    /// Sources of a budget with the linked account names (owner, admin or
    /// viewer).
    pub async fn list_sources(
        &self,
        budget_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Vec<SourceView>> {
        with_tx!(self, |db_tx| {
            self.require_budget_read(&db_tx, budget_id, user_id, EngineError::Forbidden)
                .await?;

            let rows = sources::Entity::find()
                .filter(sources::Column::BudgetId.eq(budget_id))
                .order_by_asc(sources::Column::Id)
                .find_also_related(external_accounts::Entity)
                .all(&db_tx)
                .await?;
            Ok(rows
                .into_iter()
                .filter_map(|(source, account)| {
                    account.map(|account| SourceView {
                        id: source.id,
                        budget_id: source.budget_id,
                        external_account_id: source.external_account_id,
                        account_name: account.account_name,
                    })
                })
                .collect::<Vec<_>>())
        })
    }

    /// Unlink a source (owner or admin of its budget).
    pub async fn delete_source(&self, source_id: Uuid, user_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let source = sources::Entity::find_by_id(source_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("source not exists".to_string()))?;
            self.require_budget_write(&db_tx, source.budget_id, user_id, EngineError::Forbidden)
                .await?;
            sources::Entity::delete_by_id(source_id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// Remove every source of a budget. Only reachable from budget deletion,
    /// which has already authorized the owner.
    pub(super) async fn delete_all_sources_for_budget(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
    ) -> ResultEngine<u64> {
        let deleted = sources::Entity::delete_many()
            .filter(sources::Column::BudgetId.eq(budget_id))
            .exec(db)
            .await?;
        Ok(deleted.rows_affected)
    }
}

/// External accounts feeding a budget, in source order.
pub(super) async fn source_accounts<C: ConnectionTrait>(
    db: &C,
    budget_id: Uuid,
) -> ResultEngine<Vec<external_accounts::Model>> {
    let rows = sources::Entity::find()
        .filter(sources::Column::BudgetId.eq(budget_id))
        .order_by_asc(sources::Column::Id)
        .find_also_related(external_accounts::Entity)
        .all(db)
        .await?;
    Ok(rows.into_iter().filter_map(|(_, account)| account).collect())
}
