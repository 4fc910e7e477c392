use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{
    Budget, BudgetAccess, EngineError, ResultEngine, budget_roles, budgets, categories,
    category_mappings, util::normalize_display,
};

use super::{Engine, access::BudgetRole, with_tx};

impl Engine {
    /// Add a new budget owned by `owner_id`.
    ///
    /// Budget names are unique per owner, compared case-insensitively.
    pub async fn create_budget(&self, name: &str, owner_id: Uuid) -> ResultEngine<Budget> {
        let name = normalize_display(name, "budget")?;

        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, owner_id).await?;

            let exists = budgets::Entity::find()
                .filter(budgets::Column::OwnerId.eq(owner_id))
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let model = budgets::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                owner_id: ActiveValue::Set(owner_id),
                name: ActiveValue::Set(name),
            }
            .insert(&db_tx)
            .await?;
            tracing::info!("created budget {} for {owner_id}", model.id);

            Ok(Budget::from(model))
        })
    }

    /// Budgets the user owns or holds a role on, sorted by name.
    pub async fn list_budgets(&self, user_id: Uuid) -> ResultEngine<Vec<BudgetAccess>> {
        with_tx!(self, |db_tx| {
            let mut result: Vec<BudgetAccess> = budgets::Entity::find()
                .filter(budgets::Column::OwnerId.eq(user_id))
                .order_by_asc(budgets::Column::Name)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|model| BudgetAccess {
                    budget: model.into(),
                    role: BudgetRole::Owner,
                })
                .collect();

            let shared = budget_roles::Entity::find()
                .filter(budget_roles::Column::UserId.eq(user_id))
                .find_also_related(budgets::Entity)
                .all(&db_tx)
                .await?;
            for (row, budget) in shared {
                let Some(budget) = budget else {
                    continue;
                };
                result.push(BudgetAccess {
                    budget: budget.into(),
                    role: BudgetRole::try_from(row.role.as_str())?,
                });
            }

            result.sort_by(|a, b| a.budget.name.cmp(&b.budget.name));
            Ok(result)
        })
    }

    /// Delete a budget and everything scoped to it (owner-only).
    ///
    /// Children go first, all inside one DB transaction: transaction sources,
    /// category mappings, expenses with their tags, categories, role rows and
    /// finally the budget. Linked external accounts survive.
    pub async fn delete_budget(&self, budget_id: Uuid, user_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_budget_owner(&db_tx, budget_id, user_id, EngineError::Unauthorized)
                .await?;

            self.delete_all_sources_for_budget(&db_tx, budget_id).await?;

            category_mappings::Entity::delete_many()
                .filter(category_mappings::Column::BudgetId.eq(budget_id))
                .exec(&db_tx)
                .await?;

            self.delete_expenses_in_budget(&db_tx, budget_id).await?;

            categories::Entity::delete_many()
                .filter(categories::Column::BudgetId.eq(budget_id))
                .exec(&db_tx)
                .await?;

            budget_roles::Entity::delete_many()
                .filter(budget_roles::Column::BudgetId.eq(budget_id))
                .exec(&db_tx)
                .await?;

            budgets::Entity::delete_by_id(budget_id)
                .exec(&db_tx)
                .await?;
            tracing::info!("deleted budget {budget_id}");

            Ok(())
        })
    }
}
