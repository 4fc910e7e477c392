use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, RoleAssignment, budget_roles, budgets};

use super::{Engine, access::BudgetRole, with_tx};

impl Engine {
    /// Grant or change a member's role on a budget (owner-only).
    ///
    /// `role_name` is free-form: "Full Rights" in any casing grants admin,
    /// anything else grants view rights. Granting again replaces the role.
    pub async fn add_role(
        &self,
        owner_id: Uuid,
        budget_id: Uuid,
        member_id: Uuid,
        role_name: &str,
    ) -> ResultEngine<RoleAssignment> {
        let role = BudgetRole::from_grant(role_name);

        with_tx!(self, |db_tx| {
            let budget = self
                .require_budget_owner(&db_tx, budget_id, owner_id, EngineError::Forbidden)
                .await?;
            self.require_user_exists(&db_tx, member_id).await?;
            if member_id == budget.owner_id {
                return Err(EngineError::InvalidRole(
                    "the budget owner cannot be granted a role".to_string(),
                ));
            }

            let active = budget_roles::ActiveModel {
                budget_id: ActiveValue::Set(budget_id),
                user_id: ActiveValue::Set(member_id),
                role: ActiveValue::Set(role.as_str().to_string()),
            };

            // Upsert: insert if missing, otherwise update role.
            match budget_roles::Entity::find_by_id((budget_id, member_id))
                .one(&db_tx)
                .await?
            {
                Some(_) => {
                    active.update(&db_tx).await?;
                }
                None => {
                    active.insert(&db_tx).await?;
                }
            }
            tracing::info!("granted {} on budget {budget_id} to {member_id}", role.as_str());

            Ok(RoleAssignment {
                budget_id,
                user_id: member_id,
                role,
            })
        })
    }

    /// Lists role assignments on a budget (owner-only).
    pub async fn list_roles(
        &self,
        budget_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<Vec<RoleAssignment>> {
        with_tx!(self, |db_tx| {
            self.require_budget_owner(&db_tx, budget_id, user_id, EngineError::Forbidden)
                .await?;

            let rows = budget_roles::Entity::find()
                .filter(budget_roles::Column::BudgetId.eq(budget_id))
                .order_by_asc(budget_roles::Column::UserId)
                .all(&db_tx)
                .await?;
            let assignments: ResultEngine<Vec<RoleAssignment>> = rows
                .into_iter()
                .map(|m| {
                    Ok(RoleAssignment {
                        budget_id: m.budget_id,
                        user_id: m.user_id,
                        role: BudgetRole::try_from(m.role.as_str())?,
                    })
                })
                .collect();
            assignments
        })
    }

    /// Revokes a member's role (owner-only). Missing rows are not an error.
    pub async fn remove_role(
        &self,
        budget_id: Uuid,
        member_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_budget_owner(&db_tx, budget_id, user_id, EngineError::Forbidden)
                .await?;
            budget_roles::Entity::delete_by_id((budget_id, member_id))
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    pub async fn is_owner(&self, budget_id: Uuid, user_id: Uuid) -> ResultEngine<bool> {
        Ok(budgets::Entity::find_by_id(budget_id)
            .one(&self.database)
            .await?
            .is_some_and(|budget| budget.owner_id == user_id))
    }

    /// `true` if the user holds "Full Rights" on the budget.
    pub async fn is_admin(&self, budget_id: Uuid, user_id: Uuid) -> ResultEngine<bool> {
        Ok(self.stored_role(budget_id, user_id).await? == Some(BudgetRole::Admin))
    }

    /// `true` if the user holds "View Rights" on the budget. Admins are not
    /// viewers.
    pub async fn is_viewer(&self, budget_id: Uuid, user_id: Uuid) -> ResultEngine<bool> {
        Ok(self.stored_role(budget_id, user_id).await? == Some(BudgetRole::Viewer))
    }

    async fn stored_role(&self, budget_id: Uuid, user_id: Uuid) -> ResultEngine<Option<BudgetRole>> {
        budget_roles::Entity::find_by_id((budget_id, user_id))
            .one(&self.database)
            .await?
            .map(|m| BudgetRole::try_from(m.role.as_str()))
            .transpose()
    }
}
