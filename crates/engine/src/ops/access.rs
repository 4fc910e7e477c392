use sea_orm::{DatabaseTransaction, prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{EngineError, ResultEngine, budget_roles, budgets, users};

use super::Engine;

/// Access level of a user on a budget.
///
/// `Owner` is implicit (the budget's `owner_id`) and never stored as a role
/// row. `Admin` is the "Full Rights" grant, `Viewer` the "View Rights" one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetRole {
    Owner,
    Admin,
    Viewer,
}

impl BudgetRole {
    pub fn can_write(self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }

    /// Canonical role string used by the database and the API.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Viewer => "viewer",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Owner => "Owner",
            Self::Admin => "Full Rights",
            Self::Viewer => "View Rights",
        }
    }

    /// Interpret a free-form role name from a grant request.
    ///
    /// "Full Rights" (any casing) grants admin; any other value grants view
    /// rights.
    pub(super) fn from_grant(role_name: &str) -> Self {
        if role_name.trim().eq_ignore_ascii_case("full rights") {
            Self::Admin
        } else {
            Self::Viewer
        }
    }
}

impl TryFrom<&str> for BudgetRole {
    type Error = EngineError;

    /// Parse a stored role row. `owner` is never stored.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "admin" => Ok(Self::Admin),
            "viewer" => Ok(Self::Viewer),
            other => Err(EngineError::InvalidRole(format!(
                "invalid budget role: {other}"
            ))),
        }
    }
}

/// Builds the error returned when the caller lacks the required role.
///
/// Operations differ on whether a missing role is reported as unauthorized
/// or forbidden, so the constructor is passed in.
pub(super) type Deny = fn(String) -> EngineError;

impl Engine {
    pub(super) async fn require_budget(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
    ) -> ResultEngine<budgets::Model> {
        budgets::Entity::find_by_id(budget_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("budget not exists".to_string()))
    }

    pub(super) async fn require_user_exists(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    pub(super) async fn budget_role(
        &self,
        db: &DatabaseTransaction,
        budget: &budgets::Model,
        user_id: Uuid,
    ) -> ResultEngine<Option<BudgetRole>> {
        if budget.owner_id == user_id {
            return Ok(Some(BudgetRole::Owner));
        }
        let row = budget_roles::Entity::find_by_id((budget.id, user_id))
            .one(db)
            .await?;
        row.as_ref()
            .map(|m| BudgetRole::try_from(m.role.as_str()))
            .transpose()
    }

    async fn require_budget_role(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
        user_id: Uuid,
        allowed: fn(BudgetRole) -> bool,
        needed: &str,
        deny: Deny,
    ) -> ResultEngine<budgets::Model> {
        let budget = self.require_budget(db, budget_id).await?;
        match self.budget_role(db, &budget, user_id).await? {
            Some(role) if allowed(role) => Ok(budget),
            _ => Err(deny(format!("{needed} access to budget required"))),
        }
    }

    /// Owner, admin or viewer.
    pub(super) async fn require_budget_read(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
        user_id: Uuid,
        deny: Deny,
    ) -> ResultEngine<budgets::Model> {
        self.require_budget_role(db, budget_id, user_id, |_| true, "read", deny)
            .await
    }

    /// Owner or admin.
    pub(super) async fn require_budget_write(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
        user_id: Uuid,
        deny: Deny,
    ) -> ResultEngine<budgets::Model> {
        self.require_budget_role(db, budget_id, user_id, BudgetRole::can_write, "write", deny)
            .await
    }

    pub(super) async fn require_budget_owner(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
        user_id: Uuid,
        deny: Deny,
    ) -> ResultEngine<budgets::Model> {
        self.require_budget_role(
            db,
            budget_id,
            user_id,
            |role| role == BudgetRole::Owner,
            "owner",
            deny,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_names_are_case_insensitive() {
        assert_eq!(BudgetRole::from_grant("Full Rights"), BudgetRole::Admin);
        assert_eq!(BudgetRole::from_grant("FULL RIGHTS"), BudgetRole::Admin);
        assert_eq!(BudgetRole::from_grant(" full rights "), BudgetRole::Admin);
    }

    #[test]
    fn unknown_grant_names_fall_back_to_view_rights() {
        assert_eq!(BudgetRole::from_grant("View Rights"), BudgetRole::Viewer);
        assert_eq!(BudgetRole::from_grant("full-rights"), BudgetRole::Viewer);
        assert_eq!(BudgetRole::from_grant(""), BudgetRole::Viewer);
    }

    #[test]
    fn stored_roles_round_trip_through_as_str() {
        for role in [BudgetRole::Admin, BudgetRole::Viewer] {
            assert_eq!(BudgetRole::try_from(role.as_str()), Ok(role));
        }
        assert!(BudgetRole::try_from("owner").is_err());
    }

    #[test]
    fn only_owner_and_admin_write() {
        assert!(BudgetRole::Owner.can_write());
        assert!(BudgetRole::Admin.can_write());
        assert!(!BudgetRole::Viewer.can_write());
    }
}
