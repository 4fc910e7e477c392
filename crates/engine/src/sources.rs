//! Links between a budget and the external accounts feeding its summary.

use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Source {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub external_account_id: Uuid,
}

/// Source joined with the linked account's display name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SourceView {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub external_account_id: Uuid,
    pub account_name: String,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budget_transaction_sources")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub budget_id: Uuid,
    pub external_account_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budgets::Entity",
        from = "Column::BudgetId",
        to = "super::budgets::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Budgets,
    #[sea_orm(
        belongs_to = "super::external_accounts::Entity",
        from = "Column::ExternalAccountId",
        to = "super::external_accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    ExternalAccounts,
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl Related<super::external_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExternalAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Source {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            budget_id: model.budget_id,
            external_account_id: model.external_account_id,
        }
    }
}
