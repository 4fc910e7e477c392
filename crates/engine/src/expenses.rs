//! Manually declared recurring expenses attached to a budget.

use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::{ChargeCycle, MoneyCents};

/// An expense with its resolved charge cycle and category tags.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Expense {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub name: String,
    pub value: MoneyCents,
    pub description: Option<String>,
    pub charge_cycle: ChargeCycle,
    /// Primary category. Deleting that category deletes the expense.
    pub category_id: Option<Uuid>,
    /// Names of the tagged budget categories, sorted.
    pub categories: Vec<String>,
}

/// Input for [`Engine::add_expense`](crate::Engine::add_expense).
#[derive(Clone, Debug, Default)]
pub struct NewExpense {
    pub budget_id: Uuid,
    pub name: String,
    pub value: MoneyCents,
    pub description: Option<String>,
    /// Charge cycle unit, e.g. `monthly`.
    pub charge_cycle: String,
    pub category_id: Option<Uuid>,
    pub categories: Vec<String>,
}

/// Input for [`Engine::update_expense`](crate::Engine::update_expense).
///
/// `categories: None` keeps the current tags, `Some(list)` replaces them.
#[derive(Clone, Debug, Default)]
pub struct ExpenseUpdate {
    pub id: Uuid,
    pub name: String,
    pub value: MoneyCents,
    pub description: Option<String>,
    pub charge_cycle: String,
    pub categories: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub budget_id: Uuid,
    pub name: String,
    pub value_minor: i64,
    pub description: Option<String>,
    pub charge_cycle_id: i32,
    pub category_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budgets::Entity",
        from = "Column::BudgetId",
        to = "super::budgets::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Budgets,
    #[sea_orm(
        belongs_to = "super::charge_cycles::Entity",
        from = "Column::ChargeCycleId",
        to = "super::charge_cycles::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    ChargeCycles,
    #[sea_orm(has_many = "super::expense_categories::Entity")]
    Tags,
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl Related<super::charge_cycles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChargeCycles.def()
    }
}

impl Related<super::expense_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
