//! Static catalog of expense recurrence units, seeded by the migrations.

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChargeCycle {
    pub id: i32,
    pub unit: String,
    pub days: i32,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_charge_cycles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub unit: String,
    pub days: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ChargeCycle {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            unit: model.unit,
            days: model.days,
        }
    }
}
