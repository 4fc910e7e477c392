use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, prelude::*};

use crate::{ChargeCycle, EngineError, ResultEngine, charge_cycles};

use super::Engine;

impl Engine {
    /// Id of the charge cycle with the given unit (exact match).
    pub async fn resolve_cycle_id(&self, unit: &str) -> ResultEngine<i32> {
        Ok(cycle_by_unit(&self.database, unit).await?.id)
    }

    pub async fn resolve_cycle_unit(&self, cycle_id: i32) -> ResultEngine<String> {
        Ok(cycle_by_id(&self.database, cycle_id).await?.unit)
    }

    /// The whole catalog, shortest recurrence first.
    pub async fn list_cycles(&self) -> ResultEngine<Vec<ChargeCycle>> {
        Ok(charge_cycles::Entity::find()
            .order_by_asc(charge_cycles::Column::Days)
            .all(&self.database)
            .await?
            .into_iter()
            .map(ChargeCycle::from)
            .collect())
    }
}

pub(super) async fn cycle_by_unit<C: ConnectionTrait>(
    db: &C,
    unit: &str,
) -> ResultEngine<charge_cycles::Model> {
    charge_cycles::Entity::find()
        .filter(charge_cycles::Column::Unit.eq(unit))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("expense charge cycle {unit}")))
}

pub(super) async fn cycle_by_id<C: ConnectionTrait>(
    db: &C,
    cycle_id: i32,
) -> ResultEngine<charge_cycles::Model> {
    charge_cycles::Entity::find_by_id(cycle_id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("expense charge cycle {cycle_id}")))
}

/// Resolve a unit supplied with an expense; unknown units are caller input
/// errors rather than missing resources.
pub(super) async fn expense_cycle<C: ConnectionTrait>(
    db: &C,
    unit: &str,
) -> ResultEngine<charge_cycles::Model> {
    cycle_by_unit(db, unit).await.map_err(|err| match err {
        EngineError::KeyNotFound(_) => EngineError::InvalidChargeCycle(unit.to_string()),
        other => other,
    })
}
