//! Seeds the static expense charge-cycle catalog.

use sea_orm::ConnectionTrait;
use sea_orm_migration::prelude::*;

use crate::m20241001_000001_init::ExpenseChargeCycles;

#[derive(DeriveMigrationName)]
pub struct Migration;

const CYCLES: [(&str, i32); 6] = [
    ("daily", 1),
    ("weekly", 7),
    ("biweekly", 14),
    ("monthly", 30),
    ("quarterly", 90),
    ("yearly", 365),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert();
        insert
            .into_table(ExpenseChargeCycles::Table)
            .columns([ExpenseChargeCycles::Unit, ExpenseChargeCycles::Days]);
        for (unit, days) in CYCLES {
            insert
                .values([unit.into(), days.into()])
                .map_err(|err| DbErr::Custom(err.to_string()))?;
        }

        let db = manager.get_connection();
        db.execute(db.get_database_backend().build(&insert)).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let units: Vec<&str> = CYCLES.iter().map(|(unit, _)| *unit).collect();
        let delete = Query::delete()
            .from_table(ExpenseChargeCycles::Table)
            .and_where(Expr::col(ExpenseChargeCycles::Unit).is_in(units))
            .to_owned();

        let db = manager.get_connection();
        db.execute(db.get_database_backend().build(&delete)).await?;
        Ok(())
    }
}
