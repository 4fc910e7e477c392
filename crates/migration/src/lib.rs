pub use sea_orm_migration::prelude::*;

mod m20241001_000001_init;
mod m20241001_000002_charge_cycles;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241001_000001_init::Migration),
            Box::new(m20241001_000002_charge_cycles::Migration),
        ]
    }
}
