pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_core_tables;
mod m20250312_000001_create_entitlement_tables;
mod m20250320_000001_create_scheduling_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_core_tables::Migration),
            Box::new(m20250312_000001_create_entitlement_tables::Migration),
            Box::new(m20250320_000001_create_scheduling_tables::Migration),
        ]
    }
}
