pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_warehouses_table;
mod m20250301_000002_create_fields_table;
mod m20250301_000003_create_racks_table;
mod m20250301_000004_create_shelves_table;
mod m20250301_000005_create_pallets_table;
mod m20250301_000006_create_vaults_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_warehouses_table::Migration),
            Box::new(m20250301_000002_create_fields_table::Migration),
            Box::new(m20250301_000003_create_racks_table::Migration),
            Box::new(m20250301_000004_create_shelves_table::Migration),
            Box::new(m20250301_000005_create_pallets_table::Migration),
            Box::new(m20250301_000006_create_vaults_table::Migration),
        ]
    }
}
