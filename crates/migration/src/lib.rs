pub use sea_orm_migration::prelude::*;

mod m20250901_000001_create_people_tables;
mod m20250901_000002_create_catalog_tables;
mod m20250902_000001_create_activity_tables;
mod m20250902_000002_add_activity_indexes;
mod m20250903_000001_create_program_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_people_tables::Migration),
            Box::new(m20250901_000002_create_catalog_tables::Migration),
            Box::new(m20250902_000001_create_activity_tables::Migration),
            Box::new(m20250902_000002_add_activity_indexes::Migration),
            Box::new(m20250903_000001_create_program_tables::Migration),
        ]
    }
}
