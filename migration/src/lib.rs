pub use sea_orm_migration::prelude::*;

mod m20250219_000001_identities;
mod m20250219_000002_employees;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250219_000001_identities::Migration),
            Box::new(m20250219_000002_employees::Migration),
        ]
    }
}
