use sea_orm_migration::prelude::*;

mod m20260315_initial;
mod m20260402_add_saved_unique;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260315_initial::Migration),
            Box::new(m20260402_add_saved_unique::Migration),
        ]
    }
}
