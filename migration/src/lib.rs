pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20240601_000001_link_click;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240601_000001_link_click::Migration)]
    }
}
