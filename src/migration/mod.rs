pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_identity_tables;
mod m20250101_000002_create_cafe_tables;
mod m20250101_000003_create_booking_order_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_identity_tables::Migration),
            Box::new(m20250101_000002_create_cafe_tables::Migration),
            Box::new(m20250101_000003_create_booking_order_tables::Migration),
        ]
    }
}
