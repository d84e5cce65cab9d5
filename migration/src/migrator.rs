use sea_orm_migration::prelude::*;

use crate::migrations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(migrations::m20250601_000001_create_users::Migration),
            Box::new(migrations::m20250601_000002_create_geofences::Migration),
            Box::new(migrations::m20250601_000003_create_attendance_records::Migration),
        ]
    }
}
