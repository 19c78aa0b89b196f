use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users_table;
mod m20250301_000002_create_refresh_tokens;
mod m20250301_000003_create_status_definitions;
mod m20250301_000004_create_categories;
mod m20250301_000005_create_cases_table;
mod m20250301_000006_create_case_assignees;
mod m20250301_000007_create_case_messages;
mod m20250301_000008_create_attachments;
mod m20250301_000009_create_audit_log;
mod m20250301_000010_create_share_tokens;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users_table::Migration),
            Box::new(m20250301_000002_create_refresh_tokens::Migration),
            Box::new(m20250301_000003_create_status_definitions::Migration),
            Box::new(m20250301_000004_create_categories::Migration),
            Box::new(m20250301_000005_create_cases_table::Migration),
            Box::new(m20250301_000006_create_case_assignees::Migration),
            Box::new(m20250301_000007_create_case_messages::Migration),
            Box::new(m20250301_000008_create_attachments::Migration),
            Box::new(m20250301_000009_create_audit_log::Migration),
            Box::new(m20250301_000010_create_share_tokens::Migration),
        ]
    }
}
