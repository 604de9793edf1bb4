use sea_orm_migration::prelude::*;

mod m20250101_000001_create_profiles_table;
mod m20250101_000002_create_ideas_table;
mod m20250101_000003_create_idea_votes_table;
mod m20250101_000004_create_idea_comments_table;
mod m20250101_000005_create_password_reset_tokens_table;
mod m20250101_000006_create_refresh_tokens_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_profiles_table::Migration),
            Box::new(m20250101_000002_create_ideas_table::Migration),
            Box::new(m20250101_000003_create_idea_votes_table::Migration),
            Box::new(m20250101_000004_create_idea_comments_table::Migration),
            Box::new(m20250101_000005_create_password_reset_tokens_table::Migration),
            Box::new(m20250101_000006_create_refresh_tokens_table::Migration),
        ]
    }
}
