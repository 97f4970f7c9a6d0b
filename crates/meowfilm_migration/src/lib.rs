pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_settings;
mod m20260301_000002_create_users;
mod m20260301_000003_create_auth_tokens;
mod m20260315_000001_add_user_revision;
mod m20261019_000001_create_history;
mod m20261019_000002_seed_site_settings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_settings::Migration),
            Box::new(m20260301_000002_create_users::Migration),
            Box::new(m20260301_000003_create_auth_tokens::Migration),
            Box::new(m20260315_000001_add_user_revision::Migration),
            Box::new(m20261019_000001_create_history::Migration),
            Box::new(m20261019_000002_seed_site_settings::Migration),
        ]
    }
}
