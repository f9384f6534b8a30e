use crate::{adapters::persistence::PostgresPersistence, infra::db::init_db};

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod http_client;
pub mod rate_limit;
pub mod setup;
pub mod shutdown;

pub use error::InfraError;
pub use rate_limit::RateLimiterTrait;

pub async fn postgres_persistence(
    database_url: &str,
    run_migrations: bool,
) -> Result<PostgresPersistence, InfraError> {
    let pool = init_db(database_url, run_migrations).await?;
    Ok(PostgresPersistence::new(pool))
}
