use std::time::Duration;

use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;

use super::InfraError;

pub async fn init_db(database_url: &str, run_migrations: bool) -> Result<PgPool, InfraError> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .map_err(InfraError::DatabaseConnection)?;

    info!("Connected to database!");

    if run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(InfraError::Migration)?;
        info!("Database migrations applied");
    }

    Ok(pool)
}
