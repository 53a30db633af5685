use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

use crate::error::Result;

pub type DbPool = PgPool;

pub async fn get_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    info!(max_connections, "Connecting to database");
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;
    Ok(pool)
}

pub async fn get_db_connection(database_url: &str) -> Result<DatabaseConnection> {
    info!("Connecting to database via Sea-ORM");
    let mut options = ConnectOptions::new(database_url.to_string());
    options.max_connections(5).sqlx_logging(false);
    let db = Database::connect(options).await?;
    Ok(db)
}
