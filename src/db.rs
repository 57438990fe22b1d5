use std::str::FromStr;

use sqlx::{
    migrate::MigrateError,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tracing::info;

use crate::config::Config;

pub async fn connect(config: &Config) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let db_pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    migrate(&db_pool).await?;

    info!("database ready at {}", config.database_url);
    Ok(db_pool)
}

/// Brings the schema (users, messages, follows, likes) up to date.
pub async fn migrate(db_pool: &SqlitePool) -> Result<(), MigrateError> {
    sqlx::migrate!().run(db_pool).await
}
