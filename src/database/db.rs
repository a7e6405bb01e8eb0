use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::error::AppError;

#[instrument]
pub async fn connect(database_url: &str) -> Result<Pool<Sqlite>, AppError> {
    info!("Connecting to SQLite database");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Applies a schema made of `CREATE ... IF NOT EXISTS` statements, so running
/// it against an up-to-date database changes nothing.
#[instrument(skip(pool, schema))]
pub async fn init_schema(pool: &Pool<Sqlite>, schema: &str) -> Result<(), AppError> {
    info!("Applying database schema");

    sqlx::raw_sql(schema).execute(pool).await?;

    Ok(())
}

/// SQLite hands timestamps back without an offset; they are stored as UTC.
pub fn to_utc_opt(value: Option<NaiveDateTime>) -> Option<DateTime<Utc>> {
    value.map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc))
}

pub fn to_utc(value: Option<NaiveDateTime>) -> DateTime<Utc> {
    to_utc_opt(value).unwrap_or_else(Utc::now)
}
