//! PostgreSQL integration.
//!
//! ## Connectivity
//!
//! - [`db()`] — Establishes a database connection
//! - [`migrate()`] — Creates a table and its indices if missing
//!
//! ## Schema
//!
//! - [`Schema`] — Table metadata and DDL generation
mod schema;

pub use schema::*;

use std::sync::Arc;
use tokio_postgres::Client;

/// Establishes a database connection.
///
/// Returns an `Arc<Client>` suitable for sharing across async tasks.
/// The connection driver is spawned onto the current tokio runtime.
pub async fn db(url: &str) -> Result<Arc<Client>, PgErr> {
    log::info!("connecting to database");
    let tls = tokio_postgres::tls::NoTls;
    let (client, connection) = tokio_postgres::connect(url, tls).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            log::error!("database connection closed: {}", e);
        }
    });
    client
        .execute("SET client_min_messages TO WARNING", &[])
        .await?;
    Ok(Arc::new(client))
}

/// Runs the DDL for `T` against the database.
pub async fn migrate<T: Schema>(client: &Client) -> Result<(), PgErr> {
    log::info!("ensuring table {}", T::name());
    client.batch_execute(T::creates()).await?;
    client.batch_execute(T::indices()).await?;
    Ok(())
}

/// PostgreSQL error type alias.
pub type PgErr = tokio_postgres::Error;

/// Table for registered member accounts.
#[rustfmt::skip]
pub const USERS:       &str = "users";
