//! HTTP server entry point.
//!
//! Configuration comes from the environment:
//!
//! - `DATABASE_URL` — `PostgreSQL` connection string (required)
//! - `BIND_ADDR` — listen address, defaulting to `0.0.0.0:8080`
//! - `RUST_LOG` — tracing filter, defaulting to `info`
//!
//! Tasks, payments, and activities persist in `PostgreSQL`; attachment bytes
//! use the in-memory store until an object-storage collaborator is wired in.

use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::DefaultClock;
use std::env;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use waymark::activity::adapters::postgres::PostgresActivityLog;
use waymark::api::{AppState, router};
use waymark::task::adapters::memory::InMemoryAttachmentStore;
use waymark::task::adapters::postgres::{PostgresPaymentRepository, PostgresTaskRepository};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let database_url = env::var("DATABASE_URL")?;
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_owned());

    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder().build(manager)?;

    let state = AppState::new(
        Arc::new(PostgresTaskRepository::new(pool.clone())),
        Arc::new(PostgresPaymentRepository::new(pool.clone())),
        Arc::new(InMemoryAttachmentStore::new()),
        Arc::new(PostgresActivityLog::new(pool)),
        Arc::new(DefaultClock),
    );

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
