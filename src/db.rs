use std::{convert::Infallible, str::FromStr, sync::Arc};

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use sqlx::{
    pool::PoolConnection,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Sqlite, SqliteConnection, SqlitePool,
};

use crate::AppState;

// Opens the pool, creating the data file when it does not exist yet
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    init_schema(&pool).await?;
    Ok(pool)
}

// Create the 'todos' table if it doesn't exist
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS todos (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        task        TEXT NOT NULL,
        done        INTEGER NOT NULL DEFAULT 0,
        created_at  TEXT NOT NULL,
        updated_at  TEXT NOT NULL
    );"#,
    )
    .execute(pool)
    .await?;

    tracing::debug!("todos table ready");
    Ok(())
}

/// Database handle scoped to a single request.
///
/// A connection is checked out of the pool the first time [`RequestDb::conn`]
/// is called and goes back to the pool when the handle is dropped, which
/// happens when the handler returns on any path.
pub struct RequestDb {
    pool: SqlitePool,
    conn: Option<PoolConnection<Sqlite>>,
}

impl RequestDb {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool, conn: None }
    }

    pub async fn conn(&mut self) -> Result<&mut SqliteConnection, sqlx::Error> {
        let conn = match self.conn.take() {
            Some(conn) => conn,
            None => {
                tracing::trace!("acquiring request connection");
                self.pool.acquire().await?
            }
        };
        Ok(&mut **self.conn.insert(conn))
    }

    #[cfg(test)]
    pub fn is_acquired(&self) -> bool {
        self.conn.is_some()
    }
}

impl Drop for RequestDb {
    fn drop(&mut self) {
        if self.conn.take().is_some() {
            tracing::trace!("released request connection");
        }
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequestDb {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(RequestDb::new(state.db.clone()))
    }
}

// Single-connection in-memory database; the pool must never recycle the
// connection or the data goes with it.
#[cfg(test)]
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    init_schema(&pool).await.unwrap();
    pool
}
