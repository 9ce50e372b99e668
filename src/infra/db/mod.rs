//! Postgres-backed repository implementations.

mod comments;
mod employees;
mod followers;
mod pages;
mod posts;
mod util;

pub use util::map_sqlx_error;

use std::sync::Arc;

use sqlx::{
    PgPool, Postgres, QueryBuilder,
    postgres::PgPoolOptions,
    query,
};

use crate::application::pagination::OffsetWindow;

/// Rows per multi-row `INSERT`, keeping bind counts under the protocol limit.
const INSERT_CHUNK: usize = 500;

#[derive(Clone)]
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        query("SELECT 1").execute(self.pool()).await.map(|_| ())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// `OFFSET`/`LIMIT` tail shared by the list queries.
fn push_window(qb: &mut QueryBuilder<'_, Postgres>, window: OffsetWindow) {
    qb.push(" OFFSET ");
    qb.push_bind(window.skip);
    qb.push(" LIMIT ");
    qb.push_bind(window.limit);
}
