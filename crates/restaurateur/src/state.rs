//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::services::CoordinateCache;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: PgPool,
    coordinates: CoordinateCache,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `pool` - `PostgreSQL` connection pool
    /// * `coordinates` - Coordinate cache sharing the same pool
    #[must_use]
    pub fn new(pool: PgPool, coordinates: CoordinateCache) -> Self {
        Self {
            inner: Arc::new(AppStateInner { pool, coordinates }),
        }
    }

    /// Get a reference to the database pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the coordinate cache.
    #[must_use]
    pub fn coordinates(&self) -> &CoordinateCache {
        &self.inner.coordinates
    }
}
