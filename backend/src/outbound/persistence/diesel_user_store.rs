//! Diesel-backed read-only adapter over user accounts.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserStore, UserStoreError};
use crate::domain::{User, UserId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::UserRow;
use super::pool::DbPool;
use super::schema::users;

/// User store over a PostgreSQL pool.
#[derive(Clone)]
pub struct DieselUserStore {
    pool: DbPool,
}

impl DieselUserStore {
    /// Create a store backed by the given pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_query_error(error: diesel::result::Error) -> UserStoreError {
    map_diesel_error(error, UserStoreError::query, UserStoreError::connection)
}

#[async_trait]
impl UserStore for DieselUserStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserStoreError::connection))?;

        let row: Option<UserRow> = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_query_error)?;

        Ok(row.map(User::from))
    }

    async fn exists(&self, id: UserId) -> Result<bool, UserStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, UserStoreError::connection))?;

        let found: i64 = users::table
            .filter(users::id.eq(id.get()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_query_error)?;

        Ok(found > 0)
    }
}
