//! Diesel-backed read-only adapter over the item catalogue.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ItemStore, ItemStoreError};
use crate::domain::{Item, ItemId, UserId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::ItemRow;
use super::pool::DbPool;
use super::schema::items;

/// Item store over a PostgreSQL pool.
#[derive(Clone)]
pub struct DieselItemStore {
    pool: DbPool,
}

impl DieselItemStore {
    /// Create a store backed by the given pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_query_error(error: diesel::result::Error) -> ItemStoreError {
    map_diesel_error(error, ItemStoreError::query, ItemStoreError::connection)
}

#[async_trait]
impl ItemStore for DieselItemStore {
    async fn find_by_id(&self, id: ItemId) -> Result<Option<Item>, ItemStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ItemStoreError::connection))?;

        let row: Option<ItemRow> = items::table
            .find(id.get())
            .select(ItemRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_query_error)?;

        Ok(row.map(Item::from))
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Item>, ItemStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ItemStoreError::connection))?;

        let rows: Vec<ItemRow> = items::table
            .filter(items::owner_id.eq(owner.get()))
            .order(items::id.asc())
            .select(ItemRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_query_error)?;

        Ok(rows.into_iter().map(Item::from).collect())
    }
}
