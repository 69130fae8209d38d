//! Diesel-backed implementation of the comment persistence port.
//!
//! Comments carry the author's display name for rendering, so every read
//! joins `users` and the insert resolves the name up front.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CommentRepository, CommentRepositoryError};
use crate::domain::{Comment, CommentDraft, ItemId, UserId};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{CommentRow, NewCommentRow};
use super::pool::DbPool;
use super::schema::{comments, items, users};

/// Comment repository over a PostgreSQL pool.
#[derive(Clone)]
pub struct DieselCommentRepository {
    pool: DbPool,
}

impl DieselCommentRepository {
    /// Create a repository backed by the given pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_query_error(error: diesel::result::Error) -> CommentRepositoryError {
    map_diesel_error(
        error,
        CommentRepositoryError::query,
        CommentRepositoryError::connection,
    )
}

fn assemble(row: CommentRow, author_name: String) -> Comment {
    Comment::new(
        row.id,
        ItemId::new(row.item_id),
        UserId::new(row.author_id),
        author_name,
        row.text,
        row.created,
    )
}

#[async_trait]
impl CommentRepository for DieselCommentRepository {
    async fn insert(&self, draft: &CommentDraft) -> Result<Comment, CommentRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, CommentRepositoryError::connection))?;

        let author_name: String = users::table
            .find(draft.author.get())
            .select(users::name)
            .first(&mut conn)
            .await
            .map_err(map_query_error)?;

        let new_row = NewCommentRow {
            item_id: draft.item.get(),
            author_id: draft.author.get(),
            text: &draft.text,
            created: draft.created,
        };

        let row: CommentRow = diesel::insert_into(comments::table)
            .values(&new_row)
            .returning(CommentRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_query_error)?;

        Ok(assemble(row, author_name))
    }

    async fn list_for_item(&self, item: ItemId) -> Result<Vec<Comment>, CommentRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, CommentRepositoryError::connection))?;

        let rows: Vec<(CommentRow, String)> = comments::table
            .inner_join(users::table)
            .filter(comments::item_id.eq(item.get()))
            .order(comments::created.asc())
            .select((CommentRow::as_select(), users::name))
            .load(&mut conn)
            .await
            .map_err(map_query_error)?;

        Ok(rows
            .into_iter()
            .map(|(row, name)| assemble(row, name))
            .collect())
    }

    async fn list_for_owner_items(
        &self,
        owner: UserId,
    ) -> Result<HashMap<ItemId, Vec<Comment>>, CommentRepositoryError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, CommentRepositoryError::connection))?;

        let rows: Vec<(CommentRow, String)> = comments::table
            .inner_join(items::table)
            .inner_join(users::table)
            .filter(items::owner_id.eq(owner.get()))
            .order((comments::item_id.asc(), comments::created.asc()))
            .select((CommentRow::as_select(), users::name))
            .load(&mut conn)
            .await
            .map_err(map_query_error)?;

        let mut grouped: HashMap<ItemId, Vec<Comment>> = HashMap::new();
        for (row, name) in rows {
            grouped
                .entry(ItemId::new(row.item_id))
                .or_default()
                .push(assemble(row, name));
        }
        Ok(grouped)
    }
}
