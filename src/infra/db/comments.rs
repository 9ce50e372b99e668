use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::pagination::OffsetWindow,
    application::repos::{CommentsRepo, RepoError},
    domain::entities::{CommentRecord, NewComment},
};

use super::{INSERT_CHUNK, PostgresRepositories, map_sqlx_error, push_window};

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    page_id: String,
    post_id: String,
    comment_id: String,
    author: Option<String>,
    content: String,
    likes: i64,
    posted_at: OffsetDateTime,
}

impl From<CommentRow> for CommentRecord {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            page_id: row.page_id,
            post_id: row.post_id,
            comment_id: row.comment_id,
            author: row.author,
            content: row.content,
            likes: row.likes,
            posted_at: row.posted_at,
        }
    }
}

#[async_trait]
impl CommentsRepo for PostgresRepositories {
    async fn insert_comments(&self, comments: &[NewComment]) -> Result<u64, RepoError> {
        let mut inserted = 0;
        for chunk in comments.chunks(INSERT_CHUNK) {
            let mut qb = QueryBuilder::<Postgres>::new(
                "INSERT INTO comments (id, page_id, post_id, comment_id, author, content, likes, posted_at) ",
            );
            qb.push_values(chunk, |mut row, comment| {
                row.push_bind(Uuid::new_v4())
                    .push_bind(comment.page_id.as_str())
                    .push_bind(comment.post_id.as_str())
                    .push_bind(comment.comment_id.as_str())
                    .push_bind(comment.author.as_deref())
                    .push_bind(comment.content.as_str())
                    .push_bind(comment.likes)
                    .push_bind(comment.posted_at);
            });
            inserted += qb
                .build()
                .execute(self.pool())
                .await
                .map_err(map_sqlx_error)?
                .rows_affected();
        }
        Ok(inserted)
    }

    async fn list_comments(
        &self,
        page_id: &str,
        post_id: Option<&str>,
        window: OffsetWindow,
    ) -> Result<Vec<CommentRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT id, page_id, post_id, comment_id, author, content, likes, posted_at \
             FROM comments WHERE page_id = ",
        );
        qb.push_bind(page_id);

        if let Some(post_id) = post_id {
            qb.push(" AND post_id = ");
            qb.push_bind(post_id);
        }

        qb.push(" ORDER BY posted_at DESC, comment_id");
        push_window(&mut qb, window);

        let rows = qb
            .build_query_as::<CommentRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(CommentRecord::from).collect())
    }
}
