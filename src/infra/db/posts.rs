use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::pagination::OffsetWindow,
    application::repos::{PostsRepo, RepoError},
    domain::entities::{NewPost, PostRecord},
};

use super::{INSERT_CHUNK, PostgresRepositories, map_sqlx_error, push_window};

#[derive(sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    page_id: String,
    post_id: String,
    content: String,
    likes: i64,
    comments_count: i64,
    posted_at: OffsetDateTime,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            page_id: row.page_id,
            post_id: row.post_id,
            content: row.content,
            likes: row.likes,
            comments_count: row.comments_count,
            posted_at: row.posted_at,
        }
    }
}

#[async_trait]
impl PostsRepo for PostgresRepositories {
    async fn insert_posts(&self, posts: &[NewPost]) -> Result<u64, RepoError> {
        let mut inserted = 0;
        for chunk in posts.chunks(INSERT_CHUNK) {
            let mut qb = QueryBuilder::<Postgres>::new(
                "INSERT INTO posts (id, page_id, post_id, content, likes, comments_count, posted_at) ",
            );
            qb.push_values(chunk, |mut row, post| {
                row.push_bind(Uuid::new_v4())
                    .push_bind(post.page_id.as_str())
                    .push_bind(post.post_id.as_str())
                    .push_bind(post.content.as_str())
                    .push_bind(post.likes)
                    .push_bind(post.comments_count)
                    .push_bind(post.posted_at);
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

    async fn list_recent_posts(
        &self,
        page_id: &str,
        window: OffsetWindow,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT id, page_id, post_id, content, likes, comments_count, posted_at \
             FROM posts WHERE page_id = ",
        );
        qb.push_bind(page_id);
        qb.push(" ORDER BY posted_at DESC, post_id");
        push_window(&mut qb, window);

        let rows = qb
            .build_query_as::<PostRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostRecord::from).collect())
    }
}
