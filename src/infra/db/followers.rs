use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::pagination::OffsetWindow,
    application::repos::{FollowersRepo, RepoError},
    domain::{
        entities::{FollowerRecord, NewFollower},
        types::Relation,
    },
};

use super::{INSERT_CHUNK, PostgresRepositories, map_sqlx_error, push_window};

#[derive(sqlx::FromRow)]
struct FollowerRow {
    id: Uuid,
    page_id: String,
    profile_id: String,
    name: Option<String>,
    profile_url: Option<String>,
    relation: Relation,
    followed_at: OffsetDateTime,
}

impl From<FollowerRow> for FollowerRecord {
    fn from(row: FollowerRow) -> Self {
        Self {
            id: row.id,
            page_id: row.page_id,
            profile_id: row.profile_id,
            name: row.name,
            profile_url: row.profile_url,
            relation: row.relation,
            followed_at: row.followed_at,
        }
    }
}

#[async_trait]
impl FollowersRepo for PostgresRepositories {
    async fn insert_relations(&self, rows: &[NewFollower]) -> Result<u64, RepoError> {
        let mut inserted = 0;
        for chunk in rows.chunks(INSERT_CHUNK) {
            let mut qb = QueryBuilder::<Postgres>::new(
                "INSERT INTO followers (id, page_id, profile_id, name, profile_url, relation, followed_at) ",
            );
            qb.push_values(chunk, |mut row, follower| {
                row.push_bind(Uuid::new_v4())
                    .push_bind(follower.page_id.as_str())
                    .push_bind(follower.profile_id.as_str())
                    .push_bind(follower.name.as_deref())
                    .push_bind(follower.profile_url.as_deref())
                    .push_bind(follower.relation)
                    .push_bind(follower.followed_at);
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

    async fn list_relations(
        &self,
        page_id: &str,
        relation: Relation,
        window: OffsetWindow,
    ) -> Result<Vec<FollowerRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT id, page_id, profile_id, name, profile_url, relation, followed_at \
             FROM followers WHERE page_id = ",
        );
        qb.push_bind(page_id);
        qb.push(" AND relation = ");
        qb.push_bind(relation);
        qb.push(" ORDER BY followed_at DESC, profile_id");
        push_window(&mut qb, window);

        let rows = qb
            .build_query_as::<FollowerRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(FollowerRecord::from).collect())
    }
}
