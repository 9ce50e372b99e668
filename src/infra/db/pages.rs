use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::pagination::OffsetWindow,
    application::repos::{PageSearchFilter, PagesRepo, RepoError},
    domain::entities::{NewPage, PageRecord},
};

use super::{PostgresRepositories, map_sqlx_error, push_window};

const PAGE_COLUMNS: &str = "id, page_id, name, url, linkedin_internal_id, profile_picture, \
     description, website, industry, followers, head_count, specialties, \
     created_at, last_scraped_at";

#[derive(sqlx::FromRow)]
struct PageRow {
    id: Uuid,
    page_id: String,
    name: String,
    url: String,
    linkedin_internal_id: Option<String>,
    profile_picture: Option<String>,
    description: Option<String>,
    website: Option<String>,
    industry: Option<String>,
    followers: i64,
    head_count: i64,
    specialties: Vec<String>,
    created_at: OffsetDateTime,
    last_scraped_at: OffsetDateTime,
}

impl From<PageRow> for PageRecord {
    fn from(row: PageRow) -> Self {
        Self {
            id: row.id,
            page_id: row.page_id,
            name: row.name,
            url: row.url,
            linkedin_internal_id: row.linkedin_internal_id,
            profile_picture: row.profile_picture,
            description: row.description,
            website: row.website,
            industry: row.industry,
            followers: row.followers,
            head_count: row.head_count,
            specialties: row.specialties,
            created_at: row.created_at,
            last_scraped_at: row.last_scraped_at,
        }
    }
}

#[async_trait]
impl PagesRepo for PostgresRepositories {
    async fn find_by_page_id(&self, page_id: &str) -> Result<Option<PageRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(PAGE_COLUMNS);
        qb.push(" FROM pages WHERE page_id = ");
        qb.push_bind(page_id);

        let row = qb
            .build_query_as::<PageRow>()
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(PageRecord::from))
    }

    async fn create_page(&self, page: &NewPage) -> Result<PageRecord, RepoError> {
        let now = OffsetDateTime::now_utc();

        let mut qb = QueryBuilder::<Postgres>::new("INSERT INTO pages (");
        qb.push(PAGE_COLUMNS);
        qb.push(") VALUES (");
        let mut values = qb.separated(", ");
        values.push_bind(Uuid::new_v4());
        values.push_bind(page.page_id.as_str());
        values.push_bind(page.name.as_str());
        values.push_bind(page.url.as_str());
        values.push_bind(page.linkedin_internal_id.as_deref());
        values.push_bind(page.profile_picture.as_deref());
        values.push_bind(page.description.as_deref());
        values.push_bind(page.website.as_deref());
        values.push_bind(page.industry.as_deref());
        values.push_bind(page.followers);
        values.push_bind(page.head_count);
        values.push_bind(page.specialties.as_slice());
        values.push_bind(now);
        values.push_bind(now);
        qb.push(") RETURNING ");
        qb.push(PAGE_COLUMNS);

        let row = qb
            .build_query_as::<PageRow>()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn search_pages(
        &self,
        filter: &PageSearchFilter,
        window: OffsetWindow,
    ) -> Result<Vec<PageRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(PAGE_COLUMNS);
        qb.push(" FROM pages WHERE followers >= ");
        qb.push_bind(filter.min_followers);
        qb.push(" AND followers <= ");
        qb.push_bind(filter.max_followers);

        if let Some(pattern) = filter.industry_pattern() {
            qb.push(" AND industry ILIKE ");
            qb.push_bind(pattern);
        }

        if let Some(pattern) = filter.name_pattern() {
            qb.push(" AND name ILIKE ");
            qb.push_bind(pattern);
        }

        qb.push(" ORDER BY created_at, page_id");
        push_window(&mut qb, window);

        let rows = qb
            .build_query_as::<PageRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PageRecord::from).collect())
    }
}
