//! Paginated list reads and page search.

use serde_json::Value;

use crate::application::pagination::OffsetWindow;
use crate::application::repos::{PageSearchFilter, RepoError, RepoSet};
use crate::application::serializer::serialize_documents;
use crate::domain::types::Relation;

pub const SEARCH_PAGE_SIZE: i64 = 10;
pub const POSTS_PAGE_SIZE: i64 = 15;
pub const EMPLOYEES_PAGE_SIZE: i64 = 20;
pub const COMMENTS_PAGE_SIZE: i64 = 20;
pub const RELATIONS_PAGE_SIZE: i64 = 25;

#[derive(Clone)]
pub struct BrowseService {
    repos: RepoSet,
}

impl BrowseService {
    pub fn new(repos: RepoSet) -> Self {
        Self { repos }
    }

    pub async fn search_pages(
        &self,
        filter: &PageSearchFilter,
        page: i64,
        limit: i64,
    ) -> Result<Value, RepoError> {
        let rows = self
            .repos
            .pages
            .search_pages(filter, OffsetWindow::new(page, limit))
            .await?;
        Ok(serialize_documents(rows.iter().map(|row| row.to_document())))
    }

    pub async fn list_posts(&self, page_id: &str, page: i64, limit: i64) -> Result<Value, RepoError> {
        let rows = self
            .repos
            .posts
            .list_recent_posts(page_id, OffsetWindow::new(page, limit))
            .await?;
        Ok(serialize_documents(rows.iter().map(|row| row.to_document())))
    }

    pub async fn list_employees(
        &self,
        page_id: &str,
        page: i64,
        limit: i64,
    ) -> Result<Value, RepoError> {
        let rows = self
            .repos
            .employees
            .list_employees(page_id, OffsetWindow::new(page, limit))
            .await?;
        Ok(serialize_documents(rows.iter().map(|row| row.to_document())))
    }

    pub async fn list_comments(
        &self,
        page_id: &str,
        post_id: Option<&str>,
        page: i64,
        limit: i64,
    ) -> Result<Value, RepoError> {
        let rows = self
            .repos
            .comments
            .list_comments(page_id, post_id, OffsetWindow::new(page, limit))
            .await?;
        Ok(serialize_documents(rows.iter().map(|row| row.to_document())))
    }

    pub async fn list_followers(
        &self,
        page_id: &str,
        page: i64,
        limit: i64,
    ) -> Result<Value, RepoError> {
        self.list_relations(page_id, Relation::Follower, page, limit)
            .await
    }

    pub async fn list_following(
        &self,
        page_id: &str,
        page: i64,
        limit: i64,
    ) -> Result<Value, RepoError> {
        self.list_relations(page_id, Relation::Following, page, limit)
            .await
    }

    async fn list_relations(
        &self,
        page_id: &str,
        relation: Relation,
        page: i64,
        limit: i64,
    ) -> Result<Value, RepoError> {
        let rows = self
            .repos
            .followers
            .list_relations(page_id, relation, OffsetWindow::new(page, limit))
            .await?;
        Ok(serialize_documents(rows.iter().map(|row| row.to_document())))
    }
}
