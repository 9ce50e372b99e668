//! Page and insight resolution.
//!
//! Page reads go cache → store → acquisition. A first-time acquisition is
//! fanned out into the page table and each child collection before the full
//! record is cached. Insight reads go cache → store → generator and never
//! trigger acquisition.
//!
//! Concurrent first reads of one identifier are not collapsed: both acquire,
//! and the later page insert fails on the unique identifier index.

use std::sync::Arc;

use metrics::counter;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::application::acquisition::PageSource;
use crate::application::insights::{InsightError, InsightGenerator};
use crate::application::repos::{RepoError, RepoSet};
use crate::application::serializer::serialize_document;
use crate::cache::{CacheError, KvCache, insights_key, page_key};
use crate::domain::entities::{AcquiredPage, PageRecord};

pub const METRIC_CACHE_HIT_TOTAL: &str = "pageinsight_cache_hit_total";
pub const METRIC_CACHE_MISS_TOTAL: &str = "pageinsight_cache_miss_total";

#[derive(Debug, Error)]
pub enum PageServiceError {
    #[error("page `{page_id}` not found")]
    NotFound { page_id: String },
    #[error("{operation} failed: {source}")]
    Repo {
        operation: &'static str,
        #[source]
        source: RepoError,
    },
    #[error("cache {operation} failed: {source}")]
    Cache {
        operation: &'static str,
        #[source]
        source: CacheError,
    },
    #[error(transparent)]
    Insights(#[from] InsightError),
}

#[derive(Clone)]
pub struct PageService {
    cache: Arc<dyn KvCache>,
    repos: RepoSet,
    source: Arc<dyn PageSource>,
    insights: Arc<dyn InsightGenerator>,
}

impl PageService {
    pub fn new(
        cache: Arc<dyn KvCache>,
        repos: RepoSet,
        source: Arc<dyn PageSource>,
        insights: Arc<dyn InsightGenerator>,
    ) -> Self {
        Self {
            cache,
            repos,
            source,
            insights,
        }
    }

    /// Serialized page record, acquiring and persisting it on first request.
    pub async fn resolve_page(&self, page_id: &str) -> Result<Value, PageServiceError> {
        let key = page_key(page_id);
        if let Some(cached) = self.cached(&key, "page").await? {
            debug!(
                target = "pageinsight::page",
                page_id,
                outcome = "cache_hit",
                "Resolved page"
            );
            return Ok(cached);
        }

        let stored = self
            .repos
            .pages
            .find_by_page_id(page_id)
            .await
            .map_err(repo_failure("find_by_page_id"))?;

        if let Some(record) = stored {
            let payload = serialize_document(&record.to_document());
            self.fill(&key, &payload).await?;
            debug!(
                target = "pageinsight::page",
                page_id,
                outcome = "store_hit",
                "Resolved page"
            );
            return Ok(payload);
        }

        let acquired = self.source.produce_record(page_id).await;
        let record = self.persist(&acquired).await?;
        let payload = serialize_document(&acquired.to_document(&record));
        self.fill(&key, &payload).await?;

        info!(
            target = "pageinsight::page",
            page_id,
            outcome = "acquired",
            posts = acquired.posts.len(),
            comments = acquired.comments.len(),
            employees = acquired.employees.len(),
            followers = acquired.followers.len(),
            following = acquired.following.len(),
            "Resolved page"
        );
        Ok(payload)
    }

    /// Derived insight object for a stored page.
    pub async fn resolve_insights(&self, page_id: &str) -> Result<Value, PageServiceError> {
        let key = insights_key(page_id);
        if let Some(cached) = self.cached(&key, "insights").await? {
            debug!(
                target = "pageinsight::insights",
                page_id,
                outcome = "cache_hit",
                "Resolved insights"
            );
            return Ok(cached);
        }

        let record = self
            .repos
            .pages
            .find_by_page_id(page_id)
            .await
            .map_err(repo_failure("find_by_page_id"))?
            .ok_or_else(|| PageServiceError::NotFound {
                page_id: page_id.to_string(),
            })?;

        let page = serialize_document(&record.to_document());
        let insights = self.insights.generate(&page).await.inspect_err(|err| {
            warn!(
                target = "pageinsight::insights",
                page_id,
                error = %err,
                "Insight generation failed"
            );
        })?;

        self.fill(&key, &insights).await?;
        info!(
            target = "pageinsight::insights",
            page_id,
            outcome = "generated",
            "Resolved insights"
        );
        Ok(insights)
    }

    /// Page row first, then each non-empty child collection. Nothing is
    /// rolled back when a later step fails.
    async fn persist(&self, acquired: &AcquiredPage) -> Result<PageRecord, PageServiceError> {
        let record = self
            .repos
            .pages
            .create_page(&acquired.page)
            .await
            .map_err(repo_failure("create_page"))?;

        if !acquired.posts.is_empty() {
            self.repos
                .posts
                .insert_posts(&acquired.posts)
                .await
                .map_err(repo_failure("insert_posts"))?;
        }
        if !acquired.employees.is_empty() {
            self.repos
                .employees
                .insert_employees(&acquired.employees)
                .await
                .map_err(repo_failure("insert_employees"))?;
        }
        if !acquired.comments.is_empty() {
            self.repos
                .comments
                .insert_comments(&acquired.comments)
                .await
                .map_err(repo_failure("insert_comments"))?;
        }
        if !acquired.followers.is_empty() {
            self.repos
                .followers
                .insert_relations(&acquired.followers)
                .await
                .map_err(repo_failure("insert_followers"))?;
        }
        if !acquired.following.is_empty() {
            self.repos
                .followers
                .insert_relations(&acquired.following)
                .await
                .map_err(repo_failure("insert_following"))?;
        }

        Ok(record)
    }

    async fn cached(&self, key: &str, kind: &'static str) -> Result<Option<Value>, PageServiceError> {
        let hit = self
            .cache
            .get(key)
            .await
            .map_err(|source| PageServiceError::Cache {
                operation: "get",
                source,
            })?;
        match hit {
            Some(_) => counter!(METRIC_CACHE_HIT_TOTAL, "kind" => kind).increment(1),
            None => counter!(METRIC_CACHE_MISS_TOTAL, "kind" => kind).increment(1),
        }
        Ok(hit)
    }

    async fn fill(&self, key: &str, payload: &Value) -> Result<(), PageServiceError> {
        self.cache
            .set(key, payload, None)
            .await
            .map_err(|source| PageServiceError::Cache {
                operation: "set",
                source,
            })
    }
}

fn repo_failure(operation: &'static str) -> impl FnOnce(RepoError) -> PageServiceError {
    move |source| PageServiceError::Repo { operation, source }
}
