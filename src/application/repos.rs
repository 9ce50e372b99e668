//! Repository traits describing persistence adapters.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::application::pagination::OffsetWindow;
use crate::domain::entities::{
    CommentRecord, EmployeeRecord, FollowerRecord, NewComment, NewEmployee, NewFollower, NewPage,
    NewPost, PageRecord, PostRecord,
};
use crate::domain::types::Relation;

pub const DEFAULT_MIN_FOLLOWERS: i64 = 0;
pub const DEFAULT_MAX_FOLLOWERS: i64 = 1_000_000;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Page search criteria. Text filters are case-insensitive substring matches;
/// follower bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSearchFilter {
    pub industry: Option<String>,
    pub name: Option<String>,
    pub min_followers: i64,
    pub max_followers: i64,
}

impl Default for PageSearchFilter {
    fn default() -> Self {
        Self {
            industry: None,
            name: None,
            min_followers: DEFAULT_MIN_FOLLOWERS,
            max_followers: DEFAULT_MAX_FOLLOWERS,
        }
    }
}

impl PageSearchFilter {
    /// Blank text filters are dropped so they never constrain the query.
    pub fn new(
        industry: Option<String>,
        name: Option<String>,
        min_followers: Option<i64>,
        max_followers: Option<i64>,
    ) -> Self {
        Self {
            industry: non_blank(industry),
            name: non_blank(name),
            min_followers: min_followers.unwrap_or(DEFAULT_MIN_FOLLOWERS),
            max_followers: max_followers.unwrap_or(DEFAULT_MAX_FOLLOWERS),
        }
    }

    pub fn industry_pattern(&self) -> Option<String> {
        self.industry.as_deref().map(contains_pattern)
    }

    pub fn name_pattern(&self) -> Option<String> {
        self.name.as_deref().map(contains_pattern)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// `ILIKE` pattern matching `needle` anywhere, with LIKE metacharacters escaped.
pub fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
pub trait PagesRepo: Send + Sync {
    async fn find_by_page_id(&self, page_id: &str) -> Result<Option<PageRecord>, RepoError>;

    async fn create_page(&self, page: &NewPage) -> Result<PageRecord, RepoError>;

    async fn search_pages(
        &self,
        filter: &PageSearchFilter,
        window: OffsetWindow,
    ) -> Result<Vec<PageRecord>, RepoError>;
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    async fn insert_posts(&self, posts: &[NewPost]) -> Result<u64, RepoError>;

    /// Most recent first by `posted_at`.
    async fn list_recent_posts(
        &self,
        page_id: &str,
        window: OffsetWindow,
    ) -> Result<Vec<PostRecord>, RepoError>;
}

#[async_trait]
pub trait EmployeesRepo: Send + Sync {
    async fn insert_employees(&self, employees: &[NewEmployee]) -> Result<u64, RepoError>;

    async fn list_employees(
        &self,
        page_id: &str,
        window: OffsetWindow,
    ) -> Result<Vec<EmployeeRecord>, RepoError>;
}

#[async_trait]
pub trait CommentsRepo: Send + Sync {
    async fn insert_comments(&self, comments: &[NewComment]) -> Result<u64, RepoError>;

    /// Most recent first by `posted_at`, optionally narrowed to one post.
    async fn list_comments(
        &self,
        page_id: &str,
        post_id: Option<&str>,
        window: OffsetWindow,
    ) -> Result<Vec<CommentRecord>, RepoError>;
}

#[async_trait]
pub trait FollowersRepo: Send + Sync {
    async fn insert_relations(&self, rows: &[NewFollower]) -> Result<u64, RepoError>;

    async fn list_relations(
        &self,
        page_id: &str,
        relation: Relation,
        window: OffsetWindow,
    ) -> Result<Vec<FollowerRecord>, RepoError>;
}

/// One handle per collection, shared by the services.
#[derive(Clone)]
pub struct RepoSet {
    pub pages: Arc<dyn PagesRepo>,
    pub posts: Arc<dyn PostsRepo>,
    pub employees: Arc<dyn EmployeesRepo>,
    pub comments: Arc<dyn CommentsRepo>,
    pub followers: Arc<dyn FollowersRepo>,
}

impl RepoSet {
    /// Use a single adapter that implements every repository trait.
    pub fn shared<R>(repo: Arc<R>) -> Self
    where
        R: PagesRepo + PostsRepo + EmployeesRepo + CommentsRepo + FollowersRepo + 'static,
    {
        Self {
            pages: repo.clone(),
            posts: repo.clone(),
            employees: repo.clone(),
            comments: repo.clone(),
            followers: repo,
        }
    }
}
