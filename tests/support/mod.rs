#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use pageinsight::application::acquisition::{PageSource, SyntheticSource};
use pageinsight::application::insights::{InsightError, InsightGenerator};
use pageinsight::application::pagination::OffsetWindow;
use pageinsight::application::repos::{
    CommentsRepo, EmployeesRepo, FollowersRepo, PageSearchFilter, PagesRepo, PostsRepo, RepoError,
    RepoSet,
};
use pageinsight::domain::entities::{
    AcquiredPage, CommentRecord, EmployeeRecord, FollowerRecord, NewComment, NewEmployee,
    NewFollower, NewPage, NewPost, PageRecord, PostRecord,
};
use pageinsight::domain::types::Relation;

#[derive(Default)]
struct Tables {
    pages: Vec<PageRecord>,
    posts: Vec<PostRecord>,
    employees: Vec<EmployeeRecord>,
    comments: Vec<CommentRecord>,
    relations: Vec<FollowerRecord>,
}

/// Call counters per repository operation.
#[derive(Default)]
pub struct RepoCalls {
    pub find_page: AtomicUsize,
    pub create_page: AtomicUsize,
    pub insert_posts: AtomicUsize,
    pub insert_employees: AtomicUsize,
    pub insert_comments: AtomicUsize,
    pub insert_relations: AtomicUsize,
}

impl RepoCalls {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn inserts(&self) -> usize {
        Self::get(&self.insert_posts)
            + Self::get(&self.insert_employees)
            + Self::get(&self.insert_comments)
            + Self::get(&self.insert_relations)
    }
}

/// In-memory stand-in for every repository trait.
#[derive(Default)]
pub struct MemoryRepos {
    tables: Mutex<Tables>,
    pub calls: RepoCalls,
    fail_writes: AtomicBool,
}

impl MemoryRepos {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn repo_set(self: &Arc<Self>) -> RepoSet {
        RepoSet::shared(self.clone())
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_write(&self) -> Result<(), RepoError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepoError::Persistence("store unavailable".to_string()));
        }
        Ok(())
    }

    /// Persist `acquired` the way the page service would.
    pub async fn seed(&self, acquired: &AcquiredPage) -> PageRecord {
        let page = insert_page(&mut *self.tables.lock().await, &acquired.page);
        let mut tables = self.tables.lock().await;
        tables.posts.extend(acquired.posts.iter().map(post_record));
        tables
            .employees
            .extend(acquired.employees.iter().map(employee_record));
        tables
            .comments
            .extend(acquired.comments.iter().map(comment_record));
        tables.relations.extend(
            acquired
                .followers
                .iter()
                .chain(acquired.following.iter())
                .map(relation_record),
        );
        page
    }

    pub async fn page_count(&self) -> usize {
        self.tables.lock().await.pages.len()
    }

    pub async fn post_count(&self) -> usize {
        self.tables.lock().await.posts.len()
    }

    pub async fn relation_count(&self, relation: Relation) -> usize {
        self.tables
            .lock()
            .await
            .relations
            .iter()
            .filter(|row| row.relation == relation)
            .count()
    }
}

fn insert_page(tables: &mut Tables, page: &NewPage) -> PageRecord {
    let now = OffsetDateTime::now_utc();
    let record = PageRecord {
        id: Uuid::new_v4(),
        page_id: page.page_id.clone(),
        name: page.name.clone(),
        url: page.url.clone(),
        linkedin_internal_id: page.linkedin_internal_id.clone(),
        profile_picture: page.profile_picture.clone(),
        description: page.description.clone(),
        website: page.website.clone(),
        industry: page.industry.clone(),
        followers: page.followers,
        head_count: page.head_count,
        specialties: page.specialties.clone(),
        created_at: now,
        last_scraped_at: now,
    };
    tables.pages.push(record.clone());
    record
}

fn post_record(post: &NewPost) -> PostRecord {
    PostRecord {
        id: Uuid::new_v4(),
        page_id: post.page_id.clone(),
        post_id: post.post_id.clone(),
        content: post.content.clone(),
        likes: post.likes,
        comments_count: post.comments_count,
        posted_at: post.posted_at,
    }
}

fn employee_record(employee: &NewEmployee) -> EmployeeRecord {
    EmployeeRecord {
        id: Uuid::new_v4(),
        page_id: employee.page_id.clone(),
        name: employee.name.clone(),
        role: employee.role.clone(),
        profile_url: employee.profile_url.clone(),
    }
}

fn comment_record(comment: &NewComment) -> CommentRecord {
    CommentRecord {
        id: Uuid::new_v4(),
        page_id: comment.page_id.clone(),
        post_id: comment.post_id.clone(),
        comment_id: comment.comment_id.clone(),
        author: comment.author.clone(),
        content: comment.content.clone(),
        likes: comment.likes,
        posted_at: comment.posted_at,
    }
}

fn relation_record(row: &NewFollower) -> FollowerRecord {
    FollowerRecord {
        id: Uuid::new_v4(),
        page_id: row.page_id.clone(),
        profile_id: row.profile_id.clone(),
        name: row.name.clone(),
        profile_url: row.profile_url.clone(),
        relation: row.relation,
        followed_at: row.followed_at,
    }
}

fn window<T: Clone>(rows: Vec<T>, window: OffsetWindow) -> Vec<T> {
    rows.into_iter()
        .skip(window.skip_usize())
        .take(window.limit_usize())
        .collect()
}

fn contains(haystack: Option<&str>, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) => haystack
            .map(|value| value.to_lowercase().contains(&needle.to_lowercase()))
            .unwrap_or(false),
    }
}

#[async_trait]
impl PagesRepo for MemoryRepos {
    async fn find_by_page_id(&self, page_id: &str) -> Result<Option<PageRecord>, RepoError> {
        self.calls.find_page.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.lock().await;
        Ok(tables
            .pages
            .iter()
            .find(|page| page.page_id == page_id)
            .cloned())
    }

    async fn create_page(&self, page: &NewPage) -> Result<PageRecord, RepoError> {
        self.calls.create_page.fetch_add(1, Ordering::SeqCst);
        self.check_write()?;
        let mut tables = self.tables.lock().await;
        if tables.pages.iter().any(|row| row.page_id == page.page_id) {
            return Err(RepoError::Duplicate {
                constraint: "pages_page_id_key".to_string(),
            });
        }
        Ok(insert_page(&mut tables, page))
    }

    async fn search_pages(
        &self,
        filter: &PageSearchFilter,
        page_window: OffsetWindow,
    ) -> Result<Vec<PageRecord>, RepoError> {
        let tables = self.tables.lock().await;
        let rows = tables
            .pages
            .iter()
            .filter(|page| contains(page.industry.as_deref(), filter.industry.as_deref()))
            .filter(|page| contains(Some(&page.name), filter.name.as_deref()))
            .filter(|page| {
                page.followers >= filter.min_followers && page.followers <= filter.max_followers
            })
            .cloned()
            .collect();
        Ok(window(rows, page_window))
    }
}

#[async_trait]
impl PostsRepo for MemoryRepos {
    async fn insert_posts(&self, posts: &[NewPost]) -> Result<u64, RepoError> {
        self.calls.insert_posts.fetch_add(1, Ordering::SeqCst);
        self.check_write()?;
        let mut tables = self.tables.lock().await;
        tables.posts.extend(posts.iter().map(post_record));
        Ok(posts.len() as u64)
    }

    async fn list_recent_posts(
        &self,
        page_id: &str,
        page_window: OffsetWindow,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<_> = tables
            .posts
            .iter()
            .filter(|post| post.page_id == page_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
        Ok(window(rows, page_window))
    }
}

#[async_trait]
impl EmployeesRepo for MemoryRepos {
    async fn insert_employees(&self, employees: &[NewEmployee]) -> Result<u64, RepoError> {
        self.calls.insert_employees.fetch_add(1, Ordering::SeqCst);
        self.check_write()?;
        let mut tables = self.tables.lock().await;
        tables
            .employees
            .extend(employees.iter().map(employee_record));
        Ok(employees.len() as u64)
    }

    async fn list_employees(
        &self,
        page_id: &str,
        page_window: OffsetWindow,
    ) -> Result<Vec<EmployeeRecord>, RepoError> {
        let tables = self.tables.lock().await;
        let rows = tables
            .employees
            .iter()
            .filter(|row| row.page_id == page_id)
            .cloned()
            .collect();
        Ok(window(rows, page_window))
    }
}

#[async_trait]
impl CommentsRepo for MemoryRepos {
    async fn insert_comments(&self, comments: &[NewComment]) -> Result<u64, RepoError> {
        self.calls.insert_comments.fetch_add(1, Ordering::SeqCst);
        self.check_write()?;
        let mut tables = self.tables.lock().await;
        tables.comments.extend(comments.iter().map(comment_record));
        Ok(comments.len() as u64)
    }

    async fn list_comments(
        &self,
        page_id: &str,
        post_id: Option<&str>,
        page_window: OffsetWindow,
    ) -> Result<Vec<CommentRecord>, RepoError> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<_> = tables
            .comments
            .iter()
            .filter(|row| row.page_id == page_id)
            .filter(|row| post_id.is_none_or(|post_id| row.post_id == post_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
        Ok(window(rows, page_window))
    }
}

#[async_trait]
impl FollowersRepo for MemoryRepos {
    async fn insert_relations(&self, rows: &[NewFollower]) -> Result<u64, RepoError> {
        self.calls.insert_relations.fetch_add(1, Ordering::SeqCst);
        self.check_write()?;
        let mut tables = self.tables.lock().await;
        tables.relations.extend(rows.iter().map(relation_record));
        Ok(rows.len() as u64)
    }

    async fn list_relations(
        &self,
        page_id: &str,
        relation: Relation,
        page_window: OffsetWindow,
    ) -> Result<Vec<FollowerRecord>, RepoError> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<_> = tables
            .relations
            .iter()
            .filter(|row| row.page_id == page_id && row.relation == relation)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.followed_at.cmp(&a.followed_at));
        Ok(window(rows, page_window))
    }
}

/// Synthetic source that counts how often it is asked for a record.
pub struct CountingSource {
    inner: SyntheticSource,
    pub calls: AtomicUsize,
}

impl CountingSource {
    pub fn new(post_limit: usize) -> Arc<Self> {
        Arc::new(Self {
            inner: SyntheticSource::new(post_limit),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageSource for CountingSource {
    async fn produce_record(&self, page_id: &str) -> AcquiredPage {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.generate(page_id)
    }
}

/// Insight generator returning a fixed object, or failing when told to.
pub struct StubInsights {
    pub calls: AtomicUsize,
    fail: AtomicBool,
}

impl StubInsights {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        })
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InsightGenerator for StubInsights {
    async fn generate(&self, page: &Value) -> Result<Value, InsightError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(InsightError::Status {
                status: 503,
                body: "upstream overloaded".to_string(),
            });
        }
        Ok(json!({
            "company": page.get("name").cloned().unwrap_or(Value::Null),
            "summary": "steady growth",
        }))
    }
}
