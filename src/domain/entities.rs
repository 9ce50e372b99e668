//! Domain entities mirrored from persistent storage.

use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::document::{Document, ID_FIELD, StoreValue, document};
use crate::domain::types::Relation;

#[derive(Debug, Clone, PartialEq)]
pub struct PageRecord {
    pub id: Uuid,
    pub page_id: String,
    pub name: String,
    pub url: String,
    pub linkedin_internal_id: Option<String>,
    pub profile_picture: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub followers: i64,
    pub head_count: i64,
    pub specialties: Vec<String>,
    pub created_at: OffsetDateTime,
    pub last_scraped_at: OffsetDateTime,
}

/// Page fields as produced by acquisition, before the store assigns identity
/// and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPage {
    pub page_id: String,
    pub name: String,
    pub url: String,
    pub linkedin_internal_id: Option<String>,
    pub profile_picture: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub followers: i64,
    pub head_count: i64,
    pub specialties: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostRecord {
    pub id: Uuid,
    pub page_id: String,
    pub post_id: String,
    pub content: String,
    pub likes: i64,
    pub comments_count: i64,
    pub posted_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub page_id: String,
    pub post_id: String,
    pub content: String,
    pub likes: i64,
    pub comments_count: i64,
    pub posted_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeRecord {
    pub id: Uuid,
    pub page_id: String,
    pub name: String,
    pub role: String,
    pub profile_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployee {
    pub page_id: String,
    pub name: String,
    pub role: String,
    pub profile_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentRecord {
    pub id: Uuid,
    pub page_id: String,
    pub post_id: String,
    pub comment_id: String,
    pub author: Option<String>,
    pub content: String,
    pub likes: i64,
    pub posted_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub page_id: String,
    pub post_id: String,
    pub comment_id: String,
    pub author: Option<String>,
    pub content: String,
    pub likes: i64,
    pub posted_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FollowerRecord {
    pub id: Uuid,
    pub page_id: String,
    pub profile_id: String,
    pub name: Option<String>,
    pub profile_url: Option<String>,
    pub relation: Relation,
    pub followed_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFollower {
    pub page_id: String,
    pub profile_id: String,
    pub name: Option<String>,
    pub profile_url: Option<String>,
    pub relation: Relation,
    pub followed_at: OffsetDateTime,
}

/// Everything acquisition knows about a page: the page row plus the child
/// collections that fan out into their own tables.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquiredPage {
    pub page: NewPage,
    pub posts: Vec<NewPost>,
    pub comments: Vec<NewComment>,
    pub employees: Vec<NewEmployee>,
    pub followers: Vec<NewFollower>,
    pub following: Vec<NewFollower>,
}

impl AcquiredPage {
    /// Full payload: `stored` supplies the page fields, the child collections
    /// come from the acquired record.
    pub fn to_document(&self, stored: &PageRecord) -> Document {
        let mut doc = stored.to_document();
        doc.insert(
            "posts".into(),
            StoreValue::Array(self.posts.iter().map(|p| p.to_document().into()).collect()),
        );
        doc.insert(
            "comments".into(),
            StoreValue::Array(
                self.comments
                    .iter()
                    .map(|c| c.to_document().into())
                    .collect(),
            ),
        );
        doc.insert(
            "employees".into(),
            StoreValue::Array(
                self.employees
                    .iter()
                    .map(|e| e.to_document().into())
                    .collect(),
            ),
        );
        doc.insert(
            "followers_list".into(),
            StoreValue::Array(
                self.followers
                    .iter()
                    .map(|f| f.to_document().into())
                    .collect(),
            ),
        );
        doc.insert(
            "following_list".into(),
            StoreValue::Array(
                self.following
                    .iter()
                    .map(|f| f.to_document().into())
                    .collect(),
            ),
        );
        doc
    }
}

impl PageRecord {
    pub fn to_document(&self) -> Document {
        document([
            (ID_FIELD, self.id.into()),
            ("page_id", (&self.page_id).into()),
            ("name", (&self.name).into()),
            ("url", (&self.url).into()),
            ("linkedin_internal_id", (&self.linkedin_internal_id).into()),
            ("profile_picture", (&self.profile_picture).into()),
            ("description", (&self.description).into()),
            ("website", (&self.website).into()),
            ("industry", (&self.industry).into()),
            ("followers", self.followers.into()),
            ("head_count", self.head_count.into()),
            ("specialties", self.specialties.clone().into()),
            ("created_at", self.created_at.into()),
            ("last_scraped_at", self.last_scraped_at.into()),
        ])
    }
}

impl PostRecord {
    pub fn to_document(&self) -> Document {
        let mut doc = document([(ID_FIELD, self.id.into())]);
        doc.extend(post_fields(
            &self.page_id,
            &self.post_id,
            &self.content,
            self.likes,
            self.comments_count,
            self.posted_at,
        ));
        doc
    }
}

impl NewPost {
    pub fn to_document(&self) -> Document {
        post_fields(
            &self.page_id,
            &self.post_id,
            &self.content,
            self.likes,
            self.comments_count,
            self.posted_at,
        )
    }
}

fn post_fields(
    page_id: &str,
    post_id: &str,
    content: &str,
    likes: i64,
    comments_count: i64,
    posted_at: OffsetDateTime,
) -> Document {
    document([
        ("page_id", page_id.into()),
        ("post_id", post_id.into()),
        ("content", content.into()),
        ("likes", likes.into()),
        ("comments_count", comments_count.into()),
        ("posted_at", posted_at.into()),
    ])
}

impl EmployeeRecord {
    pub fn to_document(&self) -> Document {
        document([
            (ID_FIELD, self.id.into()),
            ("page_id", (&self.page_id).into()),
            ("name", (&self.name).into()),
            ("role", (&self.role).into()),
            ("profile_url", (&self.profile_url).into()),
        ])
    }
}

impl NewEmployee {
    pub fn to_document(&self) -> Document {
        document([
            ("page_id", (&self.page_id).into()),
            ("name", (&self.name).into()),
            ("role", (&self.role).into()),
            ("profile_url", (&self.profile_url).into()),
        ])
    }
}

impl CommentRecord {
    pub fn to_document(&self) -> Document {
        document([
            (ID_FIELD, self.id.into()),
            ("page_id", (&self.page_id).into()),
            ("post_id", (&self.post_id).into()),
            ("comment_id", (&self.comment_id).into()),
            ("author", (&self.author).into()),
            ("content", (&self.content).into()),
            ("likes", self.likes.into()),
            ("posted_at", self.posted_at.into()),
        ])
    }
}

impl NewComment {
    pub fn to_document(&self) -> Document {
        document([
            ("page_id", (&self.page_id).into()),
            ("post_id", (&self.post_id).into()),
            ("comment_id", (&self.comment_id).into()),
            ("author", (&self.author).into()),
            ("content", (&self.content).into()),
            ("likes", self.likes.into()),
            ("posted_at", self.posted_at.into()),
        ])
    }
}

impl FollowerRecord {
    pub fn to_document(&self) -> Document {
        document([
            (ID_FIELD, self.id.into()),
            ("page_id", (&self.page_id).into()),
            ("profile_id", (&self.profile_id).into()),
            ("name", (&self.name).into()),
            ("profile_url", (&self.profile_url).into()),
            ("relation", self.relation.as_str().into()),
            ("followed_at", self.followed_at.into()),
        ])
    }
}

impl NewFollower {
    pub fn to_document(&self) -> Document {
        document([
            ("page_id", (&self.page_id).into()),
            ("profile_id", (&self.profile_id).into()),
            ("name", (&self.name).into()),
            ("profile_url", (&self.profile_url).into()),
            ("relation", self.relation.as_str().into()),
            ("followed_at", self.followed_at.into()),
        ])
    }
}
