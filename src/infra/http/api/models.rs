use serde::Deserialize;

use crate::application::browse::{
    COMMENTS_PAGE_SIZE, EMPLOYEES_PAGE_SIZE, POSTS_PAGE_SIZE, RELATIONS_PAGE_SIZE,
    SEARCH_PAGE_SIZE,
};
use crate::application::repos::PageSearchFilter;

const FIRST_PAGE: i64 = 1;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub industry: Option<String>,
    pub name: Option<String>,
    pub min_followers: Option<i64>,
    pub max_followers: Option<i64>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl SearchQuery {
    pub fn filter(&self) -> PageSearchFilter {
        PageSearchFilter::new(
            self.industry.clone(),
            self.name.clone(),
            self.min_followers,
            self.max_followers,
        )
    }

    pub fn window(&self) -> (i64, i64) {
        (
            self.page.unwrap_or(FIRST_PAGE),
            self.limit.unwrap_or(SEARCH_PAGE_SIZE),
        )
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ListQuery {
    pub fn window(&self, default_limit: i64) -> (i64, i64) {
        (
            self.page.unwrap_or(FIRST_PAGE),
            self.limit.unwrap_or(default_limit),
        )
    }

    pub fn posts(&self) -> (i64, i64) {
        self.window(POSTS_PAGE_SIZE)
    }

    pub fn employees(&self) -> (i64, i64) {
        self.window(EMPLOYEES_PAGE_SIZE)
    }

    pub fn relations(&self) -> (i64, i64) {
        self.window(RELATIONS_PAGE_SIZE)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentsQuery {
    pub post_id: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl CommentsQuery {
    pub fn post_id(&self) -> Option<&str> {
        self.post_id.as_deref().filter(|id| !id.trim().is_empty())
    }

    pub fn window(&self) -> (i64, i64) {
        (
            self.page.unwrap_or(FIRST_PAGE),
            self.limit.unwrap_or(COMMENTS_PAGE_SIZE),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_parameters_use_route_defaults() {
        assert_eq!(SearchQuery::default().window(), (1, SEARCH_PAGE_SIZE));
        assert_eq!(ListQuery::default().posts(), (1, 15));
        assert_eq!(ListQuery::default().relations(), (1, 25));
        assert_eq!(CommentsQuery::default().window(), (1, 20));
    }

    #[test]
    fn blank_post_filter_is_ignored() {
        let query = CommentsQuery {
            post_id: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(query.post_id().is_none());
    }
}
