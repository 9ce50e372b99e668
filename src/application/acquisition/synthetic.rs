use async_trait::async_trait;
use metrics::counter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

use super::{METRIC_ACQUISITION_TOTAL, PageSource, capitalize, company_url};
use crate::domain::entities::{
    AcquiredPage, NewComment, NewEmployee, NewFollower, NewPage, NewPost,
};
use crate::domain::types::Relation;

pub const DEFAULT_POST_LIMIT: usize = 20;
pub const EMPLOYEE_COUNT: usize = 20;
pub const FOLLOWER_COUNT: usize = 30;
pub const FOLLOWING_COUNT: usize = 15;
pub const SPECIALTIES: [&str; 3] = ["AI", "Cloud", "Automation"];

/// Every generated timestamp is an offset from this instant.
const ANCHOR: OffsetDateTime = datetime!(2024-01-01 00:00:00 UTC);

/// Seeded generator producing a full record for any identifier.
///
/// The generator is seeded from the SHA-256 of the identifier, so two calls
/// with the same identifier yield identical records in any process.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    post_limit: usize,
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new(DEFAULT_POST_LIMIT)
    }
}

impl SyntheticSource {
    pub fn new(post_limit: usize) -> Self {
        Self { post_limit }
    }

    pub fn generate(&self, page_id: &str) -> AcquiredPage {
        let mut rng = seeded_rng(page_id);

        let mut posts = Vec::with_capacity(self.post_limit);
        let mut comments = Vec::new();
        for i in 0..self.post_limit {
            let post_id = format!("{page_id}_post_{i}");
            let posted_at = ANCHOR - Duration::hours(i as i64);
            let likes = rng.random_range(10..=600);
            let comments_count: i64 = rng.random_range(1..=5);

            for j in 1..=comments_count {
                comments.push(NewComment {
                    page_id: page_id.to_string(),
                    post_id: post_id.clone(),
                    comment_id: format!("{post_id}_c{j}"),
                    author: Some(format!("User {j}")),
                    content: format!("Comment {j} on post {i}"),
                    likes: rng.random_range(0..=50),
                    posted_at: posted_at + Duration::minutes(j),
                });
            }

            posts.push(NewPost {
                page_id: page_id.to_string(),
                post_id,
                content: format!("Post content {i}"),
                likes,
                comments_count,
                posted_at,
            });
        }

        let employees = (0..EMPLOYEE_COUNT)
            .map(|i| NewEmployee {
                page_id: page_id.to_string(),
                name: format!("Employee {i}"),
                role: "Software Engineer".to_string(),
                profile_url: format!("https://www.linkedin.com/company/{page_id}/people/"),
            })
            .collect();

        let followers = (0..FOLLOWER_COUNT)
            .map(|i| NewFollower {
                page_id: page_id.to_string(),
                profile_id: format!("follower_{i}"),
                name: Some(format!("Follower {i}")),
                profile_url: Some(format!("https://www.linkedin.com/in/follower-{i}")),
                relation: Relation::Follower,
                followed_at: ANCHOR - Duration::days(i as i64),
            })
            .collect();

        let following = (0..FOLLOWING_COUNT)
            .map(|i| NewFollower {
                page_id: page_id.to_string(),
                profile_id: format!("following_{i}"),
                name: Some(format!("Following {i}")),
                profile_url: Some(format!("https://www.linkedin.com/company/following-{i}")),
                relation: Relation::Following,
                followed_at: ANCHOR - Duration::days(i as i64),
            })
            .collect();

        let internal_id: u32 = rng.random_range(100_000..=999_999);
        let page = NewPage {
            page_id: page_id.to_string(),
            name: capitalize(page_id),
            url: company_url(page_id),
            linkedin_internal_id: Some(internal_id.to_string()),
            profile_picture: Some(format!("https://picsum.photos/seed/{page_id}/200/200")),
            description: Some("Sample LinkedIn company description".to_string()),
            website: Some("https://example.com".to_string()),
            industry: Some("Software Development".to_string()),
            followers: rng.random_range(20_000..=80_000),
            head_count: rng.random_range(50..=500),
            specialties: SPECIALTIES.iter().map(|tag| tag.to_string()).collect(),
        };

        AcquiredPage {
            page,
            posts,
            comments,
            employees,
            followers,
            following,
        }
    }
}

fn seeded_rng(page_id: &str) -> StdRng {
    let mut hasher = Sha256::new();
    hasher.update(page_id.as_bytes());
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&hasher.finalize());
    StdRng::from_seed(seed)
}

#[async_trait]
impl PageSource for SyntheticSource {
    async fn produce_record(&self, page_id: &str) -> AcquiredPage {
        counter!(METRIC_ACQUISITION_TOTAL, "source" => "synthetic").increment(1);
        self.generate(page_id)
    }
}
