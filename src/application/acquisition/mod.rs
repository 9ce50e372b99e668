//! Page acquisition.
//!
//! A [`PageSource`] turns an unknown identifier into a complete
//! [`AcquiredPage`]. Two implementations exist: [`SyntheticSource`] generates
//! a deterministic record from the identifier alone, [`LiveSource`] scrapes
//! the public company profile and falls back to the synthetic record on any
//! failure. Acquisition never fails outward.

mod live;
mod synthetic;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

pub use live::{LiveSource, ParsedProfile, ScrapeError, extract_number, parse_profile};
pub use synthetic::{
    DEFAULT_POST_LIMIT, EMPLOYEE_COUNT, FOLLOWER_COUNT, FOLLOWING_COUNT, SyntheticSource,
};

use crate::domain::entities::AcquiredPage;

pub const METRIC_ACQUISITION_TOTAL: &str = "pageinsight_acquisition_total";
pub const METRIC_LIVE_FALLBACK_TOTAL: &str = "pageinsight_acquisition_live_fallback_total";

#[async_trait]
pub trait PageSource: Send + Sync {
    async fn produce_record(&self, page_id: &str) -> AcquiredPage;
}

/// Construction-time inputs for [`build_source`].
#[derive(Debug, Clone)]
pub struct AcquisitionOptions {
    pub live_enabled: bool,
    pub session_cookie: Option<String>,
    pub post_limit: usize,
    pub timeout: Duration,
}

impl Default for AcquisitionOptions {
    fn default() -> Self {
        Self {
            live_enabled: true,
            session_cookie: None,
            post_limit: DEFAULT_POST_LIMIT,
            timeout: Duration::from_secs(20),
        }
    }
}

/// Live scraping needs both the flag and a session cookie; anything else
/// yields the synthetic source.
pub fn build_source(options: &AcquisitionOptions) -> Result<Arc<dyn PageSource>, ScrapeError> {
    let synthetic = SyntheticSource::new(options.post_limit);
    match options.session_cookie.as_deref() {
        Some(cookie) if options.live_enabled && !cookie.is_empty() => {
            info!(
                target = "pageinsight::acquisition",
                timeout_secs = options.timeout.as_secs(),
                "Using live page source with synthetic fallback"
            );
            Ok(Arc::new(LiveSource::new(
                cookie.to_string(),
                options.timeout,
                synthetic,
            )?))
        }
        _ => {
            info!(
                target = "pageinsight::acquisition",
                live_enabled = options.live_enabled,
                "Using synthetic page source"
            );
            Ok(Arc::new(synthetic))
        }
    }
}

/// Canonical profile URL for an identifier.
pub fn company_url(page_id: &str) -> String {
    format!("https://www.linkedin.com/company/{page_id}/")
}

/// Upper-case the first character and lower-case the rest.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_lowers_the_tail() {
        assert_eq!(capitalize("acme"), "Acme");
        assert_eq!(capitalize("deepMind-AI"), "Deepmind-ai");
        assert_eq!(capitalize(""), "");
    }

    #[tokio::test]
    async fn missing_cookie_selects_synthetic_source() {
        let options = AcquisitionOptions {
            post_limit: 3,
            ..AcquisitionOptions::default()
        };
        let source = build_source(&options).unwrap();
        let record = source.produce_record("acme").await;
        assert_eq!(record.posts.len(), 3);
        assert_eq!(record, SyntheticSource::new(3).generate("acme"));
    }

    #[tokio::test]
    async fn disabled_live_ignores_cookie() {
        let options = AcquisitionOptions {
            live_enabled: false,
            session_cookie: Some("secret".to_string()),
            post_limit: 2,
            ..AcquisitionOptions::default()
        };
        let record = build_source(&options).unwrap().produce_record("acme").await;
        assert_eq!(record, SyntheticSource::new(2).generate("acme"));
    }
}
