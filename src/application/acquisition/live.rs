use std::{cell::RefCell, rc::Rc, time::Duration};

use async_trait::async_trait;
use lol_html::html_content::EndTag;
use lol_html::{RewriteStrSettings, doc_text, element, rewrite_str, text};
use metrics::counter;
use reqwest::{Client, header};
use thiserror::Error;
use tracing::{debug, warn};

use super::{
    METRIC_ACQUISITION_TOTAL, METRIC_LIVE_FALLBACK_TOTAL, PageSource, SyntheticSource, capitalize,
    company_url,
};
use crate::domain::entities::{AcquiredPage, NewPage};

const DEFAULT_BASE_URL: &str = "https://www.linkedin.com/company/";
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36";
const FOLLOWER_KEYWORDS: [&str; 2] = ["followers", "Follower"];
const EMPLOYEE_KEYWORDS: [&str; 2] = ["employees", "employee"];
/// Characters inspected after a keyword when collecting digits.
const NUMBER_WINDOW: usize = 50;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("profile request returned status {0}")]
    Status(u16),
    #[error("failed to parse profile markup: {0}")]
    Parse(String),
}

/// Fields recovered from the profile markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedProfile {
    pub name: Option<String>,
    pub description: Option<String>,
    pub followers: Option<i64>,
    pub head_count: Option<i64>,
}

impl ParsedProfile {
    fn into_record(self, page_id: &str) -> AcquiredPage {
        AcquiredPage {
            page: NewPage {
                page_id: page_id.to_string(),
                name: self.name.unwrap_or_else(|| capitalize(page_id)),
                url: company_url(page_id),
                linkedin_internal_id: None,
                profile_picture: None,
                description: self.description,
                website: None,
                industry: None,
                followers: self.followers.unwrap_or(0),
                head_count: self.head_count.unwrap_or(0),
                specialties: Vec::new(),
            },
            posts: Vec::new(),
            comments: Vec::new(),
            employees: Vec::new(),
            followers: Vec::new(),
            following: Vec::new(),
        }
    }
}

/// Scrapes the public "about" page, substituting the synthetic record when
/// the scrape fails.
pub struct LiveSource {
    client: Client,
    session_cookie: String,
    base_url: String,
    fallback: SyntheticSource,
}

impl LiveSource {
    pub fn new(
        session_cookie: String,
        timeout: Duration,
        fallback: SyntheticSource,
    ) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            session_cookie,
            base_url: DEFAULT_BASE_URL.to_string(),
            fallback,
        })
    }

    /// Point the scraper at another host. The identifier and `/about` are
    /// appended to `base_url`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn scrape(&self, page_id: &str) -> Result<AcquiredPage, ScrapeError> {
        let url = format!("{}{page_id}/about", self.base_url);
        let response = self
            .client
            .get(&url)
            .header(header::COOKIE, format!("li_at={}", self.session_cookie))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status(status.as_u16()));
        }

        let html = response.text().await?;
        let profile = parse_profile(&html)?;
        debug!(
            target = "pageinsight::acquisition::live",
            page_id,
            has_name = profile.name.is_some(),
            followers = profile.followers,
            "Parsed live profile"
        );
        Ok(profile.into_record(page_id))
    }
}

#[async_trait]
impl PageSource for LiveSource {
    async fn produce_record(&self, page_id: &str) -> AcquiredPage {
        match self.scrape(page_id).await {
            Ok(record) => {
                counter!(METRIC_ACQUISITION_TOTAL, "source" => "live").increment(1);
                record
            }
            Err(err) => {
                warn!(
                    target = "pageinsight::acquisition::live",
                    page_id,
                    error = %err,
                    "Live scrape failed; using synthetic record"
                );
                counter!(METRIC_LIVE_FALLBACK_TOTAL).increment(1);
                counter!(METRIC_ACQUISITION_TOTAL, "source" => "synthetic").increment(1);
                self.fallback.generate(page_id)
            }
        }
    }
}

/// Accumulates text nodes, which may arrive split across several chunks.
#[derive(Debug, Default)]
struct TextCollector {
    pending: String,
    parts: Vec<String>,
}

impl TextCollector {
    fn push(&mut self, chunk: &str, last_in_node: bool) {
        self.pending.push_str(chunk);
        if last_in_node {
            let trimmed = self.pending.trim();
            if !trimmed.is_empty() {
                self.parts.push(trimmed.to_string());
            }
            self.pending.clear();
        }
    }

    fn joined(&self, separator: &str) -> Option<String> {
        let text = self.parts.join(separator);
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Debug, Default)]
struct ProfileState {
    /// Open `<script>`/`<style>` elements; their text is not page content.
    raw_depth: usize,
    headings: usize,
    paragraphs: usize,
    heading: TextCollector,
    paragraph: TextCollector,
    document: TextCollector,
}

/// Extract the first `<h1>` text, the first `<p>` text, and the follower and
/// employee counts found in the document text.
pub fn parse_profile(html: &str) -> Result<ParsedProfile, ScrapeError> {
    let state = Rc::new(RefCell::new(ProfileState::default()));

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("script, style", {
                    let state = Rc::clone(&state);
                    move |el| {
                        if let Some(handlers) = el.end_tag_handlers() {
                            state.borrow_mut().raw_depth += 1;
                            let state = Rc::clone(&state);
                            handlers.push(Box::new(move |_: &mut EndTag<'_>| {
                                let mut state = state.borrow_mut();
                                state.raw_depth = state.raw_depth.saturating_sub(1);
                                Ok(())
                            }) as lol_html::EndTagHandler<'static>);
                        }
                        Ok(())
                    }
                }),
                element!("h1", {
                    let state = Rc::clone(&state);
                    move |_| {
                        state.borrow_mut().headings += 1;
                        Ok(())
                    }
                }),
                text!("h1", {
                    let state = Rc::clone(&state);
                    move |t| {
                        let mut state = state.borrow_mut();
                        if state.headings == 1 {
                            state.heading.push(t.as_str(), t.last_in_text_node());
                        }
                        Ok(())
                    }
                }),
                element!("p", {
                    let state = Rc::clone(&state);
                    move |_| {
                        state.borrow_mut().paragraphs += 1;
                        Ok(())
                    }
                }),
                text!("p", {
                    let state = Rc::clone(&state);
                    move |t| {
                        let mut state = state.borrow_mut();
                        if state.paragraphs == 1 {
                            state.paragraph.push(t.as_str(), t.last_in_text_node());
                        }
                        Ok(())
                    }
                }),
            ],
            document_content_handlers: vec![doc_text!({
                let state = Rc::clone(&state);
                move |t| {
                    let mut state = state.borrow_mut();
                    if state.raw_depth == 0 {
                        state.document.push(t.as_str(), t.last_in_text_node());
                    }
                    Ok(())
                }
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| ScrapeError::Parse(err.to_string()))?;

    let state = state.borrow();
    let text = state.document.joined(" ").unwrap_or_default();
    Ok(ParsedProfile {
        name: state.heading.joined(""),
        description: state.paragraph.joined(""),
        followers: extract_number(&text, &FOLLOWER_KEYWORDS),
        head_count: extract_number(&text, &EMPLOYEE_KEYWORDS),
    })
}

/// Case-insensitive keyword search; returns the digits found in the window
/// starting at the first keyword that has any.
pub fn extract_number(text: &str, keywords: &[&str]) -> Option<i64> {
    let haystack = text.to_lowercase();
    keywords.iter().find_map(|keyword| {
        let start = haystack.find(&keyword.to_lowercase())?;
        let digits: String = haystack[start..]
            .chars()
            .take(NUMBER_WINDOW)
            .filter(char::is_ascii_digit)
            .collect();
        digits.parse().ok()
    })
}

#[cfg(test)]
mod tests {
    use axum::{Router, extract::Path, http::StatusCode, response::Html, routing::get};
    use tokio::net::TcpListener;

    use super::*;

    const PROFILE: &str = r#"
        <html>
          <head><title>Acme | LinkedIn</title></head>
          <body>
            <h1> Acme <span>Corp</span> </h1>
            <h1>Ignored heading</h1>
            <p>Industrial  supplies.</p>
            <p>Second paragraph</p>
            <div>Followers 12,345</div>
            <div>Our mission is to build the best supplies for everyone.</div>
            <div>201-500 employees</div>
          </body>
        </html>
    "#;

    #[test]
    fn parses_first_heading_and_paragraph() {
        let profile = parse_profile(PROFILE).unwrap();
        assert_eq!(profile.name.as_deref(), Some("AcmeCorp"));
        assert_eq!(profile.description.as_deref(), Some("Industrial  supplies."));
    }

    #[test]
    fn counts_come_from_keyword_windows() {
        let profile = parse_profile(PROFILE).unwrap();
        assert_eq!(profile.followers, Some(12345));
        assert_eq!(profile.head_count, None);
    }

    #[test]
    fn script_and_style_text_is_ignored() {
        let html = r#"<html><head>
            <script>{"followers":987654,"employees":42}</script>
            <style>.followers::after { content: "1000"; }</style>
            </head><body><div>Followers: 12,345</div></body></html>"#;

        let profile = parse_profile(html).unwrap();
        assert_eq!(profile.followers, Some(12345));
        assert_eq!(profile.head_count, None);
    }

    #[test]
    fn digits_are_collected_after_the_keyword_only() {
        assert_eq!(
            extract_number("about 40 employees 1,200 staff", &EMPLOYEE_KEYWORDS),
            Some(1200)
        );
        assert_eq!(extract_number("FOLLOWERS: 9 000", &FOLLOWER_KEYWORDS), Some(9000));
        assert_eq!(extract_number("no counts here", &FOLLOWER_KEYWORDS), None);
    }

    #[test]
    fn window_is_bounded() {
        let text = format!("followers{}7", " ".repeat(60));
        assert_eq!(extract_number(&text, &FOLLOWER_KEYWORDS), None);
    }

    #[test]
    fn missing_markup_falls_back_to_identifier() {
        let profile = parse_profile("<div>nothing</div>").unwrap();
        assert_eq!(profile, ParsedProfile::default());
        let record = profile.into_record("globex");
        assert_eq!(record.page.name, "Globex");
        assert_eq!(record.page.followers, 0);
        assert!(record.posts.is_empty());
        assert!(record.page.specialties.is_empty());
    }

    async fn serve_profiles() -> String {
        let app = Router::new().route(
            "/company/{page_id}/about",
            get(|Path(page_id): Path<String>| async move {
                if page_id == "acme" {
                    Ok(Html(PROFILE))
                } else {
                    Err(StatusCode::NOT_FOUND)
                }
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/company/")
    }

    fn source(base_url: String) -> LiveSource {
        LiveSource::new(
            "cookie".to_string(),
            Duration::from_secs(5),
            SyntheticSource::new(4),
        )
        .unwrap()
        .with_base_url(base_url)
    }

    #[tokio::test]
    async fn live_scrape_produces_bare_record() {
        let source = source(serve_profiles().await);
        let record = source.produce_record("acme").await;
        assert_eq!(record.page.name, "AcmeCorp");
        assert_eq!(record.page.url, "https://www.linkedin.com/company/acme/");
        assert_eq!(record.page.followers, 12345);
        assert!(record.posts.is_empty());
        assert!(record.followers.is_empty());
    }

    #[tokio::test]
    async fn error_status_falls_back_to_synthetic() {
        let source = source(serve_profiles().await);
        assert!(matches!(
            source.scrape("missing").await,
            Err(ScrapeError::Status(404))
        ));
        let record = source.produce_record("missing").await;
        assert_eq!(record, SyntheticSource::new(4).generate("missing"));
    }
}
