//! Cache key layout.

const PAGE_PREFIX: &str = "page";
const INSIGHTS_PREFIX: &str = "ai_insights";

/// Key of the full page payload.
pub fn page_key(page_id: &str) -> String {
    format!("{PAGE_PREFIX}:{page_id}")
}

/// Key of the derived insight payload.
pub fn insights_key(page_id: &str) -> String {
    format!("{INSIGHTS_PREFIX}:{page_id}")
}
