//! Offset pagination helpers.

pub const MAX_PAGE_SIZE: i64 = 50;

/// Resolved `OFFSET`/`LIMIT` pair for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetWindow {
    pub skip: i64,
    pub limit: i64,
}

impl OffsetWindow {
    /// Page numbers start at 1; anything lower is treated as the first page.
    /// Page sizes are clamped to `1..=MAX_PAGE_SIZE`.
    pub fn new(page: i64, limit: i64) -> Self {
        let page = page.max(1);
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        Self {
            skip: (page - 1).saturating_mul(limit),
            limit,
        }
    }

    pub fn skip_usize(&self) -> usize {
        usize::try_from(self.skip).unwrap_or(usize::MAX)
    }

    pub fn limit_usize(&self) -> usize {
        usize::try_from(self.limit).unwrap_or(usize::MAX)
    }
}
