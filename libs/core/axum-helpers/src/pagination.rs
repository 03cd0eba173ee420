//! Client-side pagination over a fully-retrieved result set.
//!
//! `page` and `limit` arrive as raw query strings. Anything absent, non-numeric
//! or below 1 falls back to the defaults (page 1, limit 10), so a listing
//! endpoint never rejects a request because of its paging parameters.

use serde::Deserialize;
use utoipa::IntoParams;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 10;

/// `?page=&limit=` query parameters, kept as strings until parsed.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number (default 1)
    pub page: Option<String>,
    /// Page size (default 10)
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

fn parse_positive(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|n| *n >= 1)
        .unwrap_or(default)
}

impl Pagination {
    pub fn new(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: parse_positive(page, DEFAULT_PAGE),
            limit: parse_positive(limit, DEFAULT_LIMIT),
        }
    }

    /// Slice bounds for a result set of `total` items, clamped to `[0, total]`.
    pub fn bounds(&self, total: usize) -> (usize, usize) {
        let start = (self.page - 1).saturating_mul(self.limit).min(total);
        let end = start.saturating_add(self.limit).min(total);
        (start, end)
    }

    /// Returns the requested page. Pages past the end are empty.
    pub fn paginate<T>(&self, items: Vec<T>) -> Vec<T> {
        let (start, end) = self.bounds(items.len());
        items.into_iter().skip(start).take(end - start).collect()
    }
}

impl From<&PageQuery> for Pagination {
    fn from(query: &PageQuery) -> Self {
        Self::new(query.page.as_deref(), query.limit.as_deref())
    }
}
