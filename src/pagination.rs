//! Page/limit normalization and the sort options shared by every listing.
//!
//! Every ranked view recomputes its full candidate set per request, so `limit`
//! is capped at [`MAX_LIMIT`] and slicing always happens after ranking.

use serde::Serialize;
use std::cmp::Ordering;

use crate::errors::AppError;
use crate::models::MemeRecord;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: usize,
    pub limit: usize,
    pub skip: usize,
}

impl Default for Page {
    fn default() -> Self {
        Page {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            skip: 0,
        }
    }
}

/// Normalizes raw `page`/`limit` query values with the default limit of 20.
pub fn normalize(page: Option<&str>, limit: Option<&str>) -> Result<Page, AppError> {
    normalize_with_default(page, limit, DEFAULT_LIMIT)
}

/// Missing or non-numeric values take the defaults, numbers below 1 are
/// rejected and `limit` is clamped to [`MAX_LIMIT`].
pub fn normalize_with_default(
    page: Option<&str>,
    limit: Option<&str>,
    default_limit: usize,
) -> Result<Page, AppError> {
    let page = parse_positive("page", page)?.unwrap_or(DEFAULT_PAGE);
    let limit = parse_positive("limit", limit)?
        .unwrap_or(default_limit)
        .min(MAX_LIMIT);
    Ok(Page {
        page,
        limit,
        skip: (page - 1).saturating_mul(limit),
    })
}

/// Parses a single limit value, used by the tag views that take no page.
pub fn normalize_limit(limit: Option<&str>, default_limit: usize) -> Result<usize, AppError> {
    Ok(normalize_with_default(None, limit, default_limit)?.limit)
}

fn parse_positive(name: &str, raw: Option<&str>) -> Result<Option<usize>, AppError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<i64>() {
        Ok(value) if value >= 1 => Ok(Some(usize::try_from(value).unwrap_or(usize::MAX))),
        Ok(value) => Err(AppError::InvalidInput(format!(
            "{} must be a positive integer, got {}",
            name, value
        ))),
        Err(_) => {
            tracing::debug!(param = name, value = raw, "Ignoring non-numeric pagination value");
            Ok(None)
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub current: usize,
    pub total: usize,
    pub count: usize,
    pub total_items: usize,
}

impl PaginationInfo {
    pub fn new(page: &Page, count: usize, total_items: usize) -> Self {
        PaginationInfo {
            current: page.page,
            total: total_items.div_ceil(page.limit.max(1)),
            count,
            total_items,
        }
    }
}

/// Slices an already ranked sequence down to the requested page.
pub fn paginate<T>(ranked: Vec<T>, page: &Page) -> (Vec<T>, PaginationInfo) {
    let total_items = ranked.len();
    let items: Vec<T> = ranked.into_iter().skip(page.skip).take(page.limit).collect();
    let info = PaginationInfo::new(page, items.len(), total_items);
    (items, info)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    Upvotes,
    Downloads,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort {
    pub field: SortField,
    pub order: SortOrder,
}

impl Sort {
    pub fn parse(sort_by: Option<&str>, order: Option<&str>) -> Result<Self, AppError> {
        let field = match sort_by.map(str::trim).filter(|s| !s.is_empty()) {
            None | Some("createdAt") => SortField::CreatedAt,
            Some("upvotes") => SortField::Upvotes,
            Some("downloads") => SortField::Downloads,
            Some(other) => {
                return Err(AppError::InvalidInput(format!(
                    "sortBy must be one of createdAt, upvotes, downloads; got '{}'",
                    other
                )));
            }
        };
        let order = match order.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("desc") => SortOrder::Desc,
            Some("asc") => SortOrder::Asc,
            Some(other) => {
                return Err(AppError::InvalidInput(format!(
                    "order must be 'asc' or 'desc'; got '{}'",
                    other
                )));
            }
        };
        Ok(Sort { field, order })
    }

    pub fn compare(&self, a: &MemeRecord, b: &MemeRecord) -> Ordering {
        let primary = match self.field {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::Upvotes => a.upvotes.cmp(&b.upvotes),
            SortField::Downloads => a.downloads.cmp(&b.downloads),
        };
        let primary = match self.order {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        };
        primary
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| a.id.cmp(&b.id))
    }

    pub fn apply(&self, records: &mut [MemeRecord]) {
        records.sort_by(|a, b| self.compare(a, b));
    }
}
