use crate::shared::types::PaginationParams;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Page defaults to 1 and is floored at 1; page size defaults to 10 and is
/// clamped to `1..=100`.
pub fn validate_pagination(page: Option<i64>, page_size: Option<i64>) -> PaginationParams {
    let page = page.unwrap_or(1).max(1);
    let page_size = page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    PaginationParams {
        page: page as u64,
        page_size: page_size as u64,
    }
}

/// Trimmed search term, or `None` when absent or blank.
pub fn normalize_search(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
