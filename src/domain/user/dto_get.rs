use crate::shared::{normalize_search, validate_pagination, PaginationParams};

/// Raw list request as received from a caller.
#[derive(Debug, Clone, Default)]
pub struct GetUserDto {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl GetUserDto {
    pub fn normalize(&self) -> UserPageQuery {
        UserPageQuery {
            pagination: validate_pagination(self.page, self.page_size),
            search: normalize_search(self.search.as_deref()),
        }
    }
}

/// Normalized list request handed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPageQuery {
    pub pagination: PaginationParams,
    /// Trimmed, non-blank search term (case preserved).
    pub search: Option<String>,
}

impl UserPageQuery {
    pub fn new(page: u64, page_size: u64, search: Option<&str>) -> Self {
        GetUserDto {
            search: search.map(str::to_string),
            page: Some(page as i64),
            page_size: Some(page_size as i64),
        }
        .normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_applies_defaults_and_trims_search() {
        let q = GetUserDto {
            search: Some("  doe ".into()),
            page: None,
            page_size: Some(1000),
        }
        .normalize();

        assert_eq!(q.pagination.page, 1);
        assert_eq!(q.pagination.page_size, 100);
        assert_eq!(q.search.as_deref(), Some("doe"));
    }
}
