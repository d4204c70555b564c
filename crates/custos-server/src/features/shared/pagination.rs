//! Pagination parameters shared by list endpoints

use serde::{Deserialize, Serialize};

/// Default page size for list endpoints
pub const DEFAULT_PER_PAGE: i64 = 100;

/// Maximum page size for list endpoints
pub const MAX_PER_PAGE: i64 = 1000;

/// Page/per_page query parameters
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PaginationParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
}

impl PaginationParams {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE)
    }

    pub fn offset(&self) -> i64 {
        self.page().saturating_sub(1).saturating_mul(self.per_page())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let params = PaginationParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.per_page(), DEFAULT_PER_PAGE);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn per_page_is_clamped() {
        let params = PaginationParams {
            page: Some(2),
            per_page: Some(50_000),
        };
        assert_eq!(params.per_page(), MAX_PER_PAGE);
        assert_eq!(params.offset(), MAX_PER_PAGE);
    }

    #[test]
    fn huge_page_does_not_overflow() {
        let params = PaginationParams {
            page: Some(i64::MAX),
            per_page: Some(1000),
        };
        assert_eq!(params.offset(), i64::MAX);
        assert!(params.offset() >= 0);
    }

    #[test]
    fn negative_page_becomes_first() {
        let params = PaginationParams {
            page: Some(-3),
            per_page: Some(10),
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.offset(), 0);
    }
}
