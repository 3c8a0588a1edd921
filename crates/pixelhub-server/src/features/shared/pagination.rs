//! Page-based pagination for list endpoints

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 100;

/// Requested page, 1-indexed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl PaginationParams {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self { page, per_page }
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.per_page()
    }

    /// Explicit out-of-range values are rejected rather than clamped.
    pub fn validate(&self) -> AppResult<()> {
        if matches!(self.page, Some(page) if page < 1) {
            return Err(AppError::validation("Page must be greater than 0"));
        }
        if matches!(self.per_page, Some(n) if !(1..=MAX_PER_PAGE).contains(&n)) {
            return Err(AppError::validation(format!(
                "Per page must be between 1 and {}",
                MAX_PER_PAGE
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMetadata {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMetadata {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        let pages = (total.max(0) + per_page - 1) / per_page;
        Self {
            page,
            per_page,
            total,
            pages,
            has_next: page < pages,
            has_prev: page > 1,
        }
    }
}

/// One page of items with its position in the full listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: PaginationMetadata,
}

impl<T> Paginated<T> {
    pub fn from_items(items: Vec<T>, params: &PaginationParams, total: i64) -> Self {
        Self {
            items,
            pagination: PaginationMetadata::new(params.page(), params.per_page(), total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = PaginationParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.per_page(), DEFAULT_PER_PAGE);
        assert_eq!(params.offset(), 0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_offset_of_later_page() {
        let params = PaginationParams::new(Some(3), Some(25));
        assert_eq!(params.offset(), 50);
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        assert!(PaginationParams::new(Some(0), None).validate().is_err());
        assert!(PaginationParams::new(None, Some(0)).validate().is_err());
        assert!(PaginationParams::new(None, Some(MAX_PER_PAGE + 1))
            .validate()
            .is_err());
    }

    #[test]
    fn test_metadata_page_count() {
        let meta = PaginationMetadata::new(2, 10, 25);
        assert_eq!(meta.pages, 3);
        assert!(meta.has_prev);
        assert!(meta.has_next);

        let last = PaginationMetadata::new(3, 10, 30);
        assert_eq!(last.pages, 3);
        assert!(!last.has_next);

        let empty = PaginationMetadata::new(1, 10, 0);
        assert_eq!(empty.pages, 0);
        assert!(!empty.has_next && !empty.has_prev);
    }
}
