//! Pagination and ordering types for repository queries
//!
//! [`PageRequest`] is what callers hand in; it may be malformed. [`Pagination`] is the
//! validated window that reaches a store. [`Page`] is what comes back.
//!
//! # Example
//!
//! ```rust
//! use roster_search::repository::{PageRequest, Pagination};
//!
//! let window = PageRequest::new(40, 20).validate().unwrap();
//! assert_eq!(window, Pagination::new(40, 20));
//!
//! assert!(PageRequest::new(-1, 20).validate().is_err());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{RepositoryError, RepositoryOperation};
use super::filter::Field;
use super::traits::RepositoryResult;

/// Direction for ordering results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    /// Sort in ascending order (A-Z, 0-9)
    #[default]
    Ascending,
    /// Sort in descending order (Z-A, 9-0)
    Descending,
}

impl OrderDirection {
    /// SQL keyword for this direction
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "asc"),
            Self::Descending => write!(f, "desc"),
        }
    }
}

/// Pass-through sort expression
///
/// Stores always break ties by record id, so any sort key yields a stable order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: Field,
    #[serde(default)]
    pub direction: OrderDirection,
}

impl SortKey {
    #[must_use]
    pub const fn asc(field: Field) -> Self {
        Self {
            field,
            direction: OrderDirection::Ascending,
        }
    }

    #[must_use]
    pub const fn desc(field: Field) -> Self {
        Self {
            field,
            direction: OrderDirection::Descending,
        }
    }
}

/// A validated offset/limit window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Number of results to skip
    pub offset: u64,
    /// Maximum number of results to return, always at least one
    pub limit: u64,
}

impl Pagination {
    #[must_use]
    pub const fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    #[must_use]
    pub const fn first_page(limit: u64) -> Self {
        Self { offset: 0, limit }
    }

    /// Window of the page that follows this one
    #[must_use]
    pub const fn next(&self) -> Self {
        Self {
            offset: self.offset.saturating_add(self.limit),
            limit: self.limit,
        }
    }
}

/// Caller-supplied page request, validated before any store access
///
/// Offset and limit are signed so that a malformed request can be expressed and rejected
/// with `InvalidArgument` instead of wrapping around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub offset: i64,
    pub limit: i64,
    #[serde(default)]
    pub sort: Option<SortKey>,
}

impl PageRequest {
    #[must_use]
    pub const fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset,
            limit,
            sort: None,
        }
    }

    /// Zero-based page index of the given size
    ///
    /// ```rust
    /// use roster_search::repository::PageRequest;
    ///
    /// let third = PageRequest::of(2, 20);
    /// assert_eq!(third.offset, 40);
    /// assert_eq!(third.limit, 20);
    /// ```
    #[must_use]
    pub const fn of(page_index: i64, size: i64) -> Self {
        Self::new(page_index.saturating_mul(size), size)
    }

    #[must_use]
    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Check the request and turn it into a store window
    pub fn validate(&self) -> RepositoryResult<Pagination> {
        if self.offset < 0 {
            return Err(RepositoryError::invalid_argument(
                RepositoryOperation::FetchPage,
                format!("page offset must be non-negative, got {}", self.offset),
            ));
        }
        if self.limit <= 0 {
            return Err(RepositoryError::invalid_argument(
                RepositoryOperation::FetchPage,
                format!("page limit must be positive, got {}", self.limit),
            ));
        }
        // Both are non-negative here, so the casts are lossless.
        Ok(Pagination::new(self.offset as u64, self.limit as u64))
    }
}

/// One page of results plus the total match count when it was computed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total: Option<u64>,
    pub window: Pagination,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, window: Pagination, total: Option<u64>) -> Self {
        Self {
            content,
            total,
            window,
        }
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Total number of pages of this size, rounding up
    pub fn total_pages(&self) -> Option<u64> {
        self.total.map(|total| total.div_ceil(self.window.limit))
    }

    /// Whether rows exist past this page; `None` when the total was not computed
    pub fn has_next(&self) -> Option<bool> {
        self.total
            .map(|total| self.window.offset.saturating_add(self.len() as u64) < total)
    }

    pub fn has_previous(&self) -> bool {
        self.window.offset > 0
    }

    /// Transform the content while keeping the paging metadata
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total: self.total,
            window: self.window,
        }
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.content.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RepositoryErrorKind;

    #[test]
    fn test_order_direction_display() {
        assert_eq!(format!("{}", OrderDirection::Ascending), "asc");
        assert_eq!(format!("{}", OrderDirection::Descending), "desc");
        assert_eq!(OrderDirection::Descending.as_sql(), "DESC");
    }

    #[test]
    fn test_order_direction_default() {
        assert_eq!(OrderDirection::default(), OrderDirection::Ascending);
    }

    #[test]
    fn test_pagination_next() {
        let page = Pagination::first_page(25);
        assert_eq!(page.next(), Pagination::new(25, 25));
    }

    #[test]
    fn test_page_request_of_zero_based() {
        assert_eq!(PageRequest::of(0, 10), PageRequest::new(0, 10));
        assert_eq!(PageRequest::of(3, 10).offset, 30);
    }

    #[test]
    fn test_validate_rejects_negative_offset() {
        let err = PageRequest::new(-1, 2).validate().unwrap_err();
        assert_eq!(err.kind, RepositoryErrorKind::InvalidArgument);
        assert!(err.message.contains("offset"));
    }

    #[test]
    fn test_validate_rejects_non_positive_limit() {
        for limit in [0, -5] {
            let err = PageRequest::new(0, limit).validate().unwrap_err();
            assert_eq!(err.kind, RepositoryErrorKind::InvalidArgument);
            assert!(err.message.contains("limit"));
        }
    }

    #[test]
    fn test_page_metadata_with_total() {
        let page = Page::new(vec![2, 3], Pagination::new(1, 2), Some(4));
        assert_eq!(page.total_pages(), Some(2));
        assert_eq!(page.has_next(), Some(true));
        assert!(page.has_previous());

        let last = Page::new(vec![4], Pagination::new(3, 2), Some(4));
        assert_eq!(last.has_next(), Some(false));
    }

    #[test]
    fn test_page_metadata_without_total() {
        let page: Page<i32> = Page::new(vec![], Pagination::first_page(10), None);
        assert!(page.is_empty());
        assert_eq!(page.total_pages(), None);
        assert_eq!(page.has_next(), None);
        assert!(!page.has_previous());
    }

    #[test]
    fn test_page_map_keeps_metadata() {
        let page = Page::new(vec![1, 2], Pagination::new(0, 2), Some(9));
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.content, vec![10, 20]);
        assert_eq!(mapped.total, Some(9));
    }

    #[test]
    fn test_page_request_deserializes_sort() {
        let request: PageRequest = serde_json::from_str(
            r#"{"offset":0,"limit":5,"sort":{"field":"record_age","direction":"descending"}}"#,
        )
        .unwrap();
        assert_eq!(request.sort, Some(SortKey::desc(Field::RecordAge)));
    }
}
