//! Repository error types
//!
//! Every failure surfaced by the search layer or a store is a [`RepositoryError`]
//! carrying the operation that failed and a [`RepositoryErrorKind`].
//!
//! # Example
//!
//! ```rust
//! use roster_search::repository::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
//!
//! let error = RepositoryError::invalid_argument(RepositoryOperation::FetchPage, "limit must be positive");
//! assert_eq!(error.kind, RepositoryErrorKind::InvalidArgument);
//! assert!(!error.is_retriable());
//! ```

use std::fmt;

/// Operation being performed when the repository error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryOperation {
    /// Inserting a group
    InsertGroup,
    /// Inserting a record
    InsertRecord,
    /// Fetching every match of a filter
    FetchAll,
    /// Fetching one page of matches
    FetchPage,
    /// Counting matches of a filter
    Count,
    /// Fetching a page and its total in one round trip
    FetchPageWithCount,
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsertGroup => write!(f, "insert_group"),
            Self::InsertRecord => write!(f, "insert_record"),
            Self::FetchAll => write!(f, "fetch_all"),
            Self::FetchPage => write!(f, "fetch_page"),
            Self::Count => write!(f, "count"),
            Self::FetchPageWithCount => write!(f, "fetch_page_with_count"),
        }
    }
}

/// Category of repository error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryErrorKind {
    /// A caller-supplied argument was rejected before any store access
    InvalidArgument,
    /// The backing store failed or could not be reached
    StorageUnavailable,
    /// A row could not be projected into the result view
    MappingError,
    /// An insert referenced a missing row or broke a uniqueness rule
    ConstraintViolation,
}

impl fmt::Display for RepositoryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument => write!(f, "invalid_argument"),
            Self::StorageUnavailable => write!(f, "storage_unavailable"),
            Self::MappingError => write!(f, "mapping_error"),
            Self::ConstraintViolation => write!(f, "constraint_violation"),
        }
    }
}

/// Structured repository error with operation context
///
/// # Example
///
/// ```rust
/// use roster_search::repository::{RepositoryError, RepositoryOperation};
///
/// let error = RepositoryError::storage_unavailable(RepositoryOperation::Count, "pool closed");
/// assert_eq!(
///     error.to_string(),
///     "Repository storage_unavailable error during count: pool closed"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryError {
    /// The operation being performed when the error occurred
    pub operation: RepositoryOperation,
    /// The category of error
    pub kind: RepositoryErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The type of entity involved (e.g., "Record", "Group")
    pub entity_type: Option<String>,
    /// The ID of the entity involved
    pub entity_id: Option<String>,
}

impl RepositoryError {
    /// Create a new repository error
    pub fn new(
        operation: RepositoryOperation,
        kind: RepositoryErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
        }
    }

    /// Create an error for a malformed argument (bad page request)
    pub fn invalid_argument(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::InvalidArgument, message)
    }

    /// Create an error for a failed or unreachable store
    pub fn storage_unavailable(
        operation: RepositoryOperation,
        message: impl Into<String>,
    ) -> Self {
        Self::new(operation, RepositoryErrorKind::StorageUnavailable, message)
    }

    /// Create an error for a row that does not fit the result projection
    pub fn mapping(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::MappingError, message)
    }

    /// Create a constraint violation error
    pub fn constraint_violation(
        operation: RepositoryOperation,
        message: impl Into<String>,
    ) -> Self {
        Self::new(operation, RepositoryErrorKind::ConstraintViolation, message)
    }

    /// Add entity context to an existing error
    ///
    /// # Example
    ///
    /// ```rust
    /// use roster_search::repository::{RepositoryError, RepositoryOperation};
    ///
    /// let error = RepositoryError::constraint_violation(
    ///     RepositoryOperation::InsertRecord,
    ///     "group does not exist",
    /// )
    /// .with_entity("Group", "42");
    /// assert!(error.to_string().ends_with("[Group: 42]"));
    /// ```
    #[must_use]
    pub fn with_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: RepositoryOperation) -> Self {
        self.operation = operation;
        self
    }

    /// Whether a caller-side retry could succeed
    ///
    /// Only store failures are transient. The search layer never retries on its own.
    pub fn is_retriable(&self) -> bool {
        matches!(self.kind, RepositoryErrorKind::StorageUnavailable)
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repository {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let (Some(ref entity_type), Some(ref entity_id)) = (&self.entity_type, &self.entity_id) {
            write!(f, " [{}: {}]", entity_type, entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for RepositoryError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_operation_display() {
        assert_eq!(format!("{}", RepositoryOperation::InsertGroup), "insert_group");
        assert_eq!(format!("{}", RepositoryOperation::InsertRecord), "insert_record");
        assert_eq!(format!("{}", RepositoryOperation::FetchAll), "fetch_all");
        assert_eq!(format!("{}", RepositoryOperation::FetchPage), "fetch_page");
        assert_eq!(format!("{}", RepositoryOperation::Count), "count");
        assert_eq!(
            format!("{}", RepositoryOperation::FetchPageWithCount),
            "fetch_page_with_count"
        );
    }

    #[test]
    fn test_repository_error_kind_display() {
        assert_eq!(
            format!("{}", RepositoryErrorKind::InvalidArgument),
            "invalid_argument"
        );
        assert_eq!(
            format!("{}", RepositoryErrorKind::StorageUnavailable),
            "storage_unavailable"
        );
        assert_eq!(format!("{}", RepositoryErrorKind::MappingError), "mapping_error");
        assert_eq!(
            format!("{}", RepositoryErrorKind::ConstraintViolation),
            "constraint_violation"
        );
    }

    #[test]
    fn test_invalid_argument_convenience() {
        let error =
            RepositoryError::invalid_argument(RepositoryOperation::FetchPage, "offset is negative");
        assert_eq!(error.operation, RepositoryOperation::FetchPage);
        assert_eq!(error.kind, RepositoryErrorKind::InvalidArgument);
        assert_eq!(error.message, "offset is negative");
        assert!(error.entity_type.is_none());
    }

    #[test]
    fn test_mapping_convenience() {
        let error = RepositoryError::mapping(RepositoryOperation::FetchAll, "group missing");
        assert_eq!(error.kind, RepositoryErrorKind::MappingError);
    }

    #[test]
    fn test_with_entity_and_operation() {
        let error = RepositoryError::storage_unavailable(RepositoryOperation::Count, "refused")
            .with_operation(RepositoryOperation::FetchPage)
            .with_entity("Record", "7");
        assert_eq!(error.operation, RepositoryOperation::FetchPage);
        assert_eq!(error.entity_type, Some("Record".to_string()));
        assert_eq!(error.entity_id, Some("7".to_string()));
    }

    #[test]
    fn test_is_retriable_only_for_storage_failures() {
        assert!(RepositoryError::storage_unavailable(RepositoryOperation::Count, "x").is_retriable());
        assert!(!RepositoryError::invalid_argument(RepositoryOperation::FetchPage, "x").is_retriable());
        assert!(!RepositoryError::mapping(RepositoryOperation::FetchAll, "x").is_retriable());
        assert!(
            !RepositoryError::constraint_violation(RepositoryOperation::InsertRecord, "x")
                .is_retriable()
        );
    }

    #[test]
    fn test_display_without_entity() {
        let error = RepositoryError::mapping(RepositoryOperation::FetchAll, "age out of range");
        let display = format!("{}", error);
        assert!(display.contains("mapping_error"));
        assert!(display.contains("fetch_all"));
        assert!(display.contains("age out of range"));
        assert!(!display.contains('['));
    }

    #[test]
    fn test_error_is_error_trait() {
        let error: Box<dyn std::error::Error> = Box::new(RepositoryError::invalid_argument(
            RepositoryOperation::FetchPage,
            "bad",
        ));
        assert!(error.to_string().contains("invalid_argument"));
    }
}
