//! Typed predicates over the record/group join
//!
//! A [`Predicate`] compares one [`Field`] with a [`FilterValue`]. A [`QueryPredicate`]
//! is the conjunction of zero or more predicates; the empty conjunction matches every row.
//!
//! # Example
//!
//! ```rust
//! use roster_search::repository::{Field, Predicate, QueryPredicate};
//!
//! let predicate = QueryPredicate::match_all()
//!     .and(Predicate::gte(Field::RecordAge, 20))
//!     .and(None)
//!     .and(Predicate::eq(Field::GroupName, "teamB"));
//!
//! assert_eq!(predicate.terms().len(), 2);
//! ```

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::model::JoinRow;

/// A filterable or sortable column of the record/group join
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    RecordId,
    RecordName,
    RecordAge,
    GroupId,
    GroupName,
}

impl Field {
    /// Qualified SQL column for this field
    ///
    /// `r` aliases the record table and `g` the group table.
    #[must_use]
    pub const fn column(&self) -> &'static str {
        match self {
            Self::RecordId => "r.record_id",
            Self::RecordName => "r.name",
            Self::RecordAge => "r.age",
            Self::GroupId => "g.group_id",
            Self::GroupName => "g.name",
        }
    }

    /// Read this field out of a join row; `None` when the row has no value for it
    pub(crate) fn read(&self, row: &JoinRow) -> Option<FilterValue> {
        match self {
            Self::RecordId => Some(FilterValue::Integer(row.record_id)),
            Self::RecordName => Some(FilterValue::String(row.record_name.clone())),
            Self::RecordAge => Some(FilterValue::Integer(row.record_age)),
            Self::GroupId => row.group_id.map(FilterValue::Integer),
            Self::GroupName => row.group_name.clone().map(FilterValue::String),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RecordId => write!(f, "record.id"),
            Self::RecordName => write!(f, "record.name"),
            Self::RecordAge => write!(f, "record.age"),
            Self::GroupId => write!(f, "group.id"),
            Self::GroupName => write!(f, "group.name"),
        }
    }
}

/// Comparison operators for predicates
///
/// ```rust
/// use roster_search::repository::FilterOperator;
///
/// assert_eq!(format!("{}", FilterOperator::Equal), "=");
/// assert_eq!(format!("{}", FilterOperator::GreaterThanOrEqual), ">=");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    /// Equal to (=)
    Equal,
    /// Not equal to (!=)
    NotEqual,
    /// Greater than (>)
    GreaterThan,
    /// Greater than or equal to (>=)
    GreaterThanOrEqual,
    /// Less than (<)
    LessThan,
    /// Less than or equal to (<=)
    LessThanOrEqual,
}

impl FilterOperator {
    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            Self::Equal => ordering == Ordering::Equal,
            Self::NotEqual => ordering != Ordering::Equal,
            Self::GreaterThan => ordering == Ordering::Greater,
            Self::GreaterThanOrEqual => ordering != Ordering::Less,
            Self::LessThan => ordering == Ordering::Less,
            Self::LessThanOrEqual => ordering != Ordering::Greater,
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => write!(f, "="),
            Self::NotEqual => write!(f, "!="),
            Self::GreaterThan => write!(f, ">"),
            Self::GreaterThanOrEqual => write!(f, ">="),
            Self::LessThan => write!(f, "<"),
            Self::LessThanOrEqual => write!(f, "<="),
        }
    }
}

/// A value that can be compared against a field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterValue {
    String(String),
    Integer(i64),
}

impl FilterValue {
    /// Total order between values of the same type; `None` across types
    pub(crate) fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for FilterValue {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "'{}'", s),
            Self::Integer(n) => write!(f, "{}", n),
        }
    }
}

/// A single comparison of a field against a value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Predicate {
    pub field: Field,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

impl Predicate {
    pub fn new(field: Field, operator: FilterOperator, value: impl Into<FilterValue>) -> Self {
        Self {
            field,
            operator,
            value: value.into(),
        }
    }

    /// field = value
    pub fn eq(field: Field, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::Equal, value)
    }

    /// field >= value
    pub fn gte(field: Field, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::GreaterThanOrEqual, value)
    }

    /// field <= value
    pub fn lte(field: Field, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOperator::LessThanOrEqual, value)
    }

    /// Evaluate against a join row with SQL semantics: a missing value never matches
    pub fn matches(&self, row: &JoinRow) -> bool {
        self.field
            .read(row)
            .and_then(|actual| actual.compare(&self.value))
            .is_some_and(|ordering| self.operator.accepts(ordering))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.operator, self.value)
    }
}

/// Conjunction of predicates; empty means "match every row"
///
/// Built by folding optional predicates: an absent term is skipped, so absent AND absent
/// is still the match-all predicate rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPredicate {
    terms: Vec<Predicate>,
}

impl QueryPredicate {
    #[must_use]
    pub fn match_all() -> Self {
        Self::default()
    }

    /// AND another term onto the conjunction, skipping it when absent
    #[must_use]
    pub fn and(mut self, term: impl Into<Option<Predicate>>) -> Self {
        if let Some(term) = term.into() {
            self.terms.push(term);
        }
        self
    }

    pub fn terms(&self) -> &[Predicate] {
        &self.terms
    }

    pub fn is_match_all(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn matches(&self, row: &JoinRow) -> bool {
        self.terms.iter().all(|term| term.matches(row))
    }
}

impl FromIterator<Option<Predicate>> for QueryPredicate {
    fn from_iter<I: IntoIterator<Item = Option<Predicate>>>(iter: I) -> Self {
        iter.into_iter().fold(Self::match_all(), Self::and)
    }
}

impl fmt::Display for QueryPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "TRUE");
        }
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, " AND ")?;
            }
            write!(f, "{}", term)?;
        }
        Ok(())
    }
}
