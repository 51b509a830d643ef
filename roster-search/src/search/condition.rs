//! Optional search constraints and their predicate constructors

use serde::{Deserialize, Serialize};

use crate::repository::{Field, Predicate};

/// Immutable search condition with four optional constraints
///
/// An unset field places no constraint on its dimension, so the default condition
/// matches every record. String constraints that are empty or whitespace-only count as
/// unset.
///
/// ```rust
/// use roster_search::search::FilterCondition;
///
/// let condition = FilterCondition::new()
///     .with_group_name("teamB")
///     .with_age_greater_or_equal(20);
///
/// assert_eq!(condition.group_name_equals(), Some("teamB"));
/// assert_eq!(condition.age_less_or_equal(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCondition {
    #[serde(default, alias = "username")]
    name_equals: Option<String>,
    #[serde(default, alias = "teamName")]
    group_name_equals: Option<String>,
    #[serde(default, alias = "ageGoe")]
    age_greater_or_equal: Option<i32>,
    #[serde(default, alias = "ageLoe")]
    age_less_or_equal: Option<i32>,
}

impl FilterCondition {
    /// Condition with no constraints
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name_equals = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_group_name(mut self, group_name: impl Into<String>) -> Self {
        self.group_name_equals = Some(group_name.into());
        self
    }

    #[must_use]
    pub fn with_age_greater_or_equal(mut self, age: i32) -> Self {
        self.age_greater_or_equal = Some(age);
        self
    }

    #[must_use]
    pub fn with_age_less_or_equal(mut self, age: i32) -> Self {
        self.age_less_or_equal = Some(age);
        self
    }

    pub fn name_equals(&self) -> Option<&str> {
        self.name_equals.as_deref()
    }

    pub fn group_name_equals(&self) -> Option<&str> {
        self.group_name_equals.as_deref()
    }

    pub fn age_greater_or_equal(&self) -> Option<i32> {
        self.age_greater_or_equal
    }

    pub fn age_less_or_equal(&self) -> Option<i32> {
        self.age_less_or_equal
    }

    /// Whether no field contributes a predicate
    pub fn is_unconstrained(&self) -> bool {
        self.terms().iter().all(Option::is_none)
    }

    /// One optional predicate per dimension, in a fixed order
    pub(crate) fn terms(&self) -> [Option<Predicate>; 4] {
        [
            name_eq(self.name_equals()),
            group_name_eq(self.group_name_equals()),
            age_goe(self.age_greater_or_equal),
            age_loe(self.age_less_or_equal),
        ]
    }
}

/// True when the string holds at least one non-whitespace character
pub(crate) fn has_text(value: &str) -> bool {
    !value.trim().is_empty()
}

fn name_eq(name: Option<&str>) -> Option<Predicate> {
    name.filter(|name| has_text(name))
        .map(|name| Predicate::eq(Field::RecordName, name))
}

fn group_name_eq(group_name: Option<&str>) -> Option<Predicate> {
    group_name
        .filter(|name| has_text(name))
        .map(|name| Predicate::eq(Field::GroupName, name))
}

fn age_goe(age: Option<i32>) -> Option<Predicate> {
    age.map(|age| Predicate::gte(Field::RecordAge, age))
}

fn age_loe(age: Option<i32>) -> Option<Predicate> {
    age.map(|age| Predicate::lte(Field::RecordAge, age))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_text() {
        assert!(!has_text(""));
        assert!(!has_text("  \t\n"));
        assert!(has_text(" a "));
    }

    #[test]
    fn test_default_is_unconstrained() {
        assert!(FilterCondition::new().is_unconstrained());
    }

    #[test]
    fn test_blank_strings_are_unconstrained() {
        let condition = FilterCondition::new().with_name("").with_group_name("   ");
        assert!(condition.is_unconstrained());
        assert_eq!(condition.name_equals(), Some(""));
    }

    #[test]
    fn test_terms_follow_set_fields() {
        let condition = FilterCondition::new()
            .with_name("member1")
            .with_age_less_or_equal(15);
        let terms = condition.terms();
        assert_eq!(terms[0], Some(Predicate::eq(Field::RecordName, "member1")));
        assert_eq!(terms[1], None);
        assert_eq!(terms[2], None);
        assert_eq!(terms[3], Some(Predicate::lte(Field::RecordAge, 15)));
    }

    #[test]
    fn test_deserializes_source_field_names() {
        let condition: FilterCondition =
            serde_json::from_str(r#"{"username":"member1","teamName":"teamA","ageGoe":10}"#)
                .unwrap();
        assert_eq!(condition.name_equals(), Some("member1"));
        assert_eq!(condition.group_name_equals(), Some("teamA"));
        assert_eq!(condition.age_greater_or_equal(), Some(10));
        assert_eq!(condition.age_less_or_equal(), None);
    }

    #[test]
    fn test_deserializes_own_field_names() {
        let condition: FilterCondition =
            serde_json::from_str(r#"{"nameEquals":"member2","ageLessOrEqual":30}"#).unwrap();
        assert_eq!(condition.name_equals(), Some("member2"));
        assert_eq!(condition.age_less_or_equal(), Some(30));
    }
}
