//! Entities, raw join rows and the flattened result projection

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{RepositoryError, RepositoryOperation};

/// Identifier of a [`Record`], generated by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

/// Identifier of a [`Group`], generated by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A group that records belong to
///
/// The set of member records is not stored on the group; stores answer it by query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
}

/// A person record, always owned by exactly one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub age: i32,
    pub group_id: GroupId,
}

/// Parameters for inserting a group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    pub name: String,
}

impl NewGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Parameters for inserting a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub name: String,
    pub age: i32,
    pub group_id: GroupId,
}

impl NewRecord {
    pub fn new(name: impl Into<String>, age: i32, group_id: GroupId) -> Self {
        Self {
            name: name.into(),
            age,
            group_id,
        }
    }
}

/// One row of the record/group join, exactly as a store returns it
///
/// The group side is optional and the age is wide so that a store can report what it
/// actually holds; [`RecordGroupView::try_from`] decides whether the row is usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRow {
    pub record_id: i64,
    pub record_name: String,
    pub record_age: i64,
    pub group_id: Option<i64>,
    pub group_name: Option<String>,
}

/// Flattened read-only view of a record and its owning group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordGroupView {
    pub record_id: RecordId,
    pub name: String,
    pub age: i32,
    pub group_id: GroupId,
    pub group_name: String,
}

impl TryFrom<JoinRow> for RecordGroupView {
    type Error = RepositoryError;

    fn try_from(row: JoinRow) -> Result<Self, Self::Error> {
        let unmappable = |reason: String| {
            RepositoryError::mapping(RepositoryOperation::FetchAll, reason)
                .with_entity("Record", row.record_id.to_string())
        };

        let age = i32::try_from(row.record_age)
            .map_err(|_| unmappable(format!("age {} does not fit in i32", row.record_age)))?;
        let (group_id, group_name) = match (row.group_id, row.group_name.as_ref()) {
            (Some(id), Some(name)) => (GroupId(id), name.clone()),
            _ => return Err(unmappable("record has no owning group".to_string())),
        };

        Ok(Self {
            record_id: RecordId(row.record_id),
            name: row.record_name,
            age,
            group_id,
            group_name,
        })
    }
}
