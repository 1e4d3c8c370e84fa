use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::{is_blank, Id};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassroomStatus {
    Active,
    Inactive,
}

impl Default for ClassroomStatus {
    fn default() -> Self {
        ClassroomStatus::Active
    }
}

impl fmt::Display for ClassroomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassroomStatus::Active => f.write_str("ACTIVE"),
            ClassroomStatus::Inactive => f.write_str("INACTIVE"),
        }
    }
}

/// Editable classroom fields, also the create/update request body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassroomFields {
    pub name: String,
    /// Age (for EDAD institutions) or grade (for GRADO institutions)
    pub age_or_grade: String,
    pub capacity: u32,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub status: ClassroomStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassroomError {
    #[error("Classroom name is required")]
    NameRequired,
    #[error("Age or grade is required")]
    AgeOrGradeRequired,
    #[error("Capacity must be greater than zero")]
    CapacityNotPositive,
}

impl ClassroomFields {
    /// Checked whenever a classroom is added or edited in a draft
    pub fn validate(&self) -> Result<(), ClassroomError> {
        if is_blank(&self.name) {
            return Err(ClassroomError::NameRequired);
        }
        if is_blank(&self.age_or_grade) {
            return Err(ClassroomError::AgeOrGradeRequired);
        }
        if self.capacity == 0 {
            return Err(ClassroomError::CapacityNotPositive);
        }
        Ok(())
    }
}

/// Classroom as returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassroomRecord {
    pub id: Id,
    #[serde(flatten)]
    pub fields: ClassroomFields,
}

/// Working copy of a classroom inside an institution draft.
/// A missing id means the classroom has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassroomDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    #[serde(flatten)]
    pub fields: ClassroomFields,
}

impl From<ClassroomRecord> for ClassroomDraft {
    fn from(record: ClassroomRecord) -> Self {
        Self {
            id: Some(record.id),
            fields: record.fields,
        }
    }
}
