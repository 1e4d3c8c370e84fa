use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{Id, InstitutionRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassroomOperation {
    Delete,
    Restore,
    Update,
    Create,
}

impl fmt::Display for ClassroomOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ClassroomOperation::Delete => "delete",
            ClassroomOperation::Restore => "restore",
            ClassroomOperation::Update => "update",
            ClassroomOperation::Create => "create",
        };
        f.write_str(label)
    }
}

/// Which classroom a sub-operation acted on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassroomTarget {
    /// Persisted classroom, by backend id
    Existing { id: Id },
    /// Unsaved classroom, by local key; `created_id` is set once the backend assigned one
    New {
        key: String,
        name: String,
        created_id: Option<Id>,
    },
}

impl fmt::Display for ClassroomTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassroomTarget::Existing { id } => write!(f, "classroom {}", id),
            ClassroomTarget::New { name, .. } => write!(f, "new classroom '{}'", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum OperationOutcome {
    Ok,
    Failed { reason: String },
}

impl OperationOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, OperationOutcome::Ok)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub operation: ClassroomOperation,
    pub classroom: ClassroomTarget,
    pub outcome: OperationOutcome,
}

/// Top-level result of a reconciliation run.
/// `Partial` means the institution was updated but some classroom calls failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitStatus {
    Complete,
    Partial,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReport {
    pub institution: InstitutionRecord,
    pub operations: Vec<OperationRecord>,
    pub status: CommitStatus,
}

impl CommitReport {
    pub fn new(institution: InstitutionRecord, operations: Vec<OperationRecord>) -> Self {
        let status = if operations.iter().all(|op| op.outcome.is_ok()) {
            CommitStatus::Complete
        } else {
            CommitStatus::Partial
        };
        Self {
            institution,
            operations,
            status,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &OperationRecord> {
        self.operations.iter().filter(|op| !op.outcome.is_ok())
    }

    pub fn is_partial(&self) -> bool {
        self.status == CommitStatus::Partial
    }

    /// One line per failed sub-operation, for user feedback
    pub fn failure_summary(&self) -> Option<String> {
        let lines: Vec<String> = self
            .operations
            .iter()
            .filter_map(|op| match &op.outcome {
                OperationOutcome::Failed { reason } => {
                    Some(format!("{} {}: {}", op.operation, op.classroom, reason))
                }
                OperationOutcome::Ok => None,
            })
            .collect();
        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }
}
