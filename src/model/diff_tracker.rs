use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{
    generate_id, ClassroomDraft, ClassroomFields, ClassroomRecord, ClassroomStatus, Id,
};

/// Staged state of one classroom relative to the baseline snapshot.
/// A classroom is never deleted and restored at the same time; the
/// `edited` flag survives a delete/restore toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ClassroomChange {
    Unchanged,
    Edited,
    Deleted { edited: bool },
    Restored { edited: bool },
    /// Not persisted yet; `key` identifies it locally until created
    New { key: String },
}

impl ClassroomChange {
    pub fn is_edited(&self) -> bool {
        matches!(
            self,
            ClassroomChange::Edited
                | ClassroomChange::Deleted { edited: true }
                | ClassroomChange::Restored { edited: true }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    #[error("Classroom '{0}' does not belong to this institution")]
    UnknownClassroom(Id),
    #[error("Classroom '{0}' is marked for deletion; restore it before editing")]
    EditWhileDeleted(Id),
    #[error("No unsaved classroom with key '{0}'")]
    UnknownNewClassroom(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackedClassroom {
    pub draft: ClassroomDraft,
    pub change: ClassroomChange,
    /// Last state known to be stored in the backend; `None` for unsaved classrooms
    baseline: Option<ClassroomDraft>,
}

impl TrackedClassroom {
    fn persisted(draft: ClassroomDraft) -> Self {
        Self {
            baseline: Some(draft.clone()),
            draft,
            change: ClassroomChange::Unchanged,
        }
    }

    pub fn baseline(&self) -> Option<&ClassroomDraft> {
        self.baseline.as_ref()
    }

    pub fn id(&self) -> Option<&Id> {
        self.draft.id.as_ref()
    }

    pub fn new_key(&self) -> Option<&str> {
        match &self.change {
            ClassroomChange::New { key } => Some(key),
            _ => None,
        }
    }
}

/// Classroom collection of a draft together with its staged changes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassroomDiffTracker {
    entries: Vec<TrackedClassroom>,
}

impl ClassroomDiffTracker {
    pub fn from_baseline(records: Vec<ClassroomRecord>) -> Self {
        Self {
            entries: records
                .into_iter()
                .map(|record| TrackedClassroom::persisted(record.into()))
                .collect(),
        }
    }

    pub fn classrooms(&self) -> &[TrackedClassroom] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&TrackedClassroom> {
        self.entries
            .iter()
            .find(|entry| entry.id().map(String::as_str) == Some(id))
    }

    fn persisted_mut(&mut self, id: &str) -> Result<&mut TrackedClassroom, DiffError> {
        self.entries
            .iter_mut()
            .find(|entry| entry.id().map(String::as_str) == Some(id))
            .ok_or_else(|| DiffError::UnknownClassroom(id.to_string()))
    }

    fn new_mut(&mut self, key: &str) -> Result<&mut TrackedClassroom, DiffError> {
        self.entries
            .iter_mut()
            .find(|entry| entry.new_key() == Some(key))
            .ok_or_else(|| DiffError::UnknownNewClassroom(key.to_string()))
    }

    /// Append an unsaved classroom, returning its local key
    pub fn add_new(&mut self, fields: ClassroomFields) -> String {
        let key = generate_id();
        self.entries.push(TrackedClassroom {
            draft: ClassroomDraft { id: None, fields },
            change: ClassroomChange::New { key: key.clone() },
            baseline: None,
        });
        key
    }

    pub fn edit_new(&mut self, key: &str, fields: ClassroomFields) -> Result<(), DiffError> {
        self.new_mut(key)?.draft.fields = fields;
        Ok(())
    }

    pub fn discard_new(&mut self, key: &str) -> Result<(), DiffError> {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.new_key() != Some(key));
        if self.entries.len() == before {
            return Err(DiffError::UnknownNewClassroom(key.to_string()));
        }
        Ok(())
    }

    /// Replace the fields of a persisted classroom and mark it edited
    pub fn edit(&mut self, id: &str, fields: ClassroomFields) -> Result<(), DiffError> {
        self.mark_edited(id)?;
        let entry = self.persisted_mut(id)?;
        entry.draft.fields = fields;
        if matches!(entry.change, ClassroomChange::Restored { .. }) {
            entry.draft.fields.status = ClassroomStatus::Active;
        }
        Ok(())
    }

    pub fn mark_edited(&mut self, id: &str) -> Result<(), DiffError> {
        let entry = self.persisted_mut(id)?;
        entry.change = match entry.change {
            ClassroomChange::Deleted { .. } => {
                return Err(DiffError::EditWhileDeleted(id.to_string()))
            }
            ClassroomChange::Restored { .. } => ClassroomChange::Restored { edited: true },
            _ => ClassroomChange::Edited,
        };
        Ok(())
    }

    pub fn mark_deleted(&mut self, id: &str) -> Result<(), DiffError> {
        let entry = self.persisted_mut(id)?;
        let edited = entry.change.is_edited();
        entry.change = ClassroomChange::Deleted { edited };
        entry.draft.fields.status = ClassroomStatus::Inactive;
        Ok(())
    }

    pub fn mark_restored(&mut self, id: &str) -> Result<(), DiffError> {
        let entry = self.persisted_mut(id)?;
        let edited = entry.change.is_edited();
        entry.change = ClassroomChange::Restored { edited };
        entry.draft.fields.status = ClassroomStatus::Active;
        Ok(())
    }

    /// The backend soft-deleted `id`; its stored state is now inactive
    pub fn confirm_deleted(&mut self, id: &str) -> Result<(), DiffError> {
        let entry = self.persisted_mut(id)?;
        if let Some(baseline) = entry.baseline.as_mut() {
            baseline.fields.status = ClassroomStatus::Inactive;
        }
        Ok(())
    }

    /// The backend stored `record` (restore or update response)
    pub fn confirm_saved(&mut self, record: ClassroomRecord) -> Result<(), DiffError> {
        let entry = self.persisted_mut(&record.id)?;
        entry.baseline = Some(record.into());
        Ok(())
    }

    /// Forget every staged change on persisted classrooms. Each one goes
    /// back to its baseline, so changes never confirmed by the backend are
    /// dropped from the draft too.
    pub fn reset(&mut self) {
        for entry in self.entries.iter_mut() {
            if let Some(baseline) = &entry.baseline {
                entry.draft = baseline.clone();
                entry.change = ClassroomChange::Unchanged;
            }
        }
    }

    /// Drop all classrooms that were never persisted
    pub fn clear_new(&mut self) {
        self.entries.retain(|entry| entry.draft.id.is_some());
    }

    /// Turn an unsaved classroom into a persisted one after the backend created it
    pub fn adopt_created(&mut self, key: &str, record: ClassroomRecord) -> Result<(), DiffError> {
        let entry = self.new_mut(key)?;
        *entry = TrackedClassroom::persisted(record.into());
        Ok(())
    }

    fn ids_where(&self, predicate: impl Fn(&ClassroomChange) -> bool) -> Vec<Id> {
        self.entries
            .iter()
            .filter(|entry| predicate(&entry.change))
            .filter_map(|entry| entry.draft.id.clone())
            .collect()
    }

    pub fn edited_ids(&self) -> Vec<Id> {
        self.ids_where(ClassroomChange::is_edited)
    }

    pub fn deleted_ids(&self) -> Vec<Id> {
        self.ids_where(|change| matches!(change, ClassroomChange::Deleted { .. }))
    }

    pub fn restored_ids(&self) -> Vec<Id> {
        self.ids_where(|change| matches!(change, ClassroomChange::Restored { .. }))
    }

    /// Edited classrooms that still need an update call: plain edits plus
    /// edits made after a restore. Edits to deleted classrooms are dropped.
    pub fn pending_updates(&self) -> Vec<(Id, ClassroomFields)> {
        self.entries
            .iter()
            .filter(|entry| {
                matches!(
                    entry.change,
                    ClassroomChange::Edited | ClassroomChange::Restored { edited: true }
                )
            })
            .filter_map(|entry| {
                entry
                    .draft
                    .id
                    .clone()
                    .map(|id| (id, entry.draft.fields.clone()))
            })
            .collect()
    }

    /// Unsaved classrooms as (local key, fields), in insertion order
    pub fn new_classrooms(&self) -> Vec<(String, ClassroomFields)> {
        self.entries
            .iter()
            .filter_map(|entry| {
                entry
                    .new_key()
                    .map(|key| (key.to_string(), entry.draft.fields.clone()))
            })
            .collect()
    }

    pub fn has_changes(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.change != ClassroomChange::Unchanged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, status: ClassroomStatus) -> ClassroomRecord {
        ClassroomRecord {
            id: id.to_string(),
            fields: ClassroomFields {
                name: format!("Aula {}", id),
                age_or_grade: "3".to_string(),
                capacity: 20,
                color: "#00aa00".to_string(),
                status,
            },
        }
    }

    fn tracker() -> ClassroomDiffTracker {
        ClassroomDiffTracker::from_baseline(vec![
            record("c1", ClassroomStatus::Active),
            record("c2", ClassroomStatus::Inactive),
            record("c3", ClassroomStatus::Active),
        ])
    }

    #[test]
    fn test_delete_then_restore_moves_between_sets() {
        let mut tracker = tracker();

        tracker.mark_deleted("c1").unwrap();
        assert_eq!(tracker.deleted_ids(), vec!["c1".to_string()]);
        assert!(tracker.restored_ids().is_empty());
        assert_eq!(
            tracker.get("c1").unwrap().draft.fields.status,
            ClassroomStatus::Inactive
        );

        tracker.mark_restored("c1").unwrap();
        assert!(tracker.deleted_ids().is_empty());
        assert_eq!(tracker.restored_ids(), vec!["c1".to_string()]);
        assert_eq!(
            tracker.get("c1").unwrap().draft.fields.status,
            ClassroomStatus::Active
        );

        tracker.mark_deleted("c1").unwrap();
        assert_eq!(tracker.deleted_ids(), vec!["c1".to_string()]);
        assert!(tracker.restored_ids().is_empty());
    }

    #[test]
    fn test_sets_stay_disjoint_under_any_toggle_sequence() {
        let mut tracker = tracker();
        let ops: [(&str, bool); 8] = [
            ("c1", true),
            ("c2", false),
            ("c1", false),
            ("c3", true),
            ("c2", true),
            ("c3", false),
            ("c3", true),
            ("c2", false),
        ];
        for (id, delete) in ops {
            if delete {
                tracker.mark_deleted(id).unwrap();
            } else {
                tracker.mark_restored(id).unwrap();
            }
            let deleted = tracker.deleted_ids();
            assert!(tracker.restored_ids().iter().all(|id| !deleted.contains(id)));
        }
        assert_eq!(tracker.deleted_ids(), vec!["c3".to_string()]);
        assert_eq!(tracker.restored_ids(), vec!["c1".to_string(), "c2".to_string()]);
    }

    #[test]
    fn test_unknown_classroom_is_rejected() {
        let mut tracker = tracker();
        assert_eq!(
            tracker.mark_deleted("nope"),
            Err(DiffError::UnknownClassroom("nope".to_string()))
        );
        assert!(tracker.mark_edited("nope").is_err());
    }

    #[test]
    fn test_edit_flag_survives_delete_restore() {
        let mut tracker = tracker();
        tracker.mark_edited("c1").unwrap();
        tracker.mark_deleted("c1").unwrap();
        assert_eq!(tracker.edited_ids(), vec!["c1".to_string()]);
        assert!(tracker.pending_updates().is_empty());

        tracker.mark_restored("c1").unwrap();
        assert_eq!(
            tracker.get("c1").unwrap().change,
            ClassroomChange::Restored { edited: true }
        );
        assert_eq!(tracker.pending_updates().len(), 1);
    }

    #[test]
    fn test_editing_deleted_classroom_is_rejected() {
        let mut tracker = tracker();
        tracker.mark_deleted("c3").unwrap();
        let result = tracker.edit("c3", record("c3", ClassroomStatus::Active).fields);
        assert_eq!(result, Err(DiffError::EditWhileDeleted("c3".to_string())));
    }

    #[test]
    fn test_editing_restored_classroom_keeps_it_active() {
        let mut tracker = tracker();
        tracker.mark_restored("c2").unwrap();
        let mut fields = record("c2", ClassroomStatus::Inactive).fields;
        fields.capacity = 30;
        tracker.edit("c2", fields).unwrap();

        let entry = tracker.get("c2").unwrap();
        assert_eq!(entry.draft.fields.capacity, 30);
        assert_eq!(entry.draft.fields.status, ClassroomStatus::Active);
    }

    #[test]
    fn test_new_classrooms_are_outside_the_id_sets() {
        let mut tracker = tracker();
        let key = tracker.add_new(record("x", ClassroomStatus::Active).fields);

        assert!(tracker.edited_ids().is_empty());
        assert!(tracker.deleted_ids().is_empty());
        assert_eq!(tracker.new_classrooms().len(), 1);
        assert!(tracker.mark_deleted(&key).is_err());

        tracker.discard_new(&key).unwrap();
        assert!(tracker.new_classrooms().is_empty());
        assert!(!tracker.has_changes());
    }

    #[test]
    fn test_reset_keeps_only_confirmed_changes() {
        let mut tracker = tracker();
        tracker.mark_deleted("c1").unwrap();
        tracker.mark_restored("c2").unwrap();
        let mut fields = record("c3", ClassroomStatus::Active).fields;
        fields.capacity = 99;
        tracker.edit("c3", fields).unwrap();

        // only the delete reached the backend
        tracker.confirm_deleted("c1").unwrap();
        tracker.reset();

        assert!(!tracker.has_changes());
        assert_eq!(
            tracker.get("c1").unwrap().draft.fields.status,
            ClassroomStatus::Inactive
        );
        assert_eq!(
            tracker.get("c2").unwrap().draft.fields.status,
            ClassroomStatus::Inactive
        );
        assert_eq!(tracker.get("c3").unwrap().draft.fields.capacity, 20);
    }

    #[test]
    fn test_confirm_saved_replaces_baseline() {
        let mut tracker = tracker();
        let mut stored = record("c3", ClassroomStatus::Active);
        stored.fields.name = "Aula Sol".to_string();
        tracker.edit("c3", stored.fields.clone()).unwrap();

        tracker.confirm_saved(stored).unwrap();
        tracker.reset();

        let entry = tracker.get("c3").unwrap();
        assert_eq!(entry.draft.fields.name, "Aula Sol");
        assert_eq!(entry.baseline(), Some(&entry.draft));
        assert!(tracker
            .confirm_saved(record("nope", ClassroomStatus::Active))
            .is_err());
    }

    #[test]
    fn test_reset_and_adopt_created() {
        let mut tracker = tracker();
        tracker.mark_deleted("c1").unwrap();
        tracker.mark_edited("c3").unwrap();
        let kept = tracker.add_new(record("x", ClassroomStatus::Active).fields);
        tracker.add_new(record("y", ClassroomStatus::Active).fields);

        tracker
            .adopt_created(&kept, record("c9", ClassroomStatus::Active))
            .unwrap();
        tracker.reset();
        tracker.clear_new();

        assert!(!tracker.has_changes());
        assert_eq!(tracker.classrooms().len(), 4);
        assert!(tracker.get("c9").is_some());
    }
}
