use log::{debug, info, warn};
use thiserror::Error;

use crate::logic::director_staging::DirectorReassignmentStaging;
use crate::model::{
    ClassroomOperation, ClassroomTarget, CommitReport, DiffError, Id, InstitutionDraft,
    OperationOutcome, OperationRecord,
};
use crate::store::InstitutionBackend;

#[derive(Debug, Error)]
pub enum CommitError {
    #[error("Only institutions that already exist can be updated")]
    MissingInstitutionId,
    /// The institution update failed; nothing else was sent and the draft is intact
    #[error("Failed to update institution {id}: {cause}")]
    Primary { id: Id, cause: anyhow::Error },
}

/// Applies a staged draft to the backend.
///
/// Order of calls:
/// 1. institution fields and director reference (a failure here aborts)
/// 2. classroom deletes
/// 3. classroom restores
/// 4. classroom updates
/// 5. classroom creates
///
/// Calls run one after another. A failing classroom call is recorded in the
/// report and the remaining calls still run.
pub struct ReconciliationCommitter;

impl ReconciliationCommitter {
    pub async fn commit<B: InstitutionBackend + ?Sized>(
        backend: &B,
        draft: &mut InstitutionDraft,
        staging: &mut DirectorReassignmentStaging,
    ) -> Result<CommitReport, CommitError> {
        let institution_id = draft.id.clone().ok_or(CommitError::MissingInstitutionId)?;
        let update = draft.to_update(staging.effective_director_id().cloned());

        info!(
            "Committing institution {} (director {:?}, {} deletes, {} restores, {} updates, {} creates)",
            institution_id,
            update.director_id,
            draft.classrooms.deleted_ids().len(),
            draft.classrooms.restored_ids().len(),
            draft.classrooms.pending_updates().len(),
            draft.classrooms.new_classrooms().len(),
        );

        let institution = backend
            .update_institution(&institution_id, &update)
            .await
            .map_err(|cause| {
                warn!("Institution {} update failed: {:#}", institution_id, cause);
                CommitError::Primary {
                    id: institution_id.clone(),
                    cause,
                }
            })?;

        let mut operations = Vec::new();

        for id in draft.classrooms.deleted_ids() {
            let result = backend.delete_classroom(&id).await;
            if result.is_ok() {
                Self::confirm(draft.classrooms.confirm_deleted(&id));
            }
            operations.push(Self::record(
                ClassroomOperation::Delete,
                ClassroomTarget::Existing { id },
                result,
            ));
        }

        for id in draft.classrooms.restored_ids() {
            let result = backend
                .restore_classroom(&id)
                .await
                .map(|record| Self::confirm(draft.classrooms.confirm_saved(record)));
            operations.push(Self::record(
                ClassroomOperation::Restore,
                ClassroomTarget::Existing { id },
                result,
            ));
        }

        for (id, fields) in draft.classrooms.pending_updates() {
            let result = backend
                .update_classroom(&id, &fields)
                .await
                .map(|record| Self::confirm(draft.classrooms.confirm_saved(record)));
            operations.push(Self::record(
                ClassroomOperation::Update,
                ClassroomTarget::Existing { id },
                result,
            ));
        }

        let mut created = Vec::new();
        for (key, fields) in draft.classrooms.new_classrooms() {
            let (created_id, result) = match backend.create_classroom(&institution_id, &fields).await {
                Ok(record) => {
                    let id = record.id.clone();
                    created.push((key.clone(), record));
                    (Some(id), Ok(()))
                }
                Err(e) => (None, Err(e)),
            };
            operations.push(Self::record(
                ClassroomOperation::Create,
                ClassroomTarget::New {
                    key,
                    name: fields.name,
                    created_id,
                },
                result,
            ));
        }

        for (key, record) in created {
            if let Err(e) = draft.classrooms.adopt_created(&key, record) {
                warn!("Created classroom could not be adopted into the draft: {}", e);
            }
        }
        // Rebase on what the backend confirmed; unconfirmed changes are dropped
        draft.classrooms.reset();
        draft.classrooms.clear_new();

        staging.mark_committed();
        draft.director = staging.baseline().cloned();

        let report = CommitReport::new(institution, operations);
        if report.is_partial() {
            warn!(
                "Institution {} committed with {} failed classroom operation(s)",
                institution_id,
                report.failures().count()
            );
        } else {
            info!("Institution {} committed", institution_id);
        }

        Ok(report)
    }

    fn confirm(result: Result<(), DiffError>) {
        if let Err(e) = result {
            warn!("Backend response could not be applied to the draft: {}", e);
        }
    }

    fn record(
        operation: ClassroomOperation,
        classroom: ClassroomTarget,
        result: anyhow::Result<()>,
    ) -> OperationRecord {
        let outcome = match result {
            Ok(()) => {
                debug!("{} {} succeeded", operation, classroom);
                OperationOutcome::Ok
            }
            Err(e) => {
                warn!("{} {} failed: {:#}", operation, classroom, e);
                OperationOutcome::Failed {
                    reason: format!("{:#}", e),
                }
            }
        };
        OperationRecord {
            operation,
            classroom,
            outcome,
        }
    }
}
