use log::info;
use std::sync::Arc;

use crate::logic::director_staging::DirectorReassignmentStaging;
use crate::logic::step_gate::{Field, StepGate, SubmitError, WizardStep};
use crate::model::{
    ClassroomRecord, CommitReport, DiffError, DirectorInfo, DraftAction, DraftError, Id,
    InstitutionDraft, InstitutionRecord,
};
use crate::store::{Confirmer, InstitutionBackend, Notifier};

#[derive(Debug)]
pub enum SubmitOutcome {
    Committed(CommitReport),
    /// The user declined the confirmation prompt
    Cancelled,
}

/// One open edit wizard: the draft, its step gate and director staging,
/// plus the collaborators it talks to. Dropping the session discards the
/// draft; calls already sent to the backend are not undone.
pub struct WizardSession {
    baseline: InstitutionDraft,
    draft: InstitutionDraft,
    gate: StepGate,
    staging: DirectorReassignmentStaging,
    backend: Arc<dyn InstitutionBackend>,
    confirmer: Arc<dyn Confirmer>,
    notifier: Arc<dyn Notifier>,
}

impl WizardSession {
    pub fn open(
        record: InstitutionRecord,
        classrooms: Vec<ClassroomRecord>,
        backend: Arc<dyn InstitutionBackend>,
        confirmer: Arc<dyn Confirmer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        info!("Opening edit wizard for institution {}", record.id);
        let draft = InstitutionDraft::from_record(record, classrooms);
        let staging = DirectorReassignmentStaging::for_draft(&draft);
        Self {
            baseline: draft.clone(),
            draft,
            gate: StepGate::new(),
            staging,
            backend,
            confirmer,
            notifier,
        }
    }

    pub fn draft(&self) -> &InstitutionDraft {
        &self.draft
    }

    pub fn gate(&self) -> &StepGate {
        &self.gate
    }

    pub fn staging(&self) -> &DirectorReassignmentStaging {
        &self.staging
    }

    pub fn current_step(&self) -> WizardStep {
        self.gate.current_step()
    }

    pub fn dispatch(&mut self, action: DraftAction) -> Result<(), DraftError> {
        self.draft = self.draft.reduce(action)?;
        self.gate.refresh(&self.draft, &self.staging);
        Ok(())
    }

    pub fn blur(&mut self, field: Field) {
        self.gate.touch(field, &self.draft, &self.staging);
    }

    pub fn next(&mut self) -> bool {
        self.gate.next(&self.draft, &self.staging)
    }

    pub fn prev(&mut self) -> bool {
        self.gate.prev()
    }

    pub fn select_director(&mut self, candidate: DirectorInfo) {
        self.staging.select(candidate);
        self.gate.refresh(&self.draft, &self.staging);
    }

    pub fn cancel_director(&mut self) {
        self.staging.cancel();
        self.gate.refresh(&self.draft, &self.staging);
    }

    /// Stage a classroom delete after the user confirms. Returns whether it was staged.
    pub async fn delete_classroom(&mut self, id: &Id) -> Result<bool, DraftError> {
        let name = self
            .draft
            .classrooms
            .get(id)
            .map(|c| c.draft.fields.name.clone())
            .ok_or_else(|| DiffError::UnknownClassroom(id.clone()))?;

        let prompt = format!("Delete classroom '{}'?", name);
        if !self.confirmer.confirm(&prompt).await {
            return Ok(false);
        }
        self.dispatch(DraftAction::DeleteClassroom(id.clone()))?;
        Ok(true)
    }

    pub fn has_pending_changes(&self) -> bool {
        self.draft != self.baseline || self.staging.is_staged()
    }

    /// Validate, confirm, then reconcile with the backend. Validation runs
    /// before the prompt so the user is never asked to save an invalid draft.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, SubmitError> {
        if let Err(e) = self.gate.check_submittable(&self.draft, &self.staging) {
            self.notifier.failure(&e.to_string());
            return Err(e);
        }

        if !self
            .confirmer
            .confirm("Save the changes to this institution?")
            .await
        {
            return Ok(SubmitOutcome::Cancelled);
        }

        self.notifier.progress("Saving institution...");
        let result = self
            .gate
            .submit(self.backend.as_ref(), &mut self.draft, &mut self.staging)
            .await;

        match result {
            Ok(report) => {
                self.baseline = self.draft.clone();
                self.gate.refresh(&self.draft, &self.staging);
                match report.failure_summary() {
                    Some(summary) => self.notifier.failure(&format!(
                        "Institution saved, but some classroom changes failed:\n{}",
                        summary
                    )),
                    None => self.notifier.success("Institution updated"),
                }
                Ok(SubmitOutcome::Committed(report))
            }
            Err(e) => {
                self.notifier.failure(&e.to_string());
                Err(e)
            }
        }
    }

    pub fn close(self) {
        if self.has_pending_changes() {
            info!(
                "Discarding unsaved changes for institution {}",
                self.draft.id.as_deref().unwrap_or("<new>")
            );
        }
    }
}
