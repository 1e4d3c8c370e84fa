use serde::{Deserialize, Serialize};

use crate::model::{DirectorInfo, Id, InstitutionDraft};

/// Replacement director picked in the wizard but not yet sent to the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorReassignment {
    pub candidate_id: Id,
    pub candidate: DirectorInfo,
}

/// Holds at most one pending director replacement, apart from the rest of
/// the draft, until the commit applies it or the user cancels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectorReassignmentStaging {
    baseline: Option<DirectorInfo>,
    pending: Option<DirectorReassignment>,
}

impl DirectorReassignmentStaging {
    pub fn new(baseline: Option<DirectorInfo>) -> Self {
        Self {
            baseline,
            pending: None,
        }
    }

    pub fn for_draft(draft: &InstitutionDraft) -> Self {
        Self::new(draft.director.clone())
    }

    /// Stage `candidate` as the replacement. No backend call is made.
    pub fn select(&mut self, candidate: DirectorInfo) {
        self.pending = Some(DirectorReassignment {
            candidate_id: candidate.id.clone(),
            candidate,
        });
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn pending(&self) -> Option<&DirectorReassignment> {
        self.pending.as_ref()
    }

    pub fn baseline(&self) -> Option<&DirectorInfo> {
        self.baseline.as_ref()
    }

    /// Director the institution will have after commit
    pub fn effective_director(&self) -> Option<&DirectorInfo> {
        self.pending
            .as_ref()
            .map(|p| &p.candidate)
            .or(self.baseline.as_ref())
    }

    /// Id to send on the institution update, whether or not anything else changed
    pub fn effective_director_id(&self) -> Option<&Id> {
        self.pending
            .as_ref()
            .map(|p| &p.candidate_id)
            .or(self.baseline.as_ref().map(|d| &d.id))
    }

    /// The pending replacement was saved; it becomes the new baseline
    pub fn mark_committed(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.baseline = Some(pending.candidate);
        }
    }

    pub fn is_staged(&self) -> bool {
        self.pending.is_some()
    }
}
