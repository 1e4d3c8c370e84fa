use crate::model::{ClassroomFields, ClassroomRecord, Id, InstitutionRecord, InstitutionUpdate};
use anyhow::Result;

/// REST operations the edit workflow needs from the institution backend
#[async_trait::async_trait]
pub trait InstitutionBackend: Send + Sync {
    async fn update_institution(&self, id: &Id, fields: &InstitutionUpdate) -> Result<InstitutionRecord>;
    /// Soft delete; the classroom stays on record as inactive
    async fn delete_classroom(&self, classroom_id: &Id) -> Result<()>;
    async fn restore_classroom(&self, classroom_id: &Id) -> Result<ClassroomRecord>;
    async fn update_classroom(&self, classroom_id: &Id, fields: &ClassroomFields) -> Result<ClassroomRecord>;
    async fn create_classroom(&self, institution_id: &Id, fields: &ClassroomFields) -> Result<ClassroomRecord>;
}

/// Asks the user to confirm a destructive or committing action
#[async_trait::async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// User-facing feedback (toasts, alerts)
pub trait Notifier: Send + Sync {
    fn progress(&self, message: &str);
    fn success(&self, message: &str);
    fn failure(&self, message: &str);
}
