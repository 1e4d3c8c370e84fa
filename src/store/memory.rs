use anyhow::{anyhow, bail, Result};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

use crate::model::{
    generate_id, ClassroomFields, ClassroomRecord, ClassroomStatus, DirectorInfo, Id,
    InstitutionRecord, InstitutionUpdate,
};
use crate::store::traits::InstitutionBackend;

/// One call received by [`MemoryBackend`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BackendCall {
    UpdateInstitution { institution_id: Id },
    DeleteClassroom { classroom_id: Id },
    RestoreClassroom { classroom_id: Id },
    UpdateClassroom { classroom_id: Id },
    CreateClassroom { institution_id: Id, name: String },
}

#[derive(Debug, Default)]
struct MemoryState {
    institutions: HashMap<Id, InstitutionRecord>,
    classrooms: HashMap<Id, ClassroomRecord>,
    owners: HashMap<Id, Id>,
    directors: HashMap<Id, DirectorInfo>,
    calls: Vec<BackendCall>,
    failures: HashSet<BackendCall>,
    last_update: Option<InstitutionUpdate>,
}

impl MemoryState {
    /// Record the call and fail it if a failure was injected for it
    fn enter(&mut self, call: BackendCall) -> Result<()> {
        self.calls.push(call.clone());
        if self.failures.contains(&call) {
            bail!("injected failure for {:?}", call);
        }
        Ok(())
    }

    fn classroom_mut(&mut self, id: &Id) -> Result<&mut ClassroomRecord> {
        self.classrooms
            .get_mut(id)
            .ok_or_else(|| anyhow!("Classroom {} not found", id))
    }
}

/// In-process backend. Keeps records in memory, logs every call in order
/// and can be told to fail specific calls.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_institution(&self, record: InstitutionRecord) {
        let mut state = self.state.lock();
        if let Some(director) = &record.director {
            state.directors.insert(director.id.clone(), director.clone());
        }
        state.institutions.insert(record.id.clone(), record);
    }

    pub fn seed_classroom(&self, institution_id: &Id, record: ClassroomRecord) {
        let mut state = self.state.lock();
        state.owners.insert(record.id.clone(), institution_id.clone());
        state.classrooms.insert(record.id.clone(), record);
    }

    pub fn seed_director(&self, director: DirectorInfo) {
        self.state
            .lock()
            .directors
            .insert(director.id.clone(), director);
    }

    /// Make every future call equal to `call` fail
    pub fn fail_on(&self, call: BackendCall) {
        self.state.lock().failures.insert(call);
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.state.lock().calls.clone()
    }

    pub fn last_update(&self) -> Option<InstitutionUpdate> {
        self.state.lock().last_update.clone()
    }

    pub fn institution(&self, id: &str) -> Option<InstitutionRecord> {
        self.state.lock().institutions.get(id).cloned()
    }

    pub fn classroom(&self, id: &str) -> Option<ClassroomRecord> {
        self.state.lock().classrooms.get(id).cloned()
    }

    pub fn classrooms_of(&self, institution_id: &str) -> Vec<ClassroomRecord> {
        let state = self.state.lock();
        let mut classrooms: Vec<ClassroomRecord> = state
            .owners
            .iter()
            .filter(|(_, owner)| owner.as_str() == institution_id)
            .filter_map(|(id, _)| state.classrooms.get(id).cloned())
            .collect();
        classrooms.sort_by(|a, b| a.id.cmp(&b.id));
        classrooms
    }
}

#[async_trait::async_trait]
impl InstitutionBackend for MemoryBackend {
    async fn update_institution(&self, id: &Id, fields: &InstitutionUpdate) -> Result<InstitutionRecord> {
        let mut state = self.state.lock();
        state.enter(BackendCall::UpdateInstitution {
            institution_id: id.clone(),
        })?;
        if !state.institutions.contains_key(id) {
            bail!("Institution {} not found", id);
        }

        let director = fields.director_id.as_ref().map(|director_id| {
            state
                .directors
                .get(director_id)
                .cloned()
                .unwrap_or_else(|| DirectorInfo {
                    id: director_id.clone(),
                    first_name: String::new(),
                    last_name: String::new(),
                    email: None,
                    phone: None,
                })
        });

        let record = InstitutionRecord {
            id: id.clone(),
            name: fields.name.clone(),
            institution_code: fields.institution_code.clone(),
            modular_code: fields.modular_code.clone(),
            logo_url: fields.logo_url.clone(),
            address: fields.address.clone(),
            contacts: fields.contacts.clone(),
            grading_level: fields.grading_level.clone(),
            classroom_type: fields.classroom_type.clone(),
            schedules: fields.schedules.clone(),
            director,
            ugel: fields.ugel.clone(),
            dre: fields.dre.clone(),
        };
        state.institutions.insert(id.clone(), record.clone());
        state.last_update = Some(fields.clone());
        Ok(record)
    }

    async fn delete_classroom(&self, classroom_id: &Id) -> Result<()> {
        let mut state = self.state.lock();
        state.enter(BackendCall::DeleteClassroom {
            classroom_id: classroom_id.clone(),
        })?;
        state.classroom_mut(classroom_id)?.fields.status = ClassroomStatus::Inactive;
        Ok(())
    }

    async fn restore_classroom(&self, classroom_id: &Id) -> Result<ClassroomRecord> {
        let mut state = self.state.lock();
        state.enter(BackendCall::RestoreClassroom {
            classroom_id: classroom_id.clone(),
        })?;
        let classroom = state.classroom_mut(classroom_id)?;
        classroom.fields.status = ClassroomStatus::Active;
        Ok(classroom.clone())
    }

    async fn update_classroom(&self, classroom_id: &Id, fields: &ClassroomFields) -> Result<ClassroomRecord> {
        let mut state = self.state.lock();
        state.enter(BackendCall::UpdateClassroom {
            classroom_id: classroom_id.clone(),
        })?;
        let classroom = state.classroom_mut(classroom_id)?;
        classroom.fields = fields.clone();
        Ok(classroom.clone())
    }

    async fn create_classroom(&self, institution_id: &Id, fields: &ClassroomFields) -> Result<ClassroomRecord> {
        let mut state = self.state.lock();
        state.enter(BackendCall::CreateClassroom {
            institution_id: institution_id.clone(),
            name: fields.name.clone(),
        })?;
        if !state.institutions.contains_key(institution_id) {
            bail!("Institution {} not found", institution_id);
        }
        let record = ClassroomRecord {
            id: generate_id(),
            fields: fields.clone(),
        };
        state.owners.insert(record.id.clone(), institution_id.clone());
        state.classrooms.insert(record.id.clone(), record.clone());
        Ok(record)
    }
}
