use thiserror::Error;

use crate::model::{
    Address, ClassroomDiffTracker, ClassroomError, ClassroomFields, ClassroomRecord,
    ContactMethod, DiffError, DirectorInfo, Id, InstitutionRecord, InstitutionUpdate, Schedule,
};

pub const MAX_SCHEDULES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressField {
    Street,
    Department,
    Province,
    District,
    PostalCode,
}

/// Every mutation the wizard can make to a draft
#[derive(Debug, Clone, PartialEq)]
pub enum DraftAction {
    SetName(String),
    SetInstitutionCode(String),
    SetModularCode(String),
    SetLogoUrl(String),
    SetAddressField(AddressField, String),
    AddContact,
    UpdateContact { index: usize, contact: ContactMethod },
    RemoveContact(usize),
    SetGradingLevel(String),
    SetClassroomType(String),
    AddSchedule,
    UpdateSchedule { index: usize, schedule: Schedule },
    RemoveSchedule(usize),
    SetUgel(String),
    SetDre(String),
    AddClassroom(ClassroomFields),
    EditClassroom { id: Id, fields: ClassroomFields },
    EditNewClassroom { key: String, fields: ClassroomFields },
    DeleteClassroom(Id),
    RestoreClassroom(Id),
    DiscardNewClassroom(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DraftError {
    #[error("No contact at position {0}")]
    ContactIndex(usize),
    #[error("No schedule at position {0}")]
    ScheduleIndex(usize),
    #[error("At most two shifts can be configured")]
    ScheduleLimit,
    #[error("Invalid classroom: {0}")]
    InvalidClassroom(#[from] ClassroomError),
    #[error(transparent)]
    Classroom(#[from] DiffError),
}

/// Working copy of an institution for the lifetime of one wizard session
#[derive(Debug, Clone, PartialEq)]
pub struct InstitutionDraft {
    /// Backend id; `None` while the institution has never been saved
    pub id: Option<Id>,
    pub name: String,
    pub institution_code: String,
    pub modular_code: String,
    pub logo_url: String,
    pub address: Address,
    pub contacts: Vec<ContactMethod>,
    pub grading_level: String,
    pub classroom_type: String,
    pub schedules: Vec<Schedule>,
    pub classrooms: ClassroomDiffTracker,
    /// Director on record when the draft was opened
    pub director: Option<DirectorInfo>,
    pub ugel: String,
    pub dre: String,
}

impl InstitutionDraft {
    /// Blank draft for the create form: one empty contact row and one empty shift
    pub fn create_defaults() -> Self {
        Self {
            id: None,
            name: String::new(),
            institution_code: String::new(),
            modular_code: String::new(),
            logo_url: String::new(),
            address: Address::default(),
            contacts: vec![ContactMethod::default()],
            grading_level: String::new(),
            classroom_type: String::new(),
            schedules: vec![Schedule::default()],
            classrooms: ClassroomDiffTracker::default(),
            director: None,
            ugel: String::new(),
            dre: String::new(),
        }
    }

    /// Seed a draft from an existing institution and its classrooms
    pub fn from_record(record: InstitutionRecord, classrooms: Vec<ClassroomRecord>) -> Self {
        let contacts = if record.contacts.is_empty() {
            vec![ContactMethod::default()]
        } else {
            record.contacts
        };

        Self {
            id: Some(record.id),
            name: record.name,
            institution_code: record.institution_code,
            modular_code: record.modular_code,
            logo_url: record.logo_url.unwrap_or_default(),
            address: record.address,
            contacts,
            grading_level: record.grading_level,
            classroom_type: record.classroom_type,
            schedules: record.schedules,
            classrooms: ClassroomDiffTracker::from_baseline(classrooms),
            director: record.director,
            ugel: record.ugel,
            dre: record.dre,
        }
    }

    /// Apply one action, returning the next draft. `self` is left untouched,
    /// so a rejected action leaves the session exactly where it was.
    pub fn reduce(&self, action: DraftAction) -> Result<InstitutionDraft, DraftError> {
        let mut next = self.clone();

        match action {
            DraftAction::SetName(value) => next.name = value,
            DraftAction::SetInstitutionCode(value) => next.institution_code = value,
            DraftAction::SetModularCode(value) => next.modular_code = value,
            DraftAction::SetLogoUrl(value) => next.logo_url = value,
            DraftAction::SetAddressField(field, value) => {
                let slot = match field {
                    AddressField::Street => &mut next.address.street,
                    AddressField::Department => &mut next.address.department,
                    AddressField::Province => &mut next.address.province,
                    AddressField::District => &mut next.address.district,
                    AddressField::PostalCode => &mut next.address.postal_code,
                };
                *slot = value;
            }
            DraftAction::AddContact => next.contacts.push(ContactMethod::default()),
            DraftAction::UpdateContact { index, contact } => {
                let slot = next
                    .contacts
                    .get_mut(index)
                    .ok_or(DraftError::ContactIndex(index))?;
                *slot = contact;
            }
            DraftAction::RemoveContact(index) => {
                if index >= next.contacts.len() {
                    return Err(DraftError::ContactIndex(index));
                }
                next.contacts.remove(index);
            }
            DraftAction::SetGradingLevel(value) => next.grading_level = value,
            DraftAction::SetClassroomType(value) => next.classroom_type = value,
            DraftAction::AddSchedule => {
                if next.schedules.len() >= MAX_SCHEDULES {
                    return Err(DraftError::ScheduleLimit);
                }
                next.schedules.push(Schedule::default());
            }
            DraftAction::UpdateSchedule { index, schedule } => {
                let slot = next
                    .schedules
                    .get_mut(index)
                    .ok_or(DraftError::ScheduleIndex(index))?;
                *slot = schedule;
            }
            DraftAction::RemoveSchedule(index) => {
                if index >= next.schedules.len() {
                    return Err(DraftError::ScheduleIndex(index));
                }
                next.schedules.remove(index);
            }
            DraftAction::SetUgel(value) => next.ugel = value,
            DraftAction::SetDre(value) => next.dre = value,
            DraftAction::AddClassroom(fields) => {
                fields.validate()?;
                next.classrooms.add_new(fields);
            }
            DraftAction::EditClassroom { id, fields } => {
                fields.validate()?;
                next.classrooms.edit(&id, fields)?;
            }
            DraftAction::EditNewClassroom { key, fields } => {
                fields.validate()?;
                next.classrooms.edit_new(&key, fields)?;
            }
            DraftAction::DeleteClassroom(id) => next.classrooms.mark_deleted(&id)?,
            DraftAction::RestoreClassroom(id) => next.classrooms.mark_restored(&id)?,
            DraftAction::DiscardNewClassroom(key) => next.classrooms.discard_new(&key)?,
        }

        Ok(next)
    }

    /// Request body for the institution update. Blank contact rows and
    /// incomplete shifts are not sent.
    pub fn to_update(&self, director_id: Option<Id>) -> InstitutionUpdate {
        let logo_url = self.logo_url.trim();

        InstitutionUpdate {
            name: self.name.trim().to_string(),
            institution_code: self.institution_code.trim().to_string(),
            modular_code: self.modular_code.trim().to_string(),
            logo_url: (!logo_url.is_empty()).then(|| logo_url.to_string()),
            address: Address {
                street: self.address.street.trim().to_string(),
                department: self.address.department.trim().to_string(),
                province: self.address.province.trim().to_string(),
                district: self.address.district.trim().to_string(),
                postal_code: self.address.postal_code.trim().to_string(),
            },
            contacts: self
                .contacts
                .iter()
                .filter(|c| c.is_populated())
                .map(|c| ContactMethod::new(c.contact_type.trim(), c.value.trim()))
                .collect(),
            grading_level: self.grading_level.trim().to_string(),
            classroom_type: self.classroom_type.trim().to_string(),
            schedules: self
                .schedules
                .iter()
                .filter(|s| s.is_complete())
                .cloned()
                .collect(),
            director_id,
            ugel: self.ugel.trim().to_string(),
            dre: self.dre.trim().to_string(),
        }
    }
}
