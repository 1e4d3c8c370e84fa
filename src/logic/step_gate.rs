use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

use crate::logic::committer::{CommitError, ReconciliationCommitter};
use crate::logic::director_staging::DirectorReassignmentStaging;
use crate::logic::field_validators::{self, FieldError};
use crate::logic::schedule::ScheduleWindowValidator;
use crate::model::{CommitReport, InstitutionDraft};
use crate::store::InstitutionBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    BasicInfo,
    AddressContact,
    AcademicConfig,
    Director,
    Final,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        WizardStep::BasicInfo,
        WizardStep::AddressContact,
        WizardStep::AcademicConfig,
        WizardStep::Director,
        WizardStep::Final,
    ];

    pub fn number(&self) -> u8 {
        match self {
            WizardStep::BasicInfo => 1,
            WizardStep::AddressContact => 2,
            WizardStep::AcademicConfig => 3,
            WizardStep::Director => 4,
            WizardStep::Final => 5,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|step| step.number() == number)
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::BasicInfo => "Basic information",
            WizardStep::AddressContact => "Address and contact",
            WizardStep::AcademicConfig => "Academic configuration",
            WizardStep::Director => "Director",
            WizardStep::Final => "Jurisdiction and review",
        }
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn prev(&self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }

    /// Fields validated by this step. Contact and shift rows depend on how
    /// many the draft currently has.
    pub fn fields(&self, draft: &InstitutionDraft) -> Vec<Field> {
        match self {
            WizardStep::BasicInfo => vec![
                Field::Name,
                Field::InstitutionCode,
                Field::ModularCode,
                Field::LogoUrl,
            ],
            WizardStep::AddressContact => {
                let mut fields = vec![
                    Field::Street,
                    Field::Department,
                    Field::Province,
                    Field::District,
                    Field::PostalCode,
                    Field::Contacts,
                ];
                fields.extend((0..draft.contacts.len()).map(Field::Contact));
                fields
            }
            WizardStep::AcademicConfig => {
                let mut fields = vec![Field::GradingLevel, Field::ClassroomType, Field::Schedules];
                fields.extend((0..draft.schedules.len()).map(Field::Schedule));
                fields
            }
            WizardStep::Director => vec![Field::DirectorEmail, Field::DirectorPhone],
            WizardStep::Final => vec![Field::Ugel, Field::Dre],
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {} ({})", self.number(), self.title())
    }
}

/// Steps re-checked on submit, in order. The director step only carries
/// optional shape checks, so it is not revisited.
pub const SUBMIT_CHECKED_STEPS: [WizardStep; 4] = [
    WizardStep::BasicInfo,
    WizardStep::AddressContact,
    WizardStep::AcademicConfig,
    WizardStep::Final,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "field", content = "index", rename_all = "snake_case")]
pub enum Field {
    Name,
    InstitutionCode,
    ModularCode,
    LogoUrl,
    Street,
    Department,
    Province,
    District,
    PostalCode,
    Contacts,
    Contact(usize),
    GradingLevel,
    ClassroomType,
    Schedules,
    Schedule(usize),
    DirectorEmail,
    DirectorPhone,
    Ugel,
    Dre,
}

impl Field {
    /// Key the UI uses for its error and touched maps
    pub fn key(&self) -> String {
        match self {
            Field::Name => "name".to_string(),
            Field::InstitutionCode => "institutionCode".to_string(),
            Field::ModularCode => "modularCode".to_string(),
            Field::LogoUrl => "logoUrl".to_string(),
            Field::Street => "address.street".to_string(),
            Field::Department => "address.department".to_string(),
            Field::Province => "address.province".to_string(),
            Field::District => "address.district".to_string(),
            Field::PostalCode => "address.postalCode".to_string(),
            Field::Contacts => "contacts".to_string(),
            Field::Contact(i) => format!("contacts.{}", i),
            Field::GradingLevel => "gradingLevel".to_string(),
            Field::ClassroomType => "classroomType".to_string(),
            Field::Schedules => "schedules".to_string(),
            Field::Schedule(i) => format!("schedules.{}", i),
            Field::DirectorEmail => "director.email".to_string(),
            Field::DirectorPhone => "director.phone".to_string(),
            Field::Ugel => "ugel".to_string(),
            Field::Dre => "dre".to_string(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

fn schedule_row(draft: &InstitutionDraft, index: usize) -> Result<(), FieldError> {
    let Some(schedule) = draft.schedules.get(index) else {
        return Ok(());
    };
    if schedule.shift_type.is_none() {
        return Err(FieldError::Required("Shift type"));
    }
    if schedule.entry_time.trim().is_empty() {
        return Err(FieldError::Required("Entry time"));
    }
    if schedule.exit_time.trim().is_empty() {
        return Err(FieldError::Required("Exit time"));
    }
    Ok(())
}

/// Error message for one field, or `None` when it is valid
pub fn validate_field(
    field: Field,
    draft: &InstitutionDraft,
    staging: &DirectorReassignmentStaging,
) -> Option<String> {
    let director = staging.effective_director();
    let result = match field {
        Field::Name => field_validators::institution_name(&draft.name),
        Field::InstitutionCode => field_validators::institution_code(&draft.institution_code),
        Field::ModularCode => field_validators::modular_code(&draft.modular_code),
        Field::LogoUrl => field_validators::logo_url(&draft.logo_url),
        Field::Street => field_validators::street(&draft.address.street),
        Field::Department => field_validators::region_name("Department", &draft.address.department),
        Field::Province => field_validators::region_name("Province", &draft.address.province),
        Field::District => field_validators::region_name("District", &draft.address.district),
        Field::PostalCode => field_validators::postal_code(&draft.address.postal_code),
        Field::Contacts => field_validators::at_least_one_contact(&draft.contacts),
        Field::Contact(i) => match draft.contacts.get(i) {
            Some(contact) => field_validators::contact(contact),
            None => Ok(()),
        },
        Field::GradingLevel => field_validators::grading_level(&draft.grading_level),
        Field::ClassroomType => field_validators::classroom_type(&draft.classroom_type),
        Field::Schedules => {
            return ScheduleWindowValidator::validate(&draft.schedules)
                .err()
                .map(|e| e.to_string())
        }
        Field::Schedule(i) => schedule_row(draft, i),
        Field::DirectorEmail => {
            field_validators::director_email(director.and_then(|d| d.email.as_deref()))
        }
        Field::DirectorPhone => {
            field_validators::director_phone(director.and_then(|d| d.phone.as_deref()))
        }
        Field::Ugel => field_validators::jurisdiction("UGEL", &draft.ugel),
        Field::Dre => field_validators::jurisdiction("DRE", &draft.dre),
    };
    result.err().map(|e| e.to_string())
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Submit is only available on the last step, not {0}")]
    NotAtFinalStep(WizardStep),
    #[error("{step} has errors: {message}")]
    Invalid { step: WizardStep, message: String },
    #[error(transparent)]
    Commit(#[from] CommitError),
}

/// Sequencer over the five wizard steps. Moving forward requires the
/// current step to validate; the error and touched maps drive what the
/// form shows.
#[derive(Debug, Clone, PartialEq)]
pub struct StepGate {
    current: WizardStep,
    errors: HashMap<Field, String>,
    touched: HashSet<Field>,
    step_error: Option<String>,
}

impl Default for StepGate {
    fn default() -> Self {
        Self::new()
    }
}

impl StepGate {
    pub fn new() -> Self {
        Self {
            current: WizardStep::BasicInfo,
            errors: HashMap::new(),
            touched: HashSet::new(),
            step_error: None,
        }
    }

    pub fn current_step(&self) -> WizardStep {
        self.current
    }

    pub fn errors(&self) -> &HashMap<Field, String> {
        &self.errors
    }

    pub fn touched(&self) -> &HashSet<Field> {
        &self.touched
    }

    pub fn is_touched(&self, field: Field) -> bool {
        self.touched.contains(&field)
    }

    pub fn step_error(&self) -> Option<&str> {
        self.step_error.as_deref()
    }

    /// Error to render next to `field`; untouched fields stay silent
    pub fn visible_error(&self, field: Field) -> Option<&str> {
        if self.touched.contains(&field) {
            self.errors.get(&field).map(String::as_str)
        } else {
            None
        }
    }

    /// All errors of one step, keyed by field
    pub fn validate_step(
        step: WizardStep,
        draft: &InstitutionDraft,
        staging: &DirectorReassignmentStaging,
    ) -> Vec<(Field, String)> {
        step.fields(draft)
            .into_iter()
            .filter_map(|field| validate_field(field, draft, staging).map(|msg| (field, msg)))
            .collect()
    }

    fn set_error(&mut self, field: Field, error: Option<String>) {
        match error {
            Some(message) => {
                self.errors.insert(field, message);
            }
            None => {
                self.errors.remove(&field);
            }
        }
    }

    /// Blur handler: mark the field touched and recompute its error
    pub fn touch(
        &mut self,
        field: Field,
        draft: &InstitutionDraft,
        staging: &DirectorReassignmentStaging,
    ) {
        self.touched.insert(field);
        self.set_error(field, validate_field(field, draft, staging));
    }

    /// Recompute errors of every touched field after the draft changed
    pub fn refresh(&mut self, draft: &InstitutionDraft, staging: &DirectorReassignmentStaging) {
        self.errors = self
            .touched
            .iter()
            .filter_map(|field| validate_field(*field, draft, staging).map(|msg| (*field, msg)))
            .collect();
    }

    /// Validate a whole step, touching all of its fields
    fn check_step(
        &mut self,
        step: WizardStep,
        draft: &InstitutionDraft,
        staging: &DirectorReassignmentStaging,
    ) -> Result<(), String> {
        let mut first_error = None;
        for field in step.fields(draft) {
            let error = validate_field(field, draft, staging);
            if first_error.is_none() {
                first_error = error.clone();
            }
            self.touched.insert(field);
            self.set_error(field, error);
        }
        match first_error {
            Some(message) => Err(message),
            None => Ok(()),
        }
    }

    /// Advance when the current step validates. Returns whether it moved.
    pub fn next(&mut self, draft: &InstitutionDraft, staging: &DirectorReassignmentStaging) -> bool {
        let Some(next) = self.current.next() else {
            return false;
        };

        match self.check_step(self.current, draft, staging) {
            Ok(()) => {
                self.step_error = None;
                self.current = next;
                true
            }
            Err(_) => {
                self.step_error =
                    Some(format!("Fix the errors in {} before continuing", self.current));
                false
            }
        }
    }

    /// Go back one step without validating
    pub fn prev(&mut self) -> bool {
        match self.current.prev() {
            Some(prev) => {
                self.current = prev;
                self.step_error = None;
                true
            }
            None => false,
        }
    }

    pub fn jump_to_step(&mut self, step: WizardStep) {
        self.current = step;
    }

    /// Re-check the structural steps before a submit. On the first failing
    /// step the gate jumps there and records why.
    pub fn check_submittable(
        &mut self,
        draft: &InstitutionDraft,
        staging: &DirectorReassignmentStaging,
    ) -> Result<(), SubmitError> {
        if self.current != WizardStep::Final {
            return Err(SubmitError::NotAtFinalStep(self.current));
        }

        for step in SUBMIT_CHECKED_STEPS {
            if let Err(message) = self.check_step(step, draft, staging) {
                self.jump_to_step(step);
                self.step_error = Some(format!("{} has errors: {}", step, message));
                return Err(SubmitError::Invalid { step, message });
            }
        }

        self.step_error = None;
        Ok(())
    }

    /// Validate and then reconcile the draft against the backend
    pub async fn submit<B: InstitutionBackend + ?Sized>(
        &mut self,
        backend: &B,
        draft: &mut InstitutionDraft,
        staging: &mut DirectorReassignmentStaging,
    ) -> Result<CommitReport, SubmitError> {
        self.check_submittable(draft, staging)?;
        let report = ReconciliationCommitter::commit(backend, draft, staging).await?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Address, ContactMethod, DirectorInfo, DraftAction, InstitutionRecord, Schedule, ShiftType,
    };
    use crate::store::MemoryBackend;

    fn valid_draft() -> InstitutionDraft {
        let mut draft = InstitutionDraft::create_defaults();
        draft.id = Some("inst-1".to_string());
        draft.name = "Colegio Santa Rosa".to_string();
        draft.institution_code = "12345678".to_string();
        draft.modular_code = "1234567".to_string();
        draft.address = Address {
            street: "Av. Grau 123".to_string(),
            department: "Lima".to_string(),
            province: "Lima".to_string(),
            district: "Miraflores".to_string(),
            postal_code: "15074".to_string(),
        };
        draft.contacts = vec![ContactMethod::new("EMAIL", "info@santarosa.edu.pe")];
        draft.grading_level = "PRIMARIA".to_string();
        draft.classroom_type = "GRADO".to_string();
        draft.schedules = vec![Schedule::new(ShiftType::Morning, "07:30", "12:30")];
        draft.ugel = "UGEL 07".to_string();
        draft.dre = "DRE LIMA".to_string();
        draft
    }

    fn staging() -> DirectorReassignmentStaging {
        DirectorReassignmentStaging::new(None)
    }

    #[test]
    fn test_step_numbering() {
        assert_eq!(WizardStep::from_number(1), Some(WizardStep::BasicInfo));
        assert_eq!(WizardStep::from_number(6), None);
        assert_eq!(WizardStep::BasicInfo.prev(), None);
        assert_eq!(WizardStep::Final.next(), None);
        assert_eq!(WizardStep::Director.next(), Some(WizardStep::Final));
    }

    #[test]
    fn test_short_modular_code_blocks_step_one() {
        let mut draft = valid_draft();
        draft.modular_code = "123456".to_string();
        let mut gate = StepGate::new();

        assert!(!gate.next(&draft, &staging()));
        assert_eq!(gate.current_step(), WizardStep::BasicInfo);

        let errors = StepGate::validate_step(WizardStep::BasicInfo, &draft, &staging());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, Field::ModularCode);
        assert_eq!(
            gate.visible_error(Field::ModularCode),
            Some("Modular code must be exactly 7 digits")
        );
        assert!(gate.visible_error(Field::InstitutionCode).is_none());
        assert!(gate.is_touched(Field::Name));
        assert!(gate.step_error().is_some());
    }

    #[test]
    fn test_next_walks_through_valid_draft() {
        let draft = valid_draft();
        let mut gate = StepGate::new();
        for expected in [
            WizardStep::AddressContact,
            WizardStep::AcademicConfig,
            WizardStep::Director,
            WizardStep::Final,
        ] {
            assert!(gate.next(&draft, &staging()));
            assert_eq!(gate.current_step(), expected);
            assert!(gate.step_error().is_none());
        }
        assert!(!gate.next(&draft, &staging()));
        assert_eq!(gate.current_step(), WizardStep::Final);
    }

    #[test]
    fn test_next_matches_step_validator() {
        let drafts = vec![
            valid_draft(),
            InstitutionDraft::create_defaults(),
            {
                let mut d = valid_draft();
                d.name = "IEP".to_string();
                d
            },
        ];
        for draft in drafts {
            let mut gate = StepGate::new();
            let valid = StepGate::validate_step(WizardStep::BasicInfo, &draft, &staging()).is_empty();
            assert_eq!(gate.next(&draft, &staging()), valid);
        }
    }

    #[test]
    fn test_untouched_fields_stay_silent() {
        let draft = InstitutionDraft::create_defaults();
        let staging = staging();
        let mut gate = StepGate::new();
        assert!(gate.visible_error(Field::Name).is_none());

        gate.touch(Field::Name, &draft, &staging);
        assert_eq!(gate.visible_error(Field::Name), Some("Institution name is required"));
        assert!(gate.visible_error(Field::InstitutionCode).is_none());

        let draft = draft
            .reduce(DraftAction::SetName("Colegio Los Andes".to_string()))
            .unwrap();
        gate.refresh(&draft, &staging);
        assert!(gate.visible_error(Field::Name).is_none());
    }

    #[test]
    fn test_incomplete_schedule_row_blocks_step_three() {
        let mut draft = valid_draft();
        draft.schedules.push(Schedule {
            shift_type: Some(ShiftType::Afternoon),
            entry_time: "14:00".to_string(),
            exit_time: String::new(),
        });
        let errors = StepGate::validate_step(WizardStep::AcademicConfig, &draft, &staging());
        assert_eq!(errors, vec![(Field::Schedule(1), "Exit time is required".to_string())]);
    }

    #[test]
    fn test_duplicate_shift_reported_on_schedules_field() {
        let mut draft = valid_draft();
        draft.schedules = vec![
            Schedule::new(ShiftType::Morning, "07:00", "13:00"),
            Schedule::new(ShiftType::Morning, "08:00", "12:00"),
        ];
        let errors = StepGate::validate_step(WizardStep::AcademicConfig, &draft, &staging());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, Field::Schedules);
    }

    #[test]
    fn test_director_contact_shape_checked_on_effective_director() {
        let draft = valid_draft();
        let mut staging = staging();
        staging.select(DirectorInfo {
            id: "d-2".to_string(),
            first_name: "Luis".to_string(),
            last_name: "Huaman".to_string(),
            email: Some("luis@".to_string()),
            phone: Some("912345678".to_string()),
        });
        let errors = StepGate::validate_step(WizardStep::Director, &draft, &staging);
        assert_eq!(errors, vec![(Field::DirectorEmail, "Enter a valid email address".to_string())]);

        staging.cancel();
        assert!(StepGate::validate_step(WizardStep::Director, &draft, &staging).is_empty());
    }

    #[test]
    fn test_prev_never_validates() {
        let draft = valid_draft();
        let mut gate = StepGate::new();
        assert!(!gate.prev());
        gate.next(&draft, &staging());
        assert!(gate.prev());
        assert_eq!(gate.current_step(), WizardStep::BasicInfo);
    }

    #[test]
    fn test_submit_requires_final_step() {
        let draft = valid_draft();
        let mut gate = StepGate::new();
        assert!(matches!(
            gate.check_submittable(&draft, &staging()),
            Err(SubmitError::NotAtFinalStep(WizardStep::BasicInfo))
        ));
    }

    #[test]
    fn test_submit_jumps_to_first_failing_step() {
        let mut draft = valid_draft();
        let mut gate = StepGate::new();
        gate.jump_to_step(WizardStep::Final);

        draft.contacts = vec![ContactMethod::new("TELEFONO", "812345678")];
        draft.schedules.clear();

        let result = gate.check_submittable(&draft, &staging());
        match result {
            Err(SubmitError::Invalid { step, .. }) => assert_eq!(step, WizardStep::AddressContact),
            other => panic!("expected invalid step, got {:?}", other),
        }
        assert_eq!(gate.current_step(), WizardStep::AddressContact);
        assert!(gate.step_error().unwrap().contains("step 2"));
    }

    #[test]
    fn test_missing_jurisdiction_blocks_submit() {
        let mut draft = valid_draft();
        draft.dre = " ".to_string();
        let mut gate = StepGate::new();
        gate.jump_to_step(WizardStep::Final);

        let result = gate.check_submittable(&draft, &staging());
        assert!(matches!(
            result,
            Err(SubmitError::Invalid { step: WizardStep::Final, .. })
        ));
        assert_eq!(gate.visible_error(Field::Dre), Some("DRE is required"));
    }

    #[tokio::test]
    async fn test_submit_commits_only_after_checks_pass() {
        let backend = MemoryBackend::new();
        let mut draft = valid_draft();
        backend.seed_institution(InstitutionRecord {
            id: "inst-1".to_string(),
            name: draft.name.clone(),
            institution_code: draft.institution_code.clone(),
            modular_code: draft.modular_code.clone(),
            logo_url: None,
            address: draft.address.clone(),
            contacts: draft.contacts.clone(),
            grading_level: draft.grading_level.clone(),
            classroom_type: draft.classroom_type.clone(),
            schedules: draft.schedules.clone(),
            director: None,
            ugel: draft.ugel.clone(),
            dre: draft.dre.clone(),
        });
        let mut staging = staging();
        let mut gate = StepGate::new();

        let early = gate.submit(&backend, &mut draft, &mut staging).await;
        assert!(matches!(early, Err(SubmitError::NotAtFinalStep(_))));
        assert!(backend.calls().is_empty());

        gate.jump_to_step(WizardStep::Final);
        let report = gate.submit(&backend, &mut draft, &mut staging).await.unwrap();
        assert!(!report.is_partial());
        assert_eq!(backend.calls().len(), 1);
    }
}
