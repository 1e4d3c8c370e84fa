use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::Id;

/// Canonical daily shift a schedule entry must fit inside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShiftType {
    Morning,
    Afternoon,
}

impl ShiftType {
    pub const ALL: [ShiftType; 2] = [ShiftType::Morning, ShiftType::Afternoon];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftType::Morning => "MORNING",
            ShiftType::Afternoon => "AFTERNOON",
        }
    }

    /// Bounds of the shift in minutes since midnight, as (start, end)
    pub fn window(&self) -> (u32, u32) {
        match self {
            ShiftType::Morning => (7 * 60, 13 * 60),
            ShiftType::Afternoon => (13 * 60, 18 * 60),
        }
    }

    /// Same bounds rendered as HH:MM, for messages
    pub fn window_label(&self) -> (&'static str, &'static str) {
        match self {
            ShiftType::Morning => ("07:00", "13:00"),
            ShiftType::Afternoon => ("13:00", "18:00"),
        }
    }
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShiftType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MORNING" => Ok(ShiftType::Morning),
            "AFTERNOON" => Ok(ShiftType::Afternoon),
            other => Err(format!("unknown shift type '{}'", other)),
        }
    }
}

/// Kinds of contact method the backend accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactType {
    Telefono,
    Celular,
    Whatsapp,
    Email,
    Web,
}

impl ContactType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactType::Telefono => "TELEFONO",
            ContactType::Celular => "CELULAR",
            ContactType::Whatsapp => "WHATSAPP",
            ContactType::Email => "EMAIL",
            ContactType::Web => "WEB",
        }
    }

    pub fn is_phone_like(&self) -> bool {
        matches!(
            self,
            ContactType::Telefono | ContactType::Celular | ContactType::Whatsapp
        )
    }
}

impl fmt::Display for ContactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContactType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TELEFONO" => Ok(ContactType::Telefono),
            "CELULAR" => Ok(ContactType::Celular),
            "WHATSAPP" => Ok(ContactType::Whatsapp),
            "EMAIL" => Ok(ContactType::Email),
            "WEB" => Ok(ContactType::Web),
            other => Err(format!("unknown contact type '{}'", other)),
        }
    }
}

/// A contact row as typed in the form. The type stays a raw string because
/// rows start out blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMethod {
    #[serde(rename = "type")]
    pub contact_type: String,
    pub value: String,
}

impl ContactMethod {
    pub fn new(contact_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            contact_type: contact_type.into(),
            value: value.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.contact_type.trim().is_empty() && self.value.trim().is_empty()
    }

    pub fn is_populated(&self) -> bool {
        !self.contact_type.trim().is_empty() && !self.value.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub department: String,
    pub province: String,
    pub district: String,
    #[serde(default)]
    pub postal_code: String,
}

/// One shift entry. Times are "HH:MM" strings, empty while unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub shift_type: Option<ShiftType>,
    pub entry_time: String,
    pub exit_time: String,
}

impl Schedule {
    pub fn new(shift_type: ShiftType, entry_time: &str, exit_time: &str) -> Self {
        Self {
            shift_type: Some(shift_type),
            entry_time: entry_time.to_string(),
            exit_time: exit_time.to_string(),
        }
    }

    /// Type, entry time and exit time are all present
    pub fn is_complete(&self) -> bool {
        self.shift_type.is_some()
            && !self.entry_time.trim().is_empty()
            && !self.exit_time.trim().is_empty()
    }
}

/// Snapshot of a director as shown in the wizard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorInfo {
    pub id: Id,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl DirectorInfo {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// Institution as returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstitutionRecord {
    pub id: Id,
    pub name: String,
    pub institution_code: String,
    pub modular_code: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    pub address: Address,
    #[serde(default)]
    pub contacts: Vec<ContactMethod>,
    pub grading_level: String,
    pub classroom_type: String,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
    #[serde(default)]
    pub director: Option<DirectorInfo>,
    pub ugel: String,
    pub dre: String,
}

/// Request body for the institution update call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstitutionUpdate {
    pub name: String,
    pub institution_code: String,
    pub modular_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub address: Address,
    pub contacts: Vec<ContactMethod>,
    pub grading_level: String,
    pub classroom_type: String,
    pub schedules: Vec<Schedule>,
    pub director_id: Option<Id>,
    pub ugel: String,
    pub dre: String,
}

pub const GRADING_LEVELS: &[&str] = &["INICIAL", "PRIMARIA", "SECUNDARIA"];

pub const CLASSROOM_TYPES: &[&str] = &["EDAD", "GRADO"];
