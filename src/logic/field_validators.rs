//! Single-field validation rules shared by the create and edit wizards.
//!
//! Every function is pure: it looks at one value (or one contact row, or the
//! contact list as a whole) and returns `Ok(())` or the message to show next
//! to the field.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use url::Url;

use crate::model::{is_blank, ContactMethod, ContactType};

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static WEBSITE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://)?(www\.)?[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)+(/\S*)?$")
        .expect("valid website regex")
});

pub const INSTITUTION_NAME_MIN: usize = 5;
pub const INSTITUTION_CODE_DIGITS: usize = 8;
pub const MODULAR_CODE_DIGITS: usize = 7;
pub const PHONE_DIGITS: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },
    #[error("{0} may only contain letters and spaces")]
    LettersOnly(&'static str),
    #[error("{field} must be exactly {digits} digits")]
    ExactDigits { field: &'static str, digits: usize },
    #[error("{0} may only contain digits")]
    DigitsOnly(&'static str),
    #[error("Logo must be a valid URL")]
    InvalidUrl,
    #[error("Phone number must have 9 digits and start with 9")]
    InvalidPhone,
    #[error("Enter a valid email address")]
    InvalidEmail,
    #[error("Enter a valid website")]
    InvalidWebsite,
    #[error("Unsupported contact type '{0}'")]
    UnknownContactType(String),
    #[error("At least one contact with type and value is required")]
    NoContact,
    #[error("{field} must be one of: {allowed}")]
    NotAllowed { field: &'static str, allowed: String },
}

pub type FieldResult = Result<(), FieldError>;

fn required(field: &'static str, value: &str) -> FieldResult {
    if is_blank(value) {
        Err(FieldError::Required(field))
    } else {
        Ok(())
    }
}

fn exact_digits(field: &'static str, value: &str, digits: usize) -> FieldResult {
    let value = value.trim();
    required(field, value)?;
    if value.len() == digits && value.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(FieldError::ExactDigits { field, digits })
    }
}

pub fn institution_name(value: &str) -> FieldResult {
    required("Institution name", value)?;
    if value.trim().chars().count() < INSTITUTION_NAME_MIN {
        return Err(FieldError::TooShort {
            field: "Institution name",
            min: INSTITUTION_NAME_MIN,
        });
    }
    Ok(())
}

/// Department, province and district names
pub fn region_name(field: &'static str, value: &str) -> FieldResult {
    required(field, value)?;
    if value
        .trim()
        .chars()
        .all(|c| c.is_alphabetic() || c == ' ')
    {
        Ok(())
    } else {
        Err(FieldError::LettersOnly(field))
    }
}

pub fn institution_code(value: &str) -> FieldResult {
    exact_digits("Institution code", value, INSTITUTION_CODE_DIGITS)
}

pub fn modular_code(value: &str) -> FieldResult {
    exact_digits("Modular code", value, MODULAR_CODE_DIGITS)
}

pub fn postal_code(value: &str) -> FieldResult {
    let value = value.trim();
    if value.is_empty() || value.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(FieldError::DigitsOnly("Postal code"))
    }
}

pub fn street(value: &str) -> FieldResult {
    required("Address", value)
}

/// Logo URL. Optional; when present it must parse as an absolute URL or at
/// least look like the start of one.
pub fn logo_url(value: &str) -> FieldResult {
    let value = value.trim();
    if value.is_empty() || Url::parse(value).is_ok() {
        return Ok(());
    }

    let permissive = value.starts_with("http://")
        || value.starts_with("https://")
        || value.starts_with("www.")
        || value
            .chars()
            .next()
            .map(|c| c.is_ascii_alphanumeric())
            .unwrap_or(false);

    if permissive {
        Ok(())
    } else {
        Err(FieldError::InvalidUrl)
    }
}

/// Strip spaces and hyphens, then require 9 digits starting with 9
pub fn phone(value: &str) -> FieldResult {
    let digits: String = value
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect();

    if digits.len() == PHONE_DIGITS
        && digits.starts_with('9')
        && digits.chars().all(|c| c.is_ascii_digit())
    {
        Ok(())
    } else {
        Err(FieldError::InvalidPhone)
    }
}

pub fn email(value: &str) -> FieldResult {
    if EMAIL_REGEX.is_match(value.trim()) {
        Ok(())
    } else {
        Err(FieldError::InvalidEmail)
    }
}

pub fn website(value: &str) -> FieldResult {
    if WEBSITE_REGEX.is_match(value.trim()) {
        Ok(())
    } else {
        Err(FieldError::InvalidWebsite)
    }
}

/// Value of a contact, checked against the rule for its type
pub fn contact_value(contact_type: ContactType, value: &str) -> FieldResult {
    required("Contact value", value)?;
    if contact_type.is_phone_like() {
        phone(value)
    } else if contact_type == ContactType::Email {
        email(value)
    } else {
        website(value)
    }
}

/// A single contact row. A fully blank row is ignored here; the list-level
/// rule decides whether anything was entered at all.
pub fn contact(contact: &ContactMethod) -> FieldResult {
    if contact.is_empty() {
        return Ok(());
    }
    required("Contact type", &contact.contact_type)?;
    let contact_type: ContactType = contact
        .contact_type
        .parse()
        .map_err(|_| FieldError::UnknownContactType(contact.contact_type.trim().to_string()))?;
    contact_value(contact_type, &contact.value)
}

pub fn at_least_one_contact(contacts: &[ContactMethod]) -> FieldResult {
    if contacts.iter().any(ContactMethod::is_populated) {
        Ok(())
    } else {
        Err(FieldError::NoContact)
    }
}

fn one_of(field: &'static str, value: &str, allowed: &[&str]) -> FieldResult {
    required(field, value)?;
    if allowed.contains(&value.trim()) {
        Ok(())
    } else {
        Err(FieldError::NotAllowed {
            field,
            allowed: allowed.join(", "),
        })
    }
}

pub fn grading_level(value: &str) -> FieldResult {
    one_of("Grading level", value, crate::model::GRADING_LEVELS)
}

pub fn classroom_type(value: &str) -> FieldResult {
    one_of("Classroom type", value, crate::model::CLASSROOM_TYPES)
}

/// UGEL and DRE codes
pub fn jurisdiction(field: &'static str, value: &str) -> FieldResult {
    required(field, value)
}

/// Optional director contact details; only the shape is checked
pub fn director_email(value: Option<&str>) -> FieldResult {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => email(v),
        _ => Ok(()),
    }
}

pub fn director_phone(value: Option<&str>) -> FieldResult {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => phone(v),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_institution_name() {
        assert_eq!(institution_name(""), Err(FieldError::Required("Institution name")));
        assert!(matches!(institution_name("IEP"), Err(FieldError::TooShort { .. })));
        assert!(institution_name("Colegio").is_ok());
        // counted in characters, not bytes
        assert!(institution_name("Niñez").is_ok());
    }

    #[test]
    fn test_region_names_letters_only() {
        assert!(region_name("Department", "San Martín").is_ok());
        assert_eq!(
            region_name("District", "Lima 1"),
            Err(FieldError::LettersOnly("District"))
        );
        assert_eq!(region_name("Province", "  "), Err(FieldError::Required("Province")));
    }

    #[test]
    fn test_codes() {
        assert!(institution_code("12345678").is_ok());
        assert!(institution_code("1234567").is_err());
        assert!(institution_code("1234567a").is_err());
        assert!(modular_code("1234567").is_ok());
        assert_eq!(
            modular_code("123456"),
            Err(FieldError::ExactDigits {
                field: "Modular code",
                digits: 7
            })
        );
    }

    #[test]
    fn test_postal_code_optional() {
        assert!(postal_code("").is_ok());
        assert!(postal_code("15001").is_ok());
        assert!(postal_code("LIMA01").is_err());
    }

    #[test]
    fn test_logo_url_permissive_fallback() {
        assert!(logo_url("").is_ok());
        assert!(logo_url("https://cdn.colegio.pe/logo.png").is_ok());
        assert!(logo_url("www.colegio.pe/logo.png").is_ok());
        assert!(logo_url("colegio.pe/logo.png").is_ok());
        assert_eq!(logo_url("/static/logo.png"), Err(FieldError::InvalidUrl));
        assert_eq!(logo_url("::logo"), Err(FieldError::InvalidUrl));
    }

    #[test]
    fn test_phone_contacts() {
        assert_eq!(
            contact(&ContactMethod::new("TELEFONO", "812345678")),
            Err(FieldError::InvalidPhone)
        );
        assert!(contact(&ContactMethod::new("TELEFONO", "912345678")).is_ok());
        assert!(contact(&ContactMethod::new("WHATSAPP", "912 345-678")).is_ok());
        assert!(contact(&ContactMethod::new("CELULAR", "91234567")).is_err());
    }

    #[test]
    fn test_email_and_website_contacts() {
        assert!(contact(&ContactMethod::new("EMAIL", "direccion@colegio.edu.pe")).is_ok());
        assert_eq!(
            contact(&ContactMethod::new("EMAIL", "direccion@colegio")),
            Err(FieldError::InvalidEmail)
        );
        assert!(contact(&ContactMethod::new("WEB", "https://www.colegio.pe")).is_ok());
        assert!(contact(&ContactMethod::new("WEB", "colegio")).is_err());
    }

    #[test]
    fn test_contact_row_requires_both_parts() {
        assert!(contact(&ContactMethod::default()).is_ok());
        assert_eq!(
            contact(&ContactMethod::new("EMAIL", "")),
            Err(FieldError::Required("Contact value"))
        );
        assert_eq!(
            contact(&ContactMethod::new("", "912345678")),
            Err(FieldError::Required("Contact type"))
        );
        assert!(matches!(
            contact(&ContactMethod::new("FAX", "12345")),
            Err(FieldError::UnknownContactType(_))
        ));
    }

    #[test]
    fn test_at_least_one_contact() {
        assert!(at_least_one_contact(&[ContactMethod::new("EMAIL", "info@colegio.pe")]).is_ok());
        assert_eq!(at_least_one_contact(&[]), Err(FieldError::NoContact));
        assert_eq!(
            at_least_one_contact(&[ContactMethod::new("EMAIL", "")]),
            Err(FieldError::NoContact)
        );
    }
}
