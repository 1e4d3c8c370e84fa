use uuid::Uuid;

pub type Id = String;

pub fn generate_id() -> Id {
    Uuid::new_v4().to_string()
}

/// Trim and report whether anything is left
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
