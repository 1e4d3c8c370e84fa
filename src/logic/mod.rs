pub mod committer;
pub mod director_staging;
pub mod field_validators;
pub mod schedule;
pub mod session;
pub mod step_gate;

pub use committer::*;
pub use director_staging::*;
pub use field_validators::{FieldError, FieldResult};
pub use schedule::*;
pub use session::*;
pub use step_gate::*;
