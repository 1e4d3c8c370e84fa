pub mod classroom;
pub mod common;
pub mod diff_tracker;
pub mod draft;
pub mod institution;
pub mod report;

pub use classroom::*;
pub use common::*;
pub use diff_tracker::*;
pub use draft::*;
pub use institution::*;
pub use report::*;
