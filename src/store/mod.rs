pub mod feedback;
pub mod http;
pub mod memory;
pub mod traits;

pub use feedback::*;
pub use http::*;
pub use memory::*;
pub use traits::*;
