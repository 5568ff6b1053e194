pub mod id;
pub mod types;

pub use id::LeadIdFormat;
pub use types::*;
