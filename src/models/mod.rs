//! Response models returned by the lookup client.

pub mod batch;
pub mod details;

// Re-export commonly used types
pub use batch::{BatchEntry, BatchResponse};
pub use details::{Details, LookupResult, COUNTRY_FLAGS_URL};
