//! Common types used across the application.

pub mod envelope;
pub mod pagination;

pub use envelope::{ApiResponse, ObjectRef};
pub use pagination::PageRequest;
