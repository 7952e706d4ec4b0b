//! Common types, protocol definitions, and errors shared across the es3 crates.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
