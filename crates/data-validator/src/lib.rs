//! Student Payload Validation
//!
//! Turns a decoded request body into a [`storage::NewStudent`], reporting
//! every field that violates its constraints.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{StudentPayload, ValidationConfig, Validator};
