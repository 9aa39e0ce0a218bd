//! Student directory: record types, validation, id generation, and the in-memory store.

pub mod ids;
pub mod seed;
mod service;
pub mod types;
pub mod validate;

pub use ids::{IdGenerator, SequentialIds, UuidGenerator};
pub use service::{CreatePolicy, DirectoryApi, StudentDirectory};
pub use types::{DirectoryError, FieldViolation, NewStudent, Student, StudentPatch};
