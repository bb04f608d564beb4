//! Storage Layer
//!
//! Single-table persistence for student records. Handlers talk to the
//! [`StudentStore`] trait; [`SqliteStore`] is the production backend and
//! [`MemoryStore`] an in-process double with the same semantics.

mod error;
mod memory;
mod model;
mod sqlite;
mod store;

pub use error::StorageError;
pub use memory::MemoryStore;
pub use model::{NewStudent, Student};
pub use sqlite::SqliteStore;
pub use store::StudentStore;

/// Driver error carried by [`StorageError::QueryError`] and [`StorageError::Database`]
pub use sqlx::Error as SqlxError;
