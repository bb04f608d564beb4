//! Store capability trait

use async_trait::async_trait;

use crate::{NewStudent, Student, StorageError};

/// The five operations every student backend provides.
///
/// Handlers hold an `Arc<dyn StudentStore>`, so backends can be swapped
/// without touching the HTTP layer. No operation retries internally.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Insert a student after checking that its email is unused.
    /// Returns the generated id.
    ///
    /// The email check and the insert are not isolated from each other, so
    /// two concurrent creates with the same email can both succeed.
    async fn create_student(&self, payload: &NewStudent) -> Result<i64, StorageError>;

    /// Fetch exactly one student.
    async fn get_student_by_id(&self, id: i64) -> Result<Student, StorageError>;

    /// Fetch every student. An empty table yields an empty list.
    async fn get_student_list(&self) -> Result<Vec<Student>, StorageError>;

    /// Overwrite name, email and age of an existing student.
    /// Returns the number of rows written.
    async fn update_student(&self, payload: &NewStudent, id: i64) -> Result<u64, StorageError>;

    /// Remove an existing student. Returns the number of rows removed.
    async fn delete_student(&self, id: i64) -> Result<u64, StorageError>;
}
