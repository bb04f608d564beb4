//! In-memory backend

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{NewStudent, Student, StorageError, StudentStore};

/// Student store kept entirely in process memory
///
/// Mirrors [`SqliteStore`](crate::SqliteStore): ids start at 1, only ever
/// grow, and the email check runs before every insert. Lists come back in
/// ascending id order.
#[derive(Debug)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    students: BTreeMap<i64, Student>,
    next_id: i64,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        info!("Creating in-memory student store");
        Self {
            inner: Mutex::new(Inner {
                students: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Number of stored students
    pub async fn len(&self) -> usize {
        self.inner.lock().await.students.len()
    }

    /// Whether the store holds no students
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StudentStore for MemoryStore {
    async fn create_student(&self, payload: &NewStudent) -> Result<i64, StorageError> {
        let mut inner = self.inner.lock().await;

        if inner.students.values().any(|s| s.email == payload.email) {
            return Err(StorageError::DuplicateEmail(payload.email.clone()));
        }

        let id = inner.next_id;
        inner.next_id += 1;
        inner.students.insert(id, payload.clone().into_student(id));

        debug!("Inserted student with ID {}", id);
        Ok(id)
    }

    async fn get_student_by_id(&self, id: i64) -> Result<Student, StorageError> {
        self.inner
            .lock()
            .await
            .students
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound(id))
    }

    async fn get_student_list(&self) -> Result<Vec<Student>, StorageError> {
        Ok(self.inner.lock().await.students.values().cloned().collect())
    }

    async fn update_student(&self, payload: &NewStudent, id: i64) -> Result<u64, StorageError> {
        let mut inner = self.inner.lock().await;
        if !inner.students.contains_key(&id) {
            return Err(StorageError::NotFound(id));
        }

        if inner
            .students
            .values()
            .any(|s| s.id != id && s.email == payload.email)
        {
            return Err(StorageError::DuplicateEmail(payload.email.clone()));
        }

        let student = inner.students.get_mut(&id).ok_or(StorageError::NotFound(id))?;

        *student = payload.clone().into_student(id);
        Ok(1)
    }

    async fn delete_student(&self, id: i64) -> Result<u64, StorageError> {
        let mut inner = self.inner.lock().await;
        inner
            .students
            .remove(&id)
            .map(|_| 1)
            .ok_or(StorageError::NotFound(id))
    }
}
