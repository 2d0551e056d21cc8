//! Storage trait abstraction.

use async_trait::async_trait;
use campus_core::{Course, CourseId, ProgressRecord, User, UserId};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Storage abstraction for campus data.
///
/// A generic document store: every operation addresses whole documents by
/// identifier. Progress records are keyed by the (user, course) pair and
/// `save_progress` is an upsert on that key. There is deliberately no
/// delete for progress records; no defined operation removes one.
#[async_trait]
pub trait Storage: Send + Sync {
    // === Course operations ===

    /// Save a course (create or update).
    async fn save_course(&mut self, course: &Course) -> Result<()>;

    /// Load a course by ID.
    async fn load_course(&self, id: CourseId) -> Result<Option<Course>>;

    /// List all courses.
    async fn list_courses(&self) -> Result<Vec<Course>>;

    /// Delete a course.
    async fn delete_course(&mut self, id: CourseId) -> Result<()>;

    // === User operations ===

    /// Save a user (create or update).
    async fn save_user(&mut self, user: &User) -> Result<()>;

    /// Load a user by ID.
    async fn load_user(&self, id: UserId) -> Result<Option<User>>;

    /// List all users.
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Delete a user.
    async fn delete_user(&mut self, id: UserId) -> Result<()>;

    // === Progress operations ===

    /// Upsert the progress record for its (user, course) pair.
    async fn save_progress(&mut self, record: &ProgressRecord) -> Result<()>;

    /// Load the progress record for a (user, course) pair.
    async fn load_progress(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<ProgressRecord>>;
}
