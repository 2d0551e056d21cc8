//! Enrollment service.

use std::sync::Arc;

use async_trait::async_trait;
use campus_core::{Course, CourseId, User, UserId};
use campus_storage::{Storage, StorageError};
use tokio::sync::Mutex;
use tracing::debug;

/// Errors from enrollment operations.
#[derive(Debug, thiserror::Error)]
pub enum EnrollmentError {
    /// The referenced user does not exist
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// The referenced course does not exist
    #[error("Course not found: {0}")]
    CourseNotFound(CourseId),

    /// The caller lacks the admin role
    #[error("Access denied")]
    AccessDenied,

    /// Underlying store failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Enrollment service.
#[async_trait]
pub trait EnrollmentRegistry: Send + Sync {
    /// Enroll a user in a course and return the updated user.
    ///
    /// Enrolling in a course the user is already enrolled in is a no-op:
    /// the user is returned unchanged and no store write is issued. Both
    /// the user and the course must exist.
    async fn enroll(&self, user_id: UserId, course_id: CourseId)
        -> Result<User, EnrollmentError>;

    /// Resolve the user's enrolled course ids against the catalog.
    ///
    /// Ids whose course has since been deleted are skipped.
    async fn enrolled_courses(&self, user_id: UserId) -> Result<Vec<Course>, EnrollmentError>;
}

/// Basic registry over a storage backend.
pub struct BasicEnrollmentRegistry<S: Storage> {
    storage: Arc<Mutex<S>>,
}

impl<S: Storage> BasicEnrollmentRegistry<S> {
    /// Create a registry owning its storage.
    pub fn new(storage: S) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
        }
    }

    /// Create a registry over storage shared with other services.
    pub fn shared(storage: Arc<Mutex<S>>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl<S: Storage + 'static> EnrollmentRegistry for BasicEnrollmentRegistry<S> {
    async fn enroll(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<User, EnrollmentError> {
        let mut storage = self.storage.lock().await;

        let mut user = storage
            .load_user(user_id)
            .await?
            .ok_or(EnrollmentError::UserNotFound(user_id))?;

        if storage.load_course(course_id).await?.is_none() {
            return Err(EnrollmentError::CourseNotFound(course_id));
        }

        if user.is_enrolled(course_id) {
            return Ok(user);
        }

        user.enrolled_courses.push(course_id);
        storage.save_user(&user).await?;
        debug!(user = %user_id, course = %course_id, "enrolled");
        Ok(user)
    }

    async fn enrolled_courses(&self, user_id: UserId) -> Result<Vec<Course>, EnrollmentError> {
        let storage = self.storage.lock().await;

        let user = storage
            .load_user(user_id)
            .await?
            .ok_or(EnrollmentError::UserNotFound(user_id))?;

        let mut courses = Vec::new();
        for course_id in &user.enrolled_courses {
            if let Some(course) = storage.load_course(*course_id).await? {
                courses.push(course);
            }
        }
        Ok(courses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use campus_core::{Course, ProgressRecord};
    use chrono::Utc;

    #[derive(Default)]
    struct MemoryStorage {
        courses: HashMap<CourseId, Course>,
        users: HashMap<UserId, User>,
        progress: HashMap<(UserId, CourseId), ProgressRecord>,
        user_writes: usize,
    }

    #[async_trait]
    impl Storage for MemoryStorage {
        async fn save_course(&mut self, course: &Course) -> campus_storage::Result<()> {
            self.courses.insert(course.id, course.clone());
            Ok(())
        }
        async fn load_course(&self, id: CourseId) -> campus_storage::Result<Option<Course>> {
            Ok(self.courses.get(&id).cloned())
        }
        async fn list_courses(&self) -> campus_storage::Result<Vec<Course>> {
            Ok(self.courses.values().cloned().collect())
        }
        async fn delete_course(&mut self, id: CourseId) -> campus_storage::Result<()> {
            self.courses.remove(&id);
            Ok(())
        }
        async fn save_user(&mut self, user: &User) -> campus_storage::Result<()> {
            self.user_writes += 1;
            self.users.insert(user.id, user.clone());
            Ok(())
        }
        async fn load_user(&self, id: UserId) -> campus_storage::Result<Option<User>> {
            Ok(self.users.get(&id).cloned())
        }
        async fn list_users(&self) -> campus_storage::Result<Vec<User>> {
            Ok(self.users.values().cloned().collect())
        }
        async fn delete_user(&mut self, id: UserId) -> campus_storage::Result<()> {
            self.users.remove(&id);
            Ok(())
        }
        async fn save_progress(&mut self, record: &ProgressRecord) -> campus_storage::Result<()> {
            self.progress
                .insert((record.user_id, record.course_id), record.clone());
            Ok(())
        }
        async fn load_progress(
            &self,
            user_id: UserId,
            course_id: CourseId,
        ) -> campus_storage::Result<Option<ProgressRecord>> {
            Ok(self.progress.get(&(user_id, course_id)).cloned())
        }
    }

    fn sample_course() -> Course {
        Course {
            id: CourseId::new(),
            title: "Networks".to_string(),
            description: "d".to_string(),
            image: "n.png".to_string(),
            price: 10.0,
            duration: "2 months".to_string(),
            modules: Vec::new(),
            created_by: UserId::new(),
            created_at: Utc::now(),
        }
    }

    fn setup() -> (
        BasicEnrollmentRegistry<MemoryStorage>,
        Arc<Mutex<MemoryStorage>>,
        User,
        Course,
    ) {
        let mut storage = MemoryStorage::default();
        let user = User::new("Lin", "lin@example.com");
        let course = sample_course();
        storage.users.insert(user.id, user.clone());
        storage.courses.insert(course.id, course.clone());
        let shared = Arc::new(Mutex::new(storage));
        (
            BasicEnrollmentRegistry::shared(shared.clone()),
            shared,
            user,
            course,
        )
    }

    #[tokio::test]
    async fn enroll_adds_course_once() {
        let (registry, storage, user, course) = setup();

        let updated = registry.enroll(user.id, course.id).await.unwrap();
        assert_eq!(updated.enrolled_courses, vec![course.id]);
        let writes_after_first = storage.lock().await.user_writes;

        // Second enroll: unchanged set, no extra write.
        let updated = registry.enroll(user.id, course.id).await.unwrap();
        assert_eq!(updated.enrolled_courses, vec![course.id]);
        assert_eq!(storage.lock().await.user_writes, writes_after_first);
    }

    #[tokio::test]
    async fn enroll_requires_existing_user_and_course() {
        let (registry, _, user, course) = setup();

        let result = registry.enroll(UserId::new(), course.id).await;
        assert!(matches!(result, Err(EnrollmentError::UserNotFound(_))));

        let result = registry.enroll(user.id, CourseId::new()).await;
        assert!(matches!(result, Err(EnrollmentError::CourseNotFound(_))));
    }

    #[tokio::test]
    async fn enrolled_courses_skips_deleted_ones() {
        let (registry, storage, user, course) = setup();
        registry.enroll(user.id, course.id).await.unwrap();

        let courses = registry.enrolled_courses(user.id).await.unwrap();
        assert_eq!(courses.len(), 1);

        storage.lock().await.courses.remove(&course.id);
        let courses = registry.enrolled_courses(user.id).await.unwrap();
        assert!(courses.is_empty());
    }
}
