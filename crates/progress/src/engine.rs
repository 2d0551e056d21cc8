//! Progress ledger service.

use std::sync::Arc;

use async_trait::async_trait;
use campus_core::{CourseId, LessonId, ProgressRecord, UserId};
use campus_storage::{Storage, StorageError};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Errors from progress operations.
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    /// The referenced course does not exist
    #[error("Course not found: {0}")]
    CourseNotFound(CourseId),

    /// Underlying store failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Progress ledger service.
///
/// Each call is one unit of work: load state, compute, write, return.
/// Concurrent calls for the same (user, course) pair read-modify-write the
/// same record without a conditional update, so the last writer wins; that
/// race is an accepted part of the contract.
#[async_trait]
pub trait ProgressTracker: Send + Sync {
    /// Mark a lesson completed and return the updated record.
    ///
    /// Creates the record lazily if the pair has none. Re-completing an
    /// already-completed lesson is a no-op: the existing record is returned
    /// unchanged, with no timestamp bump and no store write.
    async fn complete_lesson(
        &self,
        user_id: UserId,
        course_id: CourseId,
        lesson_id: LessonId,
    ) -> Result<ProgressRecord, ProgressError>;

    /// Read the record for a (user, course) pair, if one exists.
    async fn get_progress(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<ProgressRecord>, ProgressError>;

    /// Overwrite completed lessons and percentage with caller-supplied
    /// values (legacy path).
    ///
    /// Kept for backward compatibility with the old bulk-update endpoint.
    /// Unlike [`complete_lesson`](Self::complete_lesson), this neither
    /// recomputes the percentage nor derives module completion, and it does
    /// not check that the course exists. Do not unify the two paths.
    async fn overwrite_progress(
        &self,
        user_id: UserId,
        course_id: CourseId,
        completed_lessons: Vec<LessonId>,
        percentage: u8,
    ) -> Result<ProgressRecord, ProgressError>;
}

/// Basic tracker over a storage backend.
pub struct LedgerTracker<S: Storage> {
    storage: Arc<Mutex<S>>,
}

impl<S: Storage> LedgerTracker<S> {
    /// Create a tracker owning its storage.
    pub fn new(storage: S) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
        }
    }

    /// Create a tracker over storage shared with other services.
    pub fn shared(storage: Arc<Mutex<S>>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl<S: Storage + 'static> ProgressTracker for LedgerTracker<S> {
    async fn complete_lesson(
        &self,
        user_id: UserId,
        course_id: CourseId,
        lesson_id: LessonId,
    ) -> Result<ProgressRecord, ProgressError> {
        let mut storage = self.storage.lock().await;

        let course = storage
            .load_course(course_id)
            .await?
            .ok_or(ProgressError::CourseNotFound(course_id))?;

        let mut record = storage
            .load_progress(user_id, course_id)
            .await?
            .unwrap_or_else(|| ProgressRecord::new(user_id, course_id));

        if record.is_lesson_completed(lesson_id) {
            return Ok(record);
        }

        record.completed_lessons.push(lesson_id);
        record.last_accessed = chrono::Utc::now();
        record.progress_percentage =
            completion_percentage(record.completed_lessons.len(), course.total_lessons());

        // Module completion is derived from course membership. A lesson id
        // the course does not contain stays in the completed set and counts
        // toward the percentage, but derives nothing.
        match course.module_containing(lesson_id) {
            Some(module) => {
                let all_done = module
                    .lessons
                    .iter()
                    .all(|l| record.is_lesson_completed(l.id));
                if all_done && !record.is_module_completed(module.id) {
                    record.completed_modules.push(module.id);
                    debug!(user = %user_id, module = %module.id, "module completed");
                }
            }
            None => {
                warn!(user = %user_id, course = %course_id, lesson = %lesson_id,
                    "completed lesson id not present in course");
            }
        }

        storage.save_progress(&record).await?;
        debug!(user = %user_id, course = %course_id, lesson = %lesson_id,
            percentage = record.progress_percentage, "lesson completed");
        Ok(record)
    }

    async fn get_progress(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<ProgressRecord>, ProgressError> {
        let storage = self.storage.lock().await;
        Ok(storage.load_progress(user_id, course_id).await?)
    }

    async fn overwrite_progress(
        &self,
        user_id: UserId,
        course_id: CourseId,
        completed_lessons: Vec<LessonId>,
        percentage: u8,
    ) -> Result<ProgressRecord, ProgressError> {
        let mut storage = self.storage.lock().await;

        let mut record = storage
            .load_progress(user_id, course_id)
            .await?
            .unwrap_or_else(|| ProgressRecord::new(user_id, course_id));

        record.completed_lessons = completed_lessons;
        record.progress_percentage = percentage;
        record.last_accessed = chrono::Utc::now();

        storage.save_progress(&record).await?;
        debug!(user = %user_id, course = %course_id, "progress overwritten (legacy)");
        Ok(record)
    }
}

/// Percentage of completed lessons, rounded to the nearest integer.
///
/// A course with zero lessons yields 0 rather than a division error.
pub fn completion_percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use campus_core::{Course, Lesson, LessonContent, Module, ModuleId, User};
    use campus_storage::Storage;
    use chrono::Utc;

    /// In-memory storage that counts progress writes, so tests can observe
    /// which operations actually hit the store.
    #[derive(Default)]
    struct MemoryStorage {
        courses: HashMap<CourseId, Course>,
        users: HashMap<UserId, User>,
        progress: HashMap<(UserId, CourseId), ProgressRecord>,
        progress_writes: usize,
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
            self.progress_writes += 1;
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

    fn lesson(title: &str) -> Lesson {
        Lesson {
            id: LessonId::new(),
            title: title.to_string(),
            duration_minutes: 10,
            content: LessonContent::Text {
                content: "body".to_string(),
            },
        }
    }

    /// Two modules of two lessons each: [[L1, L2], [L3, L4]].
    fn two_by_two() -> Course {
        Course {
            id: CourseId::new(),
            title: "Rust from Zero".to_string(),
            description: "A course".to_string(),
            image: "logo.png".to_string(),
            price: 49.0,
            duration: "4 months".to_string(),
            modules: vec![
                Module {
                    id: ModuleId::new(),
                    title: "Module A".to_string(),
                    lessons: vec![lesson("L1"), lesson("L2")],
                },
                Module {
                    id: ModuleId::new(),
                    title: "Module B".to_string(),
                    lessons: vec![lesson("L3"), lesson("L4")],
                },
            ],
            created_by: UserId::new(),
            created_at: Utc::now(),
        }
    }

    fn tracker_with(course: &Course) -> (LedgerTracker<MemoryStorage>, Arc<Mutex<MemoryStorage>>) {
        let mut storage = MemoryStorage::default();
        storage.courses.insert(course.id, course.clone());
        let shared = Arc::new(Mutex::new(storage));
        (LedgerTracker::shared(shared.clone()), shared)
    }

    #[tokio::test]
    async fn scenario_two_modules_two_lessons() {
        let course = two_by_two();
        let user = UserId::new();
        let (tracker, _) = tracker_with(&course);

        let module_a = course.modules[0].id;
        let module_b = course.modules[1].id;
        let l1 = course.modules[0].lessons[0].id;
        let l2 = course.modules[0].lessons[1].id;
        let l3 = course.modules[1].lessons[0].id;
        let l4 = course.modules[1].lessons[1].id;

        let record = tracker.complete_lesson(user, course.id, l1).await.unwrap();
        assert_eq!(record.progress_percentage, 25);
        assert!(record.completed_modules.is_empty());

        let record = tracker.complete_lesson(user, course.id, l2).await.unwrap();
        assert_eq!(record.progress_percentage, 50);
        assert_eq!(record.completed_modules, vec![module_a]);

        // Module A complete unlocks (1, 0)
        assert!(crate::gate::can_access_lesson(&course, Some(&record), 1, 0));
        // (1, 1) still locked behind L3
        assert!(!crate::gate::can_access_lesson(&course, Some(&record), 1, 1));

        let record = tracker.complete_lesson(user, course.id, l3).await.unwrap();
        assert_eq!(record.progress_percentage, 75);
        assert!(crate::gate::can_access_lesson(&course, Some(&record), 1, 1));

        let record = tracker.complete_lesson(user, course.id, l4).await.unwrap();
        assert_eq!(record.progress_percentage, 100);
        assert_eq!(record.completed_modules, vec![module_a, module_b]);
    }

    #[tokio::test]
    async fn repeat_completion_is_idempotent() {
        let course = two_by_two();
        let user = UserId::new();
        let (tracker, storage) = tracker_with(&course);
        let l1 = course.modules[0].lessons[0].id;

        let first = tracker.complete_lesson(user, course.id, l1).await.unwrap();
        let writes_after_first = storage.lock().await.progress_writes;

        let second = tracker.complete_lesson(user, course.id, l1).await.unwrap();

        // Identical record, including the timestamp, and no second write.
        assert_eq!(second, first);
        assert_eq!(storage.lock().await.progress_writes, writes_after_first);
    }

    #[tokio::test]
    async fn zero_lesson_course_yields_zero_percent() {
        let mut course = two_by_two();
        course.modules.clear();
        let user = UserId::new();
        let (tracker, _) = tracker_with(&course);

        let record = tracker
            .complete_lesson(user, course.id, LessonId::new())
            .await
            .unwrap();
        assert_eq!(record.progress_percentage, 0);
    }

    #[tokio::test]
    async fn ghost_lesson_id_is_accepted_without_module_derivation() {
        let course = two_by_two();
        let user = UserId::new();
        let (tracker, _) = tracker_with(&course);

        let ghost = LessonId::new();
        let record = tracker.complete_lesson(user, course.id, ghost).await.unwrap();

        assert!(record.completed_lessons.contains(&ghost));
        assert!(record.completed_modules.is_empty());
        // Still counts toward the percentage: 1 of 4
        assert_eq!(record.progress_percentage, 25);
    }

    #[tokio::test]
    async fn module_completion_matches_lessons_both_directions() {
        let course = two_by_two();
        let user = UserId::new();
        let (tracker, _) = tracker_with(&course);

        // Complete module B's lessons first, out of order across modules.
        let l3 = course.modules[1].lessons[0].id;
        let l4 = course.modules[1].lessons[1].id;
        let l1 = course.modules[0].lessons[0].id;
        let l2 = course.modules[0].lessons[1].id;

        tracker.complete_lesson(user, course.id, l4).await.unwrap();
        let record = tracker.complete_lesson(user, course.id, l3).await.unwrap();
        assert_eq!(record.completed_modules, vec![course.modules[1].id]);

        tracker.complete_lesson(user, course.id, l1).await.unwrap();
        let record = tracker.complete_lesson(user, course.id, l2).await.unwrap();

        // A module is recorded complete iff all of its lessons are.
        for module in &course.modules {
            let all_lessons_done = module
                .lessons
                .iter()
                .all(|l| record.is_lesson_completed(l.id));
            assert_eq!(record.is_module_completed(module.id), all_lessons_done);
        }
    }

    #[tokio::test]
    async fn partial_module_is_not_recorded_complete() {
        let course = two_by_two();
        let user = UserId::new();
        let (tracker, _) = tracker_with(&course);

        let l1 = course.modules[0].lessons[0].id;
        let record = tracker.complete_lesson(user, course.id, l1).await.unwrap();
        assert!(!record.is_module_completed(course.modules[0].id));
    }

    #[tokio::test]
    async fn record_created_lazily_on_first_completion() {
        let course = two_by_two();
        let user = UserId::new();
        let (tracker, _) = tracker_with(&course);

        assert!(tracker.get_progress(user, course.id).await.unwrap().is_none());

        let l1 = course.modules[0].lessons[0].id;
        tracker.complete_lesson(user, course.id, l1).await.unwrap();

        let stored = tracker.get_progress(user, course.id).await.unwrap().unwrap();
        assert_eq!(stored.completed_lessons, vec![l1]);
    }

    #[tokio::test]
    async fn missing_course_is_an_error() {
        let (tracker, _) = tracker_with(&two_by_two());
        let result = tracker
            .complete_lesson(UserId::new(), CourseId::new(), LessonId::new())
            .await;
        assert!(matches!(result, Err(ProgressError::CourseNotFound(_))));
    }

    #[tokio::test]
    async fn overwrite_does_not_derive_modules() {
        let course = two_by_two();
        let user = UserId::new();
        let (tracker, _) = tracker_with(&course);

        // Every lesson of module A supplied, yet no module may be derived.
        let l1 = course.modules[0].lessons[0].id;
        let l2 = course.modules[0].lessons[1].id;
        let record = tracker
            .overwrite_progress(user, course.id, vec![l1, l2], 37)
            .await
            .unwrap();

        assert_eq!(record.completed_lessons, vec![l1, l2]);
        assert_eq!(record.progress_percentage, 37);
        assert!(record.completed_modules.is_empty());
    }

    #[tokio::test]
    async fn overwrite_keeps_existing_module_completions() {
        let course = two_by_two();
        let user = UserId::new();
        let (tracker, _) = tracker_with(&course);

        let l1 = course.modules[0].lessons[0].id;
        let l2 = course.modules[0].lessons[1].id;
        tracker.complete_lesson(user, course.id, l1).await.unwrap();
        let engine_record = tracker.complete_lesson(user, course.id, l2).await.unwrap();
        assert_eq!(engine_record.completed_modules, vec![course.modules[0].id]);

        // Legacy overwrite shrinks the lesson set but leaves the stale
        // module list alone; that divergence is the contract.
        let record = tracker
            .overwrite_progress(user, course.id, vec![l1], 25)
            .await
            .unwrap();
        assert_eq!(record.completed_lessons, vec![l1]);
        assert_eq!(record.completed_modules, vec![course.modules[0].id]);
    }

    #[tokio::test]
    async fn overwrite_creates_record_without_course_check() {
        let (tracker, _) = tracker_with(&two_by_two());

        // Course id that the store has never seen; the legacy path does not
        // look at the catalog at all.
        let user = UserId::new();
        let orphan_course = CourseId::new();
        let record = tracker
            .overwrite_progress(user, orphan_course, Vec::new(), 80)
            .await
            .unwrap();
        assert_eq!(record.progress_percentage, 80);

        let stored = tracker.get_progress(user, orphan_course).await.unwrap();
        assert!(stored.is_some());
    }

    #[test]
    fn percentage_rounds_like_the_wire_format() {
        assert_eq!(completion_percentage(0, 0), 0);
        assert_eq!(completion_percentage(3, 0), 0);
        assert_eq!(completion_percentage(1, 3), 33);
        assert_eq!(completion_percentage(2, 3), 67);
        assert_eq!(completion_percentage(1, 8), 13);
        assert_eq!(completion_percentage(4, 4), 100);
    }
}
