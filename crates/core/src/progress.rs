//! Progress ledger record - per-user per-course completion state.

use serde::{Deserialize, Serialize};
use crate::id::{CourseId, LessonId, ModuleId, UserId};
use crate::Time;

/// Completion state for one (user, course) pair.
///
/// At most one record exists per pair. A record is created lazily on the
/// first lesson completion (or legacy overwrite) and is never deleted by
/// any defined operation.
///
/// On the engine-maintained path, `progress_percentage` always equals
/// `round(100 * completed_lessons / total lessons in course)` and a module
/// id is present in `completed_modules` exactly when every one of its
/// lesson ids is in `completed_lessons`. The legacy overwrite path bypasses
/// both invariants on purpose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// The learner
    pub user_id: UserId,

    /// The course
    pub course_id: CourseId,

    /// Lesson ids the learner has completed
    pub completed_lessons: Vec<LessonId>,

    /// Module ids whose lessons are all completed (derived)
    pub completed_modules: Vec<ModuleId>,

    /// Percentage complete (0-100)
    pub progress_percentage: u8,

    /// Last time the learner touched this course
    pub last_accessed: Time,
}

impl ProgressRecord {
    /// Fresh record with nothing completed.
    pub fn new(user_id: UserId, course_id: CourseId) -> Self {
        Self {
            user_id,
            course_id,
            completed_lessons: Vec::new(),
            completed_modules: Vec::new(),
            progress_percentage: 0,
            last_accessed: chrono::Utc::now(),
        }
    }

    /// Whether the learner already completed the given lesson.
    pub fn is_lesson_completed(&self, lesson_id: LessonId) -> bool {
        self.completed_lessons.contains(&lesson_id)
    }

    /// Whether the given module is recorded as complete.
    pub fn is_module_completed(&self, module_id: ModuleId) -> bool {
        self.completed_modules.contains(&module_id)
    }
}
