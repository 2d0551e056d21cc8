//! Sequential lesson-unlock gate.
//!
//! Pure functions over the course structure and the current ledger state.
//! Access is recomputed on every call and never persisted; a stale cached
//! answer would let a learner skip ahead or lock them out of unlocked
//! content.

use campus_core::{Course, LessonId, ModuleId, ProgressRecord};
use serde::Serialize;

/// Why a lesson position is not currently accessible.
///
/// Serializable so callers can hand the reason straight to a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Locked {
    /// The immediately preceding module is not complete
    ModuleIncomplete(ModuleId),
    /// The immediately preceding lesson in the same module is not complete
    LessonIncomplete(LessonId),
    /// The (module, lesson) position does not exist in this course
    OutOfBounds,
}

/// Evaluate the unlock rule for a (module, lesson) position.
///
/// - the very first lesson (0, 0) is always accessible;
/// - a lesson in module m > 0 requires module m-1 in the completed set
///   (only the immediately preceding module is consulted);
/// - lesson n > 0 within a module requires lesson n-1 of that module in
///   the completed set.
///
/// `record` is `None` for a learner with no ledger yet; only (0, 0) is
/// accessible then.
pub fn check_access(
    course: &Course,
    record: Option<&ProgressRecord>,
    module_index: usize,
    lesson_index: usize,
) -> Result<(), Locked> {
    let module = course.modules.get(module_index).ok_or(Locked::OutOfBounds)?;
    if lesson_index >= module.lessons.len() {
        return Err(Locked::OutOfBounds);
    }

    if module_index == 0 && lesson_index == 0 {
        return Ok(());
    }

    if module_index > 0 {
        let previous = &course.modules[module_index - 1];
        if !record.is_some_and(|r| r.is_module_completed(previous.id)) {
            return Err(Locked::ModuleIncomplete(previous.id));
        }
    }

    if lesson_index > 0 {
        let previous = &module.lessons[lesson_index - 1];
        if !record.is_some_and(|r| r.is_lesson_completed(previous.id)) {
            return Err(Locked::LessonIncomplete(previous.id));
        }
    }

    Ok(())
}

/// Boolean form of [`check_access`].
pub fn can_access_lesson(
    course: &Course,
    record: Option<&ProgressRecord>,
    module_index: usize,
    lesson_index: usize,
) -> bool {
    check_access(course, record, module_index, lesson_index).is_ok()
}
