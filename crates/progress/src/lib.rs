//! Progress Engine
//!
//! Lesson completion bookkeeping, the legacy bulk-overwrite path, and the
//! sequential lesson-unlock gate.

#![warn(missing_docs)]

pub mod engine;
pub mod gate;

pub use engine::{ProgressTracker, LedgerTracker, ProgressError, completion_percentage};
pub use gate::{can_access_lesson, check_access, Locked};
