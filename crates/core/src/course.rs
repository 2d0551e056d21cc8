//! Course model - hierarchical catalog content.
//!
//! A course is an ordered sequence of modules, each an ordered sequence of
//! lessons. Order is fixed at creation time; there is no reordering
//! operation anywhere in the system.

use serde::{Deserialize, Serialize};
use crate::id::{CourseId, ModuleId, LessonId, UserId};
use crate::Time;

/// A purchasable curriculum composed of ordered modules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// Unique identifier
    pub id: CourseId,

    /// Course title
    pub title: String,

    /// Detailed description
    pub description: String,

    /// Course card logo (URL or path)
    pub image: String,

    /// Price
    pub price: f64,

    /// Duration label, e.g. "4 months"
    pub duration: String,

    /// Ordered modules
    pub modules: Vec<Module>,

    /// Admin account that created the course
    pub created_by: UserId,

    /// When created
    pub created_at: Time,
}

/// An ordered group of lessons within a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// Unique identifier
    pub id: ModuleId,

    /// Module title
    pub title: String,

    /// Ordered lessons
    pub lessons: Vec<Lesson>,
}

/// The atomic content unit a learner marks complete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    /// Unique identifier
    pub id: LessonId,

    /// Lesson title
    pub title: String,

    /// Duration in minutes
    pub duration_minutes: u32,

    /// Lesson payload, text or video
    #[serde(flatten)]
    pub content: LessonContent,
}

/// Lesson payload variants.
///
/// Video lessons carry a dedicated URL next to their descriptive content;
/// text lessons are the content alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LessonContent {
    /// Raw text lesson
    Text {
        /// The lesson body
        content: String,
    },
    /// Video lesson
    Video {
        /// Descriptive content shown alongside the player
        content: String,
        /// Where the video lives
        video_url: String,
    },
}

impl Course {
    /// Total lesson count across all modules.
    pub fn total_lessons(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }

    /// First module whose lesson set contains the given id, if any.
    pub fn module_containing(&self, lesson_id: LessonId) -> Option<&Module> {
        self.modules
            .iter()
            .find(|m| m.lessons.iter().any(|l| l.id == lesson_id))
    }

    /// Lesson at a (module, lesson) position, if the position exists.
    pub fn lesson_at(&self, module_index: usize, lesson_index: usize) -> Option<&Lesson> {
        self.modules.get(module_index)?.lessons.get(lesson_index)
    }
}

impl Module {
    /// Ids of every lesson in this module, in order.
    pub fn lesson_ids(&self) -> Vec<LessonId> {
        self.lessons.iter().map(|l| l.id).collect()
    }
}
