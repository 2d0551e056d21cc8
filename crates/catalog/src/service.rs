//! Catalog management service.

use std::sync::Arc;

use async_trait::async_trait;
use campus_core::{
    Course, CourseId, Lesson, LessonContent, LessonId, Module, ModuleId, Session,
};
use campus_storage::{Storage, StorageError};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::info;

/// Errors from catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
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

/// Specification for creating a course.
///
/// Ids are generated at creation time; module and lesson order is the order
/// given here and is never changed afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCourse {
    /// Course title
    pub title: String,
    /// Detailed description
    pub description: String,
    /// Course card logo
    pub image: String,
    /// Price
    pub price: f64,
    /// Duration label, e.g. "4 months"
    pub duration: String,
    /// Ordered module specs
    pub modules: Vec<NewModule>,
}

/// Specification for a module within a new course.
#[derive(Debug, Clone, Deserialize)]
pub struct NewModule {
    /// Module title
    pub title: String,
    /// Ordered lesson specs
    pub lessons: Vec<NewLesson>,
}

/// Specification for a lesson within a new module.
#[derive(Debug, Clone, Deserialize)]
pub struct NewLesson {
    /// Lesson title
    pub title: String,
    /// Duration in minutes
    pub duration_minutes: u32,
    /// Lesson payload
    #[serde(flatten)]
    pub content: LessonContent,
}

/// Catalog management service.
#[async_trait]
pub trait CourseCatalog: Send + Sync {
    /// List every course. Public.
    async fn list_courses(&self) -> Result<Vec<Course>, CatalogError>;

    /// Load one course. Public.
    async fn get_course(&self, id: CourseId) -> Result<Course, CatalogError>;

    /// Create a course from a spec. Admin only.
    async fn create_course(
        &self,
        session: &Session,
        spec: NewCourse,
    ) -> Result<Course, CatalogError>;

    /// Replace an existing course document. Admin only.
    async fn update_course(
        &self,
        session: &Session,
        course: Course,
    ) -> Result<Course, CatalogError>;

    /// Delete a course. Admin only.
    ///
    /// Progress records and enrollment sets referencing the course are left
    /// in place; dangling ids are skipped when enrollments are resolved.
    async fn delete_course(&self, session: &Session, id: CourseId) -> Result<(), CatalogError>;
}

/// Basic catalog over a storage backend.
pub struct BasicCatalog<S: Storage> {
    storage: Arc<Mutex<S>>,
}

impl<S: Storage> BasicCatalog<S> {
    /// Create a catalog owning its storage.
    pub fn new(storage: S) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
        }
    }

    /// Create a catalog over storage shared with other services.
    pub fn shared(storage: Arc<Mutex<S>>) -> Self {
        Self { storage }
    }
}

fn require_admin(session: &Session) -> Result<(), CatalogError> {
    if session.is_admin() {
        Ok(())
    } else {
        Err(CatalogError::AccessDenied)
    }
}

fn build_course(spec: NewCourse, session: &Session) -> Course {
    Course {
        id: CourseId::new(),
        title: spec.title,
        description: spec.description,
        image: spec.image,
        price: spec.price,
        duration: spec.duration,
        modules: spec
            .modules
            .into_iter()
            .map(|m| Module {
                id: ModuleId::new(),
                title: m.title,
                lessons: m
                    .lessons
                    .into_iter()
                    .map(|l| Lesson {
                        id: LessonId::new(),
                        title: l.title,
                        duration_minutes: l.duration_minutes,
                        content: l.content,
                    })
                    .collect(),
            })
            .collect(),
        created_by: session.user_id,
        created_at: chrono::Utc::now(),
    }
}

#[async_trait]
impl<S: Storage + 'static> CourseCatalog for BasicCatalog<S> {
    async fn list_courses(&self) -> Result<Vec<Course>, CatalogError> {
        let storage = self.storage.lock().await;
        Ok(storage.list_courses().await?)
    }

    async fn get_course(&self, id: CourseId) -> Result<Course, CatalogError> {
        let storage = self.storage.lock().await;
        storage
            .load_course(id)
            .await?
            .ok_or(CatalogError::CourseNotFound(id))
    }

    async fn create_course(
        &self,
        session: &Session,
        spec: NewCourse,
    ) -> Result<Course, CatalogError> {
        require_admin(session)?;
        let course = build_course(spec, session);

        let mut storage = self.storage.lock().await;
        storage.save_course(&course).await?;
        info!(course = %course.id, title = %course.title, "course created");
        Ok(course)
    }

    async fn update_course(
        &self,
        session: &Session,
        course: Course,
    ) -> Result<Course, CatalogError> {
        require_admin(session)?;
        let mut storage = self.storage.lock().await;

        if storage.load_course(course.id).await?.is_none() {
            return Err(CatalogError::CourseNotFound(course.id));
        }

        storage.save_course(&course).await?;
        info!(course = %course.id, "course updated");
        Ok(course)
    }

    async fn delete_course(&self, session: &Session, id: CourseId) -> Result<(), CatalogError> {
        require_admin(session)?;
        let mut storage = self.storage.lock().await;
        storage.delete_course(id).await?;
        info!(course = %id, "course deleted");
        Ok(())
    }
}
