//! JSON file storage implementation.
//!
//! Stores each entity as one pretty-printed JSON document under a root
//! directory. Courses and users are named by their id; progress records by
//! their (user, course) key. A missing file reads as `None`.

use std::path::Path;

use campus_core::{Course, CourseId, ProgressRecord, User, UserId};
use tokio::fs;
use tracing::debug;

use super::{Storage, Result};

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: std::path::PathBuf,
}

impl JsonStorage {
    /// Create storage rooted at the given directory, creating the
    /// per-entity subdirectories as needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(root.join("courses")).await?;
        fs::create_dir_all(root.join("users")).await?;
        fs::create_dir_all(root.join("progress")).await?;

        Ok(Self { root })
    }

    fn course_path(&self, id: CourseId) -> std::path::PathBuf {
        self.root.join("courses").join(format!("{}.json", id))
    }
    fn user_path(&self, id: UserId) -> std::path::PathBuf {
        self.root.join("users").join(format!("{}.json", id))
    }
    fn progress_path(&self, user_id: UserId, course_id: CourseId) -> std::path::PathBuf {
        self.root
            .join("progress")
            .join(format!("{}_{}.json", user_id, course_id))
    }
}

#[async_trait::async_trait]
impl Storage for JsonStorage {
    async fn save_course(&mut self, course: &Course) -> Result<()> {
        let json = serde_json::to_string_pretty(course)?;
        fs::write(self.course_path(course.id), json.as_bytes()).await?;
        debug!(course = %course.id, "saved course");
        Ok(())
    }

    async fn load_course(&self, id: CourseId) -> Result<Option<Course>> {
        read_json(&self.course_path(id)).await
    }

    async fn list_courses(&self) -> Result<Vec<Course>> {
        list_dir(&self.root.join("courses")).await
    }

    async fn delete_course(&mut self, id: CourseId) -> Result<()> {
        remove_if_present(&self.course_path(id)).await
    }

    async fn save_user(&mut self, user: &User) -> Result<()> {
        let json = serde_json::to_string_pretty(user)?;
        fs::write(self.user_path(user.id), json.as_bytes()).await?;
        debug!(user = %user.id, "saved user");
        Ok(())
    }

    async fn load_user(&self, id: UserId) -> Result<Option<User>> {
        read_json(&self.user_path(id)).await
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        list_dir(&self.root.join("users")).await
    }

    async fn delete_user(&mut self, id: UserId) -> Result<()> {
        remove_if_present(&self.user_path(id)).await
    }

    async fn save_progress(&mut self, record: &ProgressRecord) -> Result<()> {
        let json = serde_json::to_string_pretty(record)?;
        let path = self.progress_path(record.user_id, record.course_id);
        fs::write(&path, json.as_bytes()).await?;
        debug!(user = %record.user_id, course = %record.course_id, "saved progress");
        Ok(())
    }

    async fn load_progress(
        &self,
        user_id: UserId,
        course_id: CourseId,
    ) -> Result<Option<ProgressRecord>> {
        read_json(&self.progress_path(user_id, course_id)).await
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_dir<T: serde::de::DeserializeOwned>(dir: &std::path::Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        if entry.path().extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        if let Ok(Some(item)) = read_json(&entry.path()).await {
            items.push(item);
        }
    }
    Ok(items)
}

async fn remove_if_present(path: &std::path::Path) -> Result<()> {
    fs::remove_file(path).await.or_else(|e| {
        if e.kind() == std::io::ErrorKind::NotFound { Ok(()) } else { Err(e) }
    })?;
    Ok(())
}
