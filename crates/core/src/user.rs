//! User model - accounts and their enrollment set.
//!
//! Credential material never lives here; verification is delegated to the
//! external auth collaborator, which hands the rest of the system an
//! already-validated [`Session`](crate::Session).

use serde::{Deserialize, Serialize};
use crate::id::{CourseId, UserId};
use crate::Time;

/// A platform account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: UserId,

    /// Display name
    pub name: String,

    /// Contact email
    pub email: String,

    /// Account role
    pub role: Role,

    /// Enrolled course ids. Semantically a set: enrolling twice in the
    /// same course is a no-op, insertion order carries no meaning.
    pub enrolled_courses: Vec<CourseId>,

    /// When created
    pub created_at: Time,
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular learner account
    Learner,
    /// Content and account administrator
    Admin,
}

impl User {
    /// Create a learner account.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            name: name.into(),
            email: email.into(),
            role: Role::Learner,
            enrolled_courses: Vec::new(),
            created_at: chrono::Utc::now(),
        }
    }

    /// Whether this account is enrolled in the given course.
    pub fn is_enrolled(&self, course_id: CourseId) -> bool {
        self.enrolled_courses.contains(&course_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_is_learner_with_empty_enrollments() {
        let user = User::new("Ada", "ada@example.com");
        assert_eq!(user.role, Role::Learner);
        assert!(user.enrolled_courses.is_empty());
        assert!(!user.is_enrolled(CourseId::new()));
    }
}
