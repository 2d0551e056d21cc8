//! Admin account operations.

use std::sync::Arc;

use async_trait::async_trait;
use campus_core::{Session, User, UserId};
use campus_storage::Storage;
use tokio::sync::Mutex;
use tracing::debug;

use crate::registry::EnrollmentError;

/// Admin-only account management.
#[async_trait]
pub trait AccountAdmin: Send + Sync {
    /// List every account.
    async fn list_accounts(&self, session: &Session) -> Result<Vec<User>, EnrollmentError>;

    /// Replace an existing account document.
    async fn update_account(&self, session: &Session, user: User)
        -> Result<User, EnrollmentError>;

    /// Delete an account.
    async fn delete_account(&self, session: &Session, id: UserId)
        -> Result<(), EnrollmentError>;
}

/// Basic account admin over a storage backend.
pub struct BasicAccountAdmin<S: Storage> {
    storage: Arc<Mutex<S>>,
}

impl<S: Storage> BasicAccountAdmin<S> {
    /// Create an account admin owning its storage.
    pub fn new(storage: S) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
        }
    }

    /// Create an account admin over storage shared with other services.
    pub fn shared(storage: Arc<Mutex<S>>) -> Self {
        Self { storage }
    }
}

fn require_admin(session: &Session) -> Result<(), EnrollmentError> {
    if session.is_admin() {
        Ok(())
    } else {
        Err(EnrollmentError::AccessDenied)
    }
}

#[async_trait]
impl<S: Storage + 'static> AccountAdmin for BasicAccountAdmin<S> {
    async fn list_accounts(&self, session: &Session) -> Result<Vec<User>, EnrollmentError> {
        require_admin(session)?;
        let storage = self.storage.lock().await;
        Ok(storage.list_users().await?)
    }

    async fn update_account(
        &self,
        session: &Session,
        user: User,
    ) -> Result<User, EnrollmentError> {
        require_admin(session)?;
        let mut storage = self.storage.lock().await;

        if storage.load_user(user.id).await?.is_none() {
            return Err(EnrollmentError::UserNotFound(user.id));
        }

        storage.save_user(&user).await?;
        debug!(user = %user.id, "account updated");
        Ok(user)
    }

    async fn delete_account(
        &self,
        session: &Session,
        id: UserId,
    ) -> Result<(), EnrollmentError> {
        require_admin(session)?;
        let mut storage = self.storage.lock().await;
        storage.delete_user(id).await?;
        debug!(user = %id, "account deleted");
        Ok(())
    }
}
