//! In-memory `UserDirectory`.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::ports::{UserDirectory, UserRecord};

/// In-memory user directory.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    rows: Mutex<Vec<UserRecord>>,
}

impl InMemoryUserDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an account (test setup).
    pub fn seed(&self, user: UserRecord) {
        self.rows.lock().unwrap().push(user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DomainError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, DomainError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| &u.id == id)
            .cloned())
    }

    async fn mark_email_verified(&self, email: &str) -> Result<(), DomainError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|u| u.email == email) {
            Some(user) => {
                user.is_email_verified = true;
                Ok(())
            }
            None => Err(DomainError::user_not_found()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Role;

    fn record(email: &str, verified: bool) -> UserRecord {
        UserRecord {
            id: UserId::new(format!("id-{}", email)).unwrap(),
            email: email.to_string(),
            role: Role::User,
            is_email_verified: verified,
        }
    }

    #[tokio::test]
    async fn lookup_by_email_and_id() {
        let directory = InMemoryUserDirectory::new();
        directory.seed(record("a@x.com", false));

        let by_email = directory.find_by_email("a@x.com").await.unwrap().unwrap();
        let by_id = directory.find_by_id(&by_email.id).await.unwrap().unwrap();
        assert_eq!(by_email, by_id);
        assert!(directory.find_by_email("b@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn mark_verified_flips_flag() {
        let directory = InMemoryUserDirectory::new();
        directory.seed(record("a@x.com", false));

        directory.mark_email_verified("a@x.com").await.unwrap();
        let user = directory.find_by_email("a@x.com").await.unwrap().unwrap();
        assert!(user.is_email_verified);
    }

    #[tokio::test]
    async fn mark_verified_unknown_email_errors() {
        let directory = InMemoryUserDirectory::new();
        assert!(directory.mark_email_verified("ghost@x.com").await.is_err());
    }
}
