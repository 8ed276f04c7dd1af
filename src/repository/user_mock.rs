#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

use crate::token;
use crate::AuthError;

use super::user::{NewUser, User, UserRepository};

/// In-memory credential store for tests and demos.
#[derive(Clone)]
pub struct MockUserRepository {
    pub users: Arc<Mutex<Vec<User>>>,
    next_id: Arc<Mutex<i64>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(vec![])),
            next_id: Arc::new(Mutex::new(1)),
        }
    }
}

impl Default for MockUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AuthError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, AuthError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(AuthError::EmailTaken);
        }

        let id = {
            let mut next_id = self.next_id.lock().unwrap();
            let id = *next_id;
            *next_id += 1;
            id
        };

        let now = Utc::now();
        let user = User {
            id,
            email: new_user.email,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            role: new_user.role,
            hashed_password: new_user.hashed_password,
            is_active: true,
            email_verified: false,
            reset_token: None,
            reset_token_expiry: None,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        drop(users);

        Ok(user)
    }

    async fn update_password(&self, user_id: i64, hashed_password: &str) -> Result<(), AuthError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
            hashed_password.clone_into(&mut user.hashed_password);
            user.updated_at = Utc::now();
            Ok(())
        } else {
            Err(AuthError::UserNotFound)
        }
    }

    async fn set_reset_token(
        &self,
        user_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
            user.reset_token = Some(token.to_owned());
            user.reset_token_expiry = Some(expires_at);
            user.updated_at = Utc::now();
            Ok(())
        } else {
            Err(AuthError::UserNotFound)
        }
    }

    async fn find_by_valid_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AuthError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|u| {
                u.is_active
                    && match (u.reset_token.as_deref(), u.reset_token_expiry) {
                        (Some(stored), Some(expiry)) => token::validate(token, stored, expiry, now),
                        _ => false,
                    }
            })
            .cloned())
    }

    async fn consume_reset_token(
        &self,
        user_id: i64,
        token: &str,
        hashed_password: &str,
    ) -> Result<bool, AuthError> {
        let mut users = self.users.lock().unwrap();
        match users
            .iter_mut()
            .find(|u| u.id == user_id && u.reset_token.as_deref() == Some(token))
        {
            Some(user) => {
                hashed_password.clone_into(&mut user.hashed_password);
                user.reset_token = None;
                user.reset_token_expiry = None;
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::Role;
    use chrono::Duration;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_owned(),
            first_name: "Test".to_owned(),
            last_name: "User".to_owned(),
            role: Role::Staff,
            hashed_password: "hashed".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repo = MockUserRepository::new();
        let a = repo.create(new_user("a@example.com")).await.unwrap();
        let b = repo.create(new_user("b@example.com")).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_create_duplicate_email_rejected() {
        let repo = MockUserRepository::new();
        repo.create(new_user("a@example.com")).await.unwrap();
        let err = repo.create(new_user("a@example.com")).await.unwrap_err();
        assert_eq!(err, AuthError::EmailTaken);
    }

    #[tokio::test]
    async fn test_consume_reset_token_is_single_use() {
        let repo = MockUserRepository::new();
        let user = repo.create(new_user("a@example.com")).await.unwrap();
        let expiry = Utc::now() + Duration::hours(1);
        repo.set_reset_token(user.id, "tok", expiry).await.unwrap();

        assert!(repo.consume_reset_token(user.id, "tok", "newhash").await.unwrap());
        assert!(!repo.consume_reset_token(user.id, "tok", "other").await.unwrap());

        let stored = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.hashed_password, "newhash");
        assert!(stored.reset_token.is_none());
        assert!(stored.reset_token_expiry.is_none());
    }

    #[tokio::test]
    async fn test_find_by_valid_reset_token_checks_all_conditions() {
        let repo = MockUserRepository::new();
        let user = repo.create(new_user("a@example.com")).await.unwrap();
        let now = Utc::now();
        repo.set_reset_token(user.id, "tok", now + Duration::hours(1))
            .await
            .unwrap();

        assert!(repo.find_by_valid_reset_token("tok", now).await.unwrap().is_some());
        assert!(repo.find_by_valid_reset_token("wrong", now).await.unwrap().is_none());
        assert!(repo
            .find_by_valid_reset_token("tok", now + Duration::hours(2))
            .await
            .unwrap()
            .is_none());

        // inactive account invalidates the token
        repo.users.lock().unwrap()[0].is_active = false;
        assert!(repo.find_by_valid_reset_token("tok", now).await.unwrap().is_none());
    }
}
