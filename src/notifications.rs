//! Notification inbox service.
//!
//! Thin orchestration over [`NotificationRepository`]: input validation,
//! ownership-gated mutation (a foreign id reads as not-found, never as
//! forbidden, so ids cannot be probed), and the unread counter shown as a
//! badge in the UI.

use crate::repository::{
    NewNotification, Notification, NotificationKind, NotificationRepository,
};
use crate::validators::ValidationError;
use crate::AuthError;

/// A page of notifications plus the unread count over that page.
///
/// The count is computed over the fetched page only, so it is capped at
/// the page size. That is what the badge needs and keeps listing a
/// single query.
#[derive(Debug, Clone)]
pub struct NotificationPage {
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
}

#[derive(Debug, Clone)]
pub struct NotificationService {
    page_size: i64,
}

impl NotificationService {
    pub fn new(page_size: i64) -> Self {
        Self { page_size }
    }

    /// Lists the caller's newest notifications, at most one page.
    pub async fn list<N>(&self, repo: &N, user_id: i64) -> Result<NotificationPage, AuthError>
    where
        N: NotificationRepository,
    {
        let notifications = repo.list_for_user(user_id, self.page_size).await?;
        let unread_count = notifications.iter().filter(|n| !n.read).count();
        Ok(NotificationPage {
            notifications,
            unread_count,
        })
    }

    /// Creates a notification after validating title, message and kind.
    /// The caller supplies the target user; new entries always start
    /// unread.
    pub async fn create<N>(
        &self,
        repo: &N,
        user_id: i64,
        title: &str,
        message: &str,
        kind: &str,
        module: Option<String>,
        related_id: Option<i64>,
    ) -> Result<Notification, AuthError>
    where
        N: NotificationRepository,
    {
        let mut errors = vec![];
        if title.trim().is_empty() {
            errors.push(ValidationError::TitleEmpty);
        }
        if message.trim().is_empty() {
            errors.push(ValidationError::MessageEmpty);
        }
        let kind = match NotificationKind::parse(kind) {
            Ok(kind) => kind,
            Err(e) => {
                errors.push(e);
                return Err(AuthError::Validation(errors));
            }
        };
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        repo.create(NewNotification {
            user_id,
            title: title.to_owned(),
            message: message.to_owned(),
            kind,
            module,
            related_id,
        })
        .await
    }

    /// Flips the read flag on a notification the caller owns.
    pub async fn set_read<N>(
        &self,
        repo: &N,
        id: i64,
        owner_id: i64,
        read: bool,
    ) -> Result<Notification, AuthError>
    where
        N: NotificationRepository,
    {
        repo.set_read(id, owner_id, read)
            .await?
            .ok_or(AuthError::NotFound)
    }

    /// Deletes a notification the caller owns.
    pub async fn delete<N>(&self, repo: &N, id: i64, owner_id: i64) -> Result<(), AuthError>
    where
        N: NotificationRepository,
    {
        if repo.delete(id, owner_id).await? {
            Ok(())
        } else {
            Err(AuthError::NotFound)
        }
    }
}

impl Default for NotificationService {
    fn default() -> Self {
        Self::new(50)
    }
}
