#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use super::notification::{
    NewNotification, Notification, NotificationRepository,
};
use crate::AuthError;

/// In-memory notification store for tests and demos.
#[derive(Clone)]
pub struct MockNotificationRepository {
    pub notifications: Arc<Mutex<Vec<Notification>>>,
    next_id: Arc<Mutex<i64>>,
}

impl MockNotificationRepository {
    pub fn new() -> Self {
        Self {
            notifications: Arc::new(Mutex::new(vec![])),
            next_id: Arc::new(Mutex::new(1)),
        }
    }
}

impl Default for MockNotificationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationRepository for MockNotificationRepository {
    async fn list_for_user(
        &self,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<Notification>, AuthError> {
        let notifications = self.notifications.lock().unwrap();
        let mut matched: Vec<Notification> = notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        drop(notifications);

        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        matched.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(matched)
    }

    async fn create(&self, notification: NewNotification) -> Result<Notification, AuthError> {
        let id = {
            let mut next_id = self.next_id.lock().unwrap();
            let id = *next_id;
            *next_id += 1;
            id
        };

        let stored = Notification {
            id,
            user_id: notification.user_id,
            title: notification.title,
            message: notification.message,
            kind: notification.kind,
            module: notification.module,
            related_id: notification.related_id,
            read: false,
            created_at: Utc::now(),
        };

        self.notifications.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn set_read(
        &self,
        id: i64,
        owner_id: i64,
        read: bool,
    ) -> Result<Option<Notification>, AuthError> {
        let mut notifications = self.notifications.lock().unwrap();
        match notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == owner_id)
        {
            Some(notification) => {
                notification.read = read;
                Ok(Some(notification.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64, owner_id: i64) -> Result<bool, AuthError> {
        let mut notifications = self.notifications.lock().unwrap();
        let before = notifications.len();
        notifications.retain(|n| !(n.id == id && n.user_id == owner_id));
        Ok(notifications.len() < before)
    }
}
