#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::audit_log::{AuditAction, AuditEntry, AuditLogRepository, AuditQuery, NewAuditEntry};
use crate::AuthError;

/// In-memory audit trail. `entries` is public so tests can seed entries
/// with custom timestamps (the lockout tests age entries by hand).
#[derive(Clone)]
pub struct MockAuditLogRepository {
    pub entries: Arc<Mutex<Vec<AuditEntry>>>,
    next_id: Arc<Mutex<i64>>,
}

impl MockAuditLogRepository {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(vec![])),
            next_id: Arc::new(Mutex::new(1)),
        }
    }

    /// Seeds a LOGIN_FAILED entry at a chosen timestamp.
    pub fn push_failed_login(&self, email: &str, at: DateTime<Utc>) {
        let id = {
            let mut next_id = self.next_id.lock().unwrap();
            let id = *next_id;
            *next_id += 1;
            id
        };
        self.entries.lock().unwrap().push(AuditEntry {
            id,
            user_id: None,
            email: Some(email.to_owned()),
            action: AuditAction::LoginFailed,
            success: false,
            ip_address: None,
            user_agent: None,
            detail: None,
            created_at: at,
        });
    }
}

impl Default for MockAuditLogRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditLogRepository for MockAuditLogRepository {
    async fn append(&self, entry: NewAuditEntry) -> Result<AuditEntry, AuthError> {
        let id = {
            let mut next_id = self.next_id.lock().unwrap();
            let id = *next_id;
            *next_id += 1;
            id
        };

        let stored = AuditEntry {
            id,
            user_id: entry.user_id,
            email: entry.email,
            action: entry.action,
            success: entry.success,
            ip_address: entry.ip_address,
            user_agent: entry.user_agent,
            detail: entry.detail,
            created_at: Utc::now(),
        };

        let mut entries = self.entries.lock().unwrap();
        entries.push(stored.clone());
        drop(entries);

        Ok(stored)
    }

    async fn query(&self, query: AuditQuery) -> Result<Vec<AuditEntry>, AuthError> {
        let entries = self.entries.lock().unwrap();
        let mut matched: Vec<AuditEntry> = entries
            .iter()
            .filter(|e| {
                query.user_id.map_or(true, |id| e.user_id == Some(id))
                    && query
                        .email
                        .as_deref()
                        .map_or(true, |email| e.email.as_deref() == Some(email))
                    && query.action.map_or(true, |a| e.action == a)
                    && query.from.map_or(true, |from| e.created_at >= from)
                    && query.to.map_or(true, |to| e.created_at <= to)
            })
            .cloned()
            .collect();
        drop(entries);

        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched
            .into_iter()
            .skip(usize::try_from(query.offset).unwrap_or(0))
            .take(usize::try_from(query.limit).unwrap_or(usize::MAX))
            .collect())
    }

    async fn count_failed_logins(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<u32, AuthError> {
        let entries = self.entries.lock().unwrap();
        let count = entries
            .iter()
            .filter(|e| {
                e.action == AuditAction::LoginFailed
                    && e.email.as_deref() == Some(email)
                    && e.created_at >= since
            })
            .count();
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }
}
