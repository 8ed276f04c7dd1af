//! Fire-and-forget audit recording.
//!
//! Every flow records its outcome through [`record`], which never fails:
//! a storage error is logged and swallowed so a broken audit backend
//! cannot take down logins or password changes. Code that needs the
//! stored entry back (none of the flows do) calls
//! [`AuditLogRepository::append`] directly.

use crate::repository::{AuditLogRepository, NewAuditEntry};

/// Appends `entry` to the audit trail, logging and discarding any error.
pub async fn record<A>(audit_log: &A, entry: NewAuditEntry)
where
    A: AuditLogRepository,
{
    let action = entry.action;
    if let Err(err) = audit_log.append(entry).await {
        log::error!(
            target: "audit",
            "failed to record {} audit entry: {}",
            action.as_str(),
            err
        );
    }
}
