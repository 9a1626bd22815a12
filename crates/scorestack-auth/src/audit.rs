//! Security audit trail
//!
//! Append-only record of security-relevant events. Recording is best-effort:
//! a failed insert is logged and swallowed so that audit storage trouble
//! never blocks a login or an admin action.

use std::sync::Arc;

use scorestack_db::AuditRepo;

/// Security event types. These names are stored verbatim in the audit table
/// and consumed by external reporting, so they are stable identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityEvent {
    LoginSuccess,
    LoginFailure,
    TokenRefresh,
    FileDownload,
    AccountDisable,
    AccountEnable,
    RoleGrant,
    RoleRemove,
}

impl SecurityEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoginSuccess => "LoginSuccess",
            Self::LoginFailure => "LoginFailure",
            Self::TokenRefresh => "TokenRefresh",
            Self::FileDownload => "FileDownload",
            Self::AccountDisable => "AccountDisable",
            Self::AccountEnable => "AccountEnable",
            Self::RoleGrant => "RoleGrant",
            Self::RoleRemove => "RoleRemove",
        }
    }
}

impl std::fmt::Display for SecurityEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Records security events to the audit table
#[derive(Clone)]
pub struct AuditRecorder {
    repo: Arc<AuditRepo>,
}

impl AuditRecorder {
    pub fn new(repo: AuditRepo) -> Self {
        Self {
            repo: Arc::new(repo),
        }
    }

    /// Record an event. Never returns an error: persistence failures are
    /// logged at error level and otherwise ignored.
    pub async fn record(
        &self,
        event: SecurityEvent,
        actor: Option<&str>,
        target: Option<&str>,
        source_ip: Option<&str>,
        detail: Option<&str>,
    ) {
        if let Err(e) = self
            .repo
            .insert(event.as_str(), actor, target, source_ip, detail)
            .await
        {
            tracing::error!(
                event = %event,
                error = %e,
                "Failed to persist audit event"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_stable() {
        // External reporting matches on these strings
        assert_eq!(SecurityEvent::LoginSuccess.as_str(), "LoginSuccess");
        assert_eq!(SecurityEvent::LoginFailure.as_str(), "LoginFailure");
        assert_eq!(SecurityEvent::TokenRefresh.as_str(), "TokenRefresh");
        assert_eq!(SecurityEvent::FileDownload.as_str(), "FileDownload");
        assert_eq!(SecurityEvent::AccountDisable.as_str(), "AccountDisable");
        assert_eq!(SecurityEvent::AccountEnable.as_str(), "AccountEnable");
        assert_eq!(SecurityEvent::RoleGrant.as_str(), "RoleGrant");
        assert_eq!(SecurityEvent::RoleRemove.as_str(), "RoleRemove");
    }
}
