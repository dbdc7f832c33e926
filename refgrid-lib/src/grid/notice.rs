//! Transient user-facing notices

use std::time::Duration;
use std::time::Instant;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// A short message shown to the user until it expires.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
    pub expires_at: Instant,
}

impl Notice {
    /// Creates a notice expiring `lifetime` from now.
    pub fn new(message: impl Into<String>, kind: NoticeKind, lifetime: Duration) -> Self {
        Self {
            message: message.into(),
            kind,
            expires_at: Instant::now() + lifetime,
        }
    }

    /// Returns `true` once the notice should no longer be shown.
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry() {
        let notice = Notice::new("Saved", NoticeKind::Success, Duration::from_secs(3));
        let now = Instant::now();
        assert!(!notice.is_expired(now));
        assert!(notice.is_expired(now + Duration::from_secs(4)));
    }

    #[test]
    fn test_zero_lifetime_expires_immediately() {
        let notice = Notice::new("Gone", NoticeKind::Info, Duration::ZERO);
        assert!(notice.is_expired(Instant::now()));
    }
}
