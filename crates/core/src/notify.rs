//! User-facing notifications. Every failure in the workflow degrades to one
//! of these; they auto-dismiss after a short timeout and never crash a view.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Seconds a notice stays visible before auto-dismissing.
pub const AUTO_DISMISS_SECS: u64 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
    pub posted_at: DateTime<Utc>,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { message: message.into(), severity: Severity::Success, posted_at: Utc::now() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { message: message.into(), severity: Severity::Error, posted_at: Utc::now() }
    }

    /// The instant this notice auto-dismisses.
    pub fn dismiss_at(&self) -> DateTime<Utc> {
        self.posted_at + Duration::seconds(AUTO_DISMISS_SECS as i64)
    }

    pub fn is_dismissed(&self, now: DateTime<Utc>) -> bool {
        now >= self.dismiss_at()
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

#[derive(Clone, Default)]
pub struct InMemoryNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl InMemoryNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(notices) => notices.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices().into_iter().last()
    }

    /// Notices still on screen at `now`.
    pub fn active(&self, now: DateTime<Utc>) -> Vec<Notice> {
        self.notices().into_iter().filter(|notice| !notice.is_dismissed(now)).collect()
    }
}

impl Notifier for InMemoryNotifier {
    fn notify(&self, notice: Notice) {
        match self.notices.lock() {
            Ok(mut notices) => notices.push(notice),
            Err(poisoned) => poisoned.into_inner().push(notice),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::{InMemoryNotifier, Notice, Notifier, Severity, AUTO_DISMISS_SECS};

    #[test]
    fn notifier_collects_in_order() {
        let notifier = InMemoryNotifier::default();
        notifier.notify(Notice::error("Failed to load expenses"));
        notifier.notify(Notice::success("Status updated to \"Approved\""));

        let notices = notifier.notices();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].severity, Severity::Error);
        assert_eq!(notifier.last().unwrap().severity, Severity::Success);
    }

    #[test]
    fn notices_auto_dismiss_after_the_timeout() {
        let notifier = InMemoryNotifier::default();
        notifier.notify(Notice::error("Failed to load expenses"));

        let notice = notifier.last().unwrap();
        assert!(!notice.is_dismissed(notice.posted_at));
        assert_eq!(notifier.active(notice.posted_at).len(), 1);

        let later = notice.posted_at + Duration::seconds(AUTO_DISMISS_SECS as i64 + 1);
        assert!(notice.is_dismissed(later));
        assert!(notifier.active(later).is_empty());
    }
}
