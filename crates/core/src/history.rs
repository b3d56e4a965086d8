//! Append-only audit trail of approval actions. Entries are never edited or
//! deleted; the read side preserves backend ordering without re-sorting.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::actor::Role;
use crate::flows::states::ApprovalAction;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub entry_id: String,
    pub request_id: String,
    pub actor_name: String,
    pub actor_role: Role,
    pub action: ApprovalAction,
    pub reason: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(
        request_id: impl Into<String>,
        actor_name: impl Into<String>,
        actor_role: Role,
        action: ApprovalAction,
        reason: Option<String>,
    ) -> Self {
        Self {
            entry_id: Uuid::new_v4().to_string(),
            request_id: request_id.into(),
            actor_name: actor_name.into(),
            actor_role,
            action,
            reason,
            recorded_at: Utc::now(),
        }
    }
}

pub trait HistorySink: Send + Sync {
    fn append(&self, entry: HistoryEntry);
}

#[derive(Clone, Default)]
pub struct InMemoryHistorySink {
    entries: Arc<Mutex<Vec<HistoryEntry>>>,
}

impl InMemoryHistorySink {
    pub fn entries(&self) -> Vec<HistoryEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Entries for one request, in append order.
    pub fn entries_for(&self, request_id: &str) -> Vec<HistoryEntry> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.request_id == request_id)
            .collect()
    }
}

impl HistorySink for InMemoryHistorySink {
    fn append(&self, entry: HistoryEntry) {
        match self.entries.lock() {
            Ok(mut entries) => entries.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}

/// Read-only view over entries as received from the backend. Purely
/// presentational: no write path, no client-side re-sort.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn from_backend(entries: Vec<HistoryEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{HistoryEntry, HistoryLog, HistorySink, InMemoryHistorySink};
    use crate::domain::actor::Role;
    use crate::flows::states::ApprovalAction;

    #[test]
    fn sink_preserves_append_order() {
        let sink = InMemoryHistorySink::default();
        sink.append(HistoryEntry::new("exp-1", "Mira Osei", Role::Manager, ApprovalAction::Approve, Some("ok".to_owned())));
        sink.append(HistoryEntry::new("exp-1", "Rob Tanaka", Role::Hr, ApprovalAction::Reject, Some("policy".to_owned())));
        sink.append(HistoryEntry::new("exp-2", "Mira Osei", Role::Manager, ApprovalAction::Approve, None));

        let entries = sink.entries_for("exp-1");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].actor_role, Role::Manager);
        assert_eq!(entries[1].actor_role, Role::Hr);
    }

    #[test]
    fn log_keeps_backend_order_without_sorting() {
        let newer = HistoryEntry::new("exp-1", "Rob Tanaka", Role::Hr, ApprovalAction::Approve, None);
        let older = HistoryEntry::new("exp-1", "Mira Osei", Role::Manager, ApprovalAction::Approve, None);

        // Deliberately out of chronological order; the log must not fix it.
        let log = HistoryLog::from_backend(vec![newer.clone(), older.clone()]);
        assert_eq!(log.entries(), &[newer, older]);
    }
}
