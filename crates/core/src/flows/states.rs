use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::Deserialize;

use crate::domain::actor::Role;
use crate::status::LeaveStatus;

/// The two terminal decisions an approver can take on a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApprovalAction {
    Approve,
    Reject,
}

impl ApprovalAction {
    /// Wire value the backend expects (`status` form field and leave
    /// `action` body both use these exact strings).
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Approve => "Approved",
            Self::Reject => "Rejected",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "Approved" | "approve" | "approved" => Some(Self::Approve),
            "Rejected" | "reject" | "rejected" => Some(Self::Reject),
            _ => None,
        }
    }
}

impl serde::Serialize for ApprovalAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> serde::Deserialize<'de> for ApprovalAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid action `{raw}`")))
    }
}

/// Leave requests move through two sequential stages; the HR stage is only
/// reachable once the manager stage is approved.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LeaveStage {
    PendingManager,
    PendingHr,
    Approved,
    Rejected,
    Unknown(String),
}

impl LeaveStage {
    /// Derive the stage from the per-stage statuses the backend returns.
    pub fn from_statuses(manager_status: &LeaveStatus, hr_status: &LeaveStatus) -> Self {
        match (manager_status, hr_status) {
            (LeaveStatus::Pending, _) => Self::PendingManager,
            (LeaveStatus::Rejected, _) => Self::Rejected,
            (LeaveStatus::Approved, LeaveStatus::Pending) => Self::PendingHr,
            (LeaveStatus::Approved, LeaveStatus::Approved) => Self::Approved,
            (LeaveStatus::Approved, LeaveStatus::Rejected) => Self::Rejected,
            (manager, hr) => {
                Self::Unknown(format!("{}/{}", manager.as_code(), hr.as_code()))
            }
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    pub fn pending_role(&self) -> Option<Role> {
        match self {
            Self::PendingManager => Some(Role::Manager),
            Self::PendingHr => Some(Role::Hr),
            _ => None,
        }
    }

    pub fn as_code(&self) -> &str {
        match self {
            Self::PendingManager => "pending_manager",
            Self::PendingHr => "pending_hr",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Unknown(raw) => raw,
        }
    }

    pub fn legal_actions(&self, role: Role) -> &'static [ApprovalAction] {
        if self.pending_role() == Some(role) {
            &[ApprovalAction::Approve, ApprovalAction::Reject]
        } else {
            &[]
        }
    }
}

/// Result of applying an action to a request in a given state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionOutcome<S> {
    pub from: S,
    pub to: S,
    pub role: Role,
    pub action: ApprovalAction,
}

#[cfg(test)]
mod tests {
    use super::{ApprovalAction, LeaveStage};
    use crate::status::LeaveStatus;

    #[test]
    fn action_wire_strings_match_backend() {
        assert_eq!(ApprovalAction::Approve.as_wire(), "Approved");
        assert_eq!(ApprovalAction::Reject.as_wire(), "Rejected");
        assert_eq!(ApprovalAction::parse("Approved"), Some(ApprovalAction::Approve));
        assert_eq!(ApprovalAction::parse("cancel"), None);
    }

    #[test]
    fn stage_derivation_requires_manager_approval_before_hr() {
        let stage = LeaveStage::from_statuses(&LeaveStatus::Pending, &LeaveStatus::Pending);
        assert_eq!(stage, LeaveStage::PendingManager);

        let stage = LeaveStage::from_statuses(&LeaveStatus::Approved, &LeaveStatus::Pending);
        assert_eq!(stage, LeaveStage::PendingHr);

        let stage = LeaveStage::from_statuses(&LeaveStatus::Approved, &LeaveStatus::Approved);
        assert_eq!(stage, LeaveStage::Approved);
    }

    #[test]
    fn rejection_at_either_stage_is_terminal() {
        let stage = LeaveStage::from_statuses(&LeaveStatus::Rejected, &LeaveStatus::Pending);
        assert!(stage.is_terminal());

        let stage = LeaveStage::from_statuses(&LeaveStatus::Approved, &LeaveStatus::Rejected);
        assert!(stage.is_terminal());
    }
}
