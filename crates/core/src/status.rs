//! Status resolution: raw backend status codes to display labels, visual
//! tone, and the set of actions the current actor may take.
//!
//! Codes arrive as free strings from the backend. Every enum here keeps an
//! `Unknown` variant carrying the raw code so an unmapped value degrades to
//! a verbatim passthrough instead of an error.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::Deserialize;

use crate::domain::actor::Role;
use crate::flows::states::ApprovalAction;

/// Visual category a status renders under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusTone {
    Pending,
    Approved,
    Rejected,
}

impl StatusTone {
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Expense lifecycle status. Four-stage forward sequence with a rejection
/// variant reachable from each pending stage; rejection is terminal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExpenseStatus {
    PendingManagerApproval,
    PendingHrApproval,
    PendingAccountMgrApproval,
    Approved,
    /// Intermediate code some backend rows carry after the HR stage.
    HrApproved,
    MgrRejected,
    HrRejected,
    AccMgrRejected,
    /// Unmapped backend code, preserved verbatim.
    Unknown(String),
}

impl ExpenseStatus {
    /// Never fails: unrecognized codes become `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "pending_manager_approval" => Self::PendingManagerApproval,
            "pending_hr_approval" => Self::PendingHrApproval,
            "pending_account_mgr_approval" => Self::PendingAccountMgrApproval,
            "approved" => Self::Approved,
            "hr_approved" => Self::HrApproved,
            "mgr_rejected" => Self::MgrRejected,
            "hr_rejected" => Self::HrRejected,
            "acc_mgr_rejected" => Self::AccMgrRejected,
            other => Self::Unknown(other.to_owned()),
        }
    }

    pub fn as_code(&self) -> &str {
        match self {
            Self::PendingManagerApproval => "pending_manager_approval",
            Self::PendingHrApproval => "pending_hr_approval",
            Self::PendingAccountMgrApproval => "pending_account_mgr_approval",
            Self::Approved => "approved",
            Self::HrApproved => "hr_approved",
            Self::MgrRejected => "mgr_rejected",
            Self::HrRejected => "hr_rejected",
            Self::AccMgrRejected => "acc_mgr_rejected",
            Self::Unknown(raw) => raw,
        }
    }

    /// Display label. Unknown codes fall back to the raw code verbatim.
    pub fn label(&self) -> &str {
        match self {
            Self::PendingManagerApproval => "Pending MGR Approval",
            Self::PendingHrApproval => "Pending HR Approval",
            Self::PendingAccountMgrApproval => "Pending AM Approval",
            Self::Approved => "Approved",
            Self::HrApproved => "Approved by HR",
            Self::MgrRejected => "MGR Rejected",
            Self::HrRejected => "Rejected by HR",
            // The screens render acc_mgr_rejected with this label; kept verbatim.
            Self::AccMgrRejected => "Rejected by Manager",
            Self::Unknown(raw) => raw,
        }
    }

    pub fn tone(&self) -> StatusTone {
        match self {
            Self::PendingManagerApproval
            | Self::PendingHrApproval
            | Self::PendingAccountMgrApproval
            | Self::Unknown(_) => StatusTone::Pending,
            Self::Approved | Self::HrApproved => StatusTone::Approved,
            Self::MgrRejected | Self::HrRejected | Self::AccMgrRejected => StatusTone::Rejected,
        }
    }

    /// The role holding the request while it sits in this status.
    pub fn pending_role(&self) -> Option<Role> {
        match self {
            Self::PendingManagerApproval => Some(Role::Manager),
            Self::PendingHrApproval => Some(Role::Hr),
            Self::PendingAccountMgrApproval => Some(Role::AccountManager),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Approved
                | Self::HrApproved
                | Self::MgrRejected
                | Self::HrRejected
                | Self::AccMgrRejected
        )
    }

    /// Actions the given role may take on a request in this status. Both
    /// approve and reject are offered to the responsible role while the
    /// status is pending at that role's stage; terminal and out-of-scope
    /// statuses offer nothing.
    pub fn legal_actions(&self, role: Role) -> &'static [ApprovalAction] {
        if self.pending_role() == Some(role) {
            &[ApprovalAction::Approve, ApprovalAction::Reject]
        } else {
            &[]
        }
    }
}

impl serde::Serialize for ExpenseStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_code())
    }
}

impl<'de> serde::Deserialize<'de> for ExpenseStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// Per-stage leave status as the backend stores it (`manager_status`,
/// `hr_status`, `final_status` all use this vocabulary).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Unknown(String),
}

impl LeaveStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Pending" => Self::Pending,
            "Approved" => Self::Approved,
            "Rejected" => Self::Rejected,
            other => Self::Unknown(other.to_owned()),
        }
    }

    pub fn as_code(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Unknown(raw) => raw,
        }
    }

    pub fn label(&self) -> &str {
        self.as_code()
    }

    pub fn tone(&self) -> StatusTone {
        match self {
            Self::Pending | Self::Unknown(_) => StatusTone::Pending,
            Self::Approved => StatusTone::Approved,
            Self::Rejected => StatusTone::Rejected,
        }
    }
}

impl serde::Serialize for LeaveStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_code())
    }
}

impl<'de> serde::Deserialize<'de> for LeaveStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::{ExpenseStatus, LeaveStatus, StatusTone};
    use crate::domain::actor::Role;
    use crate::flows::states::ApprovalAction;

    #[test]
    fn known_codes_round_trip() {
        for code in [
            "pending_manager_approval",
            "pending_hr_approval",
            "pending_account_mgr_approval",
            "approved",
            "hr_approved",
            "mgr_rejected",
            "hr_rejected",
            "acc_mgr_rejected",
        ] {
            assert_eq!(ExpenseStatus::parse(code).as_code(), code);
        }
    }

    #[test]
    fn unknown_code_passes_through_verbatim() {
        let status = ExpenseStatus::parse("audit_hold");
        assert_eq!(status, ExpenseStatus::Unknown("audit_hold".to_owned()));
        assert_eq!(status.label(), "audit_hold");
        assert_eq!(status.as_code(), "audit_hold");
        assert_eq!(status.tone(), StatusTone::Pending);
        assert!(status.legal_actions(Role::Manager).is_empty());
    }

    #[test]
    fn labels_match_the_approval_screens() {
        assert_eq!(ExpenseStatus::PendingManagerApproval.label(), "Pending MGR Approval");
        assert_eq!(ExpenseStatus::PendingAccountMgrApproval.label(), "Pending AM Approval");
        assert_eq!(ExpenseStatus::HrApproved.label(), "Approved by HR");
        assert_eq!(ExpenseStatus::MgrRejected.label(), "MGR Rejected");
        assert_eq!(ExpenseStatus::HrRejected.label(), "Rejected by HR");
        assert_eq!(ExpenseStatus::AccMgrRejected.label(), "Rejected by Manager");
    }

    #[test]
    fn pending_statuses_offer_both_actions_to_the_responsible_role_only() {
        let status = ExpenseStatus::PendingManagerApproval;
        assert_eq!(
            status.legal_actions(Role::Manager),
            &[ApprovalAction::Approve, ApprovalAction::Reject]
        );
        assert!(status.legal_actions(Role::Hr).is_empty());
        assert!(status.legal_actions(Role::AccountManager).is_empty());
        assert!(status.legal_actions(Role::Employee).is_empty());

        assert_eq!(
            ExpenseStatus::PendingHrApproval.legal_actions(Role::Hr).len(),
            2
        );
        assert_eq!(
            ExpenseStatus::PendingAccountMgrApproval
                .legal_actions(Role::AccountManager)
                .len(),
            2
        );
    }

    #[test]
    fn terminal_statuses_offer_no_actions() {
        for status in [
            ExpenseStatus::Approved,
            ExpenseStatus::HrApproved,
            ExpenseStatus::MgrRejected,
            ExpenseStatus::HrRejected,
            ExpenseStatus::AccMgrRejected,
        ] {
            assert!(status.is_terminal());
            for role in [Role::Manager, Role::Hr, Role::AccountManager] {
                assert!(status.legal_actions(role).is_empty(), "{status:?} {role:?}");
            }
        }
    }

    #[test]
    fn serde_uses_wire_codes() {
        let json = serde_json::to_string(&ExpenseStatus::PendingHrApproval).unwrap();
        assert_eq!(json, "\"pending_hr_approval\"");
        let parsed: ExpenseStatus = serde_json::from_str("\"mgr_rejected\"").unwrap();
        assert_eq!(parsed, ExpenseStatus::MgrRejected);
    }

    #[test]
    fn leave_status_parses_backend_vocabulary() {
        assert_eq!(LeaveStatus::parse("Pending"), LeaveStatus::Pending);
        assert_eq!(LeaveStatus::parse("Approved").tone(), StatusTone::Approved);
        assert_eq!(LeaveStatus::parse("On Hold").label(), "On Hold");
    }
}
