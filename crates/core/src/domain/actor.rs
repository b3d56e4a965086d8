use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric identity of the signed-in actor, as issued by the backend at login.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub i64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Employee,
    Manager,
    Hr,
    AccountManager,
}

impl Role {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "employee" | "emp" => Some(Self::Employee),
            "manager" | "mgr" => Some(Self::Manager),
            "hr" => Some(Self::Hr),
            "account_manager" | "acc_mgr" | "am" => Some(Self::AccountManager),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Manager => "manager",
            Self::Hr => "hr",
            Self::AccountManager => "account_manager",
        }
    }

    /// Label used in user-facing messages ("Manager ID not found").
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Employee => "Employee",
            Self::Manager => "Manager",
            Self::Hr => "HR",
            Self::AccountManager => "Account Manager",
        }
    }

    /// URL segment for the expense approval endpoints
    /// (`/expenses/{segment}-exp-list`, `/expenses/{segment}-upd-status/{id}`).
    /// Employees have no approval endpoints.
    pub fn approval_segment(&self) -> Option<&'static str> {
        match self {
            Self::Employee => None,
            Self::Manager => Some("mgr"),
            Self::Hr => Some("hr"),
            Self::AccountManager => Some("acc-mgr"),
        }
    }

    /// Form/query field the backend expects the actor id under.
    pub fn id_field(&self) -> &'static str {
        match self {
            Self::Employee => "employee_id",
            Self::Manager => "manager_id",
            Self::Hr => "hr_id",
            Self::AccountManager => "acc_mgr_id",
        }
    }

    pub fn is_approver(&self) -> bool {
        !matches!(self, Self::Employee)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::Role;

    #[test]
    fn parse_accepts_wire_aliases() {
        assert_eq!(Role::parse("mgr"), Some(Role::Manager));
        assert_eq!(Role::parse("acc-mgr"), Some(Role::AccountManager));
        assert_eq!(Role::parse("HR "), Some(Role::Hr));
        assert_eq!(Role::parse("ceo"), None);
    }

    #[test]
    fn approver_roles_have_endpoint_segments() {
        assert_eq!(Role::Manager.approval_segment(), Some("mgr"));
        assert_eq!(Role::Hr.approval_segment(), Some("hr"));
        assert_eq!(Role::AccountManager.approval_segment(), Some("acc-mgr"));
        assert_eq!(Role::Employee.approval_segment(), None);
    }

    #[test]
    fn id_fields_match_backend_form_names() {
        assert_eq!(Role::Manager.id_field(), "manager_id");
        assert_eq!(Role::Hr.id_field(), "hr_id");
        assert_eq!(Role::AccountManager.id_field(), "acc_mgr_id");
    }
}
