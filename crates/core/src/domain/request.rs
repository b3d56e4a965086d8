use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::domain::actor::{ActorId, Role};
use crate::flows::states::LeaveStage;
use crate::status::{ExpenseStatus, LeaveStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub i64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmployeeId(pub i64);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Expense category as offered by the submission form. Codes outside the
/// closed set pass through unchanged, mirroring the status resolver.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExpenseCategory {
    Travel,
    Food,
    Accommodation,
    OfficeSupplies,
    Training,
    Gifts,
    Miscellaneous,
    Other,
    Unknown(String),
}

impl ExpenseCategory {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Travel" => Self::Travel,
            "Food" => Self::Food,
            "Accommodation" => Self::Accommodation,
            "Office Supplies" => Self::OfficeSupplies,
            "Training" => Self::Training,
            "Gifts" => Self::Gifts,
            "Miscellaneous" => Self::Miscellaneous,
            "Other" => Self::Other,
            other => Self::Unknown(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Travel => "Travel",
            Self::Food => "Food",
            Self::Accommodation => "Accommodation",
            Self::OfficeSupplies => "Office Supplies",
            Self::Training => "Training",
            Self::Gifts => "Gifts",
            Self::Miscellaneous => "Miscellaneous",
            Self::Other => "Other",
            Self::Unknown(raw) => raw,
        }
    }
}

impl serde::Serialize for ExpenseCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for ExpenseCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// An expense request moving through the three-approver workflow.
///
/// Field names and aliases follow the backend's JSON rows; routing ids are
/// denormalized from the requester's profile and owned by the (external) HR
/// assignment process — read-only here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRequest {
    pub id: RequestId,
    #[serde(default)]
    pub employee_id: Option<EmployeeId>,
    #[serde(rename = "employeeName", alias = "employee_name")]
    pub employee_name: String,
    #[serde(rename = "employeeEmail", alias = "employee_email", default)]
    pub employee_email: String,
    pub category: ExpenseCategory,
    pub amount: Decimal,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tax_included: bool,
    pub status: ExpenseStatus,
    /// Reason captured on the most recent approve/reject; the full record
    /// lives in the history log.
    #[serde(default)]
    pub reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub expense_date: Option<NaiveDate>,
    #[serde(default)]
    pub attachment: Option<String>,
    #[serde(default)]
    pub manager_id: Option<ActorId>,
    #[serde(default)]
    pub hr_id: Option<ActorId>,
    #[serde(default)]
    pub acc_mgr_id: Option<ActorId>,
}

impl ExpenseRequest {
    /// The routing id consulted when scoping visibility to `role`.
    /// Rows from role-scoped list endpoints may omit the field, in which
    /// case the server has already applied the scope.
    pub fn routing_id_for(&self, role: Role) -> Option<ActorId> {
        match role {
            Role::Employee => self.employee_id.map(|EmployeeId(id)| ActorId(id)),
            Role::Manager => self.manager_id,
            Role::Hr => self.hr_id,
            Role::AccountManager => self.acc_mgr_id,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeaveType {
    Sick,
    Casual,
    Annual,
}

impl LeaveType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "Sick" => Some(Self::Sick),
            "Casual" => Some(Self::Casual),
            "Annual" => Some(Self::Annual),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sick => "Sick",
            Self::Casual => "Casual",
            Self::Annual => "Annual",
        }
    }
}

/// A leave request as returned by the leave endpoints. Per-stage statuses
/// come straight from the backend; `stage()` folds them into the two-stage
/// flow state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    #[serde(alias = "leave_id")]
    pub id: RequestId,
    pub employee_id: EmployeeId,
    #[serde(default)]
    pub employee_name: String,
    #[serde(default)]
    pub employee_email: String,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub no_of_days: f64,
    #[serde(default)]
    pub reason: String,
    #[serde(default = "LeaveStatus::default_pending")]
    pub manager_status: LeaveStatus,
    #[serde(default = "LeaveStatus::default_pending")]
    pub hr_status: LeaveStatus,
    #[serde(alias = "status", default = "LeaveStatus::default_pending")]
    pub final_status: LeaveStatus,
}

impl LeaveStatus {
    fn default_pending() -> Self {
        Self::Pending
    }
}

impl LeaveRequest {
    pub fn stage(&self) -> LeaveStage {
        LeaveStage::from_statuses(&self.manager_status, &self.hr_status)
    }
}

#[cfg(test)]
mod tests {
    use super::{ExpenseCategory, ExpenseRequest, LeaveRequest};
    use crate::domain::actor::{ActorId, Role};
    use crate::flows::states::LeaveStage;
    use crate::status::ExpenseStatus;

    #[test]
    fn expense_row_deserializes_from_backend_shape() {
        let row = serde_json::json!({
            "id": 118,
            "employee_id": 7,
            "employeeName": "Asha Pillai",
            "employeeEmail": "asha@corp.example",
            "category": "Travel",
            "amount": "412.50",
            "currency": "USD",
            "description": "Client visit",
            "tax_included": true,
            "status": "pending_manager_approval",
            "submitted_at": "2025-03-14T09:30:00Z",
            "manager_id": 42
        });

        let expense: ExpenseRequest = serde_json::from_value(row).expect("row deserializes");
        assert_eq!(expense.id.0, 118);
        assert_eq!(expense.status, ExpenseStatus::PendingManagerApproval);
        assert_eq!(expense.category, ExpenseCategory::Travel);
        assert_eq!(expense.routing_id_for(Role::Manager), Some(ActorId(42)));
        assert_eq!(expense.routing_id_for(Role::Hr), None);
        assert!(expense.reason.is_none());
    }

    #[test]
    fn unknown_category_is_preserved() {
        let category = ExpenseCategory::parse("Team Offsite");
        assert_eq!(category.as_str(), "Team Offsite");
    }

    #[test]
    fn leave_row_accepts_both_list_shapes() {
        // `leave-requests` shape (flat, leave_id + final_status).
        let row = serde_json::json!({
            "leave_id": 31,
            "employee_id": 7,
            "employee_name": "Asha Pillai",
            "leave_type": "Casual",
            "reason": "family event",
            "start_date": "2025-03-03",
            "end_date": "2025-03-05",
            "no_of_days": 3.0,
            "manager_status": "Approved",
            "hr_status": "Pending",
            "final_status": "Pending"
        });

        let leave: LeaveRequest = serde_json::from_value(row).expect("row deserializes");
        assert_eq!(leave.id.0, 31);
        assert_eq!(leave.stage(), LeaveStage::PendingHr);
    }
}
