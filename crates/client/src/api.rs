use async_trait::async_trait;
use thiserror::Error;

use hrflow_core::domain::actor::{ActorId, Role};
use hrflow_core::domain::request::{EmployeeId, ExpenseRequest, LeaveRequest, RequestId};
use hrflow_core::flows::states::ApprovalAction;
use hrflow_core::gate::PeriodFilter;
use hrflow_core::leave::{LeaveBalance, LeaveDraft};
use hrflow_core::session::Session;

/// Failures crossing the HTTP boundary. Backend rejections carry the
/// server's own message (FastAPI `detail` where present) so it can be shown
/// verbatim; transport and decode failures carry diagnostics only.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("request to backend failed: {0}")]
    Transport(String),
    #[error("backend rejected the request (HTTP {status}): {message}")]
    Backend { status: u16, message: String },
    #[error("backend returned a malformed payload: {0}")]
    Decode(String),
    #[error("{} has no {operation} endpoint", role.display_name())]
    UnsupportedRole { role: Role, operation: &'static str },
}

/// One approver's decision on one expense, ready for the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpenseDecision {
    pub request_id: RequestId,
    pub action: ApprovalAction,
    pub reason: String,
    pub role: Role,
    pub actor_id: ActorId,
}

/// The backend surface the workflow components run against. One production
/// implementation (`HttpApprovalApi`) and one in-memory recording fake
/// (`RecordingApi`); all screens and tests go through this trait.
#[async_trait]
pub trait ApprovalApi: Send + Sync {
    /// Role-scoped expense list for an approver, optionally narrowed to a
    /// calendar month/year.
    async fn list_expenses(
        &self,
        session: &Session,
        actor_id: ActorId,
        filter: &PeriodFilter,
    ) -> Result<Vec<ExpenseRequest>, ClientError>;

    /// The employee's own submission history.
    async fn my_expenses(
        &self,
        session: &Session,
        employee_id: EmployeeId,
        filter: &PeriodFilter,
    ) -> Result<Vec<ExpenseRequest>, ClientError>;

    async fn update_expense_status(
        &self,
        session: &Session,
        decision: &ExpenseDecision,
    ) -> Result<(), ClientError>;

    /// Leaves awaiting this approver's stage.
    async fn pending_leaves(
        &self,
        session: &Session,
        actor_id: ActorId,
    ) -> Result<Vec<LeaveRequest>, ClientError>;

    /// Every leave routed through this approver, any stage.
    async fn leave_requests(
        &self,
        session: &Session,
        actor_id: ActorId,
    ) -> Result<Vec<LeaveRequest>, ClientError>;

    async fn leave_action(
        &self,
        session: &Session,
        leave_id: RequestId,
        action: ApprovalAction,
    ) -> Result<(), ClientError>;

    async fn apply_leave(
        &self,
        session: &Session,
        employee_id: EmployeeId,
        draft: &LeaveDraft,
        no_of_days: f64,
    ) -> Result<(), ClientError>;

    async fn all_leaves(
        &self,
        session: &Session,
        employee_id: EmployeeId,
    ) -> Result<Vec<LeaveRequest>, ClientError>;

    async fn leave_balance(
        &self,
        session: &Session,
        employee_id: EmployeeId,
    ) -> Result<LeaveBalance, ClientError>;
}
