use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use hrflow_core::domain::actor::ActorId;
use hrflow_core::domain::request::{
    EmployeeId, ExpenseRequest, LeaveRequest, LeaveType, RequestId,
};
use hrflow_core::flows::states::ApprovalAction;
use hrflow_core::gate::PeriodFilter;
use hrflow_core::leave::{LeaveBalance, LeaveDraft};
use hrflow_core::session::Session;

use crate::api::{ApprovalApi, ClientError, ExpenseDecision};

/// Every backend call a `RecordingApi` observed, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum ApiCall {
    ListExpenses { actor_id: ActorId, filter: PeriodFilter },
    MyExpenses { employee_id: EmployeeId, filter: PeriodFilter },
    UpdateExpenseStatus { decision: ExpenseDecision },
    PendingLeaves { actor_id: ActorId },
    LeaveRequests { actor_id: ActorId },
    LeaveAction { leave_id: RequestId, action: ApprovalAction },
    ApplyLeave { employee_id: EmployeeId, leave_type: LeaveType, no_of_days: f64 },
    AllLeaves { employee_id: EmployeeId },
    LeaveBalance { employee_id: EmployeeId },
}

/// In-memory [`ApprovalApi`] for tests: serves scripted rows, records every
/// call, and can fail the next mutating call or fetch with a scripted
/// error. No network traffic ever leaves it.
#[derive(Default)]
pub struct RecordingApi {
    state: Mutex<RecordingState>,
}

#[derive(Default)]
struct RecordingState {
    expenses: Vec<ExpenseRequest>,
    my_expenses: Vec<ExpenseRequest>,
    pending_leaves: Vec<LeaveRequest>,
    leave_requests: Vec<LeaveRequest>,
    all_leaves: Vec<LeaveRequest>,
    balance: LeaveBalance,
    fail_next: Option<ClientError>,
    fail_next_fetch: Option<ClientError>,
    calls: Vec<ApiCall>,
}

impl RecordingApi {
    pub fn set_expenses(&self, expenses: Vec<ExpenseRequest>) {
        self.lock().expenses = expenses;
    }

    pub fn set_my_expenses(&self, expenses: Vec<ExpenseRequest>) {
        self.lock().my_expenses = expenses;
    }

    pub fn set_pending_leaves(&self, leaves: Vec<LeaveRequest>) {
        self.lock().pending_leaves = leaves;
    }

    pub fn set_leave_requests(&self, leaves: Vec<LeaveRequest>) {
        self.lock().leave_requests = leaves;
    }

    pub fn set_all_leaves(&self, leaves: Vec<LeaveRequest>) {
        self.lock().all_leaves = leaves;
    }

    pub fn set_balance(&self, balance: LeaveBalance) {
        self.lock().balance = balance;
    }

    /// Fail the next mutating call (status update, leave action, or leave
    /// application) with `error`, then recover.
    pub fn fail_next(&self, error: ClientError) {
        self.lock().fail_next = Some(error);
    }

    /// Fail the next list or balance fetch with `error`, then recover.
    pub fn fail_next_fetch(&self, error: ClientError) {
        self.lock().fail_next_fetch = Some(error);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    /// The status updates observed so far.
    pub fn updates(&self) -> Vec<ExpenseDecision> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                ApiCall::UpdateExpenseStatus { decision } => Some(decision.clone()),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RecordingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take_failure(state: &mut RecordingState) -> Result<(), ClientError> {
        match state.fail_next.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn take_fetch_failure(state: &mut RecordingState) -> Result<(), ClientError> {
        match state.fail_next_fetch.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ApprovalApi for RecordingApi {
    async fn list_expenses(
        &self,
        _session: &Session,
        actor_id: ActorId,
        filter: &PeriodFilter,
    ) -> Result<Vec<ExpenseRequest>, ClientError> {
        let mut state = self.lock();
        state.calls.push(ApiCall::ListExpenses { actor_id, filter: *filter });
        Self::take_fetch_failure(&mut state)?;
        Ok(state.expenses.clone())
    }

    async fn my_expenses(
        &self,
        _session: &Session,
        employee_id: EmployeeId,
        filter: &PeriodFilter,
    ) -> Result<Vec<ExpenseRequest>, ClientError> {
        let mut state = self.lock();
        state.calls.push(ApiCall::MyExpenses { employee_id, filter: *filter });
        Self::take_fetch_failure(&mut state)?;
        Ok(state.my_expenses.clone())
    }

    async fn update_expense_status(
        &self,
        _session: &Session,
        decision: &ExpenseDecision,
    ) -> Result<(), ClientError> {
        let mut state = self.lock();
        state.calls.push(ApiCall::UpdateExpenseStatus { decision: decision.clone() });
        Self::take_failure(&mut state)
    }

    async fn pending_leaves(
        &self,
        _session: &Session,
        actor_id: ActorId,
    ) -> Result<Vec<LeaveRequest>, ClientError> {
        let mut state = self.lock();
        state.calls.push(ApiCall::PendingLeaves { actor_id });
        Self::take_fetch_failure(&mut state)?;
        Ok(state.pending_leaves.clone())
    }

    async fn leave_requests(
        &self,
        _session: &Session,
        actor_id: ActorId,
    ) -> Result<Vec<LeaveRequest>, ClientError> {
        let mut state = self.lock();
        state.calls.push(ApiCall::LeaveRequests { actor_id });
        Self::take_fetch_failure(&mut state)?;
        Ok(state.leave_requests.clone())
    }

    async fn leave_action(
        &self,
        _session: &Session,
        leave_id: RequestId,
        action: ApprovalAction,
    ) -> Result<(), ClientError> {
        let mut state = self.lock();
        state.calls.push(ApiCall::LeaveAction { leave_id, action });
        Self::take_failure(&mut state)
    }

    async fn apply_leave(
        &self,
        _session: &Session,
        employee_id: EmployeeId,
        draft: &LeaveDraft,
        no_of_days: f64,
    ) -> Result<(), ClientError> {
        let mut state = self.lock();
        state.calls.push(ApiCall::ApplyLeave {
            employee_id,
            leave_type: draft.leave_type,
            no_of_days,
        });
        Self::take_failure(&mut state)
    }

    async fn all_leaves(
        &self,
        _session: &Session,
        employee_id: EmployeeId,
    ) -> Result<Vec<LeaveRequest>, ClientError> {
        let mut state = self.lock();
        state.calls.push(ApiCall::AllLeaves { employee_id });
        Self::take_fetch_failure(&mut state)?;
        Ok(state.all_leaves.clone())
    }

    async fn leave_balance(
        &self,
        _session: &Session,
        employee_id: EmployeeId,
    ) -> Result<LeaveBalance, ClientError> {
        let mut state = self.lock();
        state.calls.push(ApiCall::LeaveBalance { employee_id });
        Self::take_fetch_failure(&mut state)?;
        Ok(state.balance)
    }
}
