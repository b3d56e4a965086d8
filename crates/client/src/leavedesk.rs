use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info};

use hrflow_core::domain::request::{EmployeeId, LeaveRequest, RequestId};
use hrflow_core::errors::WorkflowError;
use hrflow_core::flows::engine::{FlowEngine, LeaveFlow};
use hrflow_core::flows::states::{ApprovalAction, LeaveStage, TransitionOutcome};
use hrflow_core::gate::{actionable_leaves, visible_leaves, PeriodFilter};
use hrflow_core::history::{HistoryEntry, HistorySink};
use hrflow_core::leave::{LeaveBalance, LeaveDraft};
use hrflow_core::notify::{Notice, Notifier};
use hrflow_core::session::Session;

use crate::api::{ApprovalApi, ClientError};
use crate::submitter::SubmitError;

/// An approver's leave screens: the queue awaiting their stage plus the
/// reviewed history. Leave actions carry no reason on the wire; the
/// two-stage flow (manager first, then HR) is enforced before any call.
pub struct LeaveDesk<A> {
    session: Session,
    api: A,
    engine: FlowEngine<LeaveFlow>,
    history: Arc<dyn HistorySink>,
    notifier: Arc<dyn Notifier>,
    filter: PeriodFilter,
    pending: Vec<LeaveRequest>,
    reviewed: Vec<LeaveRequest>,
    in_flight: Mutex<HashSet<i64>>,
}

impl<A> LeaveDesk<A>
where
    A: ApprovalApi,
{
    pub fn new(
        session: Session,
        api: A,
        history: Arc<dyn HistorySink>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            session,
            api,
            engine: FlowEngine::new(LeaveFlow),
            history,
            notifier,
            filter: PeriodFilter::ALL,
            pending: Vec::new(),
            reviewed: Vec::new(),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn pending(&self) -> &[LeaveRequest] {
        &self.pending
    }

    pub fn reviewed(&self) -> &[LeaveRequest] {
        &self.reviewed
    }

    pub fn set_filter(&mut self, filter: PeriodFilter) {
        self.filter = filter;
    }

    pub async fn refresh(&mut self) -> Result<(), SubmitError> {
        let actor_id = match self.session.require_actor_id() {
            Ok(actor_id) => actor_id,
            Err(error) => {
                self.notifier.notify(Notice::error(error.user_message()));
                return Err(error.into());
            }
        };
        let role = self.session.role();

        let fetched = async {
            let pending = self.api.pending_leaves(&self.session, actor_id).await?;
            let reviewed = self.api.leave_requests(&self.session, actor_id).await?;
            Ok::<_, ClientError>((pending, reviewed))
        }
        .await;
        let (pending, reviewed) = match fetched {
            Ok(lists) => lists,
            Err(error) => {
                let error = SubmitError::fetch("Failed to fetch leave data", error);
                self.notifier.notify(Notice::error(error.user_message()));
                return Err(error);
            }
        };

        debug!(
            role = role.as_str(),
            pending = pending.len(),
            reviewed = reviewed.len(),
            "refreshed leave desk"
        );

        // The server scopes both lists; the stage gate re-checks that each
        // pending row really awaits this role.
        self.pending = actionable_leaves(&pending, role);
        self.reviewed = visible_leaves(&reviewed, &self.filter);
        Ok(())
    }

    /// Approve or reject one pending leave at the actor's stage, then
    /// refetch both lists.
    pub async fn decide(
        &mut self,
        leave_id: RequestId,
        action: ApprovalAction,
        actor_name: &str,
    ) -> Result<TransitionOutcome<LeaveStage>, SubmitError> {
        let result = self.try_decide(leave_id, action, actor_name).await;
        match &result {
            Ok(_) => self.notifier.notify(Notice::success(format!(
                "Status updated to \"{}\"",
                action.as_wire()
            ))),
            Err(error) => self.notifier.notify(Notice::error(error.user_message())),
        }
        if result.is_ok() {
            self.refresh().await?;
        }
        result
    }

    async fn try_decide(
        &self,
        leave_id: RequestId,
        action: ApprovalAction,
        actor_name: &str,
    ) -> Result<TransitionOutcome<LeaveStage>, SubmitError> {
        let Some(request) = self.pending.iter().find(|row| row.id == leave_id) else {
            return Err(WorkflowError::RequestNotFound { request_id: leave_id.0 }.into());
        };

        let role = self.session.role();
        let outcome = self
            .engine
            .apply(&request.stage(), role, action)
            .map_err(WorkflowError::from)?;

        self.begin(leave_id)?;
        let sent = self.api.leave_action(&self.session, leave_id, action).await;
        self.finish(leave_id);
        sent?;

        self.history.append(HistoryEntry::new(
            leave_id.to_string(),
            actor_name,
            role,
            action,
            None,
        ));
        info!(
            leave_id = %leave_id,
            from = outcome.from.as_code(),
            to = outcome.to.as_code(),
            "leave status updated"
        );
        Ok(outcome)
    }

    fn begin(&self, leave_id: RequestId) -> Result<(), WorkflowError> {
        let mut in_flight = self.lock();
        if in_flight.insert(leave_id.0) {
            Ok(())
        } else {
            Err(WorkflowError::DuplicateSubmission { request_id: leave_id.0 })
        }
    }

    fn finish(&self, leave_id: RequestId) {
        self.lock().remove(&leave_id.0);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<i64>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The employee side: balance lookup, validated application, own history.
pub struct LeavePlanner<A> {
    session: Session,
    api: A,
    notifier: Arc<dyn Notifier>,
}

impl<A> LeavePlanner<A>
where
    A: ApprovalApi,
{
    pub fn new(session: Session, api: A, notifier: Arc<dyn Notifier>) -> Self {
        Self { session, api, notifier }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn balance(&self) -> Result<LeaveBalance, SubmitError> {
        let employee_id = self.employee_id()?;
        match self.api.leave_balance(&self.session, employee_id).await {
            Ok(balance) => Ok(balance),
            Err(error) => {
                let error =
                    SubmitError::fetch("Failed to fetch summary. Please try again later.", error);
                self.notifier.notify(Notice::error(error.user_message()));
                Err(error)
            }
        }
    }

    /// Validate against the current balance and submit. Validation failures
    /// never reach the network; the working-day count is what the backend
    /// debits.
    pub async fn apply(&self, draft: &LeaveDraft) -> Result<f64, SubmitError> {
        let result = self.try_apply(draft).await;
        match &result {
            Ok(_) => self.notifier.notify(Notice::success("Leave applied successfully")),
            Err(error) => self.notifier.notify(Notice::error(error.user_message())),
        }
        result
    }

    async fn try_apply(&self, draft: &LeaveDraft) -> Result<f64, SubmitError> {
        let employee_id = self.employee_id()?;
        let balance = self.api.leave_balance(&self.session, employee_id).await?;
        let days = draft.validate(&balance)?;

        self.api.apply_leave(&self.session, employee_id, draft, days).await?;
        info!(employee_id = %employee_id, days, "leave application submitted");
        Ok(days)
    }

    pub async fn my_leaves(
        &self,
        filter: &PeriodFilter,
    ) -> Result<Vec<LeaveRequest>, SubmitError> {
        let employee_id = self.employee_id()?;
        match self.api.all_leaves(&self.session, employee_id).await {
            Ok(all) => Ok(visible_leaves(&all, filter)),
            Err(error) => {
                let error = SubmitError::fetch(
                    "Failed to fetch past leaves. Please try again later.",
                    error,
                );
                self.notifier.notify(Notice::error(error.user_message()));
                Err(error)
            }
        }
    }

    fn employee_id(&self) -> Result<EmployeeId, SubmitError> {
        let actor_id = self.session.require_actor_id()?;
        Ok(EmployeeId(actor_id.0))
    }
}
