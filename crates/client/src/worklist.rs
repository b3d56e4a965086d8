use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use hrflow_core::domain::request::{EmployeeId, ExpenseRequest, RequestId};
use hrflow_core::errors::WorkflowError;
use hrflow_core::flows::states::{ApprovalAction, TransitionOutcome};
use hrflow_core::gate::{visible_expenses, PeriodFilter};
use hrflow_core::history::HistorySink;
use hrflow_core::notify::{Notice, Notifier};
use hrflow_core::session::Session;
use hrflow_core::status::ExpenseStatus;

use crate::api::ApprovalApi;
use crate::submitter::{ActionSubmitter, SubmitError};

/// An action-plus-reason selection a row holds until it is saved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingEdit {
    pub action: ApprovalAction,
    pub reason: String,
}

/// One actor's expense screen: fetch, filter, edit, save, refetch. Approvers
/// see the rows routed to them; employees see their own history (read-only
/// since no expense status is ever pending on the employee).
pub struct ExpenseWorklist<A> {
    session: Session,
    submitter: ActionSubmitter<A>,
    notifier: Arc<dyn Notifier>,
    filter: PeriodFilter,
    rows: Vec<ExpenseRequest>,
    edits: HashMap<i64, PendingEdit>,
}

impl<A> ExpenseWorklist<A>
where
    A: ApprovalApi,
{
    /// Opens on the current calendar month, like the approval screens.
    pub fn new(
        session: Session,
        api: A,
        history: Arc<dyn HistorySink>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            session,
            submitter: ActionSubmitter::new(api, history),
            notifier,
            filter: PeriodFilter::current(Utc::now()),
            rows: Vec::new(),
            edits: HashMap::new(),
        }
    }

    pub fn api(&self) -> &A {
        self.submitter.api()
    }

    pub fn rows(&self) -> &[ExpenseRequest] {
        &self.rows
    }

    pub fn filter(&self) -> PeriodFilter {
        self.filter
    }

    /// Change the month/year window. Takes effect on the next `refresh`;
    /// `PeriodFilter::ALL` restores the unfiltered list.
    pub fn set_filter(&mut self, filter: PeriodFilter) {
        self.filter = filter;
    }

    /// Stage an action and reason on a row. Nothing is sent until `save`;
    /// re-editing replaces the previous selection.
    pub fn edit(&mut self, request_id: RequestId, action: ApprovalAction, reason: impl Into<String>) {
        self.edits.insert(request_id.0, PendingEdit { action, reason: reason.into() });
    }

    pub fn pending_edit(&self, request_id: RequestId) -> Option<&PendingEdit> {
        self.edits.get(&request_id.0)
    }

    /// Submit the staged edit for a row. The edit is cleared on success and
    /// kept for retry on failure.
    pub async fn save(
        &mut self,
        request_id: RequestId,
        actor_name: &str,
    ) -> Result<TransitionOutcome<ExpenseStatus>, SubmitError> {
        let Some(edit) = self.edits.get(&request_id.0).cloned() else {
            let error = WorkflowError::NoPendingEdit { request_id: request_id.0 };
            self.notifier.notify(Notice::error(error.user_message()));
            return Err(error.into());
        };
        self.decide(request_id, edit.action, &edit.reason, actor_name).await
    }

    /// Actions the signed-in actor may take on a row right now.
    pub fn legal_actions(&self, request_id: RequestId) -> &'static [ApprovalAction] {
        self.rows
            .iter()
            .find(|row| row.id == request_id)
            .map(|row| row.status.legal_actions(self.session.role()))
            .unwrap_or(&[])
    }

    /// Refetch from the backend and re-apply the actor gate. The server
    /// scopes the list; the gate re-checks routing ids and the window so a
    /// stale or over-broad response never widens what is shown.
    pub async fn refresh(&mut self) -> Result<(), SubmitError> {
        let actor_id = match self.session.require_actor_id() {
            Ok(actor_id) => actor_id,
            Err(error) => {
                self.notifier.notify(Notice::error(error.user_message()));
                return Err(error.into());
            }
        };
        let role = self.session.role();

        let fetched = if role.is_approver() {
            self.api().list_expenses(&self.session, actor_id, &self.filter).await
        } else {
            self.api().my_expenses(&self.session, EmployeeId(actor_id.0), &self.filter).await
        };
        let fetched = match fetched {
            Ok(rows) => rows,
            Err(error) => {
                let error = SubmitError::fetch("Failed to load expenses", error);
                self.notifier.notify(Notice::error(error.user_message()));
                return Err(error);
            }
        };

        debug!(role = role.as_str(), fetched = fetched.len(), "refreshed expense worklist");
        self.rows = visible_expenses(&fetched, role, actor_id, &self.filter);
        Ok(())
    }

    /// Apply one decision to a row. On success the whole list is refetched
    /// rather than patched in place, so concurrent approvals by other actors
    /// become visible at the same time.
    pub async fn decide(
        &mut self,
        request_id: RequestId,
        action: ApprovalAction,
        reason: &str,
        actor_name: &str,
    ) -> Result<TransitionOutcome<ExpenseStatus>, SubmitError> {
        let Some(request) = self.rows.iter().find(|row| row.id == request_id).cloned() else {
            let error = WorkflowError::RequestNotFound { request_id: request_id.0 };
            self.notifier.notify(Notice::error(error.user_message()));
            return Err(error.into());
        };

        match self.submitter.submit(&self.session, actor_name, &request, action, reason).await {
            Ok(outcome) => {
                self.edits.remove(&request_id.0);
                self.notifier.notify(Notice::success(format!(
                    "Status updated to \"{}\"",
                    outcome.to.label()
                )));
                self.refresh().await?;
                Ok(outcome)
            }
            Err(error) => {
                self.notifier.notify(Notice::error(error.user_message()));
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::ExpenseWorklist;
    use crate::api::ClientError;
    use crate::recording::{ApiCall, RecordingApi};
    use hrflow_core::domain::actor::{ActorId, Role};
    use hrflow_core::domain::request::{EmployeeId, ExpenseCategory, ExpenseRequest, RequestId};
    use hrflow_core::flows::states::ApprovalAction;
    use hrflow_core::gate::PeriodFilter;
    use hrflow_core::history::InMemoryHistorySink;
    use hrflow_core::notify::{InMemoryNotifier, Severity};
    use hrflow_core::session::Session;
    use hrflow_core::status::ExpenseStatus;

    fn expense(id: i64, manager: i64, status: ExpenseStatus) -> ExpenseRequest {
        ExpenseRequest {
            id: RequestId(id),
            employee_id: Some(EmployeeId(9)),
            employee_name: "Priya Nair".to_owned(),
            employee_email: String::new(),
            category: ExpenseCategory::Food,
            amount: Decimal::new(4_800, 2),
            currency: "USD".to_owned(),
            description: String::new(),
            tax_included: false,
            status,
            reason: None,
            submitted_at: Utc.with_ymd_and_hms(2026, 8, 10, 12, 0, 0).single().expect("timestamp"),
            expense_date: None,
            attachment: None,
            manager_id: Some(ActorId(manager)),
            hr_id: None,
            acc_mgr_id: None,
        }
    }

    fn manager_worklist(
        api: RecordingApi,
        notifier: Arc<InMemoryNotifier>,
    ) -> ExpenseWorklist<RecordingApi> {
        ExpenseWorklist::new(
            Session::new(Role::Manager, Some(ActorId(42)), "token"),
            api,
            Arc::new(InMemoryHistorySink::default()),
            notifier,
        )
    }

    #[tokio::test]
    async fn refresh_scopes_rows_to_the_assigned_manager() {
        let api = RecordingApi::default();
        api.set_expenses(vec![
            expense(1, 42, ExpenseStatus::PendingManagerApproval),
            expense(2, 77, ExpenseStatus::PendingManagerApproval),
        ]);
        let mut worklist = manager_worklist(api, Arc::new(InMemoryNotifier::default()));
        worklist.set_filter(PeriodFilter::ALL);

        worklist.refresh().await.expect("refresh");

        let ids: Vec<i64> = worklist.rows().iter().map(|row| row.id.0).collect();
        assert_eq!(ids, vec![1]);
    }

    #[tokio::test]
    async fn failed_fetch_reports_the_load_message_not_the_update_one() {
        let api = RecordingApi::default();
        api.fail_next_fetch(ClientError::Transport("connection refused".to_owned()));
        let notifier = Arc::new(InMemoryNotifier::default());
        let mut worklist = manager_worklist(api, Arc::clone(&notifier));

        let error = worklist.refresh().await.expect_err("fetch fails");
        assert_eq!(error.user_message(), "Failed to load expenses");

        let notice = notifier.last().expect("a notice was posted");
        assert_eq!(notice.severity, Severity::Error);
        assert_eq!(notice.message, "Failed to load expenses");
    }

    #[tokio::test]
    async fn successful_decision_notifies_and_refetches() {
        let api = RecordingApi::default();
        api.set_expenses(vec![expense(118, 42, ExpenseStatus::PendingManagerApproval)]);
        let notifier = Arc::new(InMemoryNotifier::default());
        let mut worklist = manager_worklist(api, Arc::clone(&notifier));
        worklist.set_filter(PeriodFilter::ALL);
        worklist.refresh().await.expect("initial fetch");

        worklist
            .decide(RequestId(118), ApprovalAction::Approve, "receipts attached", "Dana Whitfield")
            .await
            .expect("decision");

        let calls = worklist.api().calls();
        let list_calls = calls
            .iter()
            .filter(|call| matches!(call, ApiCall::ListExpenses { .. }))
            .count();
        assert_eq!(list_calls, 2, "one initial fetch plus one refetch after the update");

        let last = notifier.last().expect("a notice was posted");
        assert_eq!(last.severity, Severity::Success);
        assert_eq!(last.message, "Status updated to \"Pending HR Approval\"");
    }

    #[tokio::test]
    async fn saved_edit_clears_on_success_and_survives_failure() {
        let api = RecordingApi::default();
        api.set_expenses(vec![expense(118, 42, ExpenseStatus::PendingManagerApproval)]);
        api.fail_next(crate::api::ClientError::Transport("connection reset".to_owned()));
        let mut worklist = manager_worklist(api, Arc::new(InMemoryNotifier::default()));
        worklist.set_filter(PeriodFilter::ALL);
        worklist.refresh().await.expect("initial fetch");

        worklist.edit(RequestId(118), ApprovalAction::Reject, "Missing receipt");

        let error = worklist.save(RequestId(118), "Dana Whitfield").await.expect_err("transport");
        assert_eq!(error.user_message(), "Failed to update status");
        assert_eq!(
            worklist.pending_edit(RequestId(118)).map(|edit| edit.reason.as_str()),
            Some("Missing receipt"),
            "failed saves keep the selection for retry"
        );

        worklist.save(RequestId(118), "Dana Whitfield").await.expect("retry succeeds");
        assert!(worklist.pending_edit(RequestId(118)).is_none());
    }

    #[tokio::test]
    async fn saving_without_a_selection_is_refused() {
        let api = RecordingApi::default();
        api.set_expenses(vec![expense(118, 42, ExpenseStatus::PendingManagerApproval)]);
        let notifier = Arc::new(InMemoryNotifier::default());
        let mut worklist = manager_worklist(api, Arc::clone(&notifier));
        worklist.set_filter(PeriodFilter::ALL);
        worklist.refresh().await.expect("refresh");

        let error = worklist.save(RequestId(118), "Dana Whitfield").await.expect_err("no edit");
        assert_eq!(error.user_message(), "Please select an action first");
        assert!(worklist.api().updates().is_empty());
    }

    #[tokio::test]
    async fn unknown_row_produces_an_error_notice_and_no_update() {
        let api = RecordingApi::default();
        let notifier = Arc::new(InMemoryNotifier::default());
        let mut worklist = manager_worklist(api, Arc::clone(&notifier));

        let result = worklist
            .decide(RequestId(999), ApprovalAction::Reject, "nope", "Dana Whitfield")
            .await;

        assert!(result.is_err());
        assert!(worklist.api().updates().is_empty());
        assert_eq!(notifier.last().expect("notice").severity, Severity::Error);
    }

    #[tokio::test]
    async fn legal_actions_are_empty_off_the_actors_stage() {
        let api = RecordingApi::default();
        api.set_expenses(vec![
            expense(1, 42, ExpenseStatus::PendingManagerApproval),
            expense(2, 42, ExpenseStatus::PendingHrApproval),
            expense(3, 42, ExpenseStatus::HrApproved),
        ]);
        let mut worklist = manager_worklist(api, Arc::new(InMemoryNotifier::default()));
        worklist.set_filter(PeriodFilter::ALL);
        worklist.refresh().await.expect("refresh");

        assert_eq!(
            worklist.legal_actions(RequestId(1)),
            &[ApprovalAction::Approve, ApprovalAction::Reject]
        );
        assert!(worklist.legal_actions(RequestId(2)).is_empty());
        assert!(worklist.legal_actions(RequestId(3)).is_empty());
    }

    #[tokio::test]
    async fn employee_refresh_uses_the_personal_history_endpoint() {
        let api = RecordingApi::default();
        api.set_my_expenses(vec![expense(5, 42, ExpenseStatus::Approved)]);
        let mut worklist = ExpenseWorklist::new(
            Session::new(Role::Employee, Some(ActorId(9)), "token"),
            api,
            Arc::new(InMemoryHistorySink::default()),
            Arc::new(InMemoryNotifier::default()),
        );
        worklist.set_filter(PeriodFilter::ALL);

        worklist.refresh().await.expect("refresh");

        assert!(matches!(
            worklist.api().calls()[0],
            ApiCall::MyExpenses { employee_id: EmployeeId(9), .. }
        ));
        assert_eq!(worklist.rows().len(), 1);
    }
}
