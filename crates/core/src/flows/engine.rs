use thiserror::Error;

use crate::domain::actor::Role;
use crate::flows::states::{ApprovalAction, LeaveStage, TransitionOutcome};
use crate::history::{HistoryEntry, HistorySink};
use crate::status::ExpenseStatus;

/// A workflow's transition table: `(current, role, action) -> next`.
/// Implementations are pure and independently testable; the same table backs
/// both client-side validation and the audit trail.
pub trait FlowDefinition {
    type State: Clone;

    fn initial_state(&self) -> Self::State;

    fn transition(
        &self,
        current: &Self::State,
        role: Role,
        action: ApprovalAction,
    ) -> Result<TransitionOutcome<Self::State>, FlowTransitionError>;
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlowTransitionError {
    #[error("{role} cannot apply `{}` from status `{state}`", action.as_wire())]
    InvalidTransition { state: String, role: Role, action: ApprovalAction },
}

/// Expense flow: Manager -> HR -> Account Manager -> approved, with a
/// terminal rejection variant at each stage. Transitions are monotonic;
/// terminal states accept nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExpenseFlow;

impl FlowDefinition for ExpenseFlow {
    type State = ExpenseStatus;

    fn initial_state(&self) -> ExpenseStatus {
        ExpenseStatus::PendingManagerApproval
    }

    fn transition(
        &self,
        current: &ExpenseStatus,
        role: Role,
        action: ApprovalAction,
    ) -> Result<TransitionOutcome<ExpenseStatus>, FlowTransitionError> {
        use ApprovalAction::{Approve, Reject};
        use ExpenseStatus::{
            AccMgrRejected, Approved, HrRejected, MgrRejected, PendingAccountMgrApproval,
            PendingHrApproval, PendingManagerApproval,
        };

        let to = match (current, role, action) {
            (PendingManagerApproval, Role::Manager, Approve) => PendingHrApproval,
            (PendingManagerApproval, Role::Manager, Reject) => MgrRejected,
            (PendingHrApproval, Role::Hr, Approve) => PendingAccountMgrApproval,
            (PendingHrApproval, Role::Hr, Reject) => HrRejected,
            (PendingAccountMgrApproval, Role::AccountManager, Approve) => Approved,
            (PendingAccountMgrApproval, Role::AccountManager, Reject) => AccMgrRejected,
            _ => {
                return Err(FlowTransitionError::InvalidTransition {
                    state: current.as_code().to_owned(),
                    role,
                    action,
                });
            }
        };

        Ok(TransitionOutcome { from: current.clone(), to, role, action })
    }
}

/// Leave flow: Manager stage then HR stage; rejection at either stage is
/// terminal and the HR stage is unreachable until the manager approves.
#[derive(Clone, Copy, Debug, Default)]
pub struct LeaveFlow;

impl FlowDefinition for LeaveFlow {
    type State = LeaveStage;

    fn initial_state(&self) -> LeaveStage {
        LeaveStage::PendingManager
    }

    fn transition(
        &self,
        current: &LeaveStage,
        role: Role,
        action: ApprovalAction,
    ) -> Result<TransitionOutcome<LeaveStage>, FlowTransitionError> {
        use ApprovalAction::{Approve, Reject};
        use LeaveStage::{Approved, PendingHr, PendingManager, Rejected};

        let to = match (current, role, action) {
            (PendingManager, Role::Manager, Approve) => PendingHr,
            (PendingManager, Role::Manager, Reject) => Rejected,
            (PendingHr, Role::Hr, Approve) => Approved,
            (PendingHr, Role::Hr, Reject) => Rejected,
            _ => {
                return Err(FlowTransitionError::InvalidTransition {
                    state: current.as_code().to_owned(),
                    role,
                    action,
                });
            }
        };

        Ok(TransitionOutcome { from: current.clone(), to, role, action })
    }
}

pub struct FlowEngine<F> {
    flow: F,
}

impl<F> FlowEngine<F>
where
    F: FlowDefinition,
{
    pub fn new(flow: F) -> Self {
        Self { flow }
    }

    pub fn initial_state(&self) -> F::State {
        self.flow.initial_state()
    }

    pub fn apply(
        &self,
        current: &F::State,
        role: Role,
        action: ApprovalAction,
    ) -> Result<TransitionOutcome<F::State>, FlowTransitionError> {
        self.flow.transition(current, role, action)
    }

    /// Apply a transition and, on success, append one audit entry. Failed
    /// transitions leave the history untouched.
    #[allow(clippy::too_many_arguments)]
    pub fn apply_with_history<S>(
        &self,
        current: &F::State,
        role: Role,
        action: ApprovalAction,
        request_id: &str,
        actor_name: &str,
        reason: Option<&str>,
        sink: &S,
    ) -> Result<TransitionOutcome<F::State>, FlowTransitionError>
    where
        S: HistorySink,
    {
        let outcome = self.apply(current, role, action)?;
        sink.append(HistoryEntry::new(
            request_id,
            actor_name,
            role,
            action,
            reason.map(str::to_owned),
        ));
        Ok(outcome)
    }
}

impl Default for FlowEngine<ExpenseFlow> {
    fn default() -> Self {
        Self::new(ExpenseFlow)
    }
}

#[cfg(test)]
mod tests {
    use super::{ExpenseFlow, FlowDefinition, FlowEngine, FlowTransitionError, LeaveFlow};
    use crate::domain::actor::Role;
    use crate::flows::states::{ApprovalAction, LeaveStage};
    use crate::history::{HistorySink, InMemoryHistorySink};
    use crate::status::ExpenseStatus;

    #[test]
    fn expense_happy_path_advances_through_all_three_stages() {
        let engine = FlowEngine::new(ExpenseFlow);
        let mut state = engine.initial_state();

        state = engine
            .apply(&state, Role::Manager, ApprovalAction::Approve)
            .expect("manager stage")
            .to;
        assert_eq!(state, ExpenseStatus::PendingHrApproval);

        state = engine.apply(&state, Role::Hr, ApprovalAction::Approve).expect("hr stage").to;
        assert_eq!(state, ExpenseStatus::PendingAccountMgrApproval);

        state = engine
            .apply(&state, Role::AccountManager, ApprovalAction::Approve)
            .expect("am stage")
            .to;
        assert_eq!(state, ExpenseStatus::Approved);
    }

    #[test]
    fn rejection_short_circuits_at_each_stage() {
        let engine = FlowEngine::default();

        let rejected = engine
            .apply(&ExpenseStatus::PendingManagerApproval, Role::Manager, ApprovalAction::Reject)
            .expect("manager reject")
            .to;
        assert_eq!(rejected, ExpenseStatus::MgrRejected);

        let rejected = engine
            .apply(&ExpenseStatus::PendingHrApproval, Role::Hr, ApprovalAction::Reject)
            .expect("hr reject")
            .to;
        assert_eq!(rejected, ExpenseStatus::HrRejected);

        let rejected = engine
            .apply(
                &ExpenseStatus::PendingAccountMgrApproval,
                Role::AccountManager,
                ApprovalAction::Reject,
            )
            .expect("am reject")
            .to;
        assert_eq!(rejected, ExpenseStatus::AccMgrRejected);
    }

    #[test]
    fn terminal_states_accept_no_further_transitions() {
        let engine = FlowEngine::default();
        for state in [
            ExpenseStatus::Approved,
            ExpenseStatus::MgrRejected,
            ExpenseStatus::HrRejected,
            ExpenseStatus::AccMgrRejected,
        ] {
            for role in [Role::Manager, Role::Hr, Role::AccountManager] {
                for action in [ApprovalAction::Approve, ApprovalAction::Reject] {
                    let error = engine.apply(&state, role, action).expect_err("terminal");
                    assert!(matches!(error, FlowTransitionError::InvalidTransition { .. }));
                }
            }
        }
    }

    #[test]
    fn out_of_scope_role_is_rejected_even_on_pending_states() {
        let engine = FlowEngine::default();
        let error = engine
            .apply(&ExpenseStatus::PendingManagerApproval, Role::Hr, ApprovalAction::Approve)
            .expect_err("hr cannot act on the manager stage");
        assert_eq!(
            error,
            FlowTransitionError::InvalidTransition {
                state: "pending_manager_approval".to_owned(),
                role: Role::Hr,
                action: ApprovalAction::Approve,
            }
        );
    }

    #[test]
    fn unknown_status_never_transitions() {
        let engine = FlowEngine::default();
        let state = ExpenseStatus::Unknown("audit_hold".to_owned());
        assert!(engine.apply(&state, Role::Manager, ApprovalAction::Approve).is_err());
    }

    #[test]
    fn leave_hr_stage_is_unreachable_before_manager_approval() {
        let engine = FlowEngine::new(LeaveFlow);

        let error = engine
            .apply(&LeaveStage::PendingManager, Role::Hr, ApprovalAction::Approve)
            .expect_err("hr acts only after the manager");
        assert!(matches!(error, FlowTransitionError::InvalidTransition { .. }));

        let to_hr = engine
            .apply(&LeaveStage::PendingManager, Role::Manager, ApprovalAction::Approve)
            .expect("manager approves")
            .to;
        assert_eq!(to_hr, LeaveStage::PendingHr);

        let approved =
            engine.apply(&to_hr, Role::Hr, ApprovalAction::Approve).expect("hr approves").to;
        assert_eq!(approved, LeaveStage::Approved);
    }

    #[test]
    fn successful_transition_appends_exactly_one_history_entry() {
        let engine = FlowEngine::default();
        let sink = InMemoryHistorySink::default();

        engine
            .apply_with_history(
                &ExpenseStatus::PendingManagerApproval,
                Role::Manager,
                ApprovalAction::Reject,
                "exp-118",
                "Dana Whitfield",
                Some("Missing receipt"),
                &sink,
            )
            .expect("transition succeeds");

        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].request_id, "exp-118");
        assert_eq!(entries[0].actor_role, Role::Manager);
        assert_eq!(entries[0].reason.as_deref(), Some("Missing receipt"));
    }

    #[test]
    fn failed_transition_leaves_history_untouched() {
        let engine = FlowEngine::default();
        let sink = InMemoryHistorySink::default();

        let result = engine.apply_with_history(
            &ExpenseStatus::Approved,
            Role::Manager,
            ApprovalAction::Reject,
            "exp-119",
            "Dana Whitfield",
            Some("too late"),
            &sink,
        );

        assert!(result.is_err());
        assert!(sink.entries().is_empty());
    }
}
