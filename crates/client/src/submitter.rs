use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tracing::{info, warn};

use hrflow_core::domain::request::{ExpenseRequest, RequestId};
use hrflow_core::errors::WorkflowError;
use hrflow_core::flows::engine::{ExpenseFlow, FlowEngine};
use hrflow_core::flows::states::{ApprovalAction, TransitionOutcome};
use hrflow_core::history::{HistoryEntry, HistorySink};
use hrflow_core::leave::LeaveValidationError;
use hrflow_core::session::Session;
use hrflow_core::status::ExpenseStatus;

use crate::api::{ApprovalApi, ClientError, ExpenseDecision};

/// Anything a submission can fail with, from pre-flight validation through
/// the wire. `user_message` is what the auto-dismissing notification shows.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    #[error(transparent)]
    Validation(#[from] LeaveValidationError),
    #[error(transparent)]
    Client(#[from] ClientError),
    /// A list or balance fetch failed. The screens show a per-screen
    /// generic message for these, never the update toast.
    #[error("{message}")]
    Fetch {
        message: &'static str,
        source: ClientError,
    },
}

impl SubmitError {
    pub(crate) fn fetch(message: &'static str, source: ClientError) -> Self {
        Self::Fetch { message, source }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Workflow(error) => error.user_message(),
            Self::Validation(error) => error.to_string(),
            Self::Client(ClientError::Backend { message, .. }) => message.clone(),
            Self::Client(_) => "Failed to update status".to_owned(),
            Self::Fetch { message, .. } => (*message).to_owned(),
        }
    }
}

/// Submits expense decisions: validates the reason and the transition,
/// guards against double submission, sends the update, and appends the
/// audit entry on success. Validation failures never reach the network.
pub struct ActionSubmitter<A> {
    api: A,
    engine: FlowEngine<ExpenseFlow>,
    history: Arc<dyn HistorySink>,
    in_flight: Mutex<HashSet<i64>>,
}

impl<A> ActionSubmitter<A>
where
    A: ApprovalApi,
{
    pub fn new(api: A, history: Arc<dyn HistorySink>) -> Self {
        Self {
            api,
            engine: FlowEngine::default(),
            history,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn submit(
        &self,
        session: &Session,
        actor_name: &str,
        request: &ExpenseRequest,
        action: ApprovalAction,
        reason: &str,
    ) -> Result<TransitionOutcome<ExpenseStatus>, SubmitError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(WorkflowError::EmptyReason.into());
        }

        let actor_id = session.require_actor_id()?;
        let role = session.role();
        let outcome =
            self.engine.apply(&request.status, role, action).map_err(WorkflowError::from)?;

        self.begin(request.id)?;
        let decision = ExpenseDecision {
            request_id: request.id,
            action,
            reason: reason.to_owned(),
            role,
            actor_id,
        };
        let sent = self.api.update_expense_status(session, &decision).await;
        self.finish(request.id);

        if let Err(error) = sent {
            warn!(
                request_id = %request.id,
                action = action.as_wire(),
                error = %error,
                "expense status update failed"
            );
            return Err(error.into());
        }

        self.history.append(HistoryEntry::new(
            request.id.to_string(),
            actor_name,
            role,
            action,
            Some(reason.to_owned()),
        ));
        info!(
            request_id = %request.id,
            from = outcome.from.as_code(),
            to = outcome.to.as_code(),
            "expense status updated"
        );
        Ok(outcome)
    }

    fn begin(&self, request_id: RequestId) -> Result<(), WorkflowError> {
        let mut in_flight = self.lock();
        if in_flight.insert(request_id.0) {
            Ok(())
        } else {
            Err(WorkflowError::DuplicateSubmission { request_id: request_id.0 })
        }
    }

    fn finish(&self, request_id: RequestId) {
        self.lock().remove(&request_id.0);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<i64>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
