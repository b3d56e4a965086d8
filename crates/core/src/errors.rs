use thiserror::Error;

use crate::domain::actor::Role;
use crate::flows::engine::FlowTransitionError;

/// Client-side failures caught before any network call leaves the machine.
/// Every variant degrades to a user-visible, retryable message; nothing here
/// is fatal to the caller.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    /// Required role identifier absent from the session; the fetch or
    /// submit is aborted before any HTTP request.
    #[error("{} ID not found", role.display_name())]
    MissingActor { role: Role },
    /// Approve and reject both require a non-empty reason.
    #[error("Please provide a reason")]
    EmptyReason,
    /// A submit is already in flight for this request.
    #[error("an update for request {request_id} is already in progress")]
    DuplicateSubmission { request_id: i64 },
    /// The request id is not in the actor's current worklist.
    #[error("request {request_id} is not in the current list")]
    RequestNotFound { request_id: i64 },
    /// Save was pressed before choosing an action for the row.
    #[error("no action selected for request {request_id}")]
    NoPendingEdit { request_id: i64 },
    #[error(transparent)]
    Transition(#[from] FlowTransitionError),
}

impl WorkflowError {
    /// Message shown in the auto-dismissing notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingActor { .. } | Self::EmptyReason => self.to_string(),
            Self::DuplicateSubmission { .. } => {
                "This request is already being updated".to_owned()
            }
            Self::RequestNotFound { .. } => "Request not found".to_owned(),
            Self::NoPendingEdit { .. } => "Please select an action first".to_owned(),
            Self::Transition(_) => "No action is available for this request".to_owned(),
        }
    }
}
