use std::sync::Arc;

use secrecy::ExposeSecret;

use hrflow_client::http::HttpApprovalApi;
use hrflow_client::submitter::SubmitError;
use hrflow_client::worklist::ExpenseWorklist;
use hrflow_core::config::AppConfig;
use hrflow_core::domain::actor::ActorId;
use hrflow_core::domain::request::RequestId;
use hrflow_core::flows::states::ApprovalAction;
use hrflow_core::gate::PeriodFilter;
use hrflow_core::history::InMemoryHistorySink;
use hrflow_core::notify::InMemoryNotifier;
use hrflow_core::session::Session;

use crate::commands::{parse_role, runtime, CommandResult};

/// Apply one expense decision: fetch the actor's worklist, run the
/// pre-flight checks, send the update, refetch.
#[allow(clippy::too_many_arguments)]
pub fn run(
    config: &AppConfig,
    action: ApprovalAction,
    role: &str,
    actor_id: i64,
    request_id: i64,
    reason: &str,
    actor_name: &str,
) -> CommandResult {
    let command = command_name(action);
    let role = match parse_role(command, role) {
        Ok(role) => role,
        Err(result) => return result,
    };

    let api = match HttpApprovalApi::new(&config.backend) {
        Ok(api) => api,
        Err(error) => return CommandResult::failure(command, "client", error.to_string(), 1),
    };

    let session = Session::new(
        role,
        Some(ActorId(actor_id)),
        config.backend.token.expose_secret().to_owned(),
    );
    let mut worklist = ExpenseWorklist::new(
        session,
        api,
        Arc::new(InMemoryHistorySink::default()),
        Arc::new(InMemoryNotifier::default()),
    );
    worklist.set_filter(PeriodFilter::ALL);

    let runtime = match runtime(command) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let outcome = runtime.block_on(async {
        worklist.refresh().await?;
        worklist.decide(RequestId(request_id), action, reason, actor_name).await
    });

    match outcome {
        Ok(outcome) => CommandResult::success(
            command,
            format!(
                "request {request_id} moved from \"{}\" to \"{}\"",
                outcome.from.label(),
                outcome.to.label()
            ),
        ),
        Err(error) => CommandResult::failure(command, error_class(&error), error.user_message(), 1),
    }
}

fn command_name(action: ApprovalAction) -> &'static str {
    match action {
        ApprovalAction::Approve => "approve",
        ApprovalAction::Reject => "reject",
    }
}

pub(crate) fn error_class(error: &SubmitError) -> &'static str {
    match error {
        SubmitError::Workflow(_) => "workflow",
        SubmitError::Validation(_) => "validation",
        SubmitError::Client(_) => "client",
        SubmitError::Fetch { .. } => "fetch",
    }
}
