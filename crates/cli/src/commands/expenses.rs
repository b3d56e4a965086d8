use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::Serialize;

use hrflow_client::http::HttpApprovalApi;
use hrflow_client::worklist::ExpenseWorklist;
use hrflow_core::config::AppConfig;
use hrflow_core::domain::actor::ActorId;
use hrflow_core::domain::request::ExpenseRequest;
use hrflow_core::gate::PeriodFilter;
use hrflow_core::history::InMemoryHistorySink;
use hrflow_core::notify::InMemoryNotifier;
use hrflow_core::session::Session;

use crate::commands::{parse_role, runtime, CommandResult};

const COMMAND: &str = "expenses";

#[derive(Debug, Serialize)]
struct ExpenseRow {
    id: i64,
    employee: String,
    category: String,
    amount: String,
    status: String,
    status_label: String,
    submitted_at: String,
    actions: Vec<&'static str>,
}

/// List the expense worklist for one actor, optionally narrowed to a
/// calendar month/year window.
pub fn run(
    config: &AppConfig,
    role: &str,
    actor_id: i64,
    month: Option<u32>,
    year: Option<i32>,
) -> CommandResult {
    let role = match parse_role(COMMAND, role) {
        Ok(role) => role,
        Err(result) => return result,
    };

    let api = match HttpApprovalApi::new(&config.backend) {
        Ok(api) => api,
        Err(error) => return CommandResult::failure(COMMAND, "client", error.to_string(), 1),
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
    worklist.set_filter(PeriodFilter::new(month, year));

    let runtime = match runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    if let Err(error) = runtime.block_on(worklist.refresh()) {
        return CommandResult::failure(COMMAND, "fetch", error.user_message(), 1);
    }

    let rows: Vec<ExpenseRow> = worklist
        .rows()
        .iter()
        .map(|request| row(request, &worklist))
        .collect();
    CommandResult::payload(COMMAND, &rows)
}

fn row(request: &ExpenseRequest, worklist: &ExpenseWorklist<HttpApprovalApi>) -> ExpenseRow {
    ExpenseRow {
        id: request.id.0,
        employee: request.employee_name.clone(),
        category: request.category.as_str().to_owned(),
        amount: request.amount.to_string(),
        status: request.status.as_code().to_owned(),
        status_label: request.status.label().to_owned(),
        submitted_at: request.submitted_at.to_rfc3339(),
        actions: worklist
            .legal_actions(request.id)
            .iter()
            .map(|action| action.as_wire())
            .collect(),
    }
}
