use std::sync::Arc;

use chrono::NaiveDate;
use secrecy::ExposeSecret;
use serde::Serialize;

use hrflow_client::http::HttpApprovalApi;
use hrflow_client::leavedesk::{LeaveDesk, LeavePlanner};
use hrflow_core::config::AppConfig;
use hrflow_core::domain::actor::{ActorId, Role};
use hrflow_core::domain::request::{LeaveRequest, LeaveType, RequestId};
use hrflow_core::flows::states::ApprovalAction;
use hrflow_core::gate::PeriodFilter;
use hrflow_core::history::InMemoryHistorySink;
use hrflow_core::leave::LeaveDraft;
use hrflow_core::notify::InMemoryNotifier;
use hrflow_core::session::Session;

use crate::commands::{parse_role, runtime, CommandResult};

#[derive(Debug, Serialize)]
struct LeaveRow {
    id: i64,
    employee: String,
    leave_type: &'static str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    days: f64,
    stage: String,
    manager_status: String,
    hr_status: String,
}

#[derive(Debug, Serialize)]
struct LeaveScreen {
    pending: Vec<LeaveRow>,
    reviewed: Vec<LeaveRow>,
}

fn row(leave: &LeaveRequest) -> LeaveRow {
    LeaveRow {
        id: leave.id.0,
        employee: leave.employee_name.clone(),
        leave_type: leave.leave_type.as_str(),
        start_date: leave.start_date,
        end_date: leave.end_date,
        days: leave.no_of_days,
        stage: leave.stage().as_code().to_owned(),
        manager_status: leave.manager_status.label().to_owned(),
        hr_status: leave.hr_status.label().to_owned(),
    }
}

fn session(config: &AppConfig, role: Role, actor_id: i64) -> Session {
    Session::new(role, Some(ActorId(actor_id)), config.backend.token.expose_secret().to_owned())
}

fn api(command: &str, config: &AppConfig) -> Result<HttpApprovalApi, CommandResult> {
    HttpApprovalApi::new(&config.backend)
        .map_err(|error| CommandResult::failure(command, "client", error.to_string(), 1))
}

fn desk(
    command: &str,
    config: &AppConfig,
    role: &str,
    actor_id: i64,
) -> Result<LeaveDesk<HttpApprovalApi>, CommandResult> {
    let role = parse_role(command, role)?;
    let api = api(command, config)?;
    Ok(LeaveDesk::new(
        session(config, role, actor_id),
        api,
        Arc::new(InMemoryHistorySink::default()),
        Arc::new(InMemoryNotifier::default()),
    ))
}

/// List an approver's leave queue and reviewed history.
pub fn list(config: &AppConfig, role: &str, actor_id: i64) -> CommandResult {
    const COMMAND: &str = "leaves";

    let mut desk = match desk(COMMAND, config, role, actor_id) {
        Ok(desk) => desk,
        Err(result) => return result,
    };
    let runtime = match runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    if let Err(error) = runtime.block_on(desk.refresh()) {
        return CommandResult::failure(COMMAND, "fetch", error.user_message(), 1);
    }

    let screen = LeaveScreen {
        pending: desk.pending().iter().map(row).collect(),
        reviewed: desk.reviewed().iter().map(row).collect(),
    };
    CommandResult::payload(COMMAND, &screen)
}

/// Approve or reject one pending leave at the actor's stage.
pub fn decide(
    config: &AppConfig,
    action: ApprovalAction,
    role: &str,
    actor_id: i64,
    leave_id: i64,
    actor_name: &str,
) -> CommandResult {
    const COMMAND: &str = "leave-action";

    let mut desk = match desk(COMMAND, config, role, actor_id) {
        Ok(desk) => desk,
        Err(result) => return result,
    };
    let runtime = match runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let outcome = runtime.block_on(async {
        desk.refresh().await?;
        desk.decide(RequestId(leave_id), action, actor_name).await
    });

    match outcome {
        Ok(outcome) => CommandResult::success(
            COMMAND,
            format!(
                "leave {leave_id} moved from {} to {}",
                outcome.from.as_code(),
                outcome.to.as_code()
            ),
        ),
        Err(error) => CommandResult::failure(
            COMMAND,
            super::decide::error_class(&error),
            error.user_message(),
            1,
        ),
    }
}

/// Submit a leave application for an employee after a balance check.
#[allow(clippy::too_many_arguments)]
pub fn apply(
    config: &AppConfig,
    employee_id: i64,
    leave_type: &str,
    start_date: &str,
    end_date: &str,
    half_day: bool,
    reason: &str,
) -> CommandResult {
    const COMMAND: &str = "apply-leave";

    let Some(leave_type) = LeaveType::parse(leave_type) else {
        return CommandResult::failure(
            COMMAND,
            "invalid_leave_type",
            format!("unknown leave type `{leave_type}` (expected Sick, Casual, or Annual)"),
            2,
        );
    };
    let (start_date, end_date) = match (parse_date(start_date), parse_date(end_date)) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            return CommandResult::failure(
                COMMAND,
                "invalid_date",
                "dates must be in YYYY-MM-DD form",
                2,
            );
        }
    };

    let api = match api(COMMAND, config) {
        Ok(api) => api,
        Err(result) => return result,
    };
    let planner = LeavePlanner::new(
        session(config, Role::Employee, employee_id),
        api,
        Arc::new(InMemoryNotifier::default()),
    );
    let draft = LeaveDraft {
        leave_type,
        start_date,
        end_date,
        half_day,
        reason: reason.to_owned(),
    };

    let runtime = match runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    match runtime.block_on(planner.apply(&draft)) {
        Ok(days) => {
            CommandResult::success(COMMAND, format!("applied for {days} working day(s) of leave"))
        }
        Err(error) => CommandResult::failure(
            COMMAND,
            super::decide::error_class(&error),
            error.user_message(),
            1,
        ),
    }
}

/// Show an employee's remaining leave balances.
pub fn balance(config: &AppConfig, employee_id: i64) -> CommandResult {
    const COMMAND: &str = "balance";

    let api = match api(COMMAND, config) {
        Ok(api) => api,
        Err(result) => return result,
    };
    let planner = LeavePlanner::new(
        session(config, Role::Employee, employee_id),
        api,
        Arc::new(InMemoryNotifier::default()),
    );
    let runtime = match runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    match runtime.block_on(planner.balance()) {
        Ok(balance) => CommandResult::payload(COMMAND, &balance),
        Err(error) => CommandResult::failure(COMMAND, "fetch", error.user_message(), 1),
    }
}

/// List an employee's own leave history.
pub fn my_leaves(config: &AppConfig, employee_id: i64) -> CommandResult {
    const COMMAND: &str = "my-leaves";

    let api = match api(COMMAND, config) {
        Ok(api) => api,
        Err(result) => return result,
    };
    let planner = LeavePlanner::new(
        session(config, Role::Employee, employee_id),
        api,
        Arc::new(InMemoryNotifier::default()),
    );
    let runtime = match runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    match runtime.block_on(planner.my_leaves(&PeriodFilter::ALL)) {
        Ok(leaves) => {
            let rows: Vec<LeaveRow> = leaves.iter().map(row).collect();
            CommandResult::payload(COMMAND, &rows)
        }
        Err(error) => CommandResult::failure(COMMAND, "fetch", error.user_message(), 1),
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}
