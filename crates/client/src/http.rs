use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::multipart::Form;
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use hrflow_core::config::BackendConfig;
use hrflow_core::domain::actor::{ActorId, Role};
use hrflow_core::domain::request::{EmployeeId, ExpenseRequest, LeaveRequest, RequestId};
use hrflow_core::flows::states::ApprovalAction;
use hrflow_core::gate::PeriodFilter;
use hrflow_core::leave::{LeaveBalance, LeaveDraft};
use hrflow_core::session::Session;

use crate::api::{ApprovalApi, ClientError, ExpenseDecision};

/// `reqwest`-backed implementation of [`ApprovalApi`]. Paths and payload
/// shapes follow the backend's REST contract; the status update is a
/// multipart form PUT, leave actions are JSON POSTs.
pub struct HttpApprovalApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApprovalApi {
    pub fn new(config: &BackendConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| ClientError::Transport(error.to_string()))?;

        Ok(Self { client, base_url: config.base_url.trim_end_matches('/').to_owned() })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T>(
        &self,
        session: &Session,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!(url = %url, "fetching from backend");

        let response = self
            .client
            .get(&url)
            .bearer_auth(session.bearer_token())
            .query(query)
            .send()
            .await
            .map_err(|error| ClientError::Transport(error.to_string()))?;

        ensure_success(response)
            .await?
            .json::<T>()
            .await
            .map_err(|error| ClientError::Decode(error.to_string()))
    }
}

#[async_trait]
impl ApprovalApi for HttpApprovalApi {
    async fn list_expenses(
        &self,
        session: &Session,
        actor_id: ActorId,
        filter: &PeriodFilter,
    ) -> Result<Vec<ExpenseRequest>, ClientError> {
        let segment = approval_segment(session.role())?;
        let path = format!("expenses/{segment}-exp-list");
        let query = period_query(session.role().id_field(), actor_id, filter);
        self.get_json(session, &path, &query).await
    }

    async fn my_expenses(
        &self,
        session: &Session,
        employee_id: EmployeeId,
        filter: &PeriodFilter,
    ) -> Result<Vec<ExpenseRequest>, ClientError> {
        let query = period_query("employee_id", ActorId(employee_id.0), filter);
        self.get_json(session, "expenses/my-expenses", &query).await
    }

    async fn update_expense_status(
        &self,
        session: &Session,
        decision: &ExpenseDecision,
    ) -> Result<(), ClientError> {
        let segment = approval_segment(decision.role)?;
        let url = self.endpoint(&format!(
            "expenses/{segment}-upd-status/{}",
            decision.request_id
        ));

        info!(
            request_id = %decision.request_id,
            status = decision.action.as_wire(),
            role = decision.role.as_str(),
            "submitting expense status update"
        );

        let form = Form::new()
            .text("status", decision.action.as_wire().to_owned())
            .text("reason", decision.reason.clone())
            .text(decision.role.id_field(), decision.actor_id.0.to_string());

        let response = self
            .client
            .put(&url)
            .bearer_auth(session.bearer_token())
            .multipart(form)
            .send()
            .await
            .map_err(|error| ClientError::Transport(error.to_string()))?;

        ensure_success(response).await?;
        Ok(())
    }

    async fn pending_leaves(
        &self,
        session: &Session,
        actor_id: ActorId,
    ) -> Result<Vec<LeaveRequest>, ClientError> {
        let segment = leave_segment(session.role())?;
        let path = format!("{segment}/pending-leaves/{actor_id}");
        self.get_json(session, &path, &[]).await
    }

    async fn leave_requests(
        &self,
        session: &Session,
        actor_id: ActorId,
    ) -> Result<Vec<LeaveRequest>, ClientError> {
        let path = match session.role() {
            Role::Manager => format!("leave-requests/{actor_id}"),
            Role::Hr => format!("hr/leave-requests/{actor_id}"),
            role => return Err(ClientError::UnsupportedRole { role, operation: "leave review" }),
        };
        self.get_json(session, &path, &[]).await
    }

    async fn leave_action(
        &self,
        session: &Session,
        leave_id: RequestId,
        action: ApprovalAction,
    ) -> Result<(), ClientError> {
        let segment = leave_segment(session.role())?;
        let url = self.endpoint(&format!("{segment}/leave-action/{leave_id}"));

        info!(leave_id = %leave_id, action = action.as_wire(), "submitting leave action");

        let response = self
            .client
            .post(&url)
            .bearer_auth(session.bearer_token())
            .json(&serde_json::json!({ "action": action.as_wire() }))
            .send()
            .await
            .map_err(|error| ClientError::Transport(error.to_string()))?;

        ensure_success(response).await?;
        Ok(())
    }

    async fn apply_leave(
        &self,
        session: &Session,
        employee_id: EmployeeId,
        draft: &LeaveDraft,
        no_of_days: f64,
    ) -> Result<(), ClientError> {
        let url = self.endpoint("apply_leave");
        info!(employee_id = %employee_id, days = no_of_days, "applying for leave");

        let body = ApplyLeaveBody {
            employee_id: employee_id.0,
            leave_type: draft.leave_type.as_str(),
            start_date: draft.start_date,
            end_date: draft.end_date,
            half_day: draft.half_day,
            no_of_days,
            reason: &draft.reason,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(session.bearer_token())
            .json(&body)
            .send()
            .await
            .map_err(|error| ClientError::Transport(error.to_string()))?;

        ensure_success(response).await?;
        Ok(())
    }

    async fn all_leaves(
        &self,
        session: &Session,
        employee_id: EmployeeId,
    ) -> Result<Vec<LeaveRequest>, ClientError> {
        let path = format!("all_leaves/{employee_id}");
        self.get_json(session, &path, &[]).await
    }

    async fn leave_balance(
        &self,
        session: &Session,
        employee_id: EmployeeId,
    ) -> Result<LeaveBalance, ClientError> {
        let path = format!("leave_balances/{employee_id}");
        self.get_json(session, &path, &[]).await
    }
}

#[derive(Serialize)]
struct ApplyLeaveBody<'a> {
    employee_id: i64,
    leave_type: &'a str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    half_day: bool,
    no_of_days: f64,
    reason: &'a str,
}

fn approval_segment(role: Role) -> Result<&'static str, ClientError> {
    role.approval_segment()
        .ok_or(ClientError::UnsupportedRole { role, operation: "expense approval" })
}

fn leave_segment(role: Role) -> Result<&'static str, ClientError> {
    match role {
        Role::Manager => Ok("manager"),
        Role::Hr => Ok("hr"),
        role => Err(ClientError::UnsupportedRole { role, operation: "leave approval" }),
    }
}

fn period_query(
    id_field: &'static str,
    actor_id: ActorId,
    filter: &PeriodFilter,
) -> Vec<(&'static str, String)> {
    let mut query = vec![(id_field, actor_id.0.to_string())];
    if let Some(year) = filter.year {
        query.push(("year", year.to_string()));
    }
    if let Some(month) = filter.month {
        query.push(("month", month.to_string()));
    }
    query
}

async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Backend { status, message: backend_message(status, &body) })
}

/// Prefer the backend's structured `detail` field; fall back to the raw
/// body, then to a status-line placeholder for empty responses.
fn backend_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(detail) = value.get("detail").and_then(serde_json::Value::as_str) {
            return detail.to_owned();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("backend returned HTTP {status}")
    } else {
        trimmed.to_owned()
    }
}
