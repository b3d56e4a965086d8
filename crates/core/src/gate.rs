//! Actor gate: scopes the full request set down to what the signed-in actor
//! may see and act on. Pure functions over slices; applying the same filter
//! twice yields the same subset.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::domain::actor::{ActorId, Role};
use crate::domain::request::{ExpenseRequest, LeaveRequest};

/// Optional calendar month/year filter. Matching is equality on the calendar
/// month (1-12) and the 4-digit year, not range overlap; `None` means "all".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PeriodFilter {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl PeriodFilter {
    pub const ALL: Self = Self { month: None, year: None };

    pub fn new(month: Option<u32>, year: Option<i32>) -> Self {
        Self { month, year }
    }

    /// Current calendar month and year, the approval screens' default.
    pub fn current(now: DateTime<Utc>) -> Self {
        Self { month: Some(now.month()), year: Some(now.year()) }
    }

    /// Lenient parse from form-style strings; empty selects "all".
    pub fn from_strings(month: &str, year: &str) -> Self {
        Self {
            month: month.trim().parse().ok().filter(|m| (1..=12).contains(m)),
            year: year.trim().parse().ok(),
        }
    }

    pub fn matches_date(&self, date: NaiveDate) -> bool {
        self.month.map_or(true, |month| date.month() == month)
            && self.year.map_or(true, |year| date.year() == year)
    }

    pub fn matches_datetime(&self, at: DateTime<Utc>) -> bool {
        self.matches_date(at.date_naive())
    }

    pub fn is_all(&self) -> bool {
        self.month.is_none() && self.year.is_none()
    }
}

/// Expenses visible to `role`/`actor_id` under `filter`.
///
/// Scoping uses the request's denormalized routing id for the role;
/// role-scoped list endpoints may omit the field, in which case the server
/// already applied the scope and the row stays visible. Time filtering is
/// against `submitted_at`.
pub fn visible_expenses(
    all: &[ExpenseRequest],
    role: Role,
    actor_id: ActorId,
    filter: &PeriodFilter,
) -> Vec<ExpenseRequest> {
    all.iter()
        .filter(|expense| match expense.routing_id_for(role) {
            Some(assigned) => assigned == actor_id,
            None => true,
        })
        .filter(|expense| filter.matches_datetime(expense.submitted_at))
        .cloned()
        .collect()
}

/// Leaves visible under `filter`; time filtering is against the leave start
/// date. Leave rows carry no routing ids (the backend joins the assignment
/// tables), so role scoping is the server's.
pub fn visible_leaves(all: &[LeaveRequest], filter: &PeriodFilter) -> Vec<LeaveRequest> {
    all.iter()
        .filter(|leave| filter.matches_date(leave.start_date))
        .cloned()
        .collect()
}

/// Leaves currently actionable by `role`: those whose pending stage is
/// scoped to it.
pub fn actionable_leaves(all: &[LeaveRequest], role: Role) -> Vec<LeaveRequest> {
    all.iter()
        .filter(|leave| leave.stage().pending_role() == Some(role))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::{visible_expenses, visible_leaves, PeriodFilter};
    use crate::domain::actor::{ActorId, Role};
    use crate::domain::request::{
        EmployeeId, ExpenseCategory, ExpenseRequest, LeaveRequest, LeaveType, RequestId,
    };
    use crate::status::{ExpenseStatus, LeaveStatus};

    fn expense(id: i64, manager: i64, submitted: &str) -> ExpenseRequest {
        ExpenseRequest {
            id: RequestId(id),
            employee_id: Some(EmployeeId(7)),
            employee_name: "Asha Pillai".to_owned(),
            employee_email: "asha@corp.example".to_owned(),
            category: ExpenseCategory::Travel,
            amount: Decimal::new(41_250, 2),
            currency: "USD".to_owned(),
            description: String::new(),
            tax_included: false,
            status: ExpenseStatus::PendingManagerApproval,
            reason: None,
            submitted_at: submitted.parse().expect("valid timestamp"),
            expense_date: None,
            attachment: None,
            manager_id: Some(ActorId(manager)),
            hr_id: None,
            acc_mgr_id: None,
        }
    }

    fn leave(id: i64, start: &str) -> LeaveRequest {
        LeaveRequest {
            id: RequestId(id),
            employee_id: EmployeeId(7),
            employee_name: "Asha Pillai".to_owned(),
            employee_email: String::new(),
            leave_type: LeaveType::Casual,
            start_date: start.parse().expect("valid date"),
            end_date: start.parse().expect("valid date"),
            no_of_days: 1.0,
            reason: "errand".to_owned(),
            manager_status: LeaveStatus::Pending,
            hr_status: LeaveStatus::Pending,
            final_status: LeaveStatus::Pending,
        }
    }

    #[test]
    fn filters_by_calendar_month_and_year_equality() {
        let all = vec![
            expense(1, 42, "2025-03-02T08:00:00Z"),
            expense(2, 42, "2025-03-30T18:00:00Z"),
            expense(3, 42, "2025-04-01T00:10:00Z"),
            expense(4, 42, "2024-03-15T12:00:00Z"),
        ];

        let filter = PeriodFilter::from_strings("3", "2025");
        let visible = visible_expenses(&all, Role::Manager, ActorId(42), &filter);
        assert_eq!(visible.iter().map(|e| e.id.0).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn reset_filter_restores_the_full_set() {
        let all = vec![
            expense(1, 42, "2025-03-02T08:00:00Z"),
            expense(2, 42, "2024-11-20T08:00:00Z"),
        ];

        let filtered = visible_expenses(&all, Role::Manager, ActorId(42), &PeriodFilter::from_strings("3", "2025"));
        assert_eq!(filtered.len(), 1);

        let unfiltered = visible_expenses(&all, Role::Manager, ActorId(42), &PeriodFilter::ALL);
        assert_eq!(unfiltered, all);
    }

    #[test]
    fn scopes_to_the_assigned_manager() {
        let all = vec![
            expense(1, 42, "2025-03-02T08:00:00Z"),
            expense(2, 99, "2025-03-02T08:00:00Z"),
        ];

        let visible = visible_expenses(&all, Role::Manager, ActorId(42), &PeriodFilter::ALL);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id.0, 1);
    }

    #[test]
    fn rows_without_a_routing_id_stay_visible() {
        let mut row = expense(1, 42, "2025-03-02T08:00:00Z");
        row.hr_id = None;
        let visible = visible_expenses(&[row], Role::Hr, ActorId(5), &PeriodFilter::ALL);
        assert_eq!(visible.len(), 1);
    }

    #[test]
    fn filtering_is_idempotent() {
        let all = vec![
            expense(1, 42, "2025-03-02T08:00:00Z"),
            expense(2, 42, "2025-06-02T08:00:00Z"),
        ];
        let filter = PeriodFilter::new(Some(3), Some(2025));

        let once = visible_expenses(&all, Role::Manager, ActorId(42), &filter);
        let twice = visible_expenses(&once, Role::Manager, ActorId(42), &filter);
        assert_eq!(once, twice);
    }

    #[test]
    fn leave_filtering_uses_the_start_date() {
        let all = vec![leave(1, "2025-03-03"), leave(2, "2025-05-12")];
        let visible = visible_leaves(&all, &PeriodFilter::new(Some(3), Some(2025)));
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id.0, 1);
    }

    #[test]
    fn out_of_range_month_string_means_all_months() {
        let filter = PeriodFilter::from_strings("13", "2025");
        assert_eq!(filter.month, None);
        assert!(filter.matches_date(NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()));
        assert_eq!(
            PeriodFilter::current(Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap()),
            PeriodFilter::new(Some(3), Some(2025))
        );
    }
}
