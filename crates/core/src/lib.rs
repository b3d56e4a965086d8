pub mod config;
pub mod domain;
pub mod errors;
pub mod flows;
pub mod gate;
pub mod history;
pub mod leave;
pub mod notify;
pub mod session;
pub mod status;

pub use config::{AppConfig, BackendConfig, ConfigError, LoadOptions, LogFormat, LoggingConfig};
pub use domain::actor::{ActorId, Role};
pub use domain::request::{
    EmployeeId, ExpenseCategory, ExpenseRequest, LeaveRequest, LeaveType, RequestId,
};
pub use errors::WorkflowError;
pub use flows::engine::{ExpenseFlow, FlowDefinition, FlowEngine, FlowTransitionError, LeaveFlow};
pub use flows::states::{ApprovalAction, LeaveStage, TransitionOutcome};
pub use gate::{actionable_leaves, visible_expenses, visible_leaves, PeriodFilter};
pub use history::{HistoryEntry, HistoryLog, HistorySink, InMemoryHistorySink};
pub use leave::{working_days, LeaveBalance, LeaveDraft, LeaveValidationError};
pub use notify::{InMemoryNotifier, Notice, Notifier, Severity, AUTO_DISMISS_SECS};
pub use session::Session;
pub use status::{ExpenseStatus, LeaveStatus, StatusTone};
