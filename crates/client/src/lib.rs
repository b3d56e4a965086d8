//! Backend client and approval screens
//!
//! This crate is the HTTP-facing half of hrflow:
//! - **API trait** (`api`) - the backend surface as one async trait
//! - **HTTP** (`http`) - `reqwest` implementation of the REST contract
//! - **Recording fake** (`recording`) - in-memory backend for tests
//! - **Submitter** (`submitter`) - validated, guarded expense decisions
//! - **Worklist** (`worklist`) - per-role expense screen view-model
//! - **Leave desk** (`leavedesk`) - leave approval queue and applications
//!
//! # Architecture
//!
//! ```text
//! ExpenseWorklist / LeaveDesk / LeavePlanner
//!         ↓ (flow + gate checks, hrflow-core)
//!   ActionSubmitter → ApprovalApi → HttpApprovalApi → backend
//!         ↓ on success
//!   HistorySink + Notifier
//! ```
//!
//! Everything above the trait is testable against `RecordingApi`; tests
//! never open a socket.

pub mod api;
pub mod http;
pub mod leavedesk;
pub mod recording;
pub mod submitter;
pub mod worklist;

pub use api::{ApprovalApi, ClientError, ExpenseDecision};
pub use http::HttpApprovalApi;
pub use leavedesk::{LeaveDesk, LeavePlanner};
pub use recording::{ApiCall, RecordingApi};
pub use submitter::{ActionSubmitter, SubmitError};
pub use worklist::{ExpenseWorklist, PendingEdit};
