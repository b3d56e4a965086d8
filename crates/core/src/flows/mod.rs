pub mod engine;
pub mod states;

pub use engine::{ExpenseFlow, FlowDefinition, FlowEngine, FlowTransitionError, LeaveFlow};
pub use states::{ApprovalAction, LeaveStage, TransitionOutcome};
