pub mod actor;
pub mod request;
