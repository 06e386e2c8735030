//! Executor Module
//!
//! At-most-one-in-flight request execution and the outgoing header hook.

mod headers;
mod request_executor;

pub use headers::{BearerAuth, Headers, PrepareHeaders};
pub use request_executor::{Outcome, RequestExecutor};
