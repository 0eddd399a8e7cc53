//! The handoff coordinator: 2PC orchestration across region participants,
//! the buffer and drainer for deferred handoffs to unhealthy regions,
//! startup recovery from the transaction log, and the coordinator's own
//! HTTP surface.

mod backoff;
mod buffer;
mod config;
mod coordinator;
mod drainer;
mod outcome;
mod recovery;
mod server;

pub use buffer::Buffer;
pub use config::{CoordinatorConfig, RetryPolicy};
pub use coordinator::Coordinator;
pub use drainer::run as run_drainer;
pub use outcome::{HandoffResult, OutcomeStatus};
pub use recovery::recover;
pub use server::CoordinatorServer;
