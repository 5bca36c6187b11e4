//! Test execution for Fuschia canvases.
//!
//! [`TestOrchestrator`] plans a node or workflow test, hands the compiled
//! request to a [`PollingSupervisor`] that drives it through the execution
//! gateway, and writes the reconciled outcome to the result store.

mod error;
mod events;
mod orchestrator;
mod reconcile;
mod supervisor;

pub use error::TestError;
pub use events::{ChannelNotifier, NoopNotifier, TestEvent, TestNotifier};
pub use orchestrator::{TestOrchestrator, TestReport, TestStatus};
pub use reconcile::{MatchKind, Reconciled, match_node, reconcile};
pub use supervisor::{PollingSupervisor, RunOutcome};
