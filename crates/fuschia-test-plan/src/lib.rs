//! Fuschia Test Plan
//!
//! Turns part of a canvas into an executable request for the execution
//! service. Everything here is synchronous and pure except the final step of
//! planning, which reads cached dependency results from a
//! [`fuschia_store::ResultStore`].
//!
//! # Pipeline
//!
//! ```text
//! Workflow ──► scanner ──────► referenced node ids
//!    │                              │
//!    ├──► reachability ──► full node set (ancestors of X, or reachable from trigger)
//!    │                              │
//!    └──► compiler ──► execution set, entry nodes, skip-rewritten edges
//!                                   │
//!                     request ──► ExecutionRequest { actions, edges, state? }
//! ```
//!
//! [`plan_node_test`] and [`plan_workflow_test`] run the whole pipeline.

mod compiler;
mod error;
mod planner;
mod reachability;
mod request;
mod scanner;

pub use compiler::{CompiledSubgraph, compile_subgraph};
pub use error::{GraphError, PlanError};
pub use planner::{PlanScope, TestPlan, plan_node_test, plan_workflow_test};
pub use reachability::{find_trigger, predecessor_closure, reachable_from};
pub use request::{
  CachedState, CompiledEdge, ExecutionAction, ExecutionRequest, RESERVED_CONFIG_KEYS,
  SOURCE_NODE, build_action, build_request, normalize_inputs,
};
pub use scanner::{scan_references, scan_text};
