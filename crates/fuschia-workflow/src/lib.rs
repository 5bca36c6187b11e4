//! Fuschia Workflow
//!
//! This crate provides the read-only graph model the test orchestrator works
//! against. A [`Workflow`] is built once from a canvas snapshot
//! ([`fuschia_config::WorkflowDef`]) and then only queried.
//!
//! Key differences from `fuschia-config`:
//! - Node ids are checked for uniqueness
//! - Node iteration order is fixed (canvas order) and indexed by id
//! - Outgoing and incoming edges are indexed per node
//! - Edges may still point at unknown nodes; traversals skip them

mod error;
mod graph;
mod node;
mod trigger;
mod workflow;

pub use error::WorkflowError;
pub use node::{Edge, EdgeMeta, Node};
pub use trigger::{TRIGGER_KINDS, is_trigger};
pub use workflow::Workflow;

pub use fuschia_config::{Inputs, NodeRole};
