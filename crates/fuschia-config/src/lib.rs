//! Fuschia Config
//!
//! This crate contains the serializable types the test orchestrator consumes
//! from the rest of the editor:
//!
//! - Canvas snapshots ([`WorkflowDef`]): nodes, directed edges and each node's
//!   configured input values, exactly as the canvas layer stores them.
//! - Orchestrator settings ([`TestSettings`]): poll cadence and gateway location.
//!
//! Both are loaded from JSON (files on disk for the CLI, blobs when embedded).
//! Nothing here is validated; `fuschia-workflow` turns a [`WorkflowDef`] into a
//! read-only graph model.

mod edge;
mod input;
mod node;
mod settings;
mod workflow;

pub use edge::EdgeDef;
pub use input::{InputValue, Inputs};
pub use node::{NodeDef, NodeRole};
pub use settings::{GatewaySettings, PollSettings, TestSettings};
pub use workflow::WorkflowDef;
