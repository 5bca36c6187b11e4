//! Input value types for node configuration.
//!
//! Configuration values are arbitrary JSON as produced by the node forms. A value
//! may reference another node's output with `$.<nodeId>` syntax, either inside a
//! template or as a bare path:
//!
//! ```json
//! {
//!   "recipient": "{{ $.fetch_user.email }}",
//!   "body": { "text": "$.summarize.output" },
//!   "retries": 3
//! }
//! ```
//!
//! The orchestrator never renders these templates; the execution service does.
//! It only scans them to find which other nodes' results a test depends on.

use std::collections::BTreeMap;

/// A single configured input value.
pub type InputValue = serde_json::Value;

/// A node's configured inputs, keyed by input name.
///
/// Ordered so that serialized input maps (and anything derived from them) are
/// deterministic.
pub type Inputs = BTreeMap<String, InputValue>;
