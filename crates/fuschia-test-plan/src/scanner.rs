//! Cross-node reference scanning.
//!
//! Two reference syntaxes name another node's output inside configured
//! inputs, and together they are the whole contract:
//!
//! 1. Template interpolation: `{{ $.<nodeId> ... }}`
//! 2. Bare path access: `$.<nodeId>.` (the trailing dot is optional)
//!
//! Both are matched against the serialized input map, so references nested
//! anywhere inside objects or arrays are found.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use fuschia_workflow::Inputs;
use regex::Regex;

fn template_reference() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| {
    Regex::new(r"\{\{\s*\$\.([A-Za-z0-9_-]+)[^}]*\}\}").expect("template reference pattern")
  })
}

fn path_reference() -> &'static Regex {
  static RE: OnceLock<Regex> = OnceLock::new();
  RE.get_or_init(|| Regex::new(r"\$\.([A-Za-z0-9_-]+)\.?").expect("path reference pattern"))
}

/// Distinct node ids referenced anywhere in a piece of text.
pub fn scan_text(text: &str) -> BTreeSet<String> {
  let template_ids = template_reference()
    .captures_iter(text)
    .filter_map(|caps| caps.get(1));
  let path_ids = path_reference()
    .captures_iter(text)
    .filter_map(|caps| caps.get(1));

  template_ids
    .chain(path_ids)
    .map(|m| m.as_str().to_string())
    .collect()
}

/// Distinct node ids referenced by a node's configured inputs.
pub fn scan_references(inputs: &Inputs) -> BTreeSet<String> {
  if inputs.is_empty() {
    return BTreeSet::new();
  }
  // A string-keyed map of JSON values always serializes.
  let serialized = serde_json::to_string(inputs).unwrap_or_default();
  scan_text(&serialized)
}
