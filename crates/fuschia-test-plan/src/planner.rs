//! End-to-end planning for node and workflow tests.

use std::collections::{BTreeSet, HashMap, HashSet};

use fuschia_store::{NodeResult, ResultStore};
use fuschia_workflow::Workflow;
use tracing::{info, instrument};

use crate::compiler::compile_subgraph;
use crate::error::{GraphError, PlanError};
use crate::reachability::{find_trigger, predecessor_closure, reachable_from};
use crate::request::{ExecutionRequest, build_request};
use crate::scanner::scan_references;

/// What a plan tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanScope {
  Node,
  Workflow,
}

/// A compiled test, ready for submission.
#[derive(Debug, Clone)]
pub struct TestPlan {
  pub scope: PlanScope,
  /// Node id for node tests, workflow id for workflow tests.
  pub target: String,
  pub request: ExecutionRequest,
  /// Nodes that will run, in canvas order.
  pub execution_set: Vec<String>,
  /// Nodes of the full set replaced by cached state.
  pub excluded: BTreeSet<String>,
  /// Every referenced node whose cached result is injected.
  pub dependencies: BTreeSet<String>,
}

/// Plan a test of a single node.
///
/// Runs the node together with all of its ancestors. Ancestors the node
/// references directly are not re-run; their cached results are injected
/// instead. Any node referenced by the target or by an executed ancestor
/// that lies outside the ancestry must be cached and is injected too.
#[instrument(name = "plan_node_test", skip(workflow, results), fields(workflow_id = %workflow.workflow_id))]
pub async fn plan_node_test(
  workflow: &Workflow,
  node_id: &str,
  results: &dyn ResultStore,
) -> Result<TestPlan, PlanError> {
  let node = workflow
    .get_node(node_id)
    .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))?;

  let mut dependencies = scan_references(&node.inputs);
  dependencies.remove(node_id);

  let closure = predecessor_closure(workflow, node_id)?;
  let excluded: HashSet<String> = dependencies
    .iter()
    .filter(|id| closure.contains(*id))
    .cloned()
    .collect();

  let compiled = compile_subgraph(workflow, &closure, &excluded)?;

  // Executed ancestors may reference nodes the run will never produce
  for ancestor in compiled.execution_set.iter().filter(|id| id.as_str() != node_id) {
    let Some(inputs) = workflow.config(ancestor) else {
      continue;
    };
    dependencies.extend(
      scan_references(inputs)
        .into_iter()
        .filter(|id| id != ancestor && !closure.contains(id)),
    );
  }

  let cached = load_cached(node_id, &dependencies, results).await?;
  let request = build_request(workflow, &compiled, &cached);

  info!(
    node_id = %node_id,
    actions = request.actions.len(),
    edges = request.edges.len(),
    excluded = ?compiled.excluded,
    dependencies = ?dependencies,
    "node_test_planned"
  );

  Ok(TestPlan {
    scope: PlanScope::Node,
    target: node_id.to_string(),
    request,
    execution_set: compiled.execution_set,
    excluded: compiled.excluded,
    dependencies,
  })
}

/// Plan a test of the whole workflow.
///
/// Runs every node reachable from the trigger. References between those
/// nodes are satisfied by execution; references to nodes outside the
/// reachable set need cached results.
#[instrument(name = "plan_workflow_test", skip(workflow, results), fields(workflow_id = %workflow.workflow_id))]
pub async fn plan_workflow_test(
  workflow: &Workflow,
  results: &dyn ResultStore,
) -> Result<TestPlan, PlanError> {
  let trigger = find_trigger(workflow)?;
  let reachable = reachable_from(workflow, &trigger.node_id)?;
  if reachable.len() <= 1 {
    return Err(
      GraphError::NothingConnectedToTrigger {
        trigger: trigger.node_id.clone(),
      }
      .into(),
    );
  }

  let dependencies: BTreeSet<String> = workflow
    .nodes()
    .iter()
    .filter(|node| reachable.contains(&node.node_id))
    .flat_map(|node| scan_references(&node.inputs))
    .filter(|id| !reachable.contains(id))
    .collect();

  let compiled = compile_subgraph(workflow, &reachable, &HashSet::new())?;
  let cached = load_cached(&workflow.workflow_id, &dependencies, results).await?;
  let request = build_request(workflow, &compiled, &cached);

  info!(
    trigger = %trigger.node_id,
    actions = request.actions.len(),
    edges = request.edges.len(),
    dependencies = ?dependencies,
    "workflow_test_planned"
  );

  Ok(TestPlan {
    scope: PlanScope::Workflow,
    target: workflow.workflow_id.clone(),
    request,
    execution_set: compiled.execution_set,
    excluded: compiled.excluded,
    dependencies,
  })
}

/// Fetch the cached result of every dependency, failing if any is missing.
async fn load_cached(
  requester: &str,
  dependencies: &BTreeSet<String>,
  results: &dyn ResultStore,
) -> Result<HashMap<String, NodeResult>, PlanError> {
  let mut cached = HashMap::with_capacity(dependencies.len());
  let mut missing = Vec::new();

  for id in dependencies {
    match results.get(id).await? {
      Some(result) => {
        cached.insert(id.clone(), result);
      }
      None => missing.push(id.clone()),
    }
  }

  if !missing.is_empty() {
    return Err(PlanError::DependencyMissing {
      node_id: requester.to_string(),
      missing,
    });
  }

  Ok(cached)
}
