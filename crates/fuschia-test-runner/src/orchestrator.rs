//! Node and workflow test entry points.

use std::sync::Arc;

use fuschia_config::PollSettings;
use fuschia_gateway::ExecutionGateway;
use fuschia_store::{NodeResult, ResultStore, SessionKey, SessionRegistry, SessionScope};
use fuschia_test_plan::{GraphError, PlanError, TestPlan, plan_node_test, plan_workflow_test};
use fuschia_workflow::{Node, Workflow, is_trigger};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::error::TestError;
use crate::events::TestNotifier;
use crate::reconcile::{match_node, reconcile};
use crate::supervisor::{PollingSupervisor, RunOutcome};

/// How a test that did not fail ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
  Succeeded,
  Cancelled,
}

/// Outcome of a test that did not fail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestReport {
  /// Node id for node tests, workflow id for workflow tests.
  pub target: String,
  pub status: TestStatus,
  /// Results written to the result store. Empty when cancelled.
  pub results: Vec<NodeResult>,
}

impl TestReport {
  fn cancelled(target: impl Into<String>) -> Self {
    Self {
      target: target.into(),
      status: TestStatus::Cancelled,
      results: Vec::new(),
    }
  }
}

/// Plans, runs and reconciles tests.
///
/// Every failure except a rejected duplicate run writes a failure result for
/// the nodes under test, so the last-known state always reflects the last
/// attempt.
#[derive(Clone)]
pub struct TestOrchestrator {
  supervisor: PollingSupervisor,
  results: Arc<dyn ResultStore>,
}

impl TestOrchestrator {
  pub fn new(
    gateway: Arc<dyn ExecutionGateway>,
    results: Arc<dyn ResultStore>,
    sessions: Arc<dyn SessionRegistry>,
    poll: PollSettings,
  ) -> Self {
    Self {
      supervisor: PollingSupervisor::new(gateway, sessions, poll),
      results,
    }
  }

  pub fn with_notifier(mut self, notifier: Arc<dyn TestNotifier>) -> Self {
    self.supervisor = self.supervisor.with_notifier(notifier);
    self
  }

  pub fn results(&self) -> &Arc<dyn ResultStore> {
    &self.results
  }

  pub fn sessions(&self) -> &Arc<dyn SessionRegistry> {
    self.supervisor.sessions()
  }

  /// Test a single node together with its ancestors.
  #[instrument(name = "test_node", skip(self, workflow), fields(workflow_id = %workflow.workflow_id))]
  pub async fn test_node(&self, workflow: &Workflow, node_id: &str) -> Result<TestReport, TestError> {
    let plan = plan_node_test(workflow, node_id, self.results.as_ref()).await?;
    let node = workflow
      .get_node(node_id)
      .ok_or_else(|| PlanError::from(GraphError::NodeNotFound(node_id.to_string())))?;

    let outcome = self
      .supervisor
      .run(SessionScope::Node, node_id, &plan.request)
      .await;

    match outcome {
      Ok(RunOutcome::Succeeded { data }) => {
        let reconciled = reconcile(&data, node);
        let result = NodeResult::success(node_id, reconciled.data);
        self.results.set(result.clone()).await?;
        info!(node_id = %node_id, matched = ?reconciled.matched, "node_test_succeeded");

        Ok(TestReport {
          target: node_id.to_string(),
          status: TestStatus::Succeeded,
          results: vec![result],
        })
      }
      Ok(RunOutcome::Cancelled) => {
        info!(node_id = %node_id, "node_test_cancelled");
        Ok(TestReport::cancelled(node_id))
      }
      Err(e @ TestError::AlreadyRunning { .. }) => Err(e),
      Err(e) => {
        self.record_failures(&[node], &e).await;
        Err(e)
      }
    }
  }

  /// Test every node reachable from the workflow's trigger.
  #[instrument(name = "test_workflow", skip(self, workflow), fields(workflow_id = %workflow.workflow_id))]
  pub async fn test_workflow(&self, workflow: &Workflow) -> Result<TestReport, TestError> {
    let plan = plan_workflow_test(workflow, self.results.as_ref()).await?;
    let actions = action_nodes(workflow, &plan);

    let outcome = self
      .supervisor
      .run(SessionScope::Workflow, &workflow.workflow_id, &plan.request)
      .await;

    match outcome {
      Ok(RunOutcome::Succeeded { data }) => {
        let results = self.record_workflow_results(&data, &actions).await?;
        info!(
          workflow_id = %workflow.workflow_id,
          results = results.len(),
          actions = actions.len(),
          "workflow_test_succeeded"
        );

        Ok(TestReport {
          target: workflow.workflow_id.clone(),
          status: TestStatus::Succeeded,
          results,
        })
      }
      Ok(RunOutcome::Cancelled) => {
        info!(workflow_id = %workflow.workflow_id, "workflow_test_cancelled");
        Ok(TestReport::cancelled(&workflow.workflow_id))
      }
      Err(e @ TestError::AlreadyRunning { .. }) => Err(e),
      Err(e) => {
        self.record_failures(&actions, &e).await;
        Err(e)
      }
    }
  }

  /// Ask a running test to cancel. Returns false if nothing is running in
  /// the slot or its session already finished.
  pub fn request_cancel(&self, key: &SessionKey) -> bool {
    let requested = self.sessions().request_cancel(key);
    info!(key = %key, requested, "test_cancel_requested");
    requested
  }

  pub fn is_testing(&self, node_id: &str) -> bool {
    self.sessions().is_testing(node_id)
  }

  pub fn is_workflow_testing(&self) -> bool {
    self.sessions().is_workflow_testing()
  }

  /// Write the results the payload can be matched to. Unmatched nodes keep
  /// their previous result.
  async fn record_workflow_results(
    &self,
    data: &serde_json::Value,
    actions: &[&Node],
  ) -> Result<Vec<NodeResult>, TestError> {
    let Some(entries) = data.as_object() else {
      warn!(actions = actions.len(), "reconcile_payload_not_object");
      return Ok(Vec::new());
    };

    let mut results = Vec::new();
    for node in actions {
      match match_node(entries, node) {
        Some(reconciled) => {
          let result = NodeResult::success(&node.node_id, reconciled.data);
          self.results.set(result.clone()).await?;
          results.push(result);
        }
        None => warn!(node_id = %node.node_id, "reconcile_ambiguous"),
      }
    }

    Ok(results)
  }

  async fn record_failures(&self, nodes: &[&Node], err: &TestError) {
    let message = err.to_string();
    for node in nodes {
      if let Err(store_err) = self
        .results
        .set(NodeResult::failure(&node.node_id, &message))
        .await
      {
        error!(node_id = %node.node_id, error = %store_err, "failure_result_not_written");
      }
    }
  }
}

/// Non-trigger nodes of a plan, in canvas order.
fn action_nodes<'a>(workflow: &'a Workflow, plan: &TestPlan) -> Vec<&'a Node> {
  plan
    .execution_set
    .iter()
    .filter_map(|id| workflow.get_node(id))
    .filter(|node| !is_trigger(node))
    .collect()
}
