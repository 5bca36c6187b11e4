use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use fuschia_config::{TestSettings, WorkflowDef};
use fuschia_gateway::HttpGateway;
use fuschia_store::{
  InMemorySessionRegistry, NodeResult, ResultStore, SessionKey, SqliteResultStore,
};
use fuschia_test_plan::{TestPlan, plan_node_test, plan_workflow_test};
use fuschia_test_runner::{ChannelNotifier, TestError, TestOrchestrator, TestReport};
use fuschia_workflow::Workflow;

const TOKEN_ENV: &str = "FUSCHIA_GATEWAY_TOKEN";

/// Fuschia - plan and run tests of workflow canvases
#[derive(Parser)]
#[command(name = "fuschia")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.fuschia)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  /// Execution gateway base URL, overriding config.json
  #[arg(long, global = true)]
  gateway_url: Option<String>,

  /// Log filter used when RUST_LOG is not set
  #[arg(long, global = true, default_value = "info")]
  log_level: String,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Compile a test and print the execution request without running it
  Plan {
    #[command(subcommand)]
    target: Target,
  },

  /// Run a test through the execution gateway
  Test {
    #[command(subcommand)]
    target: Target,
  },

  /// Inspect or edit cached node results
  Results {
    #[command(subcommand)]
    action: ResultsAction,
  },
}

#[derive(Subcommand)]
enum Target {
  /// Test a single node and its ancestors
  Node {
    /// Path to the canvas snapshot (JSON)
    workflow_file: PathBuf,

    /// The node ID to test
    #[arg(long)]
    node: String,
  },

  /// Test every node reachable from the trigger
  Workflow {
    /// Path to the canvas snapshot (JSON)
    workflow_file: PathBuf,
  },
}

#[derive(Subcommand)]
enum ResultsAction {
  /// List every cached result
  List,

  /// Show the cached result of a node
  Show { node: String },

  /// Remove the cached result of a node, or all results
  Clear { node: Option<String> },

  /// Store a successful result for a node
  Set {
    node: String,

    /// Result payload (JSON)
    #[arg(long)]
    data: String,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_tracing(&cli.log_level);

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".fuschia"),
  };

  let Some(command) = cli.command else {
    println!("fuschia - use --help to see available commands");
    return Ok(());
  };

  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async {
    let results = open_results(&data_dir).await?;

    match command {
      Commands::Plan { target } => plan(target, results.as_ref()).await,
      Commands::Test { target } => {
        let settings = load_settings(&data_dir, cli.gateway_url).await?;
        test(target, results, settings).await
      }
      Commands::Results { action } => manage_results(action, results.as_ref()).await,
    }
  })
}

fn init_tracing(default_filter: &str) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

  // stdout carries JSON output only
  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
    .with(filter)
    .init();
}

async fn open_results(data_dir: &Path) -> Result<Arc<dyn ResultStore>> {
  tokio::fs::create_dir_all(data_dir)
    .await
    .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;

  let path = data_dir.join("results.db");
  let store = SqliteResultStore::open(&path)
    .await
    .with_context(|| format!("failed to open result store: {}", path.display()))?;

  Ok(Arc::new(store))
}

async fn load_settings(data_dir: &Path, gateway_url: Option<String>) -> Result<TestSettings> {
  let path = data_dir.join("config.json");

  let mut settings = if tokio::fs::try_exists(&path).await.unwrap_or(false) {
    let content = tokio::fs::read_to_string(&path)
      .await
      .with_context(|| format!("failed to read config file: {}", path.display()))?;
    serde_json::from_str(&content)
      .with_context(|| format!("failed to parse config file: {}", path.display()))?
  } else {
    TestSettings::default()
  };

  if let Some(url) = gateway_url {
    settings.gateway.base_url = url;
  }
  if settings.gateway.api_token.is_none() {
    settings.gateway.api_token = std::env::var(TOKEN_ENV).ok();
  }

  info!(
    gateway = %settings.gateway.base_url,
    poll_interval_ms = settings.poll.interval_ms,
    max_attempts = settings.poll.max_attempts,
    "settings_loaded"
  );
  Ok(settings)
}

async fn load_workflow(workflow_file: &Path) -> Result<Workflow> {
  let content = tokio::fs::read_to_string(workflow_file)
    .await
    .with_context(|| format!("failed to read workflow file: {}", workflow_file.display()))?;

  let def: WorkflowDef = serde_json::from_str(&content)
    .with_context(|| format!("failed to parse workflow file: {}", workflow_file.display()))?;

  Workflow::from_def(def).context("invalid workflow")
}

async fn plan(target: Target, results: &dyn ResultStore) -> Result<()> {
  let plan: TestPlan = match target {
    Target::Node {
      workflow_file,
      node,
    } => {
      let workflow = load_workflow(&workflow_file).await?;
      plan_node_test(&workflow, &node, results)
        .await
        .with_context(|| format!("failed to plan test of node '{}'", node))?
    }
    Target::Workflow { workflow_file } => {
      let workflow = load_workflow(&workflow_file).await?;
      plan_workflow_test(&workflow, results)
        .await
        .with_context(|| format!("failed to plan test of workflow '{}'", workflow.name))?
    }
  };

  eprintln!(
    "Execution set: {} node(s), skipped: {:?}, injected: {:?}",
    plan.execution_set.len(),
    plan.excluded,
    plan.dependencies
  );
  println!("{}", serde_json::to_string_pretty(&plan.request)?);

  Ok(())
}

async fn test(target: Target, results: Arc<dyn ResultStore>, settings: TestSettings) -> Result<()> {
  let gateway = HttpGateway::new(&settings.gateway).context("failed to create gateway client")?;
  let sessions = Arc::new(InMemorySessionRegistry::new());

  let (tx, mut rx) = mpsc::unbounded_channel();
  let orchestrator = TestOrchestrator::new(Arc::new(gateway), results, sessions, settings.poll)
    .with_notifier(Arc::new(ChannelNotifier::new(tx)));

  let printer = tokio::spawn(async move {
    while let Some(event) = rx.recv().await {
      if let Ok(line) = serde_json::to_string(&event) {
        eprintln!("{}", line);
      }
    }
  });

  let outcome = match target {
    Target::Node {
      workflow_file,
      node,
    } => {
      let workflow = load_workflow(&workflow_file).await?;
      let key = SessionKey::node(node.as_str());
      run_until_done(&orchestrator, key, orchestrator.test_node(&workflow, &node)).await
    }
    Target::Workflow { workflow_file } => {
      let workflow = load_workflow(&workflow_file).await?;
      run_until_done(
        &orchestrator,
        SessionKey::Workflow,
        orchestrator.test_workflow(&workflow),
      )
      .await
    }
  };

  // Closing the last sender lets the printer drain and exit
  drop(orchestrator);
  printer.await?;

  let report = outcome.context("test failed")?;
  println!("{}", serde_json::to_string_pretty(&report)?);

  Ok(())
}

/// Drive a test, turning Ctrl-C into a cooperative cancel request.
async fn run_until_done(
  orchestrator: &TestOrchestrator,
  key: SessionKey,
  run: impl Future<Output = Result<TestReport, TestError>>,
) -> Result<TestReport, TestError> {
  tokio::pin!(run);

  loop {
    tokio::select! {
      outcome = &mut run => return outcome,
      signal = tokio::signal::ctrl_c() => {
        if signal.is_err() {
          // No signal handler available; wait for the test to finish
          return run.await;
        }
        if orchestrator.request_cancel(&key) {
          eprintln!("Cancelling {}, waiting for the gateway to confirm...", key);
        }
      }
    }
  }
}

async fn manage_results(action: ResultsAction, results: &dyn ResultStore) -> Result<()> {
  match action {
    ResultsAction::List => {
      let all = results.list().await?;
      println!("{}", serde_json::to_string_pretty(&all)?);
    }
    ResultsAction::Show { node } => {
      let Some(result) = results.get(&node).await? else {
        bail!("no cached result for node '{}'", node);
      };
      println!("{}", serde_json::to_string_pretty(&result)?);
    }
    ResultsAction::Clear { node: Some(node) } => {
      results.remove(&node).await?;
      eprintln!("Cleared result for {}", node);
    }
    ResultsAction::Clear { node: None } => {
      results.clear().await?;
      eprintln!("Cleared all results");
    }
    ResultsAction::Set { node, data } => {
      let data: serde_json::Value =
        serde_json::from_str(&data).context("failed to parse --data as JSON")?;
      results.set(NodeResult::success(node.as_str(), data)).await?;
      eprintln!("Stored result for {}", node);
    }
  }

  Ok(())
}
