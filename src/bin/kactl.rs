//! # KACTL
//!
//! Command-line host for the Kinesis Analytics v2 reconcilers.
//!
//! Declared and prior state are read from YAML or JSON documents; the
//! resulting state is printed to stdout. Failures are printed as diagnostics.
//!
//! ## Usage
//!
//! ```bash
//! # Create an application from a declared state document
//! kactl application create -f app.yaml > app.state.yaml
//!
//! # Move it to a new declared state
//! kactl application update --prior app.state.yaml -f app.yaml
//!
//! # Adopt an existing application by name or ARN
//! kactl application import arn:aws:kinesisanalytics:us-east-1:123456789012:application/my-app
//!
//! # Snapshot it, then remove the snapshot
//! kactl snapshot create -f snapshot.yaml > snapshot.state.yaml
//! kactl snapshot delete -f snapshot.state.yaml
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use kinesis_analytics_controller::observability::{init_tracing, metrics};
use kinesis_analytics_controller::provider::aws::AwsKinesisAnalytics;
use kinesis_analytics_controller::provider::KinesisAnalyticsApi;
use kinesis_analytics_controller::{
    ApplicationReconciler, ControllerConfig, Diagnostics, MaintenanceReconciler,
    OperationContext, ResourceHandler, SnapshotReconciler,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Kinesis Analytics v2 reconciler CLI
#[derive(Parser)]
#[command(name = "kactl")]
#[command(
    about = "Reconcile Kinesis Analytics v2 applications, snapshots and maintenance windows",
    long_about = None,
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_GIT_HASH"), ", built ", env!("BUILD_DATETIME"), ")"),
    after_help = "\
Available resource types:
  application  - Kinesis Analytics v2 application
  snapshot     - application snapshot (id: <application-name>/<snapshot-name>)
  maintenance  - application maintenance window (id: <application-name>)

Examples:
  kactl application create -f app.yaml
  kactl snapshot import my-app/nightly
  kactl maintenance update --prior window.state.yaml -f window.yaml
"
)]
struct Cli {
    #[command(subcommand)]
    resource: Resource,

    /// AWS region (defaults to the SDK provider chain)
    #[arg(short, long, global = true)]
    region: Option<String>,

    /// Output format for the resulting state
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Yaml)]
    output: OutputFormat,

    /// Print Prometheus metrics to stderr on exit
    #[arg(long, global = true)]
    metrics: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Subcommand)]
enum Resource {
    /// Kinesis Analytics v2 application
    #[command(alias = "app")]
    Application {
        #[command(subcommand)]
        action: Action,
    },
    /// Application snapshot
    Snapshot {
        #[command(subcommand)]
        action: Action,
    },
    /// Application maintenance window
    Maintenance {
        #[command(subcommand)]
        action: Action,
    },
}

#[derive(Subcommand)]
enum Action {
    /// Create from a declared state document
    Create {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Refresh a state document from the remote
    Read {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Move from prior state to a declared state document
    Update {
        /// State document returned by an earlier create, read or import
        #[arg(long)]
        prior: PathBuf,
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Delete the resource a state document describes
    Delete {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Adopt an existing resource by id
    Import { id: String },
}

fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    } else {
        serde_yaml::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

fn print<T: Serialize>(state: &T, format: OutputFormat) -> Result<()> {
    let rendered = match format {
        OutputFormat::Yaml => serde_yaml::to_string(state).context("Failed to render state as YAML")?,
        OutputFormat::Json => {
            serde_json::to_string_pretty(state).context("Failed to render state as JSON")?
        }
    };
    println!("{rendered}");
    Ok(())
}

fn fail(diagnostics: &Diagnostics) -> anyhow::Error {
    for diagnostic in diagnostics.iter() {
        match &diagnostic.detail {
            Some(detail) => eprintln!("Error: {}\n  {detail}", diagnostic.summary),
            None => eprintln!("Error: {}", diagnostic.summary),
        }
    }
    anyhow::anyhow!("{} failed with {} diagnostic(s)", env!("CARGO_BIN_NAME"), diagnostics.0.len())
}

async fn run<H>(handler: &H, action: Action, ctx: &OperationContext, format: OutputFormat) -> Result<()>
where
    H: ResourceHandler,
    H::State: Serialize + DeserializeOwned,
{
    let kind = handler.type_name();
    match action {
        Action::Create { file } => {
            let desired: H::State = load(&file)?;
            let state = handler.create(&desired, ctx).await.map_err(|d| fail(&d))?;
            print(&state, format)
        }
        Action::Read { file } => {
            let current: H::State = load(&file)?;
            match handler.read(&current, ctx).await.map_err(|d| fail(&d))? {
                Some(state) => print(&state, format),
                None => {
                    warn!(resource = kind, "Resource no longer exists");
                    Ok(())
                }
            }
        }
        Action::Update { prior, file } => {
            let prior: H::State = load(&prior)?;
            let desired: H::State = load(&file)?;
            let state = handler
                .update(&prior, &desired, ctx)
                .await
                .map_err(|d| fail(&d))?;
            print(&state, format)
        }
        Action::Delete { file } => {
            let current: H::State = load(&file)?;
            handler.delete(&current, ctx).await.map_err(|d| fail(&d))?;
            info!(resource = kind, "Deleted");
            Ok(())
        }
        Action::Import { id } => {
            let state = handler.import(&id, ctx).await.map_err(|d| fail(&d))?;
            print(&state, format)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = ControllerConfig::from_env();
    if cli.region.is_some() {
        config.region.clone_from(&cli.region);
    }

    init_tracing(&config);
    if let Err(e) = metrics::register_metrics() {
        bail!("Failed to register metrics: {e}");
    }

    let cancellation = CancellationToken::new();
    let on_signal = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling in-flight waits");
            on_signal.cancel();
        }
    });
    let ctx = OperationContext::with_cancellation(cancellation);

    let api: Arc<dyn KinesisAnalyticsApi> =
        Arc::new(AwsKinesisAnalytics::from_env(config.region.as_deref()).await);

    let result = match cli.resource {
        Resource::Application { action } => {
            let handler = ApplicationReconciler::new(Arc::clone(&api), config.clone());
            run(&handler, action, &ctx, cli.output).await
        }
        Resource::Snapshot { action } => {
            let handler = SnapshotReconciler::new(Arc::clone(&api), config.clone());
            run(&handler, action, &ctx, cli.output).await
        }
        Resource::Maintenance { action } => {
            let handler = MaintenanceReconciler::new(Arc::clone(&api));
            run(&handler, action, &ctx, cli.output).await
        }
    };

    if cli.metrics {
        eprintln!("{}", metrics::render().context("Failed to render metrics")?);
    }
    result
}
