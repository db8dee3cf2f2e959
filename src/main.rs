//! omctl - operator CLI for the metadata catalog

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use ometa::api::DEFAULT_LINEAGE_DEPTH;
use ometa::entity::models::*;
use ometa::entity::spec_for;
use ometa::error::format_error;
use ometa::{EntityKind, ListParams, MetadataServerConfig, OpenMetadata, Shape};
use serde_json::Value;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Operator CLI for the metadata catalog
#[derive(Parser, Debug)]
#[command(name = "omctl", version, about, long_about = None)]
struct Args {
    /// Config file (defaults to the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Catalog API endpoint, e.g. http://localhost:8585/api
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the server health endpoint
    Health,
    /// List entities of a kind
    List {
        kind: EntityKind,
        /// Page size
        #[arg(long, default_value_t = ometa::api::DEFAULT_LIST_LIMIT)]
        limit: usize,
        /// Comma-separated extra fields
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
        /// Continuation cursor from a previous page
        #[arg(long)]
        after: Option<String>,
        /// Follow cursors until the last page
        #[arg(long)]
        all: bool,
        /// Print the server response as-is instead of the decoded entities
        #[arg(long, conflicts_with = "all")]
        raw: bool,
    },
    /// Fetch one entity
    Get {
        kind: EntityKind,
        #[command(flatten)]
        target: Target,
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },
    /// Delete an entity by id
    Delete { kind: EntityKind, id: Uuid },
    /// Recompute usage percentiles for a kind on a date (YYYY-MM-DD)
    Percentile { kind: String, date: NaiveDate },
    /// Show the lineage graph around an entity
    Lineage {
        kind: EntityKind,
        #[command(flatten)]
        target: Target,
        #[arg(long, default_value_t = DEFAULT_LINEAGE_DEPTH)]
        upstream: u32,
        #[arg(long, default_value_t = DEFAULT_LINEAGE_DEPTH)]
        downstream: u32,
    },
}

#[derive(ClapArgs, Debug)]
#[group(required = true, multiple = false)]
struct Target {
    /// Fully qualified name
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Cannot open log file {}: {}", log_path.display(), e);
            return None;
        },
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing_level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("omctl started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("ometa").join("omctl.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".ometa").join("omctl.log");
    }
    PathBuf::from("omctl.log")
}

fn load_config(args: &Args) -> Result<MetadataServerConfig> {
    let mut config = match &args.config {
        Some(path) => MetadataServerConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => MetadataServerConfig::load_default().context("Failed to load default config")?,
    };

    if let Some(endpoint) = &args.endpoint {
        config.api_endpoint = endpoint.clone();
        config.validate()?;
    }

    Ok(config)
}

/// Runs a generic operation with the read shape bound to `kind`
macro_rules! with_shape {
    ($kind:expr, $op:ident($($arg:expr),*)) => {
        match $kind {
            EntityKind::Table => $op::<Table>($($arg),*).await,
            EntityKind::Database => $op::<Database>($($arg),*).await,
            EntityKind::Dashboard => $op::<Dashboard>($($arg),*).await,
            EntityKind::Pipeline => $op::<Pipeline>($($arg),*).await,
            EntityKind::Topic => $op::<Topic>($($arg),*).await,
            EntityKind::Chart => $op::<Chart>($($arg),*).await,
            EntityKind::Model => $op::<Model>($($arg),*).await,
            EntityKind::Report => $op::<Report>($($arg),*).await,
            EntityKind::Metrics => $op::<Metrics>($($arg),*).await,
            EntityKind::User => $op::<User>($($arg),*).await,
            EntityKind::DatabaseService => $op::<DatabaseService>($($arg),*).await,
            EntityKind::DashboardService => $op::<DashboardService>($($arg),*).await,
            EntityKind::MessagingService => $op::<MessagingService>($($arg),*).await,
            EntityKind::PipelineService => $op::<PipelineService>($($arg),*).await,
            EntityKind::Lineage => Err(anyhow!(
                "lineage edges are not a collection; use the lineage subcommand"
            )),
        }
    };
}

async fn list<E: Shape>(
    metadata: &OpenMetadata,
    params: ListParams,
    all: bool,
    raw: bool,
) -> Result<Value> {
    let is_service = spec_for(E::KIND)?.is_service;
    match (is_service, raw) {
        (true, true) => return Ok(metadata.list_services_raw::<E>().await?),
        (true, false) => return Ok(serde_json::to_value(metadata.list_services::<E>().await?)?),
        (false, true) => return Ok(metadata.list_entities_raw::<E>(&params).await?),
        (false, false) => {},
    }

    if all {
        let entities = metadata.list_all_entities::<E>(&params).await?;
        let total = entities.len();
        return Ok(serde_json::json!({ "data": entities, "total": total }));
    }

    let page = metadata.list_entities::<E>(&params).await?;
    Ok(serde_json::json!({
        "data": page.entities,
        "paging": { "total": page.total, "after": page.after },
    }))
}

async fn get<E: Shape>(
    metadata: &OpenMetadata,
    target: &Target,
    fields: &[String],
) -> Result<Value> {
    let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
    let fields = (!fields.is_empty()).then_some(fields.as_slice());

    let entity = match (&target.name, target.id) {
        (Some(name), _) => metadata.get_by_name::<E>(name, fields).await?,
        (None, Some(id)) => metadata.get_by_id::<E>(id, fields).await?,
        (None, None) => return Err(anyhow!("either --name or --id is required")),
    };

    match entity {
        Some(entity) => Ok(serde_json::to_value(entity)?),
        None => Err(anyhow!("{} not found", E::KIND)),
    }
}

async fn delete<E: Shape>(metadata: &OpenMetadata, id: Uuid) -> Result<Value> {
    metadata.delete::<E>(id).await?;
    Ok(serde_json::json!({ "deleted": id }))
}

async fn run(args: &Args) -> Result<Value> {
    let config = load_config(args)?;
    let metadata = OpenMetadata::new(&config)
        .await
        .context("Failed to initialize catalog client")?;

    match &args.command {
        Command::Health => {
            let healthy = metadata.health_check().await?;
            Ok(serde_json::json!({ "healthy": healthy }))
        },
        Command::List {
            kind,
            limit,
            fields,
            after,
            all,
            raw,
        } => {
            let params = ListParams::default()
                .limit(*limit)
                .fields(fields.as_slice())
                .after(after.clone());
            with_shape!(*kind, list(&metadata, params, *all, *raw))
        },
        Command::Get {
            kind,
            target,
            fields,
        } => with_shape!(*kind, get(&metadata, target, fields)),
        Command::Delete { kind, id } => with_shape!(*kind, delete(&metadata, *id)),
        Command::Percentile { kind, date } => {
            metadata.compute_percentile_by_name(kind, *date).await?;
            Ok(serde_json::json!({ "kind": kind, "date": date.to_string() }))
        },
        Command::Lineage {
            kind,
            target,
            upstream,
            downstream,
        } => {
            let lineage = metadata.lineage();
            let graph = match (&target.name, target.id) {
                (Some(name), _) => {
                    lineage
                        .get_lineage_by_name(*kind, name, *upstream, *downstream)
                        .await?
                },
                (None, Some(id)) => {
                    lineage
                        .get_lineage_by_id(*kind, id, *upstream, *downstream)
                        .await?
                },
                (None, None) => return Err(anyhow!("either --name or --id is required")),
            };
            match graph {
                Some(graph) => Ok(serde_json::to_value(graph)?),
                None => Err(anyhow!("{} not found", kind)),
            }
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    match run(&args).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        },
        Err(err) => {
            tracing::error!("omctl failed: {:?}", err);
            let message = err
                .downcast_ref::<ometa::OmetaError>()
                .map(format_error)
                .unwrap_or_else(|| format!("{:#}", err));
            eprintln!("Error: {}", message);
            std::process::exit(1);
        },
    }
}
