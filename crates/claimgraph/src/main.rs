use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use claimgraph_core::config::StageConfig;
use claimgraph_core::graph::HttpGraphClient;
use claimgraph_core::staging::{self, ClaimsDataset, NodeSet};
use comfy_table::Table;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Claims feature staging and graph loading", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the derived tables and print their shapes
    Features(FeaturesArgs),
    /// Build the derived tables and merge their node keys into the graph store
    LoadNodes(LoadNodesArgs),
}

#[derive(Args, Debug, Default)]
struct FeaturesArgs {
    /// Directory containing the source CSV files
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
struct LoadNodesArgs {
    /// Directory containing the source CSV files
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Number of keys sent per merge request
    #[arg(long)]
    chunk_size: Option<usize>,
    /// Node sets to load (beneficiary, claim, provider, physician); defaults to all
    #[arg(long = "set")]
    sets: Vec<NodeSet>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Features(args) => {
            if let Some(data_dir) = args.data_dir {
                config.data_dir = data_dir;
            }
            handle_features(&config)
        }
        Command::LoadNodes(args) => {
            if let Some(data_dir) = args.data_dir {
                config.data_dir = data_dir;
            }
            if let Some(chunk_size) = args.chunk_size {
                config.chunk_size = chunk_size;
            }
            let sets = if args.sets.is_empty() {
                NodeSet::ALL.to_vec()
            } else {
                args.sets
            };
            handle_load_nodes(&config, &sets).await
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<StageConfig> {
    dotenvy::dotenv().ok();

    let mut config = match path {
        Some(path) => StageConfig::from_file(path)
            .with_context(|| format!("failed to load config from '{}'", path.display()))?,
        None => StageConfig::default(),
    };
    config
        .apply_process_env()
        .context("invalid environment override")?;
    Ok(config)
}

fn build_dataset(config: &StageConfig) -> Result<ClaimsDataset> {
    staging::load_dataset(&config.data_dir).with_context(|| {
        format!(
            "failed to build claims dataset from '{}'",
            config.data_dir.display()
        )
    })
}

fn handle_features(config: &StageConfig) -> Result<()> {
    let dataset = build_dataset(config)?;

    let mut table = Table::new();
    table.set_header(vec!["table", "rows", "columns"]);
    for (name, df) in [
        ("beneficiary", &dataset.beneficiaries),
        ("claim", &dataset.claims),
        ("provider", &dataset.providers),
    ] {
        table.add_row(vec![
            name.to_string(),
            df.height().to_string(),
            df.width().to_string(),
        ]);
    }
    println!("{table}");

    Ok(())
}

async fn handle_load_nodes(config: &StageConfig, sets: &[NodeSet]) -> Result<()> {
    let dataset = build_dataset(config)?;
    let client = HttpGraphClient::new(&config.graph).context("failed to configure graph client")?;

    let reports = staging::stage_nodes(&client, &dataset, sets, config.chunk_size)
        .await
        .context("node staging failed")?;

    for report in &reports {
        info!(
            label = %report.label,
            total = report.total,
            loaded = report.loaded(),
            batches = report.batches.len(),
            "Node set staged"
        );
    }

    Ok(())
}
