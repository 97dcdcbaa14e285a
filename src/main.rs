use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use family_lca::{
    config::Config,
    lineage::AncestryAnalyzer,
    render::GraphRenderer,
    reports::{generator::MISSING_DATA_MESSAGE, ReportGenerator},
    source::{self, cache::read_response_file, AncestorSource, FileSource, ResponseCache, WikiTreeClient},
    types::*,
    LcaError,
};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "family-lca")]
#[command(about = "Find the most recent common ancestor of two WikiTree profiles")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level
    #[arg(short, long, env = "FAMILY_LCA_LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    /// Configuration file path
    #[arg(short, long, env = "FAMILY_LCA_CONFIG", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch both ancestor lists from WikiTree and resolve their common ancestor
    Resolve {
        /// WikiTree name of the first individual (e.g. Windsor-1)
        first: String,

        /// WikiTree name of the second individual
        second: String,

        /// Generations to fetch per individual
        #[arg(short, long)]
        depth: Option<u32>,

        /// Read cached responses only, never call the API
        #[arg(long)]
        offline: bool,

        /// Do not write fetched responses to the cache
        #[arg(long, conflicts_with = "offline")]
        no_cache: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Resolve from two saved getAncestors response files
    ResolveFiles {
        /// WikiTree name of the first individual
        first: String,

        /// WikiTree name of the second individual
        second: String,

        /// Response file for the first individual
        #[arg(long)]
        first_file: PathBuf,

        /// Response file for the second individual
        #[arg(long)]
        second_file: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Initialize configuration file
    Init {
        /// Configuration file path
        #[arg(short = 'f', long, default_value = "family-lca.yml")]
        config_file: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Output format (text, markdown, json)
    #[arg(short, long)]
    output: Option<String>,

    /// Output file path (defaults to stdout)
    #[arg(short = 'f', long)]
    output_file: Option<PathBuf>,

    /// Write a Graphviz tree per individual
    #[arg(long)]
    render: bool,

    /// Directory for rendered trees
    #[arg(long)]
    render_dir: Option<PathBuf>,
}

impl OutputArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(format) = &self.output {
            config.output.format = format.clone();
        }
        if self.render {
            config.output.render = true;
        }
        if let Some(directory) = &self.render_dir {
            config.output.render_directory = directory.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(&cli.log_level)?;

    info!("Starting family-lca");

    let mut config = load_config(cli.config.as_ref()).await?;

    match cli.command {
        Commands::Resolve {
            first,
            second,
            depth,
            offline,
            no_cache,
            output,
        } => {
            if let Some(depth) = depth {
                config.api.depth = depth;
            }
            if offline {
                config.cache.enabled = true;
                config.cache.offline = true;
            }
            if no_cache {
                config.cache.enabled = false;
            }
            output.apply(&mut config);
            config.validate()?;

            resolve(first, second, output.output_file, config).await?;
        }

        Commands::ResolveFiles {
            first,
            second,
            first_file,
            second_file,
            output,
        } => {
            output.apply(&mut config);
            config.validate()?;

            resolve_files(first, second, first_file, second_file, output.output_file, config).await?;
        }

        Commands::Init { config_file, force } => {
            init_config(config_file, force).await?;
        }
    }

    Ok(())
}

/// Initialize tracing with the specified log level
fn init_tracing(log_level: &str) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))
        .context("Failed to create env filter")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_level(true),
        )
        .with(env_filter)
        .init();

    Ok(())
}

/// Load configuration from file or use defaults, then apply the environment
async fn load_config(config_path: Option<&PathBuf>) -> Result<Config> {
    if let Some(path) = config_path {
        if path.exists() {
            info!("Loading configuration from: {:?}", path);
            let mut config = Config::default();
            config.merge_with(Config::load_from_file(path).await?);
            config.apply_env()?;
            return Ok(config);
        }
        warn!("Configuration file not found: {:?}. Using defaults.", path);
    }

    Config::load_from_env()
}

/// Fetch both ancestor lists and resolve their common ancestor
async fn resolve(first: String, second: String, output_file: Option<PathBuf>, config: Config) -> Result<()> {
    let cache = ResponseCache::new(&config.cache.directory);

    let source: Box<dyn AncestorSource> = if config.cache.offline {
        info!("Offline mode: reading cached responses from {:?}", cache.directory());
        Box::new(FileSource::new(cache))
    } else {
        let client = WikiTreeClient::new(&config.api)?;
        if config.cache.enabled {
            Box::new(client.with_cache(cache))
        } else {
            Box::new(client)
        }
    };

    let lists = source::fetch_family_tree_data(source.as_ref(), &first, &second).await?;
    run_query(lists, output_file, &config).await
}

/// Resolve from response files saved earlier
async fn resolve_files(
    first: String,
    second: String,
    first_file: PathBuf,
    second_file: PathBuf,
    output_file: Option<PathBuf>,
    config: Config,
) -> Result<()> {
    let first_records = read_records(&first_file).await;
    let second_records = read_records(&second_file).await;

    let lists = AncestorLists {
        first,
        second,
        first_records,
        second_records,
    };
    run_query(lists, output_file, &config).await
}

async fn read_records(path: &PathBuf) -> Option<Vec<AncestorRecord>> {
    match read_response_file(path).await {
        Ok(records) => records,
        Err(e) => {
            warn!("{:#}", e);
            None
        }
    }
}

/// Build the graph, select the ancestor, render and report
async fn run_query(lists: AncestorLists, output_file: Option<PathBuf>, config: &Config) -> Result<()> {
    let resolved = match AncestryAnalyzer::new().resolve(lists) {
        Ok(resolved) => resolved,
        Err(LcaError::MissingInputData(key)) => {
            error!("Missing ancestor data for {}", key);
            println!("{}", MISSING_DATA_MESSAGE);
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Failed to resolve common ancestor"),
    };
    let outcome = &resolved.outcome;

    let stats = resolved.graph.get_statistics();
    info!(
        "Family graph: {} people, {} edges ({} parent links), {} roots",
        stats.total_nodes, stats.total_edges, stats.parent_edges, stats.root_nodes
    );

    if config.output.render {
        let trees = [
            (&outcome.first, &outcome.first_root),
            (&outcome.second, &outcome.second_root),
        ];
        for (key, root) in trees {
            match root {
                Some(root) => {
                    println!("Visualizing tree for {}", key);
                    GraphRenderer::render_tree(&resolved.graph, root, key, &config.output.render_directory).await?;
                }
                None => warn!("No root found for {}, skipping visualization", key),
            }
        }
    }

    output_report(outcome, &config.output.format, output_file.as_ref()).await
}

/// Output the report in the specified format
async fn output_report(outcome: &LcaOutcome, format: &str, output_file: Option<&PathBuf>) -> Result<()> {
    let content = ReportGenerator::new().generate(outcome, format)?;

    if let Some(file_path) = output_file {
        tokio::fs::write(file_path, &content)
            .await
            .with_context(|| format!("Failed to write output to: {:?}", file_path))?;
        info!("Report written to: {:?}", file_path);
    } else {
        println!("{}", content);
    }

    Ok(())
}

/// Initialize configuration file
async fn init_config(config_file: PathBuf, force: bool) -> Result<()> {
    info!("Initializing configuration file: {:?}", config_file);

    if config_file.exists() && !force {
        warn!("Configuration file already exists: {:?}. Use --force to overwrite.", config_file);
        return Ok(());
    }

    Config::default()
        .save_to_file(&config_file)
        .await
        .with_context(|| format!("Failed to write configuration file: {:?}", config_file))?;

    info!("Configuration file created successfully: {:?}", config_file);
    println!("Configuration file created: {:?}", config_file);
    println!("Edit this file to customize the resolver behavior.");

    Ok(())
}
