//! Chronicler CLI entry point

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use chronicler::application::{ChronicleOptions, ChronicleRun, Council, CouncilConfig};
use chronicler::config::ChroniclerConfig;
use chronicler::infrastructure::cache::SummaryCache;
use chronicler::infrastructure::gateway::HttpGateway;
use chronicler::infrastructure::store;

#[derive(Parser, Debug)]
#[command(name = "chronicler", about = "Generate portfolio project summaries via an LLM council")]
struct Cli {
    /// Input project document (defaults to the configured path)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output path (defaults to updating the input document in place)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Cache file path (defaults to the configured path)
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Job-description context file; tailors output and disables the cache
    #[arg(long)]
    context: Option<PathBuf>,

    /// LLM provider to use
    #[arg(long, default_value = "openrouter")]
    provider: String,

    /// Run only for a specific project name
    #[arg(long)]
    project: Option<String>,

    /// Regenerate summaries, ignoring the cache and existing values
    #[arg(long)]
    force: bool,

    /// Don't save changes
    #[arg(long)]
    dry_run: bool,

    /// Optional JSON config file overriding defaults
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chronicler=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = ChroniclerConfig::load(cli.config.as_deref())?;

    if config.provider(&cli.provider).is_none() {
        bail!(
            "unknown provider '{}'; configured providers: {}",
            cli.provider,
            config.providers.keys().cloned().collect::<Vec<_>>().join(", ")
        );
    }

    let input = cli.input.unwrap_or_else(|| config.paths.input.clone());
    let output = cli.output.unwrap_or_else(|| input.clone());
    let cache_path = cli.cache.unwrap_or_else(|| config.paths.cache.clone());

    let job_context = match &cli.context {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read context file {}", path.display()))?,
        ),
        None => None,
    };

    tracing::info!(
        provider = %cli.provider,
        force = cli.force,
        dry_run = cli.dry_run,
        input = %input.display(),
        "Starting chronicle run"
    );

    let mut projects = store::load_projects(&input)?;
    let cache = SummaryCache::load(&cache_path);

    let gateway = Arc::new(HttpGateway::new(&config));
    let council = Council::new(
        gateway,
        CouncilConfig {
            provider: cli.provider,
            fallback_provider: config.fallback_provider.clone(),
            stage_cooldown: config.cooldown.stage(),
        },
    );

    let options = ChronicleOptions {
        force: cli.force,
        project_filter: cli.project,
        job_context,
    };

    let mut run = ChronicleRun::new(council, cache, options, config.cooldown.project());
    let report = run.execute(&mut projects).await;

    run.persist(&output, &projects, &report, cli.dry_run)?;

    tracing::info!(
        generated = report.generated,
        from_cache = report.from_cache,
        skipped = report.skipped,
        failed = report.failed,
        "Done"
    );
    Ok(())
}
