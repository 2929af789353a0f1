//! hyperbolic CLI - talk to a Hyperbolic model from the command line.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hyperbolic_adapter::{HyperbolicClient, KeyChain, KeySource, ProviderConfig, Turn};
use std::path::{Path, PathBuf};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "hyperbolic")]
#[command(version)]
#[command(about = "Rate-limited Hyperbolic completion and embedding client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "hyperbolic.toml")]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a completion for a single user message
    Generate {
        /// User message
        #[arg(short, long)]
        prompt: String,

        /// Optional system instruction
        #[arg(short, long)]
        system: Option<String>,
    },

    /// Print the embedding of a text as JSON
    Embed {
        /// Text to embed
        #[arg(short, long)]
        text: String,
    },

    /// Validate configuration file and credentials
    Validate,

    /// Show example configuration
    Example,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
}

fn print_example_config() {
    let example = r#"# hyperbolic configuration file

model = "hyperbolic/meta-llama/Meta-Llama-3.1-70B-Instruct"
base_url = "https://api.hyperbolic.xyz/v1"

# API key lookup: keys file first, then environment
api_key_name = "HYPERBOLIC_API_KEY"
keys_file = "keys.json"

min_interval_ms = 1000
max_attempts = 3
retry_backoff_ms = 2000
temperature = 0.7
max_tokens = 1024
embedding_model = "text-embedding-3-small"
# timeout_secs = 60
"#;
    println!("{example}");
}

fn load(path: &Path) -> Result<(ProviderConfig, KeyChain)> {
    let config = ProviderConfig::from_file(path)
        .with_context(|| format!("Failed to load config from {path:?}"))?;
    let keys = KeyChain::load(&config.keys_file)
        .with_context(|| format!("Failed to load keys from {:?}", config.keys_file))?;
    Ok((config, keys))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Example => {
            print_example_config();
        }

        Commands::Validate => {
            let (config, keys) = load(&cli.config)?;

            let model_name = config.model_name().context("Invalid model identifier")?;
            keys.get_key(&config.api_key_name)
                .context("Failed to resolve API key")?;

            info!("Configuration is valid");
            info!("  Model:        {model_name}");
            info!("  Base URL:     {}", config.base_url);
            info!("  Min interval: {}ms", config.min_interval_ms);
            info!(
                "  Retries:      {} attempts, {}ms backoff",
                config.max_attempts, config.retry_backoff_ms
            );
        }

        Commands::Generate { prompt, system } => {
            let (config, keys) = load(&cli.config)?;
            let client = HyperbolicClient::from_config(&config, &keys)
                .context("Failed to create client")?;

            let response = client
                .generate(&[Turn::user(prompt)], system.as_deref())
                .await;
            println!("{response}");
        }

        Commands::Embed { text } => {
            let (config, keys) = load(&cli.config)?;
            let client = HyperbolicClient::from_config(&config, &keys)
                .context("Failed to create client")?;

            let embedding = client.embed(&text).await;
            println!("{}", serde_json::to_string(&embedding)?);
        }
    }

    Ok(())
}
