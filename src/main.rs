use anyhow::{anyhow, Result};
use clap::builder::BoolishValueParser;
use clap::{Parser, Subcommand};
use fsecure::{
    config::Config,
    model::{PluginRecord, ScanResult},
    output::{render_result, OutputFormat},
    plugin,
    scanner::{FSecure, SystemRunner},
    store::{self, ElasticsearchStore, ResultStore},
    update::update_av,
    webhook::Webhook,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, error, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
}

#[derive(Parser)]
#[command(name = "fsecure")]
#[command(author, version, about = "Malice F-Secure AntiVirus Plugin")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// File to scan
    path: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as Markdown table
    #[arg(short, long)]
    table: bool,

    /// Elasticsearch address for Malice to store results
    #[arg(long, env = "MALICE_ELASTICSEARCH")]
    elasticsearch: Option<String>,

    /// POST results to Malice webhook (MALICE_ENDPOINT)
    #[arg(short, long, env = "MALICE_POST", value_parser = BoolishValueParser::new())]
    post: bool,

    /// Send the webhook request through MALICE_PROXY
    #[arg(short = 'x', long)]
    proxy: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Update virus definitions
    #[command(alias = "u")]
    Update,

    /// Show the effective configuration, or create the config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

async fn run() -> Result<u8> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %Config::config_path().display(), error = %e, "ignoring invalid config file");
            Config::default()
        }
    }
    .with_env();

    match cli.command {
        Some(Commands::Update) => {
            println!("Updating FSecure...");
            let output = tokio::task::spawn_blocking(move || {
                update_av(&config.scanner, &SystemRunner, &config.sentinel_path)
            })
            .await??;
            println!("{}", output);
            Ok(exit_codes::SUCCESS)
        }
        Some(Commands::Config { init, path }) => {
            handle_config(&config, init, path)?;
            Ok(exit_codes::SUCCESS)
        }
        None => {
            let path = cli
                .path
                .ok_or_else(|| anyhow!("no file to scan. Run 'fsecure --help' for usage"))?;
            if let Some(address) = cli.elasticsearch {
                config.elasticsearch = Some(address);
            }

            run_scan(config, path, OutputFormat::from_table_flag(cli.table), cli.post, cli.proxy).await
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "fsecure=debug" } else { "fsecure=info" };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run_scan(
    config: Config,
    path: PathBuf,
    format: OutputFormat,
    post: bool,
    use_proxy: bool,
) -> Result<u8> {
    let progress = if format == OutputFormat::Table {
        Some(spinner("Scanning with F-Secure...")?)
    } else {
        None
    };

    let (config, path, result) = scan_blocking(config, path).await?;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    let result = result?;

    store_result(&config, &path, &result).await;

    let rendered = render_result(&result, format)?;
    if post {
        if format == OutputFormat::Json {
            post_result(&config, use_proxy, &path, rendered.clone()).await;
        } else {
            warn!("--post is ignored with --table");
        }
    }
    println!("{}", rendered);

    Ok(exit_codes::SUCCESS)
}

/// Scanner runs and retry delays block, so they run off the runtime thread.
async fn scan_blocking(
    config: Config,
    path: PathBuf,
) -> Result<(Config, PathBuf, fsecure::error::Result<ScanResult>)> {
    let scanned = tokio::task::spawn_blocking(move || {
        let scanner = FSecure::new(config.scanner.clone(), SystemRunner);
        let result = plugin::scan_file(&config, &scanner, &path);
        (config, path, result)
    })
    .await?;
    Ok(scanned)
}

fn spinner(message: &'static str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);
    Ok(pb)
}

async fn store_result(config: &Config, path: &Path, result: &ScanResult) {
    let Some(address) = &config.elasticsearch else {
        debug!("no document store configured, not storing results");
        return;
    };

    let id = match store::scan_id(config, path) {
        Ok(id) => id,
        Err(e) => {
            error!(error = %e, "cannot compute scan id, not storing results");
            return;
        }
    };

    let store = ElasticsearchStore::new(address, config.index.clone());
    let record = PluginRecord::new(id, result);
    if let Err(e) = store.store(&record).await {
        error!(store = store.name(), error = %e, "failed to store results");
    }
}

async fn post_result(config: &Config, use_proxy: bool, path: &Path, body: String) {
    let webhook = match Webhook::new(&config.webhook, use_proxy) {
        Ok(webhook) => webhook,
        Err(e) => {
            error!(error = %e, "cannot post results");
            return;
        }
    };

    match webhook.post(path, body).await {
        Ok(status) => println!("{}", status),
        Err(e) => error!(endpoint = webhook.endpoint(), error = %e, "webhook request failed"),
    }
}

fn handle_config(config: &Config, init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }
        Config::default().save()?;
        println!("Wrote default configuration to {}", config_path.display());
        return Ok(());
    }

    print!("{}", effective_config(config, &config_path)?);
    Ok(())
}

/// Renders the loaded configuration, environment overrides applied, as TOML.
fn effective_config(config: &Config, config_path: &Path) -> Result<String> {
    let source = if config_path.exists() {
        config_path.display().to_string()
    } else {
        "built-in defaults".to_string()
    };

    let mut out = format!("# effective configuration ({} + MALICE_* environment)\n", source);
    out.push_str(&toml::to_string_pretty(config)?);
    if let Some(id) = &config.scan_id {
        out.push_str(&format!("# scan id from {}: {}\n", fsecure::config::ENV_SCAN_ID, id));
    }
    Ok(out)
}
