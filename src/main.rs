use clap::{Parser, Subcommand};
use ocm_log_forwarder::config::{load_config, resolve_config_path};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ocm-log-forwarder")]
#[command(about = "Forwards OCM cluster service logs to Elasticsearch or stdout", long_about = None)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Run,
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    Init {
        #[arg(long)]
        stdout: bool,
    },
    Show,
}

fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "ocm_log_forwarder=debug"
    } else {
        "ocm_log_forwarder=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Config is loaded before logging starts so that DEBUG and `debug:` can
    // pick the log level.
    let config_path = resolve_config_path(cli.config.as_deref());
    let config = load_config(config_path.as_deref());
    let debug = cli.debug || config.as_ref().map(|c| c.debug).unwrap_or(false);
    init_tracing(debug);

    let result: Result<(), Box<dyn std::error::Error>> = match cli.command {
        Some(Commands::Run) | None => match config {
            Ok(config) => ocm_log_forwarder::cli::run::run(config)
                .await
                .map_err(|e| e.into()),
            Err(e) => Err(e.into()),
        },
        Some(Commands::Config { action }) => match action {
            ConfigAction::Init { stdout } => ocm_log_forwarder::cli::config::init(stdout),
            ConfigAction::Show => match config {
                Ok(config) => ocm_log_forwarder::cli::config::show(&config),
                Err(e) => Err(e.into()),
            },
        },
    };

    if let Err(e) = result {
        if let Some(path) = &config_path {
            error!(config_path = %path.display(), "{}", e);
        } else {
            error!("{}", e);
        }
        std::process::exit(1);
    }
}
