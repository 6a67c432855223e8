use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use restkit::{
    AuthRef, BearerGuard, Gate, GateConfig, ListAdaptor, LoginOptions, MountDefaults, ResourceDef,
};
use runtime::{AppConfig, CliArgs};

mod sessions;
mod widgets;

use sessions::SessionStore;
use widgets::{PagingAdaptor, WidgetsResource};

/// Widgets demo server: an in-memory CRUD resource exposed through restkit.
#[derive(Parser)]
#[command(name = "widgets-demo")]
#[command(about = "Widgets demo server built on restkit")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging = config.logging.clone().unwrap_or_default();
    let _log_guard = runtime::init_logging(&logging);
    tracing::info!("widgets demo starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => {
            println!("Configuration check passed");
            println!("{}", config.to_yaml()?);
            Ok(())
        }
    }
}

fn gate_config(config: &AppConfig) -> Result<GateConfig> {
    let mut gate: GateConfig = if config.gate.is_null() {
        GateConfig::default()
    } else {
        serde_json::from_value(config.gate.clone())?
    };
    // Server section wins over the gate section for the bind address.
    gate.host = Some(config.server.host.clone());
    gate.port = gate.port.or(config.server.port);
    Ok(gate)
}

async fn run_server(config: AppConfig) -> Result<()> {
    let sessions = SessionStore::new();
    let paging: Arc<dyn ListAdaptor> = Arc::new(PagingAdaptor);

    let defaults = MountDefaults::default().with_auth(AuthRef::named("bearerAuth"));
    let resources = vec![
        ResourceDef::new(Arc::new(WidgetsResource::new())).with_list_adaptor(paging),
    ];

    let gate = Gate::new(gate_config(&config)?)
        .guard("bearerAuth", Arc::new(BearerGuard::new(sessions.clone())))
        .login(LoginOptions::default(), sessions)?
        .mount(&defaults, resources)?;

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
            signal_cancel.cancel();
        }
    });

    gate.serve(cancel).await
}
