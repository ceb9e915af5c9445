use std::sync::Arc;

use clap::Parser;

mod app;
mod orchestrator;
mod routes;

#[derive(Parser)]
#[command(name = "origins-server", about = "Origins task and report server")]
struct Cli {
    /// Bind address override (defaults to config `server.bind`).
    #[arg(long)]
    bind: Option<String>,

    /// Database path override (defaults to config `server.db_path`).
    #[arg(long)]
    db_path: Option<String>,

    /// Only log errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log debug output.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("origins-server error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let mut config = origins_config::OriginsConfig::load_with_dotenv()?;
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    if let Some(db_path) = cli.db_path {
        config.server.db_path = db_path;
    }

    let bind = config.server.bind.clone();
    let app = Arc::new(app::App::init(config).await?);
    routes::serve(app, &bind).await
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("ORIGINS_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
