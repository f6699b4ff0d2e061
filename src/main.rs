use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use mvc_router::config::{load_config, AppConfig};
use mvc_router::lifecycle::{signals, Shutdown};
use mvc_router::observability::{logging, metrics};
use mvc_router::resolver::Application;
use mvc_router::routing::{manifest, RouteTable};
use mvc_router::{demo, HttpServer, Resolver};

#[derive(Debug, Parser)]
#[command(name = "mvc-router", version, about = "Convention-based MVC routing server")]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the application (default).
    Serve,
    /// Print the resolved routes.
    Routes {
        /// Print as a JSON route manifest.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    logging::init(&config.observability.log_filter)?;

    let mut table = demo::routes()?;
    if let Some(path) = &config.routes.manifest {
        table.extend(manifest::load_manifest(path)?);
    }

    let registry = demo::registry()?;
    let app = Resolver::new(&table, &registry)
        .body_limit(config.limits.max_body_bytes)
        .resolve()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Routes { json } => print_routes(&table, &app, json)?,
        Command::Serve => serve(config, app).await?,
    }
    Ok(())
}

fn print_routes(table: &RouteTable, app: &Application, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", manifest::to_json(table)?);
        return Ok(());
    }

    println!("{:<28} {:<16} {}", "Endpoint", "Methods", "Rule");
    for bound in app.endpoints() {
        println!(
            "{:<28} {:<16} {}",
            bound.endpoint().to_string(),
            bound.methods().to_string(),
            bound.rule()
        );
    }
    Ok(())
}

async fn serve(config: AppConfig, app: Application) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        endpoints = app.endpoints().count(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    HttpServer::new(config, app).run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
