use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use masterdesk::{api, config::AppConfig, mcp};

#[derive(Parser)]
#[command(name = "mdesk")]
#[command(about = "Admin backend for masters and their applications")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Start MCP server via stdio
    Mcp,
    /// Apply pending database migrations and exit
    Migrate,
}

/// Initialize tracing with output to stderr (for MCP mode) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "masterdesk=debug,tower_http=debug".into()),
    );

    if use_stderr {
        // stdout carries the MCP protocol
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn serve(config: &AppConfig, host: &str, port: u16) -> anyhow::Result<()> {
    tracing::info!("Starting masterdesk server on port {}", port);

    let db = config.open_database()?;
    let app = api::create_router_with_config(db, config);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("masterdesk server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let use_stderr = matches!(cli.command, Some(Commands::Mcp));
    init_tracing(use_stderr);

    let config = AppConfig::from_env();

    match cli.command {
        Some(Commands::Serve { port, host }) => serve(&config, &host, port).await?,
        Some(Commands::Mcp) => {
            let db = config.open_database()?;
            mcp::run_stdio_server(db).await?;
        }
        Some(Commands::Migrate) => {
            config.open_database()?;
            tracing::info!("Database is up to date");
        }
        None => serve(&config, "127.0.0.1", 3000).await?,
    }

    Ok(())
}
