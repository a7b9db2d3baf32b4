use clap::Parser;
use mcp::Server;
use plot_vision::{API_KEY_ENV, Config, OpenRouterClient, PlotVision, Result, server_info};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "plot-vision")]
#[command(about = "MCP server that analyzes scientific plots with a vision LLM", long_about = None)]
#[command(version)]
struct Cli {
    /// OpenRouter API key
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        error!("{e}");
        std::process::exit(1);
    }
    std::process::exit(0);
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    // Fails before the transport is opened, so no request is ever served
    // without a key.
    let config = Config::new(cli.api_key)?;

    let client = OpenRouterClient::new(&config);
    let server = Server::new(server_info(), PlotVision::new(client, config.model));
    server.serve_stdio().await?;

    Ok(())
}

/// Logs go to stderr; stdout carries protocol messages only.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
