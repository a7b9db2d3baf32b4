use clap::Parser;
use mcp::Server;
use neurosift_tools::{
    API_URL_ENV, Config, DEFAULT_API_URL, HttpToolsApi, NeurosiftTools, Result, server_info,
};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "neurosift-tools")]
#[command(about = "MCP server for the Neurosift agent tool catalog", long_about = None)]
#[command(version)]
struct Cli {
    /// Base URL of the tool catalog API
    #[arg(long, env = API_URL_ENV, default_value = DEFAULT_API_URL)]
    api_url: String,
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
    let config = Config::new(cli.api_url)?;

    let api = HttpToolsApi::new(&config);
    let server = Server::new(server_info(), NeurosiftTools::new(api));
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
