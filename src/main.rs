use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zoho_projects_mcp::client::ZohoClient;
use zoho_projects_mcp::config::ZohoConfig;
use zoho_projects_mcp::mcp;

#[derive(Parser)]
#[command(name = "zpmcp")]
#[command(about = "MCP server for Zoho Projects")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server via stdio (default)
    Mcp,
    /// Start MCP server over streamable HTTP
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
    /// Verify credentials by refreshing the token and listing portals
    Check,
}

/// Initialize tracing with output to stderr (for stdio mode) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "zoho_projects_mcp=info,tower_http=info".into()),
    );

    if use_stderr {
        // stdout is the protocol channel
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

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let use_stderr = matches!(cli.command, None | Some(Commands::Mcp));
    init_tracing(use_stderr);

    let config = ZohoConfig::from_env()?;
    if config.access_token.is_empty() && config.refresh.is_none() {
        tracing::warn!("Neither ZOHO_ACCESS_TOKEN nor refresh credentials are set; every tool call will fail");
    }
    let client = ZohoClient::from_config(&config);

    match cli.command {
        None | Some(Commands::Mcp) => {
            mcp::run_stdio_server(client, config.portal_id).await?;
        }
        Some(Commands::Serve { port }) => {
            tracing::info!("Starting MCP server on port {}", port);
            mcp::run_http_server(client, config.portal_id, port).await?;
        }
        Some(Commands::Check) => {
            if config.refresh.is_some() {
                client.refresh_token().await?;
                println!("Token refresh succeeded");
            }
            let portals = client.dispatch(mcp::routes::list_portals()).await?;
            println!("{}", serde_json::to_string_pretty(&portals)?);
        }
    }

    Ok(())
}
