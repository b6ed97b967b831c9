//! RDS MySQL MCP server - main entry point.
//!
//! Serves the tool catalog over one of two transports:
//! - stdio: a local client spawns the process and talks over stdin/stdout
//! - streamable-http: network clients connect to `/mcp`

use clap::{Parser, ValueEnum};
use rds_mysql_mcp::server::{serve_stdio, serve_streamable_http, RdsMcpServer};
use rds_mysql_mcp::types::Config;
use rds_mysql_mcp::{Dispatcher, VolcengineClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    Stdio,
    StreamableHttp,
}

#[derive(Debug, Parser)]
#[command(name = "rds-mysql-mcp", version, about = "Run the RDS MySQL MCP server")]
struct Cli {
    /// Transport protocol to use
    #[arg(short, long, value_enum, default_value_t = Transport::Stdio)]
    transport: Transport,

    /// Bind address for streamable HTTP (defaults to 127.0.0.1:$MCP_SERVER_PORT or 127.0.0.1:8000)
    #[arg(long)]
    listen: Option<String>,

    /// Region, e.g. cn-beijing
    #[arg(long, env = "VOLCENGINE_REGION")]
    region: Option<String>,

    /// OpenAPI host
    #[arg(long, env = "VOLCENGINE_ENDPOINT")]
    endpoint: Option<String>,

    #[arg(long, env = "VOLCENGINE_ACCESS_KEY", hide_env_values = true)]
    access_key: Option<String>,

    #[arg(long, env = "VOLCENGINE_SECRET_KEY", hide_env_values = true)]
    secret_key: Option<String>,
}

impl Cli {
    fn apply(self, config: &mut Config) {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        if let Some(listen) = non_empty(self.listen) {
            config.server.listen_addr = listen;
        }
        if let Some(region) = non_empty(self.region) {
            config.region = region;
        }
        if let Some(endpoint) = non_empty(self.endpoint) {
            config.endpoint = endpoint;
        }
        if let Some(access_key) = non_empty(self.access_key) {
            config.credentials.access_key = access_key;
        }
        if let Some(secret_key) = non_empty(self.secret_key) {
            config.credentials.secret_key = secret_key;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let transport = cli.transport;

    let log_format = rds_mysql_mcp::observability::init_tracing();

    let mut config = Config::from_env()?;
    cli.apply(&mut config);

    let client = VolcengineClient::new(&config)?;
    let dispatcher = Dispatcher::new(client)?;
    let server = RdsMcpServer::new(dispatcher);

    tracing::info!(
        region = %config.region,
        endpoint = %config.endpoint,
        tools = server.tool_count(),
        ?transport,
        ?log_format,
        "RDS MySQL MCP server starting"
    );

    match transport {
        Transport::Stdio => serve_stdio(server).await?,
        Transport::StreamableHttp => {
            serve_streamable_http(server, &config.server.listen_addr).await?
        }
    }

    Ok(())
}

