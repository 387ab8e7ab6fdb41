//! PowerSchool MCP Server
//!
//! Exposes the PowerSchool student information system as Model Context
//! Protocol tools: student profile, grades, assignments, grade history,
//! courses and attendance.

use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

mod server;
mod tools;

use powerschool_mcp_shared::PowerSchoolConfig;
use server::PowerSchoolMcpServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    info!("Starting PowerSchool MCP Server");

    let config = match PowerSchoolConfig::from_env() {
        Ok(config) => {
            info!(base_url = %config.base_url, "PowerSchool configuration loaded");
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("Error: {e}");
            eprintln!(
                "Set the POWERSCHOOL_URL, POWERSCHOOL_CLIENT_ID and \
                 POWERSCHOOL_CLIENT_SECRET environment variables."
            );
            std::process::exit(1);
        }
    };

    let server = PowerSchoolMcpServer::new(config)?;

    info!("PowerSchool MCP Server initialized, starting main loop");

    match server.run().await {
        Ok(_) => {
            info!("PowerSchool MCP Server shut down gracefully");
            Ok(())
        }
        Err(e) => {
            error!("PowerSchool MCP Server error: {}", e);
            Err(e.into())
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global logging subscriber");
}
