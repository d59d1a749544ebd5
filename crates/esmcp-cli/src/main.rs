//! es-mcp - Elasticsearch MCP server.

mod configure;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::StreamableHttpService;
use rmcp::ServiceExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use esmcp_cluster::{ConnectOptions, Lifespan};
use esmcp_core::{EsMcpConfig, EsMcpError, Transport};
use esmcp_mcp::EsMcpServer;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// es-mcp - Read-only Elasticsearch access for AI assistants
#[derive(Parser)]
#[command(name = "es-mcp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding es-mcp.toml (default: current directory)
    #[arg(short, long, global = true, env = "ES_MCP_WORKDIR")]
    workdir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the MCP server
    Serve {
        /// Transport: stdio or http
        #[arg(short, long)]
        transport: Option<Transport>,

        /// Listen address for the http transport
        #[arg(short, long, value_name = "IP_ADDRESS:PORT")]
        bind: Option<String>,
    },

    /// Register this server in an MCP client settings file
    Configure {
        /// Elastic Cloud deployment id
        cloud_id: String,

        /// Encoded API key
        api_key: String,

        /// Settings file (default: the Cline settings file)
        #[arg(short, long)]
        settings: Option<PathBuf>,
    },
}

// stdout carries the stdio transport, so logs go to stderr.
fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let result = match cli.command {
        Commands::Serve { transport, bind } => serve(cli.workdir, transport, bind).await,
        Commands::Configure {
            cloud_id,
            api_key,
            settings,
        } => configure_client(&cloud_id, &api_key, settings),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Settings file, then environment (read through `lookup`), then flags.
fn resolve_config<F>(
    workdir: Option<&Path>,
    transport: Option<Transport>,
    bind: Option<String>,
    lookup: F,
) -> esmcp_core::Result<EsMcpConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = EsMcpConfig::discover(workdir)?;
    config.apply_env(lookup)?;
    if let Some(transport) = transport {
        config.server.transport = transport;
    }
    if let Some(bind) = bind {
        config.server.http_bind = bind;
    }
    Ok(config)
}

async fn serve(
    workdir: Option<PathBuf>,
    transport: Option<Transport>,
    bind: Option<String>,
) -> CliResult<()> {
    let config = resolve_config(workdir.as_deref(), transport, bind, |name| {
        std::env::var(name).ok()
    })?;

    let credentials = config.credentials()?;
    let options = ConnectOptions {
        request_timeout: config
            .elasticsearch
            .request_timeout_secs
            .map(Duration::from_secs),
    };

    let lifespan = Lifespan::connect(&credentials, &options).await?;
    let server = EsMcpServer::new(lifespan.handle(), config.pagination.default_page_size);

    let served = match config.server.transport {
        Transport::Stdio => serve_stdio(server).await,
        Transport::Http => serve_http(server, &config.server.http_bind).await,
    };

    lifespan.close();
    served
}

async fn serve_stdio(server: EsMcpServer) -> CliResult<()> {
    info!("Serving MCP over stdio");
    let service = server.serve(rmcp::transport::stdio()).await?;

    tokio::select! {
        quit = service.waiting() => {
            info!("MCP session ended: {:?}", quit?);
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
        }
    }
    Ok(())
}

async fn serve_http(server: EsMcpServer, bind: &str) -> CliResult<()> {
    let addr: SocketAddr = bind.parse().map_err(|e| {
        EsMcpError::config(format!("invalid HTTP bind address '{}': {}", bind, e))
    })?;

    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );
    let router = axum::Router::new().nest_service("/mcp", service);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Serving MCP over streamable HTTP at http://{}/mcp", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Interrupted, shutting down");
        })
        .await?;
    Ok(())
}

fn configure_client(cloud_id: &str, api_key: &str, settings: Option<PathBuf>) -> CliResult<()> {
    let path = match settings.or_else(configure::default_settings_path) {
        Some(path) => path,
        None => {
            return Err(EsMcpError::config(
                "could not determine the user config directory; pass --settings",
            )
            .into())
        }
    };

    let command = std::env::current_exe()?;
    configure::register(&path, configure::server_entry(&command, cloud_id, api_key))?;

    println!(
        "Registered the '{}' MCP server in {}",
        configure::SERVER_KEY,
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn workdir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(esmcp_core::SETTINGS_FILE),
            r#"
[elasticsearch]
cloud_id = "file-deployment:abc"
api_key = "file-key"

[server]
transport = "stdio"
http_bind = "127.0.0.1:7000"
"#,
        )
        .unwrap();
        dir
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = workdir();
        let lookup = env(&[
            ("ES_API_KEY", "env-key"),
            ("ES_MCP_TRANSPORT", "http"),
            ("ES_MCP_HTTP_BIND", "0.0.0.0:9000"),
        ]);

        let config = resolve_config(Some(dir.path()), None, None, lookup).unwrap();
        assert_eq!(config.server.transport, Transport::Http);
        assert_eq!(config.server.http_bind, "0.0.0.0:9000");
        assert_eq!(config.elasticsearch.api_key.as_deref(), Some("env-key"));
        assert_eq!(
            config.elasticsearch.cloud_id.as_deref(),
            Some("file-deployment:abc")
        );
    }

    #[test]
    fn test_flags_override_env() {
        let dir = workdir();
        let lookup = env(&[
            ("ES_MCP_TRANSPORT", "http"),
            ("ES_MCP_HTTP_BIND", "0.0.0.0:9000"),
        ]);

        let config = resolve_config(
            Some(dir.path()),
            Some(Transport::Stdio),
            Some("127.0.0.1:9100".to_string()),
            lookup,
        )
        .unwrap();
        assert_eq!(config.server.transport, Transport::Stdio);
        assert_eq!(config.server.http_bind, "127.0.0.1:9100");
    }

    #[test]
    fn test_file_values_without_overrides() {
        let dir = workdir();
        let config = resolve_config(Some(dir.path()), None, None, env(&[])).unwrap();
        assert_eq!(config.server.transport, Transport::Stdio);
        assert_eq!(config.server.http_bind, "127.0.0.1:7000");
        assert!(config.credentials().is_ok());
    }
}
