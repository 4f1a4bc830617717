mod client;
mod terminal_output;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use qrscan_config::ScannerConfig;
use qrscan_core::{ImageSource, ScanResult};
use qrscan_gateway::GatewayState;
use qrscan_logging::{init_logger, LogOptions, LogTarget};
use qrscan_mcp::McpServer;
use qrscan_scanner::Scanner;

use client::ScanClient;

#[derive(Parser)]
#[command(name = "qrscan")]
#[command(about = "qrscan: QR code detection over HTTP, MCP and the command line")]
#[command(version)]
struct Cli {
    /// YAML config file (default: $QRSCAN_CONFIG, then ./qrscan.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level or filter directive, e.g. "debug" or "qrscan_scanner=trace"
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Address to bind the HTTP server to
        #[arg(long)]
        bind: Option<String>,
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run the MCP server on stdin/stdout
    Mcp,
    /// Scan one image locally and print the result as JSON
    Scan(ScanArgs),
    /// Check the health of a running server
    Status {
        /// Server base URL (default: http://127.0.0.1:<server.port>)
        #[arg(long)]
        server: Option<String>,
    },
    /// Call a deployed server's HTTP API
    Remote {
        /// Server base URL, e.g. https://qr-scanner.example.com
        #[arg(long)]
        server: String,
        #[command(subcommand)]
        command: RemoteCommand,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct ScanArgs {
    /// Path to a local image
    #[arg(long)]
    file: Option<PathBuf>,
    /// HTTP/HTTPS URL of an image
    #[arg(long)]
    url: Option<String>,
    /// Base64 image payload (a data: URI is accepted)
    #[arg(long)]
    base64: Option<String>,
}

impl ScanArgs {
    fn into_source(self) -> Option<ImageSource> {
        self.file
            .map(ImageSource::Path)
            .or(self.url.map(ImageSource::Url))
            .or(self.base64.map(ImageSource::Base64))
    }
}

#[derive(Subcommand)]
enum RemoteCommand {
    /// GET /health
    Health,
    /// Scan a path on the server's filesystem
    File { image_path: String },
    /// Upload a local image
    Upload { path: PathBuf },
    /// Send a local image base64 encoded
    Base64 { path: PathBuf },
    /// Have the server fetch and scan an image URL
    Url { url: String },
    /// Scan several local images in one request
    Batch {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Print a table instead of JSON
        #[arg(long)]
        table: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let (config, warnings) = qrscan_config::load_and_prepare_with(cli.config.as_deref(), |config| {
        apply_flag_overrides(config, &cli.command)
    })
    .await?;

    // stdout is reserved for protocol frames or JSON output everywhere but `serve`.
    let target = match cli.command {
        Commands::Serve { .. } => LogTarget::Stdout,
        _ => LogTarget::Stderr,
    };
    init_logging(&config, cli.log_level.as_deref(), target)?;
    for warning in &warnings {
        warn!(path = %warning.path, "{}", warning.message);
    }

    match cli.command {
        Commands::Serve { .. } => run_server(&config).await,
        Commands::Mcp => run_mcp(&config).await,
        Commands::Scan(args) => run_scan(&config, args).await,
        Commands::Status { server } => {
            let server =
                server.unwrap_or_else(|| format!("http://127.0.0.1:{}", config.server.port));
            run_status(&server).await
        }
        Commands::Remote { server, command } => run_remote(&server, command).await,
    }
}

fn apply_flag_overrides(config: &mut ScannerConfig, command: &Commands) {
    if let Commands::Serve { bind, port } = command {
        if let Some(bind) = bind {
            config.server.bind_address = bind.clone();
        }
        if let Some(port) = port {
            config.server.port = *port;
        }
    }
}

fn init_logging(config: &ScannerConfig, cli_level: Option<&str>, target: LogTarget) -> Result<()> {
    let level = cli_level.unwrap_or_else(|| config.effective_log_level());
    let dir = config
        .logging
        .dir
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(PathBuf::from);
    init_logger(&LogOptions {
        level: level.to_string(),
        json: config.logging.json,
        dir,
        target,
    })
}

fn build_scanner(config: &ScannerConfig) -> Result<Arc<Scanner>> {
    Ok(Arc::new(Scanner::new(&config.scan)?))
}

async fn run_server(config: &ScannerConfig) -> Result<ExitCode> {
    info!(
        bind = %config.server.bind_address,
        port = config.server.port,
        max_body_bytes = config.server.max_body_bytes,
        "Starting qrscan HTTP API"
    );
    let state = GatewayState::new(build_scanner(config)?, &config.server);
    qrscan_gateway::start_server(&config.server, state).await?;
    Ok(ExitCode::SUCCESS)
}

async fn run_mcp(config: &ScannerConfig) -> Result<ExitCode> {
    let registry = qrscan_tools::default_registry(build_scanner(config)?);
    McpServer::new(registry).run_stdio().await?;
    Ok(ExitCode::SUCCESS)
}

async fn run_scan(config: &ScannerConfig, args: ScanArgs) -> Result<ExitCode> {
    let source = args
        .into_source()
        .context("one of --file, --url or --base64 is required")?;
    let scanner = build_scanner(config)?;
    let result = scanner.scan(source).await;
    print_result(&result)
}

async fn run_status(server: &str) -> Result<ExitCode> {
    let client = ScanClient::new(server)?;
    match client.health().await {
        Ok(body) => {
            println!("{}", serde_json::to_string_pretty(&body)?);
            terminal_output::note_success(&format!("{} is healthy", client.base_url()));
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            terminal_output::note_error(&format!("qrscan is not reachable at {server}: {e:#}"));
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run_remote(server: &str, command: RemoteCommand) -> Result<ExitCode> {
    let client = ScanClient::new(server)?;
    let result = match command {
        RemoteCommand::Health => return run_status(server).await,
        RemoteCommand::File { image_path } => client.scan_file(&image_path).await?,
        RemoteCommand::Upload { path } => client.scan_upload(&path).await?,
        RemoteCommand::Base64 { path } => client.scan_local_as_base64(&path).await?,
        RemoteCommand::Url { url } => client.scan_url(&url).await?,
        RemoteCommand::Batch { paths, table } => {
            let response = client.batch_scan(&paths).await?;
            if table {
                print!("{}", terminal_output::batch_table(&response));
            } else {
                println!("{}", serde_json::to_string_pretty(&response)?);
            }
            let failed = response.results.iter().filter(|e| !e.result.success).count();
            if failed > 0 {
                terminal_output::note_warn(&format!(
                    "{failed} of {} image(s) failed",
                    response.total_images
                ));
            } else {
                terminal_output::note_info(&format!("{} image(s) scanned", response.total_images));
            }
            return Ok(ExitCode::SUCCESS);
        }
    };
    print_result(&result)
}

fn print_result(result: &ScanResult) -> Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(result)?);
    terminal_output::note_result(result);
    Ok(if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
