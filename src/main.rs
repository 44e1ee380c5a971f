//! Memory Bank - MCP server entry point
//!
//! Serves the memory bank tools and resources over stdio, and offers a few
//! offline commands for initializing and printing documents.

use clap::{Parser, Subcommand};
use memory_bank_core::{
    config::default_config_file,
    error::{MemoryBankError, Result},
    mcp::tools::INITIALIZE_MEMORY_BANK,
    BankConfig, DocumentKind, DocumentStore, FsDocumentStore, McpServer, ResourceHandler,
    ToolHandler,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, Level};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(name = "memory-bank")]
#[command(about = "Project-scoped markdown memory bank served over MCP", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Set log level
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Config file (defaults to <config dir>/memory-bank/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Project served by resource reads (overrides MEMORY_BANK_PROJECT_PATH)
    #[arg(long, global = true)]
    project_path: Option<PathBuf>,

    /// MCP client settings file updated on initialization
    #[arg(long, global = true)]
    settings_path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server (stdio mode, the default)
    Serve,

    /// Initialize the memory bank for a project
    Init {
        /// Project root
        path: PathBuf,
    },

    /// Print one document (product, active, progress, decisions)
    Show {
        document: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr; stdout carries JSON-RPC
    let filter = EnvFilter::new(format!(
        "memory_bank={0},memory_bank_core={0}",
        level.as_str().to_lowercase()
    ));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    debug!("Memory Bank v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_file = cli.config.clone().or_else(default_config_file);
    let config = BankConfig::load_from(config_file.as_deref())?
        .with_project_path(cli.project_path.clone())
        .with_settings_path(cli.settings_path.clone());

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Init { path } => init(config, path).await,
        Commands::Show { document } => show(config, &document).await,
    }
}

fn server_command() -> String {
    std::env::current_exe()
        .map(|path| path.to_string_lossy().to_string())
        .unwrap_or_else(|_| "memory-bank".to_string())
}

fn tool_handler(config: &BankConfig, store: Arc<dyn DocumentStore>) -> ToolHandler {
    ToolHandler::new(store)
        .with_settings(config.settings_registry(server_command()))
        .with_auto_save_threshold(config.auto_save_threshold)
}

async fn serve(config: BankConfig) -> Result<()> {
    match &config.project_path {
        Some(path) => debug!("Serving resources for {}", path.display()),
        None => debug!("No project path configured; resource reads need projectPath"),
    }

    let store: Arc<dyn DocumentStore> = Arc::new(FsDocumentStore::new());
    let server = McpServer::new(
        tool_handler(&config, store.clone()),
        ResourceHandler::new(store, config.clone()),
        config.server_name.clone(),
    );

    tokio::select! {
        result = server.run() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal, stopping MCP server gracefully...");
        }
    }

    info!("MCP server shut down complete");
    Ok(())
}

async fn init(config: BankConfig, path: PathBuf) -> Result<()> {
    let project = std::path::absolute(&path)
        .map_err(|e| anyhow::anyhow!("Invalid project path '{}': {}", path.display(), e))?;
    let store: Arc<dyn DocumentStore> = Arc::new(FsDocumentStore::new());

    let message = tool_handler(&config, store)
        .execute(
            INITIALIZE_MEMORY_BANK,
            serde_json::json!({ "projectPath": project.to_string_lossy() }),
        )
        .await?;

    println!("{}", message);
    Ok(())
}

async fn show(config: BankConfig, document: &str) -> Result<()> {
    let kind = DocumentKind::from_name(document).ok_or_else(|| {
        MemoryBankError::InvalidArgument(format!(
            "unknown document '{}' (expected product, active, progress or decisions)",
            document
        ))
    })?;

    let handler = ResourceHandler::new(Arc::new(FsDocumentStore::new()), config);
    let contents = handler.read(kind.resource_uri(), None).await?;

    print!("{}", contents.text);
    Ok(())
}
