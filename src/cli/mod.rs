use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::infra::config::{Config, ConfigError, Mode, CONFIG_PATH_ENV};

#[derive(Parser, Debug)]
#[command(name = "jetson-mcp-server")]
#[command(about = "Jetson MCP Server - hardware/software info over MCP")]
#[command(version)]
pub struct Cli {
    /// `server` (HTTP) or `stdio`
    #[arg(long)]
    pub mode: Option<Mode>,
    /// Interface to bind
    #[arg(long)]
    pub host: Option<String>,
    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,
    /// TOML config file (defaults to $JETSON_MCP_CONFIG)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Validate configuration without starting the server
    CheckConfig,
}

impl Cli {
    /// File, then environment, then flags.
    pub fn resolve_config(&self) -> Result<Config, ConfigError> {
        let path = self
            .config
            .clone()
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));
        let mut cfg = Config::load(path.as_deref())?;
        if let Some(mode) = self.mode {
            cfg.mode = mode;
        }
        if let Some(host) = &self.host {
            cfg.host = host.clone();
        }
        if let Some(port) = self.port {
            cfg.port = port;
        }
        Ok(cfg)
    }
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    let cfg = match cli.resolve_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("❌ Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Some(Commands::CheckConfig) => match cfg.validate() {
            Ok(()) => {
                println!("✅ Configuration is valid");
                println!("{cfg:#?}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Configuration validation failed: {e}");
                ExitCode::FAILURE
            }
        },
        None => match crate::infra::boot::run_server(cfg).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(error = %e, "server exited with error");
                ExitCode::FAILURE
            }
        },
    }
}
