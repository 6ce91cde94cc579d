//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_PATH;

/// agrirelay - WhatsApp relay for the farmer-assistance chat agent
#[derive(Parser, Debug)]
#[command(name = "agrirelay")]
#[command(version)]
#[command(about = "Relays WhatsApp messages to the farmer-assistance chat agent", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP relay (default)
    Serve,

    /// Generate example configuration file
    GenerateConfig {
        /// Output path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate the configuration and print any issues
    CheckConfig,
}

impl Cli {
    /// 未指定子命令时运行服务
    pub fn command_or_default(&self) -> Commands {
        match self.command {
            Some(Commands::GenerateConfig { ref output, force }) => Commands::GenerateConfig {
                output: output.clone(),
                force,
            },
            Some(Commands::CheckConfig) => Commands::CheckConfig,
            Some(Commands::Serve) | None => Commands::Serve,
        }
    }
}
