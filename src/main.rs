use std::process::ExitCode;

use clap::Parser;

use agrirelay::cli::{Cli, Commands};
use agrirelay::config::{get_config, init_config};
use agrirelay::runtime::modes;
use agrirelay::system::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    match cli.command_or_default() {
        Commands::GenerateConfig { output, force } => {
            if let Err(e) = modes::generate_config(output.as_deref(), force) {
                eprintln!("{}", e.format_colored());
                return Ok(ExitCode::FAILURE);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::CheckConfig => {
            init_config(Some(&cli.config));
            let ok = modes::check_config(&get_config(), &cli.config)?;
            Ok(if ok {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Serve => {
            init_config(Some(&cli.config));
            let config = get_config();

            // guard 必须存活到进程退出，否则尾部日志会丢失
            let _log_guard = init_logging(&config.logging)?;

            modes::run_server(&config).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
