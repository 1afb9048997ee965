use clap::Parser;
use colored::Colorize;

use quicklink::config::{CliArgs, StaticConfig};
use quicklink::runtime::modes::run_server;
use quicklink::system::logging::init_logging;

#[actix_web::main]
async fn main() -> std::process::ExitCode {
    dotenvy::dotenv().ok();
    let args = CliArgs::parse();

    if args.generate_config {
        println!("{}", StaticConfig::generate_sample_config());
        return std::process::ExitCode::SUCCESS;
    }

    let config = match StaticConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            return std::process::ExitCode::FAILURE;
        }
    };

    let _guard = init_logging(&config.logging);

    if let Err(e) = run_server(config).await {
        tracing::error!("quicklink exited with error: {:#}", e);
        eprintln!("{} {:#}", "[ERROR]".red().bold(), e);
        return std::process::ExitCode::FAILURE;
    }

    std::process::ExitCode::SUCCESS
}
