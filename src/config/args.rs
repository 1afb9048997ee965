//! Command-line argument parsing

use clap::Parser;

/// quicklink 命令行参数
#[derive(Debug, Clone, Parser)]
#[command(name = "quicklink", version, about = "A small URL shortener service")]
pub struct CliArgs {
    /// Path to the TOML configuration file
    #[arg(short = 'c', long = "config", default_value = "config.toml")]
    pub config: String,

    /// Print a sample configuration file and exit
    #[arg(long = "generate-config")]
    pub generate_config: bool,
}
