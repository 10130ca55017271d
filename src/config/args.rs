//! Command-line arguments

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "tinylinker", version, about = "Per-user URL shortener")]
pub struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<String>,

    /// Print a sample configuration with all defaults and exit
    #[arg(long)]
    pub print_config: bool,
}
