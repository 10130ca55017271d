use clap::Parser;
use colored::Colorize;

use tinylinker::config::{StaticConfig, args::Args, get_config, init_config_from};
use tinylinker::errors::TinylinkerError;
use tinylinker::runtime::run_server;
use tinylinker::system::logging::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_config {
        println!("{}", StaticConfig::generate_sample_config());
        return Ok(());
    }

    init_config_from(args.config.as_deref());
    let config = get_config();

    // 日志 guard 需要在整个程序生命周期内保持
    let _log_guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
    };

    if let Err(e) = run_server().await {
        match e.downcast_ref::<TinylinkerError>() {
            Some(err) => eprintln!("{}", err.format_colored()),
            None => eprintln!("{} {:#}", "[ERROR]".red().bold(), e),
        }
        std::process::exit(1);
    }

    Ok(())
}
