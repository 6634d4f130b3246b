//! `lambdamart` command line trainer.
//!
//! Usage: `lambdamart config_file`

use anyhow::{Context, Result};
use clap::Parser;
use lambdamart::core::{init_env_logger, TrainingLogger, VERSION_BANNER};
use lambdamart::{Application, Config};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lambdamart")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "LambdaMART ranking trainer", long_about = None)]
struct Cli {
    /// Training configuration file (`key: value` lines, or `.json`)
    config_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let Some(config_path) = cli.config_file else {
        println!("usage: lambdamart config_file");
        return Ok(());
    };

    let config = Config::load_from_file(&config_path).with_context(|| {
        format!(
            "failed to load configuration from {}",
            config_path.display()
        )
    })?;

    init_env_logger(config.verbosity_level());
    info!("{}", VERSION_BANNER);

    let logger = TrainingLogger::from_verbosity(config.verbosity);
    let application = Application::new(config).context("invalid configuration")?;
    application.run(&logger).context("training failed")?;
    Ok(())
}
