//! Screen Mirror - session orchestration for a screen mirroring client
//!
//! This is the binary entry point. All logic lives in the library.

use std::path::PathBuf;

use clap::Parser;
use scrmirror_app::config::load_settings;

/// Screen Mirror - replay device session events headlessly
#[derive(Parser, Debug)]
#[command(name = "scrmirror")]
#[command(about = "Replay device session events and print NDJSON state changes", long_about = None)]
struct Args {
    /// NDJSON event script (reads stdin when omitted)
    #[arg(value_name = "SCRIPT")]
    script: Option<PathBuf>,

    /// Directory containing `.scrmirror/config.toml`
    #[arg(long, value_name = "DIR")]
    config_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    scrmirror_core::logging::init()?;

    let args = Args::parse();

    let config_dir = args
        .config_dir
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    let settings = load_settings(&config_dir);

    screen_mirror::run_headless(args.script.as_deref(), settings).await?;
    Ok(())
}
