use std::fs::File;
use std::io::{self, BufReader, IsTerminal};

use anyhow::Context;
use clap::Parser;

use optical_path_optimizer::cli::Shell;
use optical_path_optimizer::{load_optimizer, logger};

/// Plans WDM and wavelength paths over an optical network and reserves them.
#[derive(Parser)]
#[command(name = "optical-path-optimizer", version, about)]
struct Args {
    /// Network document (devices, links, link details, spectrum)
    #[arg(short, long)]
    network: String,

    /// Optimizer settings (k, frequency origin, quality method)
    #[arg(short, long)]
    config: Option<String>,

    /// Run the commands of this file instead of reading stdin
    #[arg(short, long)]
    script: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init();

    let optimizer = load_optimizer(&args.network, args.config.as_deref())
        .with_context(|| format!("Failed to load network '{}'", args.network))?;

    let stdout = io::stdout();
    match &args.script {
        Some(script) => {
            let file = File::open(script).with_context(|| format!("Failed to open script '{}'", script))?;
            Shell::new(optimizer, false).run(BufReader::new(file), stdout.lock())?;
        }
        None => {
            let interactive = io::stdin().is_terminal();
            Shell::new(optimizer, interactive).run(io::stdin().lock(), stdout.lock())?;
        }
    }

    log::info!("Shell closed.");
    Ok(())
}
