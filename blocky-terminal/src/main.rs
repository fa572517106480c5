/// Blocky Terminal - paint flat marks or animate the blocky animal
///
/// Controls:
///   - Tab: switch between paint and animal mode
///   - Paint: click/drag to place, p/t/c kind, 1-4 colors, u undo, x clear
///   - Animal: space animate, arrows rotate/select joint, +/- bend
///   - Q/ESC: Quit
use anyhow::Context;
use clap::Parser;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;

use blocky_terminal::{AppConfig, Cli, TerminalApp};

fn init_logging(path: &Path, verbose: bool) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Some(path) = &cli.log_file {
        init_logging(path, cli.verbose)?;
    }

    let config = AppConfig::load(&cli)?;
    let mut app = TerminalApp::new(&config).context("failed to start the terminal renderer")?;
    app.run()?;

    println!("Thank you for using Blocky!");
    Ok(())
}
