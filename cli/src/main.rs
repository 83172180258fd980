//! `tile-cutter`: command shell over `cutter-core`.

mod args;
mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use cutter_core::Session;
use cutter_core::log::{self, LogConfig};

use crate::args::{Cli, Command, CutOptions};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging(&cli)?;

    match cli.command {
        Command::Info { file, height } => {
            let summary = commands::info(&file, height)?;
            println!(
                "{}: {}x{} px, {} tile(s) of {} px",
                summary.name, summary.width, summary.height, summary.tile_count, summary.tile_height
            );
        }
        Command::Cut { file, options } => {
            let (session, written) = commands::cut(&file, &options)?;
            report(&session, &written, &options)?;
        }
        Command::Batch { paths, options } => {
            let (session, written) = commands::batch(&paths, &options)?;
            report(&session, &written, &options)?;
        }
    }
    Ok(())
}

fn init_logging(cli: &Cli) -> Result<()> {
    let console = cli.console_level();
    let mut config = LogConfig::default().with_console_level(console);
    let mut widest = console;
    if let Some(sink) = cli.file_sink() {
        widest = widest.max(sink.level);
        config = config.with_file(sink);
    }
    if config.env_filter.is_none() {
        config.env_filter = Some(widest.to_string().to_lowercase());
    }
    log::init(config)?;
    Ok(())
}

fn report(session: &Session, written: &[PathBuf], options: &CutOptions) -> Result<()> {
    for path in written {
        println!("{}", path.display());
    }
    if options.stats {
        println!("{}", serde_json::to_string_pretty(&session.stats().snapshot())?);
    }
    Ok(())
}
