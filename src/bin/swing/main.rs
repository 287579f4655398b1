//! swing - terminal swing-tempo trainer
//!
//! Run with: cargo run --bin swing
//! The terminal belongs to the UI, so logs are discarded unless SWING_LOG
//! names a file for them, e.g.
//! `SWING_LOG=swing.log RUST_LOG=swing_tempo=debug cargo run --bin swing`.

mod app;
mod ui;

use std::{fs::File, path::PathBuf, sync::Mutex};

use app::Trainer;
use swing_tempo::{CpalOutput, Ratio};
use tracing_subscriber::{fmt::writer::BoxMakeWriter, EnvFilter};

const LOG_PATH_VAR: &str = "SWING_LOG";

/// Where log lines go: the file at `path`, or nowhere.
fn log_writer(path: Option<PathBuf>) -> std::io::Result<BoxMakeWriter> {
    Ok(match path {
        Some(path) => BoxMakeWriter::new(Mutex::new(File::create(path)?)),
        None => BoxMakeWriter::new(std::io::sink),
    })
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")))
        .with_writer(log_writer(std::env::var_os(LOG_PATH_VAR).map(PathBuf::from))?)
        .with_ansi(false)
        .init();

    let mut trainer = Trainer::new(CpalOutput::new(), Ratio::ThreeToOne);

    let mut terminal = ratatui::init();
    let result = trainer.run(&mut terminal);
    ratatui::restore();
    result
}
