//! Walk a directory tree and report how many bytes of the last page each
//! `PT_LOAD` segment would waste under 4 KiB, 16 KiB, and 64 KiB pages.
//!
//! Only ELF64 shared libraries (regular files ending in `.so`) are
//! counted. Files that fail to parse are logged and skipped so one broken
//! library never aborts a tree-wide survey.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use elf64::fragmentation::Elf64Fragmentation;
use elf64::output::{self, OutputFormat};

#[derive(Parser, Debug)]
#[command(name = "fragcalc", version, about)]
struct Cli {
    /// Directory tree to survey.
    root: PathBuf,

    /// Output format for the report.
    #[arg(long, default_value = "human")]
    format: OutputFormat,
}

#[derive(thiserror::Error, Debug)]
enum FragcalcError {
    #[error("not a directory: {path}")]
    NotADirectory { path: PathBuf },
}

fn run(cli: &Cli) -> Result<(), FragcalcError> {
    if !cli.root.is_dir() {
        return Err(FragcalcError::NotADirectory {
            path: cli.root.clone(),
        });
    }

    let report = Elf64Fragmentation::new(cli.root.clone()).calculate();
    let _ = output::emit(cli.format, &report);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::emit_error(cli.format, 2, &e.to_string());
            ExitCode::from(2)
        }
    }
}
