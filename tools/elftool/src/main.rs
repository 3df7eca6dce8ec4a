//! Structural diff of two ELF64 files.
//!
//! Parses both files into the owned model and compares the executable
//! headers, program headers, section headers, and section contents,
//! reporting each differing field by name. A difference is a result, not
//! a failure: the exit status reflects only whether both files parsed.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use elf64::comparator::Elf64Comparator;
use elf64::output::{self, OutputFormat};
use elf64::printer;
use elf64::{Elf64Error, Elf64Parser};

#[derive(Parser, Debug)]
#[command(name = "elftool", version, about)]
struct Cli {
    /// First ELF64 file.
    file1: PathBuf,

    /// Second ELF64 file, compared against the first.
    file2: PathBuf,

    /// Output format for the diff report.
    #[arg(long, default_value = "human")]
    format: OutputFormat,
}

fn run(cli: &Cli) -> Result<(), Elf64Error> {
    let binary1 = Elf64Parser::parse_file(&cli.file1)?;
    let binary2 = Elf64Parser::parse_file(&cli.file2)?;

    // Human mode leads with the second file's structure, so the verdicts
    // that follow can be read against it. JSON mode stays a single object.
    if cli.format == OutputFormat::Human {
        println!("{}", printer::dump(&binary2));
    }

    let report = Elf64Comparator::compare(&binary1, &binary2);
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
