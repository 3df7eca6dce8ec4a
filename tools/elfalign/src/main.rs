//! Round every `PT_LOAD` segment's file and memory size up to its
//! `p_align` boundary and write the result as a new file.
//!
//! Loaders that map a library built for 4 KiB pages onto a larger page
//! size see file-size holes between the mapped segments. Pre-rounding the
//! segment sizes to the maximum supported page size removes those holes.
//! Only the program header table changes; section bytes and section
//! headers are written back untouched.

use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;

use elf64::aligner;
use elf64::output::{self, OutputFormat};
use elf64::{Elf64Error, Elf64Parser, Elf64Writer};

#[derive(Parser, Debug)]
#[command(name = "elfalign", version, about)]
struct Cli {
    /// ELF64 shared library to align.
    input: PathBuf,

    /// Path for the rewritten file.
    output: PathBuf,

    /// Output format for the summary.
    #[arg(long, default_value = "human")]
    format: OutputFormat,
}

/// What the run did, for the final report.
#[derive(Debug, Serialize)]
struct AlignSummary {
    input: PathBuf,
    output: PathBuf,
    load_segments: usize,
}

impl fmt::Display for AlignSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "aligned {} PT_LOAD segment(s) from {}",
            self.load_segments,
            self.input.display()
        )?;
        write!(f, "wrote {}", self.output.display())
    }
}

fn run(cli: &Cli) -> Result<AlignSummary, Elf64Error> {
    let mut binary = Elf64Parser::parse_file(&cli.input)?;
    let load_segments = binary.phdrs.iter().filter(|phdr| phdr.is_load()).count();

    aligner::align_phdrs(&mut binary);
    Elf64Writer::write_file(&binary, &cli.output)?;

    Ok(AlignSummary {
        input: cli.input.clone(),
        output: cli.output.clone(),
        load_segments,
    })
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(summary) => {
            let _ = output::emit(cli.format, &summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            output::emit_error(cli.format, 2, &e.to_string());
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_display_names_both_paths() {
        let summary = AlignSummary {
            input: PathBuf::from("in.so"),
            output: PathBuf::from("out.so"),
            load_segments: 2,
        };
        let text = summary.to_string();
        assert!(text.contains("2 PT_LOAD segment(s)"));
        assert!(text.contains("in.so"));
        assert!(text.contains("out.so"));
    }

    #[test]
    fn cli_parses_positional_paths() {
        let cli = Cli::parse_from(["elfalign", "lib.so", "lib.aligned.so"]);
        assert_eq!(cli.input, PathBuf::from("lib.so"));
        assert_eq!(cli.output, PathBuf::from("lib.aligned.so"));
        assert_eq!(cli.format, OutputFormat::Human);
    }

    #[test]
    fn cli_accepts_json_format() {
        let cli = Cli::parse_from(["elfalign", "a", "b", "--format", "json"]);
        assert_eq!(cli.format, OutputFormat::Json);
    }
}
