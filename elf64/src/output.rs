//! Report emission shared by the command-line tools.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Output format selection for the tools.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single JSON object on stdout.
    Json,
    /// Human-readable report on stdout.
    #[default]
    Human,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Human => write!(f, "human"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "human" => Ok(Self::Human),
            other => Err(format!("unknown output format {other:?} (expected json or human)")),
        }
    }
}

/// Write a successful result to stdout.
///
/// - **Json**: a single JSON object, no extraneous text.
/// - **Human**: the report's `Display` representation.
pub fn emit<T: Serialize + fmt::Display>(
    format: OutputFormat,
    value: &T,
) -> Result<(), std::io::Error> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string(value)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            println!("{json}");
        }
        OutputFormat::Human => {
            println!("{value}");
        }
    }
    Ok(())
}

/// Write an error to stdout (JSON mode) or stderr (human mode).
///
/// `exit_code_num` is the raw numeric exit code (0, 1, or 2).
pub fn emit_error(format: OutputFormat, exit_code_num: u8, message: &str) {
    match format {
        OutputFormat::Json => {
            let obj = serde_json::json!({
                "error": message,
                "exit_code": exit_code_num,
            });
            // JSON errors go to stdout so the caller always gets valid JSON on stdout.
            println!("{}", serde_json::to_string(&obj).unwrap_or_else(|_| {
                format!("{{\"error\":\"{message}\"}}")
            }));
        }
        OutputFormat::Human => {
            eprintln!("error: {message}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_round_trips_through_str() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("human".parse::<OutputFormat>().unwrap(), OutputFormat::Human);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn output_format_display() {
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(OutputFormat::Human.to_string(), "human");
    }

    #[test]
    fn output_format_default_is_human() {
        assert_eq!(OutputFormat::default(), OutputFormat::Human);
    }
}
