//! CLI argument definitions using clap derive macros.

use clap::builder::PossibleValuesParser;
use clap::{Parser, ValueEnum};

use crate::output::OutputMode;
use crate::pipelines::KINDS;

/// Extract tables from the Python documentation and PEP index.
#[derive(Parser, Debug)]
#[command(name = "docscrape")]
#[command(version, about)]
pub struct Args {
    /// Extraction mode
    #[arg(value_parser = PossibleValuesParser::new(KINDS))]
    pub mode: String,

    /// Remove every cached response before running
    #[arg(short, long)]
    pub clear_cache: bool,

    /// Output format (default: one line per row)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Bordered table on stdout
    Pretty,
    /// CSV file in the results directory
    File,
}

impl Args {
    pub fn output_mode(&self) -> OutputMode {
        match self.output {
            None => OutputMode::Lines,
            Some(OutputFormat::Pretty) => OutputMode::Pretty,
            Some(OutputFormat::File) => OutputMode::File,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_mode_only() {
        let args = Args::try_parse_from(["docscrape", "pep"]).unwrap();
        assert_eq!(args.mode, "pep");
        assert!(!args.clear_cache);
        assert_eq!(args.output_mode(), OutputMode::Lines);
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
    }

    #[test]
    fn test_cli_every_mode_is_accepted() {
        for kind in KINDS {
            let args = Args::try_parse_from(["docscrape", kind]).unwrap();
            assert_eq!(args.mode, kind);
        }
    }

    #[test]
    fn test_cli_unknown_mode_rejected() {
        let err = Args::try_parse_from(["docscrape", "changelog"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn test_cli_missing_mode_rejected() {
        let err = Args::try_parse_from(["docscrape"]).unwrap_err();
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn test_cli_clear_cache_flag() {
        let args = Args::try_parse_from(["docscrape", "whats-new", "-c"]).unwrap();
        assert!(args.clear_cache);

        let args = Args::try_parse_from(["docscrape", "--clear-cache", "whats-new"]).unwrap();
        assert!(args.clear_cache);
    }

    #[test]
    fn test_cli_output_flag() {
        let args = Args::try_parse_from(["docscrape", "pep", "-o", "pretty"]).unwrap();
        assert_eq!(args.output_mode(), OutputMode::Pretty);

        let args = Args::try_parse_from(["docscrape", "pep", "--output", "file"]).unwrap();
        assert_eq!(args.output_mode(), OutputMode::File);
    }

    #[test]
    fn test_cli_output_invalid_value() {
        let err = Args::try_parse_from(["docscrape", "pep", "-o", "json"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["docscrape", "pep", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["docscrape", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
