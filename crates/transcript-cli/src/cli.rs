use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use transcript::SectionCode;

/// List course records, credit totals and grade prognoses from transcript PDFs.
#[derive(Debug, Parser)]
#[command(name = "transcript", about, version)]
pub struct Cli {
    /// Print debug logging to stderr (RUST_LOG overrides the level)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Records table, credit summary and grade prognosis
    Summary {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        program: ProgramArgs,
    },

    /// List extracted course records
    Records {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Average needed over the remaining credits for each final grade
    Prognosis {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        program: ProgramArgs,
    },

    /// How often each grade occurs
    Distribution {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Show clustered text lines and how each one is classified
    Lines {
        #[command(flatten)]
        input: InputArgs,
    },
}

/// Input file and extraction flags shared by every subcommand.
#[derive(Debug, Args)]
pub struct InputArgs {
    /// Path to the transcript PDF
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Maximum vertical distance between tokens on one line
    #[arg(long, default_value_t = 2.0, allow_negative_numbers = true)]
    pub line_tolerance: f64,

    /// Section counted toward credits but not the average
    #[arg(long, default_value = "A5")]
    pub excluded_section: SectionCode,
}

/// Study-program flags for the prognosis.
#[derive(Debug, Args)]
pub struct ProgramArgs {
    /// Credits required to finish the program
    #[arg(long, default_value_t = 180.0, allow_negative_numbers = true)]
    pub target_credits: f64,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON document on stdout
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["transcript", "summary", "t.pdf"]);
        let Commands::Summary { input, program } = cli.command else {
            panic!("expected summary");
        };
        assert_eq!(input.file, PathBuf::from("t.pdf"));
        assert!(matches!(input.format, OutputFormat::Text));
        assert_eq!(input.line_tolerance, 2.0);
        assert_eq!(input.excluded_section.to_string(), "A5");
        assert_eq!(program.target_credits, 180.0);
        assert!(!cli.verbose);
    }

    #[test]
    fn overrides() {
        let cli = Cli::parse_from([
            "transcript",
            "records",
            "t.pdf",
            "--format",
            "json",
            "--line-tolerance",
            "3.5",
            "--excluded-section",
            "B1",
            "-v",
        ]);
        let Commands::Records { input } = cli.command else {
            panic!("expected records");
        };
        assert!(matches!(input.format, OutputFormat::Json));
        assert_eq!(input.line_tolerance, 3.5);
        assert_eq!(input.excluded_section.to_string(), "B1");
        assert!(cli.verbose);
    }

    #[test]
    fn invalid_section_is_rejected() {
        let result = Cli::try_parse_from([
            "transcript",
            "records",
            "t.pdf",
            "--excluded-section",
            "A0",
        ]);
        assert!(result.is_err());
    }
}
