use std::path::Path;

use transcript::{
    ExtractOptions, ExtractWarning, ParsedTranscript, ProgramOptions, Transcript, TranscriptError,
};

use crate::cli::{InputArgs, ProgramArgs};

/// Install a stderr subscriber when `--verbose` is set or `RUST_LOG` is
/// present. Without either, logging stays off so stderr only carries errors
/// and warnings.
pub fn init_logging(verbose: bool) {
    let from_env = std::env::var_os("RUST_LOG").is_some();
    if !verbose && !from_env {
        return;
    }

    let filter = if from_env {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        tracing_subscriber::EnvFilter::new("transcript=debug,transcript_parse=debug")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Build extraction options from the command line.
///
/// # Errors
///
/// Rejects a negative or non-finite line tolerance.
pub fn extract_options(input: &InputArgs) -> Result<ExtractOptions, TranscriptError> {
    if !input.line_tolerance.is_finite() || input.line_tolerance < 0.0 {
        return Err(TranscriptError::Other(format!(
            "line tolerance must be a non-negative number, got {}",
            input.line_tolerance
        )));
    }
    Ok(ExtractOptions {
        line_tolerance: input.line_tolerance,
        excluded_section: input.excluded_section,
        ..ExtractOptions::default()
    })
}

/// Build program options from the command line.
///
/// # Errors
///
/// Rejects target credits that are not a positive number.
pub fn program_options(program: &ProgramArgs) -> Result<ProgramOptions, TranscriptError> {
    if !program.target_credits.is_finite() || program.target_credits <= 0.0 {
        return Err(TranscriptError::Other(format!(
            "target credits must be a positive number, got {}",
            program.target_credits
        )));
    }
    Ok(ProgramOptions {
        target_credits: program.target_credits,
        ..ProgramOptions::default()
    })
}

/// Print an error to stderr and turn it into the exit code.
pub fn fail(err: &TranscriptError) -> i32 {
    eprintln!("Error: {err}");
    1
}

/// Open a transcript with user-friendly error messages.
///
/// Returns `Err(1)` with a message printed to stderr if the file is not found
/// or cannot be parsed as a valid PDF.
pub fn open_transcript(file: &Path) -> Result<Transcript, i32> {
    if !file.exists() {
        eprintln!("Error: file not found: {}", file.display());
        return Err(1);
    }

    Transcript::open_file(file).map_err(|e| {
        eprintln!("Error: failed to open PDF: {e}");
        1
    })
}

/// Validate the options, open the file and extract its records.
pub fn parse_input(input: &InputArgs) -> Result<ParsedTranscript, i32> {
    let options = extract_options(input).map_err(|e| fail(&e))?;
    let transcript = open_transcript(&input.file)?;
    let parsed = transcript.extract(&options).map_err(|e| fail(&e))?;
    tracing::debug!(
        file = %input.file.display(),
        pages = transcript.page_count(),
        records = parsed.records.len(),
        "extracted transcript"
    );
    report_warnings(&parsed.warnings);
    Ok(parsed)
}

/// Print non-fatal extraction warnings to stderr.
pub fn report_warnings(warnings: &[ExtractWarning]) {
    for warning in warnings {
        eprintln!("Warning: {warning}");
    }
}

/// Print a JSON value on stdout.
pub fn print_json(value: &serde_json::Value) -> Result<(), i32> {
    let json_str = serde_json::to_string_pretty(value).map_err(|e| {
        eprintln!("Error: failed to serialize output: {e}");
        1
    })?;
    println!("{json_str}");
    Ok(())
}

/// Format a number with a comma decimal separator, as transcripts print
/// them.
pub fn locale_decimal(value: f64, precision: usize) -> String {
    format!("{value:.precision$}").replace('.', ",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use std::path::PathBuf;

    fn input(line_tolerance: f64) -> InputArgs {
        InputArgs {
            file: PathBuf::from("t.pdf"),
            format: OutputFormat::Text,
            line_tolerance,
            excluded_section: "B3".parse().unwrap(),
        }
    }

    #[test]
    fn extract_options_from_args() {
        let opts = extract_options(&input(1.5)).unwrap();
        assert_eq!(opts.line_tolerance, 1.5);
        assert_eq!(opts.excluded_section.to_string(), "B3");
        assert_eq!(opts.section_letters, vec!['A', 'B']);
    }

    #[test]
    fn zero_tolerance_is_allowed() {
        assert!(extract_options(&input(0.0)).is_ok());
    }

    #[test]
    fn bad_tolerance_is_rejected() {
        for value in [-1.0, f64::NAN, f64::INFINITY] {
            let err = extract_options(&input(value)).unwrap_err();
            assert!(matches!(err, TranscriptError::Other(_)));
        }
    }

    #[test]
    fn program_options_from_args() {
        let opts = program_options(&ProgramArgs {
            target_credits: 210.0,
        })
        .unwrap();
        assert_eq!(opts.target_credits, 210.0);
        assert_eq!(opts.target_grades.len(), 10);
    }

    #[test]
    fn non_positive_target_is_rejected() {
        for value in [0.0, -180.0, f64::NAN] {
            assert!(program_options(&ProgramArgs {
                target_credits: value
            })
            .is_err());
        }
    }

    #[test]
    fn open_missing_file() {
        assert_eq!(
            open_transcript(Path::new("/nonexistent/transcript.pdf")).unwrap_err(),
            1
        );
    }

    #[test]
    fn locale_decimal_uses_comma() {
        assert_eq!(locale_decimal(6.0, 1), "6,0");
        assert_eq!(locale_decimal(1.3333, 2), "1,33");
    }
}
