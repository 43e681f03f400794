//! One-call extraction: records plus totals for a whole document.

use transcript_core::{
    ExtractOptions, ExtractResult, ExtractWarning, GradeDistribution, Prognosis, ProgramOptions,
    Projection, Record, RecordExtractor, SectionCode, Token, Totals, TranscriptError,
};

use crate::transcript::Transcript;

/// Everything extracted from one transcript.
///
/// Totals are unrounded; rounding is a presentation concern.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedTranscript {
    /// Course records in document order.
    pub records: Vec<Record>,
    pub totals: Totals,
    /// Section counted toward progress only.
    pub excluded_section: SectionCode,
    /// Non-fatal issues: font fallbacks and orphan lines.
    pub warnings: Vec<ExtractWarning>,
}

impl ParsedTranscript {
    fn from_records(
        records: Vec<Record>,
        excluded_section: SectionCode,
        warnings: Vec<ExtractWarning>,
    ) -> Self {
        let totals = Totals::from_records(&records, excluded_section);
        Self {
            records,
            totals,
            excluded_section,
            warnings,
        }
    }

    /// Sum of credit weight over every record.
    pub fn total_credit_weight(&self) -> f64 {
        self.totals.total_credit_weight
    }

    /// Credit-weighted average over records outside the excluded section.
    pub fn average_grade(&self) -> f64 {
        self.totals.average_grade
    }

    /// Credit weight entering the average.
    pub fn calc_credit_weight(&self) -> f64 {
        self.totals.calc_credit_weight
    }

    /// Whether `record` belongs to the credit-only section.
    pub fn is_excluded(&self, record: &Record) -> bool {
        record.section == self.excluded_section
    }

    pub fn distribution(&self) -> GradeDistribution {
        GradeDistribution::from_records(&self.records)
    }

    pub fn prognosis(&self, program: &ProgramOptions) -> Prognosis {
        Prognosis::compute(&self.totals, program)
    }
}

impl Transcript {
    /// Scan every page and aggregate the records found.
    ///
    /// Section context carries over page boundaries. No records are returned
    /// unless every page could be interpreted.
    ///
    /// # Errors
    ///
    /// Returns the first page's error if a page cannot be interpreted, or an
    /// error if `options` yield invalid line patterns.
    pub fn extract(&self, options: &ExtractOptions) -> Result<ParsedTranscript, TranscriptError> {
        let mut extractor = RecordExtractor::new(options)?;
        let mut warnings = Vec::new();

        for (index, page) in self.pages().enumerate() {
            let page = page?;
            extractor.feed_page(index, &page.value);
            warnings.extend(page.warnings);
        }

        let ExtractResult {
            value: records,
            warnings: line_warnings,
        } = extractor.finish();

        #[cfg(feature = "tracing")]
        for warning in &line_warnings {
            tracing::debug!(page = ?warning.page, line = ?warning.line, "{}", warning.description);
        }

        warnings.extend(line_warnings);
        Ok(ParsedTranscript::from_records(
            records,
            options.excluded_section,
            warnings,
        ))
    }
}

/// Parse the transcript at `path` with the default layout options.
///
/// The document is read, scanned and released before this returns.
///
/// # Errors
///
/// Returns [`TranscriptError`] if the file cannot be read, is not a PDF, or
/// has a page that cannot be interpreted. Malformed lines never fail the
/// call.
#[cfg(feature = "std")]
pub fn parse(path: impl AsRef<std::path::Path>) -> Result<ParsedTranscript, TranscriptError> {
    parse_with_options(path, &ExtractOptions::default())
}

/// Parse the transcript at `path` with explicit options.
///
/// # Errors
///
/// See [`parse`].
#[cfg(feature = "std")]
pub fn parse_with_options(
    path: impl AsRef<std::path::Path>,
    options: &ExtractOptions,
) -> Result<ParsedTranscript, TranscriptError> {
    Transcript::open_file(path)?.extract(options)
}

/// Parse already-extracted page token streams.
///
/// This is the entry point for layout backends other than the bundled
/// PDF one.
///
/// # Errors
///
/// Returns an error only if `options` yield invalid line patterns.
pub fn parse_pages<'a, I>(
    pages: I,
    options: &ExtractOptions,
) -> Result<ParsedTranscript, TranscriptError>
where
    I: IntoIterator<Item = &'a [Token]>,
{
    let result = transcript_core::extract_records(pages, options)?;
    Ok(ParsedTranscript::from_records(
        result.value,
        options.excluded_section,
        result.warnings,
    ))
}

/// Token streams of every page of the transcript at `path`.
///
/// Page-level warnings are merged into the result.
///
/// # Errors
///
/// Returns [`TranscriptError`] if the file cannot be read, is not a PDF, or
/// has a page that cannot be interpreted.
#[cfg(feature = "std")]
pub fn extract_pages(
    path: impl AsRef<std::path::Path>,
) -> Result<ExtractResult<Vec<Vec<Token>>>, TranscriptError> {
    let transcript = Transcript::open_file(path)?;
    let mut pages = Vec::with_capacity(transcript.page_count());
    let mut warnings = Vec::new();
    for page in transcript.pages() {
        let page = page?;
        pages.push(page.value);
        warnings.extend(page.warnings);
    }
    Ok(ExtractResult::with_warnings(pages, warnings))
}

/// Required future averages for the default program (180 credits, grades
/// 1.0 to 4.0).
pub fn project(
    total_credit_weight: f64,
    average_grade: f64,
    calc_credit_weight: f64,
) -> Vec<Projection> {
    transcript_core::project(
        total_credit_weight,
        average_grade,
        calc_credit_weight,
        &ProgramOptions::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(lines: &[&str]) -> Vec<Token> {
        lines
            .iter()
            .enumerate()
            .map(|(i, text)| Token::new(*text, 100.0 + 14.0 * i as f64))
            .collect()
    }

    #[test]
    fn parse_pages_aggregates() {
        let pages = [page(&[
            "A1 Grundlagen",
            "Math 1,3 6,0",
            "A5 Studium Generale",
            "Ethics 2,0 3,0",
        ])];
        let parsed = parse_pages(pages.iter().map(Vec::as_slice), &ExtractOptions::default())
            .unwrap();

        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.total_credit_weight(), 9.0);
        assert_eq!(parsed.calc_credit_weight(), 6.0);
        assert!((parsed.average_grade() - 1.3).abs() < 1e-9);
        assert!(!parsed.is_excluded(&parsed.records[0]));
        assert!(parsed.is_excluded(&parsed.records[1]));
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn parse_pages_reports_orphans() {
        let pages = [page(&["Vorkurs 1,0 2,0", "B2 Informatik", "Logik 2,0 5,0"])];
        let parsed = parse_pages(pages.iter().map(Vec::as_slice), &ExtractOptions::default())
            .unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.warnings[0].line.as_deref(), Some("Vorkurs 1,0 2,0"));
    }

    #[test]
    fn empty_input_has_zero_totals() {
        let parsed = parse_pages(std::iter::empty::<&[Token]>(), &ExtractOptions::default()).unwrap();
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.totals, Totals::default());
        assert!(parsed.distribution().is_empty());
    }

    #[test]
    fn prognosis_uses_totals() {
        let pages = [page(&["A1 Grundlagen", "Math 1,3 6,0"])];
        let parsed = parse_pages(pages.iter().map(Vec::as_slice), &ExtractOptions::default())
            .unwrap();
        let prognosis = parsed.prognosis(&ProgramOptions::default());
        assert_eq!(prognosis.current_credit_weight, 6.0);
        assert_eq!(prognosis.remaining_credit_weight, 174.0);
        assert_eq!(prognosis.rows.len(), 10);
    }

    #[test]
    fn project_uses_default_program() {
        let rows = project(9.0, 1.3, 6.0);
        assert_eq!(rows.len(), 10);
        assert!(
            rows.iter()
                .all(|r| (1.0..=4.0).contains(&r.required_average))
        );
        let expected = (1.3 * 180.0 - 1.3 * 6.0) / 171.0;
        assert!((rows[1].required_average - expected).abs() < 1e-9);
    }

    #[test]
    fn project_is_empty_when_complete() {
        assert!(project(180.0, 2.0, 170.0).is_empty());
        assert!(project(200.0, 2.0, 190.0).is_empty());
    }
}
