use transcript::{ParsedTranscript, Record};

use crate::cli::{InputArgs, OutputFormat};
use crate::shared::{locale_decimal, parse_input, print_json};

pub fn run(input: &InputArgs) -> Result<(), i32> {
    let parsed = parse_input(input)?;

    match input.format {
        OutputFormat::Text => {
            write_table(&parsed);
            Ok(())
        }
        OutputFormat::Json => print_json(&serde_json::json!({
            "excluded_section": parsed.excluded_section,
            "records": records_json(&parsed),
        })),
    }
}

/// Tab-separated records table. Rows of the excluded section end in `*`.
pub fn write_table(parsed: &ParsedTranscript) {
    println!("Bereich\tKurs\tNote\tECTS");
    for record in &parsed.records {
        println!("{}", table_row(record, parsed.is_excluded(record)));
    }
    if parsed.records.iter().any(|r| parsed.is_excluded(r)) {
        println!(
            "* {}: zählt zur ECTS-Summe, nicht zum Durchschnitt",
            parsed.excluded_section
        );
    }
}

fn table_row(record: &Record, excluded: bool) -> String {
    let mut row = format!(
        "{}\t{}\t{}\t{}",
        record.section,
        record.name,
        record.grade,
        locale_decimal(record.credit_weight, 1)
    );
    if excluded {
        row.push_str("\t*");
    }
    row
}

pub fn records_json(parsed: &ParsedTranscript) -> Vec<serde_json::Value> {
    parsed
        .records
        .iter()
        .map(|r| {
            serde_json::json!({
                "section": r.section,
                "name": r.name,
                "grade": r.grade,
                "credit_weight": r.credit_weight,
                "excluded": parsed.is_excluded(r),
            })
        })
        .collect()
}
