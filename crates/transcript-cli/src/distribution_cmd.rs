use transcript::GradeDistribution;

use crate::cli::{InputArgs, OutputFormat};
use crate::shared::{parse_input, print_json};

/// Width of the longest bar.
const BAR_WIDTH: usize = 40;

pub fn run(input: &InputArgs) -> Result<(), i32> {
    let parsed = parse_input(input)?;
    let distribution = parsed.distribution();

    match input.format {
        OutputFormat::Text => {
            println!("Note\tAnzahl");
            for line in bar_lines(&distribution) {
                println!("{line}");
            }
            Ok(())
        }
        OutputFormat::Json => print_json(&serde_json::json!(distribution)),
    }
}

/// One `grade<TAB>count<TAB>bar` line per grade, bars scaled to the most
/// frequent grade.
fn bar_lines(distribution: &GradeDistribution) -> Vec<String> {
    let max = distribution.max_count();
    distribution
        .buckets
        .iter()
        .map(|bucket| {
            let width = if max == 0 {
                0
            } else {
                (bucket.count * BAR_WIDTH).div_ceil(max)
            };
            format!("{}\t{}\t{}", bucket.grade, bucket.count, "#".repeat(width))
        })
        .collect()
}
