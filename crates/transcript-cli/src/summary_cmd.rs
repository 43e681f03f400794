use transcript::Totals;

use crate::cli::{InputArgs, OutputFormat, ProgramArgs};
use crate::prognosis_cmd::format_prognosis;
use crate::records_cmd::{records_json, write_table};
use crate::shared::{fail, parse_input, print_json, program_options};

pub fn run(input: &InputArgs, program: &ProgramArgs) -> Result<(), i32> {
    let program = program_options(program).map_err(|e| fail(&e))?;
    let parsed = parse_input(input)?;
    let prognosis = parsed.prognosis(&program);

    match input.format {
        OutputFormat::Text => {
            write_table(&parsed);
            println!();
            println!("{}", summary_line(&parsed.totals));
            println!();
            println!("Notenprognose (verbleibende ECTS)");
            print!("{}", format_prognosis(&prognosis));
            Ok(())
        }
        OutputFormat::Json => print_json(&serde_json::json!({
            "excluded_section": parsed.excluded_section,
            "records": records_json(&parsed),
            "totals": parsed.totals,
            "prognosis": prognosis,
            "warnings": parsed.warnings.len(),
        })),
    }
}

pub fn summary_line(totals: &Totals) -> String {
    format!(
        "Gesamte ECTS-Summe: {:.1} | Durchschnitt: {:.3}",
        totals.total_credit_weight, totals.average_grade
    )
}
