use transcript::Prognosis;

use crate::cli::{InputArgs, OutputFormat, ProgramArgs};
use crate::shared::{fail, parse_input, print_json, program_options};

pub fn run(input: &InputArgs, program: &ProgramArgs) -> Result<(), i32> {
    let program = program_options(program).map_err(|e| fail(&e))?;
    let parsed = parse_input(input)?;
    let prognosis = parsed.prognosis(&program);

    match input.format {
        OutputFormat::Text => {
            print!("{}", format_prognosis(&prognosis));
            Ok(())
        }
        OutputFormat::Json => print_json(&serde_json::json!({
            "target_credits": program.target_credits,
            "prognosis": prognosis,
        })),
    }
}

/// Current and remaining credits, a blank line, then one line per target
/// grade. Rows are absent when nothing remains.
pub fn format_prognosis(prognosis: &Prognosis) -> String {
    let mut out = format!(
        "Aktuelle ECTS: {:.1}\nVerbleibende ECTS: {:.1}\n\n",
        prognosis.current_credit_weight, prognosis.remaining_credit_weight
    );
    for row in &prognosis.rows {
        out.push_str(&format!(
            "Für Endnote {:.1} brauchst du Schnitt: {:.2}\n",
            row.target_grade, row.required_average
        ));
    }
    out
}
