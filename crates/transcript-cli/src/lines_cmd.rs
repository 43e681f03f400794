use transcript::{LineClassifier, LineKind, Token, cluster_tokens_into_lines, normalize_line};

use crate::cli::{InputArgs, OutputFormat};
use crate::shared::{extract_options, fail, open_transcript, print_json, report_warnings};

pub fn run(input: &InputArgs) -> Result<(), i32> {
    let options = extract_options(input).map_err(|e| fail(&e))?;
    let classifier = LineClassifier::new(&options).map_err(|e| fail(&e))?;
    let transcript = open_transcript(&input.file)?;

    let mut rows = Vec::new();
    for (index, page) in transcript.pages().enumerate() {
        let page = page.map_err(|e| fail(&e))?;
        report_warnings(&page.warnings);
        rows.extend(page_rows(&classifier, &page.value, options.line_tolerance, index + 1));
    }

    match input.format {
        OutputFormat::Text => {
            println!("page\ttop\tkind\ttext");
            for (page, top, kind, text) in &rows {
                println!("{page}\t{top:.2}\t{kind}\t{text}");
            }
            Ok(())
        }
        OutputFormat::Json => {
            let lines: Vec<serde_json::Value> = rows
                .iter()
                .map(|(page, top, kind, text)| {
                    serde_json::json!({
                        "page": page,
                        "top": top,
                        "kind": kind,
                        "text": text,
                    })
                })
                .collect();
            print_json(&serde_json::Value::Array(lines))
        }
    }
}

/// `(page, top, kind, text)` for every line of one page, classified the way
/// record extraction sees it.
fn page_rows(
    classifier: &LineClassifier,
    tokens: &[Token],
    tolerance: f64,
    page: usize,
) -> Vec<(usize, f64, String, String)> {
    cluster_tokens_into_lines(tokens, tolerance)
        .into_iter()
        .map(|line| {
            let text = normalize_line(&line.text());
            let kind = classifier.classify(&text);
            (page, line.top, kind_label(&kind), text)
        })
        .collect()
}

fn kind_label(kind: &LineKind) -> String {
    match kind {
        LineKind::Noise => "noise".to_string(),
        LineKind::SectionHeader(code) => format!("section:{code}"),
        LineKind::DataLine { .. } => "record".to_string(),
        LineKind::Unrecognized => "other".to_string(),
    }
}
