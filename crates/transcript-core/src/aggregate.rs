//! Credit and grade aggregation.

use std::collections::HashMap;

use crate::classify::SectionCode;
use crate::extract::Record;

/// Parse a number printed with a comma decimal separator (`"1,3"` → 1.3).
///
/// Returns `None` for text that is not a finite number.
pub fn parse_locale_decimal(text: &str) -> Option<f64> {
    text.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Summary numbers for a transcript.
///
/// All values are unrounded; rounding is left to the presentation layer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Totals {
    /// Sum of credit weight over every record.
    pub total_credit_weight: f64,
    /// Credit-weighted grade average over records outside the excluded section.
    /// Zero when no such credit weight exists.
    pub average_grade: f64,
    /// Credit weight that enters the average (the average's denominator).
    pub calc_credit_weight: f64,
}

impl Totals {
    /// Aggregate records in one pass.
    ///
    /// Records of `excluded` count toward `total_credit_weight` only. A
    /// record whose grade cannot be read as a number is kept out of the
    /// average entirely (numerator and denominator); the extractor never
    /// produces such records.
    pub fn from_records(records: &[Record], excluded: SectionCode) -> Self {
        let mut total_credit_weight = 0.0;
        let mut calc_credit_weight = 0.0;
        let mut weighted_grade_sum = 0.0;

        for record in records {
            total_credit_weight += record.credit_weight;
            if record.section == excluded {
                continue;
            }
            if let Some(grade) = record.grade_value() {
                calc_credit_weight += record.credit_weight;
                weighted_grade_sum += grade * record.credit_weight;
            }
        }

        let average_grade = if calc_credit_weight > 0.0 {
            weighted_grade_sum / calc_credit_weight
        } else {
            0.0
        };

        Self {
            total_credit_weight,
            average_grade,
            calc_credit_weight,
        }
    }

    /// The `(total_credit_weight, average_grade, calc_credit_weight)` triple.
    pub fn as_tuple(&self) -> (f64, f64, f64) {
        (
            self.total_credit_weight,
            self.average_grade,
            self.calc_credit_weight,
        )
    }
}

/// How often a grade occurs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GradeBucket {
    /// Grade as printed.
    pub grade: String,
    pub count: usize,
}

/// Count of records per grade, best grade first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GradeDistribution {
    pub buckets: Vec<GradeBucket>,
}

impl GradeDistribution {
    /// Count grades over all records, excluded section included.
    ///
    /// Buckets are ordered by numeric grade value; grades that are not
    /// numbers go last, in text order.
    pub fn from_records(records: &[Record]) -> Self {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for record in records {
            *counts.entry(record.grade.as_str()).or_insert(0) += 1;
        }

        let mut buckets: Vec<GradeBucket> = counts
            .into_iter()
            .map(|(grade, count)| GradeBucket {
                grade: grade.to_string(),
                count,
            })
            .collect();
        buckets.sort_by(|a, b| {
            let va = parse_locale_decimal(&a.grade);
            let vb = parse_locale_decimal(&b.grade);
            match (va, vb) {
                (Some(x), Some(y)) => x.total_cmp(&y).then_with(|| a.grade.cmp(&b.grade)),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.grade.cmp(&b.grade),
            }
        });

        Self { buckets }
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Largest bucket count (0 when empty).
    pub fn max_count(&self) -> usize {
        self.buckets.iter().map(|b| b.count).max().unwrap_or(0)
    }

    /// Number of records counted.
    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum()
    }
}
