//! Grade prognosis: the average still needed to reach a final grade.

use crate::aggregate::Totals;

/// Study-program constants for the prognosis.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramOptions {
    /// Credit weight required to finish the program.
    pub target_credits: f64,
    /// Final grades to project, best first.
    pub target_grades: Vec<f64>,
    /// Best grade on the scale (numerically lowest on the German scale).
    pub best_grade: f64,
    /// Worst passing grade on the scale.
    pub worst_grade: f64,
}

impl Default for ProgramOptions {
    fn default() -> Self {
        Self {
            target_credits: 180.0,
            target_grades: vec![1.0, 1.3, 1.7, 2.0, 2.3, 2.7, 3.0, 3.3, 3.7, 4.0],
            best_grade: 1.0,
            worst_grade: 4.0,
        }
    }
}

/// One prognosis row.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Projection {
    /// Desired final grade.
    pub target_grade: f64,
    /// Average needed over the remaining credit weight, clamped to the scale.
    pub required_average: f64,
}

/// Required future averages for every target grade.
///
/// With `remaining <= 0` every row is omitted: there is no capacity left to
/// move the average. Each required average is clamped into
/// `[best_grade, worst_grade]`; because `f64::max`/`f64::min` ignore NaN,
/// a non-finite intermediate value also lands inside that range.
pub fn project(
    total_credit_weight: f64,
    average_grade: f64,
    calc_credit_weight: f64,
    options: &ProgramOptions,
) -> Vec<Projection> {
    let remaining = options.target_credits - total_credit_weight;
    if remaining.is_nan() || remaining <= 0.0 {
        return Vec::new();
    }

    let (low, high) = if options.best_grade <= options.worst_grade {
        (options.best_grade, options.worst_grade)
    } else {
        (options.worst_grade, options.best_grade)
    };

    options
        .target_grades
        .iter()
        .map(|&target| {
            let needed = (target * options.target_credits - average_grade * calc_credit_weight)
                / remaining;
            Projection {
                target_grade: target,
                required_average: needed.max(low).min(high),
            }
        })
        .collect()
}

/// The full prognosis block: progress figures plus projection rows.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Prognosis {
    /// Credit weight earned so far, excluded section included.
    pub current_credit_weight: f64,
    /// `target_credits - current_credit_weight`; may be zero or negative.
    pub remaining_credit_weight: f64,
    /// One row per target grade; empty once the target is reached.
    pub rows: Vec<Projection>,
}

impl Prognosis {
    pub fn compute(totals: &Totals, options: &ProgramOptions) -> Self {
        Self {
            current_credit_weight: totals.total_credit_weight,
            remaining_credit_weight: options.target_credits - totals.total_credit_weight,
            rows: project(
                totals.total_credit_weight,
                totals.average_grade,
                totals.calc_credit_weight,
                options,
            ),
        }
    }
}
