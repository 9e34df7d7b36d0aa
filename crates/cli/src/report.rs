//! Accuracy report over labelled cases

use crate::cases::Case;
use reimburse_core::TripInput;
use serde::Serialize;
use std::fmt;

/// Absolute error below which a result counts as an exact match (one cent)
pub const EXACT_TOLERANCE: f64 = 0.01;
/// Absolute error below which a result counts as a close match (one dollar)
pub const CLOSE_TOLERANCE: f64 = 1.00;

/// One labelled case with its computed result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseOutcome {
    pub index: usize,
    pub input: TripInput,
    pub expected: f64,
    pub actual: f64,
    pub error: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracyReport {
    /// Labelled cases compared
    pub total: usize,
    /// Cases without an expected value, not scored
    pub unlabeled: usize,
    pub exact_matches: usize,
    pub close_matches: usize,
    pub average_error: f64,
    pub max_error: f64,
    /// Largest errors first
    pub worst: Vec<CaseOutcome>,
}

impl AccuracyReport {
    /// Compare results against the expected values of `cases`
    ///
    /// `results[i]` must be the engine output for `cases[i]`.
    pub fn build(cases: &[Case], results: &[f64], worst_count: usize) -> Self {
        let mut outcomes: Vec<CaseOutcome> = cases
            .iter()
            .zip(results)
            .enumerate()
            .filter_map(|(index, (case, &actual))| {
                case.expected.map(|expected| CaseOutcome {
                    index,
                    input: case.input,
                    expected,
                    actual,
                    error: (actual - expected).abs(),
                })
            })
            .collect();

        let total = outcomes.len();
        let exact_matches = outcomes.iter().filter(|o| o.error < EXACT_TOLERANCE).count();
        let close_matches = outcomes.iter().filter(|o| o.error < CLOSE_TOLERANCE).count();
        let error_sum: f64 = outcomes.iter().map(|o| o.error).sum();
        let max_error = outcomes.iter().map(|o| o.error).fold(0.0, f64::max);
        let average_error = if total == 0 {
            0.0
        } else {
            error_sum / total as f64
        };

        // stable sort keeps ties in input order
        outcomes.sort_by(|a, b| b.error.total_cmp(&a.error));
        outcomes.truncate(worst_count);

        Self {
            total,
            unlabeled: cases.len().min(results.len()) - total,
            exact_matches,
            close_matches,
            average_error,
            max_error,
            worst: outcomes,
        }
    }

    /// Percentage of labelled cases within one cent
    pub fn exact_rate(&self) -> f64 {
        percentage(self.exact_matches, self.total)
    }

    pub fn close_rate(&self) -> f64 {
        percentage(self.close_matches, self.total)
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

impl fmt::Display for AccuracyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cases evaluated: {}", self.total)?;
        if self.unlabeled > 0 {
            writeln!(f, "Unlabeled cases skipped: {}", self.unlabeled)?;
        }
        writeln!(
            f,
            "Exact matches (±$0.01): {}/{} ({:.1}%)",
            self.exact_matches,
            self.total,
            self.exact_rate()
        )?;
        writeln!(
            f,
            "Close matches (±$1.00): {}/{} ({:.1}%)",
            self.close_matches,
            self.total,
            self.close_rate()
        )?;
        writeln!(f, "Average error: ${:.2}", self.average_error)?;
        write!(f, "Max error: ${:.2}", self.max_error)?;

        if !self.worst.is_empty() {
            write!(f, "\n\nWorst cases:")?;
            for o in &self.worst {
                write!(
                    f,
                    "\n  #{}: {} days, {} miles, ${:.2} receipts -> expected ${:.2}, got ${:.2} (error ${:.2})",
                    o.index,
                    o.input.duration,
                    o.input.distance,
                    o.input.amount,
                    o.expected,
                    o.actual,
                    o.error
                )?;
            }
        }
        Ok(())
    }
}
