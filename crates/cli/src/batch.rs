//! Parallel batch evaluation
//!
//! Records are scored independently on the rayon pool. Results keep input
//! order, and a failure is always reported for the lowest failing index so
//! reruns over the same file fail the same way.

use crate::errors::BatchError;
use rayon::prelude::*;
use reimburse_core::{Engine, TripInput};
use std::io::{self, Write};
use tracing::debug;

/// Evaluate every input, in input order
pub fn evaluate_all(engine: &Engine, inputs: &[TripInput]) -> Result<Vec<f64>, BatchError> {
    debug!("Evaluating {} records on {} threads", inputs.len(), rayon::current_num_threads());

    let outcomes: Vec<_> = inputs.par_iter().map(|input| engine.evaluate(input)).collect();

    outcomes
        .into_iter()
        .enumerate()
        .map(|(index, outcome)| outcome.map_err(|source| BatchError::Case { index, source }))
        .collect()
}

/// Write one two-decimal result per line
pub fn write_results<W: Write>(mut out: W, results: &[f64]) -> io::Result<()> {
    for value in results {
        writeln!(out, "{value:.2}")?;
    }
    out.flush()
}
