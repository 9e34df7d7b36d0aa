//! Case file loading
//!
//! Two layouts are accepted:
//!
//! - JSON: an array of `{"input": {..}, "expected_output": ..}` objects or of
//!   bare input records. Input fields use either the short names (`duration`,
//!   `distance`, `amount`) or the long ones (`trip_duration_days`,
//!   `miles_traveled`, `total_receipts_amount`).
//! - CSV (`.csv` extension): `duration,distance,amount[,expected]` per line,
//!   `#` comments and blank lines skipped, an optional header row.

use crate::errors::BatchError;
use reimburse_core::TripInput;
use serde::Deserialize;
use std::path::Path;

/// One trip, with the reimbursement it is expected to produce when known
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Case {
    pub input: TripInput,
    pub expected: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CaseRecord {
    Labeled {
        input: TripInput,
        #[serde(default)]
        expected_output: Option<f64>,
    },
    Bare(TripInput),
}

impl From<CaseRecord> for Case {
    fn from(record: CaseRecord) -> Self {
        match record {
            CaseRecord::Labeled {
                input,
                expected_output,
            } => Case {
                input,
                expected: expected_output,
            },
            CaseRecord::Bare(input) => Case {
                input,
                expected: None,
            },
        }
    }
}

/// Load cases, picking the layout from the file extension
pub fn load_cases<P: AsRef<Path>>(path: P) -> Result<Vec<Case>, BatchError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| BatchError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        parse_csv(path, &content)
    } else {
        parse_json(path, &content)
    }
}

/// Parse a JSON case array
pub fn parse_json(path: &Path, content: &str) -> Result<Vec<Case>, BatchError> {
    let records: Vec<CaseRecord> =
        serde_json::from_str(content).map_err(|source| BatchError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(records.into_iter().map(Case::from).collect())
}

/// Column names accepted as the first header field
const DURATION_HEADERS: [&str; 2] = ["duration", "trip_duration_days"];

/// A header names the duration column first and holds no numbers
fn is_header(parts: &[&str]) -> bool {
    DURATION_HEADERS
        .iter()
        .any(|name| parts[0].eq_ignore_ascii_case(name))
        && parts.iter().all(|part| part.parse::<f64>().is_err())
}

/// Parse CSV case lines
pub fn parse_csv(path: &Path, content: &str) -> Result<Vec<Case>, BatchError> {
    let mut cases = Vec::new();
    let mut seen_row = false;

    for (line_idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split(',').map(str::trim).collect();
        let parse_error = |reason: String| BatchError::Parse {
            path: path.to_path_buf(),
            line: line_idx + 1,
            reason,
        };

        let first_row = !seen_row;
        seen_row = true;
        if first_row && is_header(&parts) {
            continue;
        }

        if !(3..=4).contains(&parts.len()) {
            return Err(parse_error(format!(
                "expected 3 or 4 columns, got {}",
                parts.len()
            )));
        }

        let mut values = [0.0f64; 4];
        for (column, part) in parts.iter().enumerate() {
            values[column] = part
                .parse()
                .map_err(|_| parse_error(format!("column {}: invalid number `{part}`", column + 1)))?;
        }

        cases.push(Case {
            input: TripInput::new(values[0], values[1], values[2]),
            expected: (parts.len() == 4).then_some(values[3]),
        });
    }

    Ok(cases)
}
