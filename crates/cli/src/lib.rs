//! Reimbursement CLI support library
//!
//! Case file loading, parallel batch evaluation and accuracy reporting behind
//! the `reimburse` binary.

pub mod batch;
pub mod cases;
pub mod errors;
pub mod logging;
pub mod report;

pub use batch::{evaluate_all, write_results};
pub use cases::{load_cases, Case};
pub use errors::BatchError;
pub use report::AccuracyReport;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
