//! Batch classification of Japanese attribute-group labels through an
//! OpenAI-compatible chat API.
//!
//! The pipeline reads a CSV of attribute-group names, sends the distinct
//! labels to the service in fixed-size batches, merges the results back onto
//! every source row, and derives a confidence-based review queue plus a
//! Markdown summary report.

pub mod classify;
pub mod cli;
pub mod dataset;
pub mod outputs;
pub mod report;
pub mod run;
pub mod taxonomy;
