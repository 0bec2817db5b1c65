use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate};

use crate::classify::ScoringMode;

/// Marker inserted into the review-subset file name.
const REVIEW_SUFFIX: &str = "_low_confidence";
/// Marker and extension of the companion report file.
const REPORT_SUFFIX: &str = "_report.md";

/// Resolve (and create if absent) the date-named directory grouping one
/// day's outputs, e.g. `./20260805/`. Reruns on the same day share it.
pub fn date_directory(base: &Path, date: NaiveDate) -> io::Result<PathBuf> {
    let dir = base.join(date.format("%Y%m%d").to_string());
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Timestamp-qualified default output name, so same-day reruns never
/// collide when no explicit name is given.
pub fn default_output_name(mode: ScoringMode, at: DateTime<Local>) -> String {
    let timestamp = at.format("%Y%m%d_%H%M%S");
    match mode {
        ScoringMode::WithConfidence => {
            format!("classified_attributes_with_confidence_{timestamp}.csv")
        }
        ScoringMode::CategoryOnly => format!("classified_attributes_{timestamp}.csv"),
    }
}

/// `results.csv` → `results_low_confidence.csv` (suffix before the
/// extension).
pub fn review_path(output: &Path) -> PathBuf {
    let stem = file_stem(output);
    match output.extension() {
        Some(ext) => output.with_file_name(format!(
            "{stem}{REVIEW_SUFFIX}.{}",
            ext.to_string_lossy()
        )),
        None => output.with_file_name(format!("{stem}{REVIEW_SUFFIX}")),
    }
}

/// `results.csv` → `results_report.md` (extension replaced).
pub fn report_path(output: &Path) -> PathBuf {
    let stem = file_stem(output);
    output.with_file_name(format!("{stem}{REPORT_SUFFIX}"))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
