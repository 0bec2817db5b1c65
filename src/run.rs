use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Local;
use thiserror::Error;

use crate::classify::{
    classify_in_batches, merge_classifications, unique_labels, ClassifiedRecord,
    LabelClassifier, ScoringMode,
};
use crate::dataset::{Dataset, DatasetError};
use crate::outputs;
use crate::report::{
    analyze_confidence, low_confidence_indices, render_report, ConfidenceReport,
};
use crate::taxonomy::CategoryTaxonomy;

/// Everything one classification run needs, resolved up front by the CLI.
pub struct RunConfig {
    pub input: PathBuf,
    /// Explicit output file name; timestamp-qualified default when `None`.
    pub output_name: Option<String>,
    pub batch_size: usize,
    pub mode: ScoringMode,
    pub review_threshold: f32,
    pub taxonomy: CategoryTaxonomy,
    /// Directory under which the date-named run directory is created.
    pub output_root: PathBuf,
}

/// What a run produced, for the caller's console summary.
pub struct RunOutcome {
    pub classified: Vec<ClassifiedRecord>,
    pub analysis: Option<ConfidenceReport>,
    /// Review-queue indices into `classified`, ascending by confidence.
    pub review: Vec<usize>,
    pub output_file: PathBuf,
    pub review_file: Option<PathBuf>,
    pub report_file: Option<PathBuf>,
    pub elapsed: Duration,
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("failed to prepare output directory under {}: {source}", base.display())]
    OutputDir {
        base: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write report {}: {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Drive one full run: read → batch-classify → merge → write outputs.
///
/// The classifier comes in as a capability so tests run the whole pipeline
/// against a deterministic stub. Service failures never abort the run; the
/// affected labels surface as fallback-classified records. Dataset and
/// output I/O errors abort.
pub fn execute(
    classifier: &dyn LabelClassifier,
    config: &RunConfig,
) -> Result<RunOutcome, RunError> {
    let dataset = Dataset::from_csv(&config.input)?;
    tracing::info!(
        rows = dataset.len(),
        input = %config.input.display(),
        "input loaded"
    );

    let labels = unique_labels(dataset.records());
    let started = Instant::now();
    let results = classify_in_batches(classifier, &labels, config.batch_size);
    let classified =
        merge_classifications(dataset.records(), &results, &config.taxonomy, config.mode);
    let elapsed = started.elapsed();

    let now = Local::now();
    let run_dir = outputs::date_directory(&config.output_root, now.date_naive()).map_err(
        |source| RunError::OutputDir {
            base: config.output_root.clone(),
            source,
        },
    )?;
    let output_name = config
        .output_name
        .clone()
        .unwrap_or_else(|| outputs::default_output_name(config.mode, now));
    let output_file = run_dir.join(&output_name);

    dataset.write_classified(&output_file, &classified, config.mode)?;
    tracing::info!(path = %output_file.display(), "classified output written");

    let analysis = analyze_confidence(&classified);
    let review = if analysis.is_some() {
        low_confidence_indices(&classified, config.review_threshold)
    } else {
        Vec::new()
    };

    let review_file = if !review.is_empty() {
        let path = outputs::review_path(&output_file);
        dataset.write_subset(&path, &review, &classified, config.mode)?;
        tracing::info!(path = %path.display(), items = review.len(), "review subset written");
        Some(path)
    } else {
        None
    };

    let report_file = match &analysis {
        Some(report) => {
            let path = outputs::report_path(&output_file);
            let rendered = render_report(
                &classified,
                report,
                &review,
                config.review_threshold,
                &output_name,
                elapsed,
                now,
            );
            std::fs::write(&path, rendered).map_err(|source| RunError::Report {
                path: path.clone(),
                source,
            })?;
            tracing::info!(path = %path.display(), "report written");
            Some(path)
        }
        None => None,
    };

    Ok(RunOutcome {
        classified,
        analysis,
        review,
        output_file,
        review_file,
        report_file,
        elapsed,
    })
}
