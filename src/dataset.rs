use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::classify::{AttributeRecord, ClassifiedRecord, ScoringMode};

/// Required input column holding the label to classify.
pub const LABEL_COLUMN: &str = "属性グループ名";
/// Required input column holding the per-label row count.
pub const COUNT_COLUMN: &str = "数";
/// Appended output column holding the assigned category.
pub const CATEGORY_COLUMN: &str = "分類";
/// Appended output column holding the confidence score (confidence mode).
pub const CONFIDENCE_COLUMN: &str = "信頼度";

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("input file is missing required column {0:?}")]
    MissingColumn(&'static str),

    #[error("row {row}: column {column:?} holds {value:?}, expected a non-negative integer")]
    InvalidCount {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// An input CSV held in memory: the original cells of every row, plus the
/// parsed label/count pair the pipeline works on. Columns beyond the two
/// required ones are carried through to the outputs unchanged.
#[derive(Debug)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    records: Vec<AttributeRecord>,
}

impl Dataset {
    /// Read and validate the input file. Fails fast when a required column
    /// is absent or a count cell is not a non-negative integer.
    pub fn from_csv(path: &Path) -> Result<Self, DatasetError> {
        let read_err = |source| DatasetError::Read {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = csv::Reader::from_path(path).map_err(read_err)?;
        let headers: Vec<String> = reader
            .headers()
            .map_err(read_err)?
            .iter()
            .map(str::to_string)
            .collect();

        let label_idx = headers
            .iter()
            .position(|h| h == LABEL_COLUMN)
            .ok_or(DatasetError::MissingColumn(LABEL_COLUMN))?;
        let count_idx = headers
            .iter()
            .position(|h| h == COUNT_COLUMN)
            .ok_or(DatasetError::MissingColumn(COUNT_COLUMN))?;

        let mut rows = Vec::new();
        let mut records = Vec::new();
        for (index, row) in reader.records().enumerate() {
            let row = row.map_err(read_err)?;
            let cells: Vec<String> = row.iter().map(str::to_string).collect();

            let label = cells.get(label_idx).cloned().unwrap_or_default();
            let raw_count = cells
                .get(count_idx)
                .map(|c| c.trim())
                .unwrap_or_default();
            let count = raw_count
                .parse::<u64>()
                .map_err(|_| DatasetError::InvalidCount {
                    row: index + 1,
                    column: COUNT_COLUMN,
                    value: raw_count.to_string(),
                })?;

            records.push(AttributeRecord { label, count });
            rows.push(cells);
        }

        Ok(Self {
            headers,
            rows,
            records,
        })
    }

    pub fn records(&self) -> &[AttributeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write every row with the category (and, in confidence mode, the
    /// confidence) columns appended. `classified` must line up with this
    /// dataset's rows.
    pub fn write_classified(
        &self,
        path: &Path,
        classified: &[ClassifiedRecord],
        mode: ScoringMode,
    ) -> Result<(), DatasetError> {
        assert_eq!(
            self.rows.len(),
            classified.len(),
            "classified records must line up with dataset rows"
        );
        let all: Vec<usize> = (0..self.rows.len()).collect();
        self.write_rows(path, &all, classified, mode)
    }

    /// Write only the rows at `indices` (the review subset), in the given
    /// order, with the same appended columns as the main output.
    pub fn write_subset(
        &self,
        path: &Path,
        indices: &[usize],
        classified: &[ClassifiedRecord],
        mode: ScoringMode,
    ) -> Result<(), DatasetError> {
        self.write_rows(path, indices, classified, mode)
    }

    fn write_rows(
        &self,
        path: &Path,
        indices: &[usize],
        classified: &[ClassifiedRecord],
        mode: ScoringMode,
    ) -> Result<(), DatasetError> {
        let write_err = |source: csv::Error| DatasetError::Write {
            path: path.to_path_buf(),
            source,
        };

        let mut writer = csv::Writer::from_path(path).map_err(write_err)?;

        let mut header = self.headers.clone();
        header.push(CATEGORY_COLUMN.to_string());
        if mode.with_confidence() {
            header.push(CONFIDENCE_COLUMN.to_string());
        }
        writer.write_record(&header).map_err(write_err)?;

        for &index in indices {
            let record = &classified[index];
            let mut cells = self.rows[index].clone();
            cells.push(record.category.clone());
            if mode.with_confidence() {
                cells.push(record.confidence.unwrap_or(0.0).to_string());
            }
            writer.write_record(&cells).map_err(write_err)?;
        }

        writer.flush().map_err(|e| write_err(e.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_input(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn classified(records: &[AttributeRecord], category: &str, confidence: f32) -> Vec<ClassifiedRecord> {
        records
            .iter()
            .map(|r| ClassifiedRecord {
                label: r.label.clone(),
                count: r.count,
                category: category.to_string(),
                confidence: Some(confidence),
            })
            .collect()
    }

    #[test]
    fn reads_labels_counts_and_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_input(
            dir.path(),
            "input.csv",
            "属性グループ名,数,備考\n入社区分,12,移行済み\n国籍,3,\n",
        );

        let dataset = Dataset::from_csv(&path).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records()[0], AttributeRecord::new("入社区分", 12));
        assert_eq!(dataset.records()[1], AttributeRecord::new("国籍", 3));
    }

    #[test]
    fn missing_label_column_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_input(dir.path(), "input.csv", "名前,数\nx,1\n");
        let result = Dataset::from_csv(&path);
        assert!(matches!(
            result,
            Err(DatasetError::MissingColumn(LABEL_COLUMN))
        ));
    }

    #[test]
    fn missing_count_column_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_input(dir.path(), "input.csv", "属性グループ名\nx\n");
        let result = Dataset::from_csv(&path);
        assert!(matches!(
            result,
            Err(DatasetError::MissingColumn(COUNT_COLUMN))
        ));
    }

    #[test]
    fn non_numeric_count_is_rejected_with_row_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_input(
            dir.path(),
            "input.csv",
            "属性グループ名,数\n所属,many\n",
        );
        match Dataset::from_csv(&path) {
            Err(DatasetError::InvalidCount { row, value, .. }) => {
                assert_eq!(row, 1);
                assert_eq!(value, "many");
            }
            other => panic!("expected InvalidCount, got {other:?}"),
        }
    }

    #[test]
    fn unreadable_input_reports_the_path() {
        let result = Dataset::from_csv(Path::new("/no/such/file.csv"));
        assert!(matches!(result, Err(DatasetError::Read { .. })));
    }

    #[test]
    fn classified_output_appends_columns_and_preserves_passthrough() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(
            dir.path(),
            "input.csv",
            "属性グループ名,数,備考\n入社区分,12,移行済み\n",
        );
        let dataset = Dataset::from_csv(&input).unwrap();
        let classified = classified(dataset.records(), "雇用管理", 0.9);

        let output = dir.path().join("out.csv");
        dataset
            .write_classified(&output, &classified, ScoringMode::WithConfidence)
            .unwrap();

        let written = fs::read_to_string(&output).unwrap();
        let mut lines = written.lines();
        assert_eq!(lines.next().unwrap(), "属性グループ名,数,備考,分類,信頼度");
        assert_eq!(lines.next().unwrap(), "入社区分,12,移行済み,雇用管理,0.9");
    }

    #[test]
    fn category_only_output_has_no_confidence_column() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "input.csv", "属性グループ名,数\n所属,1\n");
        let dataset = Dataset::from_csv(&input).unwrap();
        let mut classified = classified(dataset.records(), "人事管理", 0.0);
        for record in &mut classified {
            record.confidence = None;
        }

        let output = dir.path().join("out.csv");
        dataset
            .write_classified(&output, &classified, ScoringMode::CategoryOnly)
            .unwrap();

        let written = fs::read_to_string(&output).unwrap();
        assert_eq!(written.lines().next().unwrap(), "属性グループ名,数,分類");
    }

    #[test]
    fn subset_writes_only_selected_rows_in_given_order() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(
            dir.path(),
            "input.csv",
            "属性グループ名,数\na,1\nb,2\nc,3\n",
        );
        let dataset = Dataset::from_csv(&input).unwrap();
        let classified = classified(dataset.records(), "その他・未分類", 0.1);

        let output = dir.path().join("review.csv");
        dataset
            .write_subset(&output, &[2, 0], &classified, ScoringMode::WithConfidence)
            .unwrap();

        let written = fs::read_to_string(&output).unwrap();
        let rows: Vec<&str> = written.lines().skip(1).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("c,3"));
        assert!(rows[1].starts_with("a,1"));
    }
}
