//! End-of-epoch evaluation for binary interaction models.
//!
//! [`EpochEvaluator`] turns a vector of validation scores into a named
//! [`EpochRecord`], logs it, and appends it to the run history. The
//! record carries the run tags (dataset, aggregator, fold) so histories
//! from different runs can share one file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};

use super::history::{self, HistoryError, HistoryWriter};
use super::metrics::{self, MetricsError};

/// Decision threshold applied when a config does not set one.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Config {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid decision threshold {value}; thresholds lie in [0, 1]")]
    InvalidThreshold { value: f64 },
    #[error("Metric computation failed: {0}")]
    Metrics(#[from] MetricsError),
    #[error("History log error: {0}")]
    History(#[from] HistoryError),
}

/// Run tags and the decision threshold for an evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Dataset identifier, e.g. `drugbank` or `kegg`.
    pub dataset: String,
    /// Neighborhood aggregator the model was trained with.
    pub aggregator: String,
    /// Cross-validation fold index.
    #[serde(default)]
    pub fold: u32,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

impl EvalConfig {
    pub fn new(dataset: impl Into<String>, aggregator: impl Into<String>, fold: u32) -> Self {
        Self {
            dataset: dataset.into(),
            aggregator: aggregator.into(),
            fold,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Loads a config from a TOML file and validates the threshold.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Io`] when the file cannot be read,
    /// [`EvalError::Config`] on malformed TOML, and
    /// [`EvalError::InvalidThreshold`] when the threshold falls outside
    /// `[0, 1]`.
    pub fn from_toml_file(path: &Path) -> Result<Self, EvalError> {
        let content = fs::read_to_string(path).map_err(|source| EvalError::Io {
            path: path.to_string_lossy().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| EvalError::Config {
            path: path.to_string_lossy().to_string(),
            source,
        })?;
        if !(0.0..=1.0).contains(&config.threshold) {
            return Err(EvalError::InvalidThreshold {
                value: config.threshold,
            });
        }
        Ok(config)
    }
}

/// One epoch's validation metrics together with its run tags.
///
/// `epoch_count` is one-based so the first training epoch reports as
/// epoch 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    pub dataset: String,
    pub aggregator: String,
    pub fold: u32,
    pub epoch_count: u32,
    pub val_auc: f64,
    pub val_aupr: f64,
    pub val_acc: f64,
    pub val_f1: f64,
    pub val_rec: f64,
    pub val_pre: f64,
}

/// Computes and records validation metrics at the end of each epoch.
#[derive(Debug)]
pub struct EpochEvaluator {
    config: EvalConfig,
    history: Option<HistoryWriter>,
}

impl EpochEvaluator {
    pub fn new(config: EvalConfig) -> Self {
        Self {
            config,
            history: None,
        }
    }

    /// Appends every produced record to the given history log.
    pub fn with_history(mut self, writer: HistoryWriter) -> Self {
        self.history = Some(writer);
        self
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Evaluates one epoch's validation predictions.
    ///
    /// `epoch` is zero-based; the returned record reports it one-based.
    /// Ranking metrics use the raw scores, thresholded metrics use the
    /// config threshold.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Metrics`] for degenerate label vectors and
    /// [`EvalError::History`] when the history file cannot be written.
    #[instrument(skip_all, name = "epoch_eval")]
    pub fn on_epoch_end(
        &self,
        epoch: u32,
        labels: &[bool],
        scores: &[f64],
    ) -> Result<EpochRecord, EvalError> {
        let val_auc = metrics::roc_auc(labels, scores)?;
        let val_aupr = metrics::aupr(labels, scores)?;
        let predictions = metrics::threshold_scores(scores, self.config.threshold);
        let val_acc = metrics::accuracy(labels, &predictions)?;
        let val_pre = metrics::precision(labels, &predictions)?;
        let val_rec = metrics::recall(labels, &predictions)?;
        let val_f1 = metrics::f1(labels, &predictions)?;

        let record = EpochRecord {
            dataset: self.config.dataset.clone(),
            aggregator: self.config.aggregator.clone(),
            fold: self.config.fold,
            epoch_count: epoch + 1,
            val_auc,
            val_aupr,
            val_acc,
            val_f1,
            val_rec,
            val_pre,
        };

        info!(
            epoch = record.epoch_count,
            val_auc, val_aupr, val_acc, val_f1, "Validation metrics computed."
        );

        if let Some(history) = &self.history {
            history.append(&record)?;
        }
        Ok(record)
    }
}

/// Metrics for one interaction type in a multi-type evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeMetrics {
    pub type_id: u16,
    pub accuracy: f64,
    pub f1: f64,
    pub aupr: f64,
    pub auc: f64,
}

impl TypeMetrics {
    /// Computes the per-type metric row from one type's predictions.
    ///
    /// # Errors
    ///
    /// Propagates the underlying metric errors, in particular
    /// [`MetricsError::SingleClass`] for types whose validation split
    /// holds one class only.
    pub fn from_predictions(
        type_id: u16,
        labels: &[bool],
        scores: &[f64],
        threshold: f64,
    ) -> Result<Self, MetricsError> {
        let predictions = metrics::threshold_scores(scores, threshold);
        Ok(Self {
            type_id,
            accuracy: metrics::accuracy(labels, &predictions)?,
            f1: metrics::f1(labels, &predictions)?,
            aupr: metrics::aupr(labels, scores)?,
            auc: metrics::roc_auc(labels, scores)?,
        })
    }
}

/// Appends a per-type report block to a plain-text report file.
///
/// Each call writes a `New eval` marker line followed by one
/// tab-separated line per interaction type, so consecutive evaluations
/// of the same file stay distinguishable.
///
/// # Errors
///
/// Returns [`EvalError::History`] when the file cannot be written.
pub fn save_type_report(path: &Path, rows: &[TypeMetrics]) -> Result<(), EvalError> {
    let mut block = String::from("New eval");
    for row in rows {
        block.push_str(&format!(
            "\nDDI type:{}\tACC:{}\tF1:{}\tAUPR:{}\tAUC:{}",
            row.type_id, row.accuracy, row.f1, row.aupr, row.auc
        ));
    }
    history::append_text(path, &block)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const LABELS: [bool; 4] = [false, false, true, true];
    const SCORES: [f64; 4] = [0.1, 0.4, 0.35, 0.8];

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn config_loads_from_toml_with_default_threshold() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("eval.toml");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "dataset = \"drugbank\"").unwrap();
        writeln!(file, "aggregator = \"sum\"").unwrap();
        writeln!(file, "fold = 2").unwrap();

        let config = EvalConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.dataset, "drugbank");
        assert_eq!(config.aggregator, "sum");
        assert_eq!(config.fold, 2);
        assert!(close(config.threshold, DEFAULT_THRESHOLD));
    }

    #[test]
    fn config_rejects_out_of_range_thresholds() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("eval.toml");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "dataset = \"kegg\"").unwrap();
        writeln!(file, "aggregator = \"concat\"").unwrap();
        writeln!(file, "threshold = 1.5").unwrap();

        let result = EvalConfig::from_toml_file(&path);
        assert!(matches!(
            result,
            Err(EvalError::InvalidThreshold { value }) if close(value, 1.5)
        ));
    }

    #[test]
    fn config_reports_missing_files_and_bad_toml() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(matches!(
            EvalConfig::from_toml_file(&missing),
            Err(EvalError::Io { .. })
        ));

        let path = dir.path().join("broken.toml");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "dataset = ").unwrap();
        assert!(matches!(
            EvalConfig::from_toml_file(&path),
            Err(EvalError::Config { .. })
        ));
    }

    #[test]
    fn on_epoch_end_builds_a_one_based_record() {
        let evaluator = EpochEvaluator::new(EvalConfig::new("drugbank", "sum", 0));
        let record = evaluator.on_epoch_end(0, &LABELS, &SCORES).unwrap();

        assert_eq!(record.dataset, "drugbank");
        assert_eq!(record.aggregator, "sum");
        assert_eq!(record.fold, 0);
        assert_eq!(record.epoch_count, 1);
        assert!(close(record.val_auc, 0.75));
        assert!(close(record.val_aupr, 19.0 / 24.0));
        assert!(close(record.val_acc, 0.75));
        assert!(close(record.val_pre, 1.0));
        assert!(close(record.val_rec, 0.5));
        assert!(close(record.val_f1, 2.0 / 3.0));
    }

    #[test]
    fn on_epoch_end_appends_to_the_history_log() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.jsonl");
        let evaluator = EpochEvaluator::new(EvalConfig::new("drugbank", "sum", 1))
            .with_history(HistoryWriter::new(&path));

        evaluator.on_epoch_end(0, &LABELS, &SCORES).unwrap();
        evaluator.on_epoch_end(1, &LABELS, &SCORES).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let records: Vec<EpochRecord> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].epoch_count, 1);
        assert_eq!(records[1].epoch_count, 2);
        assert_eq!(records[1].fold, 1);
    }

    #[test]
    fn on_epoch_end_rejects_single_class_labels() {
        let evaluator = EpochEvaluator::new(EvalConfig::new("drugbank", "sum", 0));
        let result = evaluator.on_epoch_end(0, &[true, true], &[0.6, 0.7]);
        assert!(matches!(
            result,
            Err(EvalError::Metrics(MetricsError::SingleClass))
        ));
    }

    #[test]
    fn type_metrics_match_the_textbook_example() {
        let row = TypeMetrics::from_predictions(3, &LABELS, &SCORES, 0.5).unwrap();
        assert_eq!(row.type_id, 3);
        assert!(close(row.accuracy, 0.75));
        assert!(close(row.f1, 2.0 / 3.0));
        assert!(close(row.aupr, 19.0 / 24.0));
        assert!(close(row.auc, 0.75));
    }

    #[test]
    fn type_report_blocks_accumulate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("types.txt");
        let rows = vec![
            TypeMetrics {
                type_id: 0,
                accuracy: 0.9,
                f1: 0.8,
                aupr: 0.7,
                auc: 0.95,
            },
            TypeMetrics {
                type_id: 1,
                accuracy: 0.5,
                f1: 0.25,
                aupr: 0.75,
                auc: 0.5,
            },
        ];

        save_type_report(&path, &rows).unwrap();
        save_type_report(&path, &rows[..1]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("New eval\n").count(), 2);
        assert!(content.contains("DDI type:0\tACC:0.9\tF1:0.8\tAUPR:0.7\tAUC:0.95\n"));
        assert!(content.contains("DDI type:1\tACC:0.5\tF1:0.25\tAUPR:0.75\tAUC:0.5\n"));
    }
}
