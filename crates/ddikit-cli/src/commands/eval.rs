use crate::cli::EvalArgs;
use crate::error::{CliError, Result};
use ddikit::eval::callback::{EpochEvaluator, EvalConfig, TypeMetrics, save_type_report};
use ddikit::eval::history::HistoryWriter;
use ddikit::eval::metrics::MetricsError;
use ddikit::utils::naming;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub fn run(args: EvalArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    info!(
        dataset = %config.dataset,
        aggregator = %config.aggregator,
        fold = config.fold,
        "Evaluation run configured."
    );

    let predictions = read_predictions(&args.input)?;
    info!(samples = predictions.labels.len(), "Predictions loaded.");

    let mut evaluator = EpochEvaluator::new(config.clone());
    if let Some(history_path) = &args.history {
        evaluator = evaluator.with_history(HistoryWriter::new(history_path));
    }

    let record = evaluator.on_epoch_end(args.epoch, &predictions.labels, &predictions.scores)?;
    println!(
        "✓ Epoch {}: AUC {:.4}  AUPR {:.4}  ACC {:.4}  F1 {:.4}  P {:.4}  R {:.4}",
        record.epoch_count,
        record.val_auc,
        record.val_aupr,
        record.val_acc,
        record.val_f1,
        record.val_pre,
        record.val_rec
    );

    if let Some(report_path) = &args.type_report {
        let rows = per_type_rows(&predictions, config.threshold)?;
        let report_path = type_report_path(report_path, &config);
        save_type_report(&report_path, &rows)?;
        println!(
            "✓ Per-type report ({} type(s)) appended to: {}",
            rows.len(),
            report_path.display()
        );
    }

    Ok(())
}

/// Config file values first, then flag overrides on top.
fn resolve_config(args: &EvalArgs) -> Result<EvalConfig> {
    let mut config = match &args.config {
        Some(path) => EvalConfig::from_toml_file(path)?,
        None => EvalConfig::new("drugbank", "sum", 0),
    };
    if let Some(dataset) = &args.dataset {
        config.dataset = dataset.clone();
    }
    if let Some(aggregator) = &args.aggregator {
        config.aggregator = aggregator.clone();
    }
    if let Some(fold) = args.fold {
        config.fold = fold;
    }
    if let Some(threshold) = args.threshold {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(CliError::Argument(format!(
                "decision threshold {} lies outside [0, 1]",
                threshold
            )));
        }
        config.threshold = threshold;
    }
    Ok(config)
}

/// A report path that names an existing directory gets a file name
/// derived from the run tags, the way training runs name their logs.
fn type_report_path(base: &Path, config: &EvalConfig) -> PathBuf {
    if base.is_dir() {
        naming::format_filename(
            base,
            "{dataset}_{aggregator}_fold{fold}_types.txt",
            &[
                ("dataset", &config.dataset),
                ("aggregator", &config.aggregator),
                ("fold", &config.fold.to_string()),
            ],
        )
    } else {
        base.to_path_buf()
    }
}

struct Predictions {
    labels: Vec<bool>,
    scores: Vec<f64>,
    types: Option<Vec<u16>>,
}

fn read_predictions(path: &Path) -> Result<Predictions> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })?;

    let headers = reader
        .headers()
        .map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?
        .clone();
    let find = |name: &str| {
        headers
            .iter()
            .position(|header| header.trim().eq_ignore_ascii_case(name))
    };
    let score_index = find("score").ok_or_else(|| {
        CliError::Argument(format!(
            "predictions file '{}' has no 'score' column",
            path.display()
        ))
    })?;
    let label_index = find("label").ok_or_else(|| {
        CliError::Argument(format!(
            "predictions file '{}' has no 'label' column",
            path.display()
        ))
    })?;
    let type_index = find("type");

    let mut labels = Vec::new();
    let mut scores = Vec::new();
    let mut types = type_index.map(|_| Vec::new());
    for result in reader.records() {
        let record = result.map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        scores.push(parse_field::<f64>(path, &record, score_index, "score", line)?);
        labels.push(parse_field::<f64>(path, &record, label_index, "label", line)? != 0.0);
        if let (Some(types), Some(index)) = (&mut types, type_index) {
            types.push(parse_field::<u16>(path, &record, index, "type", line)?);
        }
    }

    Ok(Predictions {
        labels,
        scores,
        types,
    })
}

fn parse_field<T: std::str::FromStr>(
    path: &Path,
    record: &csv::StringRecord,
    index: usize,
    column: &str,
    line: u64,
) -> Result<T> {
    let value = record.get(index).unwrap_or("").trim();
    value.parse().map_err(|_| CliError::FileParsing {
        path: path.to_path_buf(),
        source: anyhow::anyhow!("line {}: invalid {} value '{}'", line, column, value),
    })
}

/// Groups predictions by interaction type and computes one metric row
/// per type. Types whose labels hold a single class are skipped with a
/// warning, matching how sparse validation splits are handled upstream.
fn per_type_rows(predictions: &Predictions, threshold: f64) -> Result<Vec<TypeMetrics>> {
    let Some(types) = &predictions.types else {
        return Err(CliError::Argument(
            "per-type reports need a 'type' column in the predictions file".to_string(),
        ));
    };

    let mut groups: BTreeMap<u16, (Vec<bool>, Vec<f64>)> = BTreeMap::new();
    for ((&label, &score), &type_id) in predictions
        .labels
        .iter()
        .zip(&predictions.scores)
        .zip(types)
    {
        let group = groups.entry(type_id).or_default();
        group.0.push(label);
        group.1.push(score);
    }

    let mut rows = Vec::new();
    for (type_id, (labels, scores)) in &groups {
        match TypeMetrics::from_predictions(*type_id, labels, scores, threshold) {
            Ok(row) => rows.push(row),
            Err(MetricsError::SingleClass) => {
                warn!(
                    type_id = *type_id,
                    "Skipping interaction type with single-class labels."
                );
            }
            Err(e) => return Err(CliError::Eval(e.into())),
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_csv(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("predictions.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", contents).unwrap();
        (dir, path)
    }

    #[test]
    fn predictions_load_with_case_insensitive_headers() {
        let (_dir, path) = write_csv("Score,Label,Type\n0.9,1,0\n0.2,0,1\n");
        let predictions = read_predictions(&path).unwrap();

        assert_eq!(predictions.scores, vec![0.9, 0.2]);
        assert_eq!(predictions.labels, vec![true, false]);
        assert_eq!(predictions.types, Some(vec![0, 1]));
    }

    #[test]
    fn the_type_column_is_optional() {
        let (_dir, path) = write_csv("score,label\n0.9,1\n");
        let predictions = read_predictions(&path).unwrap();
        assert_eq!(predictions.types, None);
    }

    #[test]
    fn missing_columns_are_reported() {
        let (_dir, path) = write_csv("score,prediction\n0.9,1\n");
        let result = read_predictions(&path);
        assert!(matches!(result, Err(CliError::Argument(message)) if message.contains("label")));
    }

    #[test]
    fn invalid_values_name_the_line() {
        let (_dir, path) = write_csv("score,label\n0.9,1\nbad,0\n");
        let result = read_predictions(&path);
        assert!(matches!(
            result,
            Err(CliError::FileParsing { source, .. }) if source.to_string().contains("line 3")
        ));
    }

    #[test]
    fn per_type_rows_group_and_skip_single_class_types() {
        let predictions = Predictions {
            labels: vec![true, false, true, true],
            scores: vec![0.8, 0.3, 0.9, 0.7],
            types: Some(vec![5, 5, 2, 2]),
        };

        let rows = per_type_rows(&predictions, 0.5).unwrap();
        // Type 2 is all-positive and drops out; type 5 survives.
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].type_id, 5);
        assert!((rows[0].accuracy - 1.0).abs() < 1e-9);
    }

    #[test]
    fn per_type_rows_require_the_type_column() {
        let predictions = Predictions {
            labels: vec![true],
            scores: vec![0.8],
            types: None,
        };
        assert!(matches!(
            per_type_rows(&predictions, 0.5),
            Err(CliError::Argument(_))
        ));
    }

    #[test]
    fn type_report_directories_expand_with_run_tags() {
        let dir = tempdir().unwrap();
        let config = EvalConfig::new("drugbank", "sum", 2);

        let expanded = type_report_path(dir.path(), &config);
        assert_eq!(expanded, dir.path().join("drugbank_sum_fold2_types.txt"));

        let file = dir.path().join("report.txt");
        assert_eq!(type_report_path(&file, &config), file);
    }
}
