use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetricsError {
    #[error("Labels and scores have different lengths ({labels} vs {scores})")]
    LengthMismatch { labels: usize, scores: usize },
    #[error("Metrics need at least one sample")]
    Empty,
    #[error("Ranking metrics are undefined when the labels hold a single class")]
    SingleClass,
}

/// Area under the ROC curve as a rank statistic.
///
/// Tied scores receive averaged ranks, so the result equals the
/// trapezoidal area under the ROC curve with tie interpolation. The
/// statistic is the probability a random positive outranks a random
/// negative.
///
/// # Errors
///
/// [`MetricsError::SingleClass`] when the labels are all positive or all
/// negative; the curve has no extent in that case.
pub fn roc_auc(labels: &[bool], scores: &[f64]) -> Result<f64, MetricsError> {
    check_inputs(labels, scores)?;
    let positives = labels.iter().filter(|&&label| label).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(MetricsError::SingleClass);
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    // 1-based ranks, averaged across tied scores.
    let mut ranks = vec![0.0; scores.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start;
        while end + 1 < order.len() && scores[order[end + 1]] == scores[order[start]] {
            end += 1;
        }
        let average = (start + end) as f64 / 2.0 + 1.0;
        for &index in &order[start..=end] {
            ranks[index] = average;
        }
        start = end + 1;
    }

    let positive_rank_sum: f64 = labels
        .iter()
        .zip(&ranks)
        .filter(|&(&label, _)| label)
        .map(|(_, &rank)| rank)
        .sum();
    let p = positives as f64;
    let n = negatives as f64;
    Ok((positive_rank_sum - p * (p + 1.0) / 2.0) / (p * n))
}

/// A precision-recall curve, points ordered by increasing threshold.
///
/// Recall decreases along the arrays and the final point is the
/// conventional `(precision=1, recall=0)` anchor, which has no
/// threshold; `thresholds` is therefore one shorter than the other two.
#[derive(Debug, Clone, PartialEq)]
pub struct PrCurve {
    pub precision: Vec<f64>,
    pub recall: Vec<f64>,
    pub thresholds: Vec<f64>,
}

/// Computes the precision-recall curve with one point per distinct
/// score.
///
/// # Errors
///
/// [`MetricsError::SingleClass`] when no positive labels exist; recall
/// would divide by zero.
pub fn precision_recall_curve(labels: &[bool], scores: &[f64]) -> Result<PrCurve, MetricsError> {
    check_inputs(labels, scores)?;
    let total_positives = labels.iter().filter(|&&label| label).count();
    if total_positives == 0 {
        return Err(MetricsError::SingleClass);
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut precision = Vec::new();
    let mut recall = Vec::new();
    let mut thresholds = Vec::new();
    let mut true_positives = 0usize;
    let mut false_positives = 0usize;
    for (position, &index) in order.iter().enumerate() {
        if labels[index] {
            true_positives += 1;
        } else {
            false_positives += 1;
        }
        // Emit a point only at the last of a run of tied scores.
        let tied_with_next = order
            .get(position + 1)
            .map(|&next| scores[next] == scores[index])
            .unwrap_or(false);
        if tied_with_next {
            continue;
        }
        precision.push(true_positives as f64 / (true_positives + false_positives) as f64);
        recall.push(true_positives as f64 / total_positives as f64);
        thresholds.push(scores[index]);
    }

    precision.reverse();
    recall.reverse();
    thresholds.reverse();
    precision.push(1.0);
    recall.push(0.0);

    Ok(PrCurve {
        precision,
        recall,
        thresholds,
    })
}

/// Area under the precision-recall curve by trapezoidal integration
/// over recall.
///
/// # Errors
///
/// Propagates [`precision_recall_curve`] errors.
pub fn aupr(labels: &[bool], scores: &[f64]) -> Result<f64, MetricsError> {
    let curve = precision_recall_curve(labels, scores)?;
    Ok(trapezoid_area(&curve.recall, &curve.precision))
}

/// `|∫ y dx|` over consecutive points; `x` must be monotone.
fn trapezoid_area(x: &[f64], y: &[f64]) -> f64 {
    let mut area = 0.0;
    for i in 1..x.len() {
        area += (x[i] - x[i - 1]) * (y[i] + y[i - 1]) / 2.0;
    }
    area.abs()
}

/// Applies a decision threshold; scores at the threshold count as
/// positive.
pub fn threshold_scores(scores: &[f64], threshold: f64) -> Vec<bool> {
    scores.iter().map(|&score| score >= threshold).collect()
}

/// Fraction of predictions that agree with the labels.
pub fn accuracy(labels: &[bool], predictions: &[bool]) -> Result<f64, MetricsError> {
    check_prediction_inputs(labels, predictions)?;
    let correct = labels
        .iter()
        .zip(predictions)
        .filter(|(label, prediction)| label == prediction)
        .count();
    Ok(correct as f64 / labels.len() as f64)
}

/// True positives over predicted positives; `0` when nothing was
/// predicted positive.
pub fn precision(labels: &[bool], predictions: &[bool]) -> Result<f64, MetricsError> {
    check_prediction_inputs(labels, predictions)?;
    let (tp, fp, _) = confusion(labels, predictions);
    if tp + fp == 0 {
        return Ok(0.0);
    }
    Ok(tp as f64 / (tp + fp) as f64)
}

/// True positives over actual positives; `0` when no positives exist.
pub fn recall(labels: &[bool], predictions: &[bool]) -> Result<f64, MetricsError> {
    check_prediction_inputs(labels, predictions)?;
    let (tp, _, fn_) = confusion(labels, predictions);
    if tp + fn_ == 0 {
        return Ok(0.0);
    }
    Ok(tp as f64 / (tp + fn_) as f64)
}

/// Harmonic mean of precision and recall; `0` when both are `0`.
pub fn f1(labels: &[bool], predictions: &[bool]) -> Result<f64, MetricsError> {
    check_prediction_inputs(labels, predictions)?;
    let (tp, fp, fn_) = confusion(labels, predictions);
    let denominator = 2 * tp + fp + fn_;
    if denominator == 0 {
        return Ok(0.0);
    }
    Ok(2.0 * tp as f64 / denominator as f64)
}

fn confusion(labels: &[bool], predictions: &[bool]) -> (usize, usize, usize) {
    let mut tp = 0;
    let mut fp = 0;
    let mut fn_ = 0;
    for (&label, &prediction) in labels.iter().zip(predictions) {
        match (label, prediction) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (true, false) => fn_ += 1,
            (false, false) => {}
        }
    }
    (tp, fp, fn_)
}

fn check_inputs(labels: &[bool], scores: &[f64]) -> Result<(), MetricsError> {
    if labels.len() != scores.len() {
        return Err(MetricsError::LengthMismatch {
            labels: labels.len(),
            scores: scores.len(),
        });
    }
    if labels.is_empty() {
        return Err(MetricsError::Empty);
    }
    Ok(())
}

fn check_prediction_inputs(labels: &[bool], predictions: &[bool]) -> Result<(), MetricsError> {
    if labels.len() != predictions.len() {
        return Err(MetricsError::LengthMismatch {
            labels: labels.len(),
            scores: predictions.len(),
        });
    }
    if labels.is_empty() {
        return Err(MetricsError::Empty);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABELS: [bool; 4] = [false, false, true, true];
    const SCORES: [f64; 4] = [0.1, 0.4, 0.35, 0.8];

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn roc_auc_matches_the_textbook_example() {
        let auc = roc_auc(&LABELS, &SCORES).unwrap();
        assert!(close(auc, 0.75));
    }

    #[test]
    fn roc_auc_is_one_for_perfect_ranking_and_zero_for_inverted() {
        let labels = [false, false, true, true];
        assert!(close(
            roc_auc(&labels, &[0.1, 0.2, 0.8, 0.9]).unwrap(),
            1.0
        ));
        assert!(close(
            roc_auc(&labels, &[0.9, 0.8, 0.2, 0.1]).unwrap(),
            0.0
        ));
    }

    #[test]
    fn roc_auc_averages_tied_ranks() {
        let labels = [true, false, true, false];
        let scores = [0.5, 0.5, 0.5, 0.5];
        assert!(close(roc_auc(&labels, &scores).unwrap(), 0.5));
    }

    #[test]
    fn roc_auc_rejects_single_class_labels() {
        assert_eq!(
            roc_auc(&[true, true], &[0.1, 0.9]),
            Err(MetricsError::SingleClass)
        );
        assert_eq!(
            roc_auc(&[false, false], &[0.1, 0.9]),
            Err(MetricsError::SingleClass)
        );
    }

    #[test]
    fn precision_recall_curve_matches_the_textbook_example() {
        let curve = precision_recall_curve(&LABELS, &SCORES).unwrap();
        let expected_precision = [0.5, 2.0 / 3.0, 0.5, 1.0, 1.0];
        let expected_recall = [1.0, 1.0, 0.5, 0.5, 0.0];
        let expected_thresholds = [0.1, 0.35, 0.4, 0.8];

        assert_eq!(curve.precision.len(), expected_precision.len());
        for (value, expected) in curve.precision.iter().zip(expected_precision) {
            assert!(close(*value, expected));
        }
        for (value, expected) in curve.recall.iter().zip(expected_recall) {
            assert!(close(*value, expected));
        }
        for (value, expected) in curve.thresholds.iter().zip(expected_thresholds) {
            assert!(close(*value, expected));
        }
    }

    #[test]
    fn aupr_matches_the_textbook_example() {
        let area = aupr(&LABELS, &SCORES).unwrap();
        assert!(close(area, 19.0 / 24.0));
    }

    #[test]
    fn aupr_is_one_for_perfect_separation() {
        assert!(close(
            aupr(&[false, true], &[0.1, 0.9]).unwrap(),
            1.0
        ));
    }

    #[test]
    fn aupr_requires_at_least_one_positive() {
        assert_eq!(
            aupr(&[false, false], &[0.1, 0.9]),
            Err(MetricsError::SingleClass)
        );
    }

    #[test]
    fn tied_scores_collapse_to_one_curve_point() {
        let curve = precision_recall_curve(&[true, false, true], &[0.7, 0.7, 0.2]).unwrap();
        // Thresholds 0.7 and 0.2, plus the terminal anchor point.
        assert_eq!(curve.thresholds.len(), 2);
        assert_eq!(curve.precision.len(), 3);
    }

    #[test]
    fn thresholded_metrics_match_the_textbook_example() {
        let predictions = threshold_scores(&SCORES, 0.5);
        assert_eq!(predictions, vec![false, false, false, true]);
        assert!(close(accuracy(&LABELS, &predictions).unwrap(), 0.75));
        assert!(close(precision(&LABELS, &predictions).unwrap(), 1.0));
        assert!(close(recall(&LABELS, &predictions).unwrap(), 0.5));
        assert!(close(f1(&LABELS, &predictions).unwrap(), 2.0 / 3.0));
    }

    #[test]
    fn threshold_is_inclusive() {
        assert_eq!(threshold_scores(&[0.5], 0.5), vec![true]);
        assert_eq!(threshold_scores(&[0.4999], 0.5), vec![false]);
    }

    #[test]
    fn zero_division_cases_return_zero() {
        let labels = [true, true];
        let none_predicted = [false, false];
        assert!(close(precision(&labels, &none_predicted).unwrap(), 0.0));
        assert!(close(f1(&labels, &none_predicted).unwrap(), 0.0));

        let no_positives = [false, false];
        assert!(close(recall(&no_positives, &[false, true]).unwrap(), 0.0));
    }

    #[test]
    fn inputs_are_validated() {
        assert_eq!(
            roc_auc(&[true], &[0.1, 0.2]),
            Err(MetricsError::LengthMismatch {
                labels: 1,
                scores: 2
            })
        );
        assert_eq!(roc_auc(&[], &[]), Err(MetricsError::Empty));
        assert_eq!(accuracy(&[], &[]), Err(MetricsError::Empty));
    }
}
