//! # Evaluation Module
//!
//! ## Overview
//!
//! Validation metrics and epoch-level bookkeeping for binary
//! interaction predictors. The metric functions mirror the standard
//! definitions used in the DDI literature (rank-statistic ROC AUC,
//! trapezoidal AUPR, thresholded accuracy/precision/recall/F1), and
//! [`callback::EpochEvaluator`] packages them into per-epoch records
//! that land in an append-only JSON-lines history.
//!
//! ## Key Capabilities
//!
//! - **Ranking Metrics**: ROC AUC with tie-averaged ranks and AUPR by
//!   trapezoidal integration of the precision-recall curve.
//! - **Thresholded Metrics**: accuracy, precision, recall and F1 at a
//!   configurable decision threshold, zero-division-safe.
//! - **Epoch Records**: run-tagged [`callback::EpochRecord`] values,
//!   logged and appended per epoch.
//! - **Per-Type Reports**: tab-separated report blocks for multi-type
//!   evaluations.

pub mod callback;
pub mod history;
pub mod metrics;
