//! # ddikit Core Library
//!
//! Chemical-knowledge and evaluation utilities for drug-drug interaction
//! (DDI) prediction models: atom-contribution scoring of molecules with
//! the Wildman-Crippen LogP rule table, dataset annotation, and the
//! per-epoch validation metrics a DDI training loop reports.
//!
//! ## Architectural Philosophy
//!
//! The library is layered so the chemistry never depends on the model
//! side and vice versa.
//!
//! - **[`chem`]: The Foundation.** Stateless molecular data (`Molecule`,
//!   `Atom`, `Bond`), the SMILES reader with implicit-hydrogen and
//!   aromaticity perception, and the SMARTS pattern language with its
//!   substructure matcher.
//!
//! - **[`knowledge`]: The Chemistry API.** The contribution rule table,
//!   the per-atom scorer built on top of the matcher, and the dataset
//!   annotation wrappers that attach scaled atom labels to molecule
//!   entries.
//!
//! - **[`eval`]: The Model Boundary.** Binary-classification metrics and
//!   the end-of-epoch evaluator that turns validation predictions into
//!   tagged, logged, history-appended records.
//!
//! [`progress`] and [`utils`] carry the cross-cutting pieces: progress
//! reporting for long batch operations, binary state snapshots, and
//! filename templating.

pub mod chem;
pub mod eval;
pub mod knowledge;
pub mod progress;
pub mod utils;
