//! Chemical-knowledge extraction for interaction-prediction models.
//!
//! The centerpiece is the atom contribution scorer: a table of
//! substructure rules is applied to a molecule, contributions accumulate
//! per atom, and the sums clip to `{-1, 0, 1}` labels a graph model can
//! attend over. The shipped table carries the Wildman-Crippen LogP atom
//! contributions. Dataset-level helpers load molecule collections and
//! attach scaled labels as node weights.

pub mod annotate;
pub mod scorer;
pub mod table;
