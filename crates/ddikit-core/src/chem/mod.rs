//! # Chemistry Module
//!
//! This module provides the molecular-graph foundation for chemical knowledge
//! extraction in ddikit: parsing line notations into graphs and matching
//! substructure queries against them.
//!
//! ## Overview
//!
//! Drug-drug-interaction models consume molecules as SMILES strings. Turning a
//! string into per-atom knowledge requires three steps, each handled by a
//! submodule here: build the molecular graph, normalize its aromatic systems,
//! and locate the substructures a pattern table describes.
//!
//! ## Architecture
//!
//! - **Element Data** ([`element`]) - Symbol tables, normal valences, and
//!   aromaticity candidates
//! - **Molecular Graphs** ([`molecule`]) - Atoms, bonds, and adjacency with
//!   stable zero-based indices
//! - **SMILES Parsing** ([`smiles`]) - Line notation to graph, with implicit
//!   hydrogen assignment and explicit-hydrogen folding
//! - **Aromaticity** ([`aromaticity`]) - Ring perception and electron-count
//!   flagging so Kekulé and aromatic input converge
//! - **Pattern Compilation** ([`smarts`]) - SMARTS queries compiled to atom
//!   and bond expressions
//! - **Substructure Search** ([`matcher`]) - Backtracking embedding
//!   enumeration with per-atom-set deduplication
//!
//! ## Key Capabilities
//!
//! - **Deterministic atom indexing** so downstream per-atom vectors line up
//!   with parse order
//! - **Toolkit-compatible hydrogen handling** where plain explicit hydrogens
//!   fold into heavy-atom counts
//! - **Compile-once patterns** reusable across whole molecule collections

pub mod aromaticity;
pub mod element;
pub mod matcher;
pub mod molecule;
pub mod smarts;
pub mod smiles;
