use super::scorer::ContributionScorer;
use super::table::ContributionTable;
use crate::chem::smiles::SmilesError;
use crate::progress::{Progress, ProgressReporter};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Dataset '{path}' is missing a '{column}' column")]
    MissingColumn { path: String, column: &'static str },
    #[error("Entry '{name}' has an unparsable structure: {source}")]
    Smiles { name: String, source: SmilesError },
}

/// One named molecule and, once annotated, its per-atom weights.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoleculeEntry {
    pub name: String,
    pub smiles: String,
    /// `factor * label` per atom, in atom-index order. `None` until an
    /// annotation pass has run.
    pub node_weights: Option<Vec<f64>>,
}

/// A collection of molecules to be enriched with chemical knowledge.
///
/// Loaded from a CSV with `name` and `smiles` columns; any other columns
/// are ignored. Entry order follows the file, and indices are stable, so
/// downstream consumers can address molecules by position.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeDataset {
    entries: Vec<MoleculeEntry>,
}

impl KnowledgeDataset {
    /// Reads a dataset from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Csv`] when the file cannot be read or
    /// parsed, and [`DatasetError::MissingColumn`] when the header lacks
    /// `name` or `smiles` (matched case-insensitively).
    pub fn from_path(path: &Path) -> Result<Self, DatasetError> {
        let display_path = path.to_string_lossy().to_string();
        let mut reader = csv::Reader::from_path(path).map_err(|e| DatasetError::Csv {
            path: display_path.clone(),
            source: e,
        })?;

        let headers = reader
            .headers()
            .map_err(|e| DatasetError::Csv {
                path: display_path.clone(),
                source: e,
            })?
            .clone();
        let column = |label: &'static str| {
            headers
                .iter()
                .position(|header| header.trim().eq_ignore_ascii_case(label))
                .ok_or(DatasetError::MissingColumn {
                    path: display_path.clone(),
                    column: label,
                })
        };
        let name_index = column("name")?;
        let smiles_index = column("smiles")?;

        let mut entries = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| DatasetError::Csv {
                path: display_path.clone(),
                source: e,
            })?;
            let name = record.get(name_index).map(str::trim).unwrap_or_default();
            let smiles = record.get(smiles_index).map(str::trim).unwrap_or_default();
            if name.is_empty() && smiles.is_empty() {
                continue;
            }
            entries.push(MoleculeEntry {
                name: name.to_string(),
                smiles: smiles.to_string(),
                node_weights: None,
            });
        }

        info!(path = %display_path, entries = entries.len(), "Loaded molecule dataset.");
        Ok(Self { entries })
    }

    pub fn from_entries(entries: Vec<MoleculeEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MoleculeEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[MoleculeEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &MoleculeEntry> {
        self.entries.iter()
    }

    /// Scores every entry against `table` and stores `factor * label`
    /// per atom as the entry's node weights.
    ///
    /// The pass is fail-fast: the first unparsable structure aborts with
    /// the entry's name, leaving earlier entries annotated and later ones
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Smiles`] naming the offending entry.
    #[instrument(skip_all, name = "annotate_dataset")]
    pub fn annotate_with_table(
        &mut self,
        table: &ContributionTable,
        factor: f64,
        reporter: &ProgressReporter,
    ) -> Result<(), DatasetError> {
        let scorer = ContributionScorer::new(table);
        reporter.report(Progress::ItemsStart {
            total: self.entries.len() as u64,
        });
        for entry in &mut self.entries {
            let labels = scorer
                .score(&entry.smiles)
                .map_err(|source| DatasetError::Smiles {
                    name: entry.name.clone(),
                    source,
                })?;
            entry.node_weights = Some(
                labels
                    .into_iter()
                    .map(|label| factor * f64::from(label))
                    .collect(),
            );
            reporter.report(Progress::ItemsAdvance);
        }
        reporter.report(Progress::ItemsFinish);
        info!(
            entries = self.entries.len(),
            factor, "Annotated dataset with contribution labels."
        );
        Ok(())
    }
}

/// Loads a dataset and annotates it with the built-in Crippen table in
/// one step.
///
/// # Errors
///
/// Propagates [`DatasetError`] from loading or annotation.
#[instrument(skip_all, name = "crippen_knowledge")]
pub fn load_crippen_knowledge(
    path: &Path,
    factor: f64,
    reporter: &ProgressReporter,
) -> Result<KnowledgeDataset, DatasetError> {
    reporter.report(Progress::StageStart {
        name: "load dataset",
    });
    let mut dataset = KnowledgeDataset::from_path(path)?;
    reporter.report(Progress::StageFinish);
    reporter.report(Progress::Note(format!(
        "{} molecule(s) to annotate",
        dataset.len()
    )));

    let table = ContributionTable::builtin();
    dataset.annotate_with_table(&table, factor, reporter)?;
    Ok(dataset)
}
