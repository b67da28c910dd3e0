use super::table::ContributionTable;
use crate::chem::matcher;
use crate::chem::molecule::Molecule;
use crate::chem::smiles::{self, SmilesError};

/// Magnitude an accumulated contribution must exceed, strictly, to earn
/// a non-zero label.
pub const CLIP_THRESHOLD: f64 = 0.3;

/// Scores atoms of a molecule against a [`ContributionTable`].
///
/// The scorer borrows its table, so one table constructed at startup can
/// back any number of scorers and calls. Scoring is pure: no state is
/// kept between calls and a failed parse leaves nothing behind.
#[derive(Debug, Clone, Copy)]
pub struct ContributionScorer<'a> {
    table: &'a ContributionTable,
}

impl<'a> ContributionScorer<'a> {
    pub fn new(table: &'a ContributionTable) -> Self {
        Self { table }
    }

    /// The table this scorer applies.
    pub fn table(&self) -> &ContributionTable {
        self.table
    }

    /// Scores a SMILES string, producing one label in `{-1, 0, 1}` per
    /// atom in parse order.
    ///
    /// Every rule is applied in table order; each substructure match adds
    /// the rule's value to the accumulator slot of every atom the match
    /// covers. Accumulated values are then clipped: strictly above
    /// [`CLIP_THRESHOLD`] gives `1`, strictly below its negation gives
    /// `-1`, everything else (boundaries included) gives `0`.
    ///
    /// # Arguments
    ///
    /// * `input` - The molecule as a SMILES string.
    ///
    /// # Return
    ///
    /// A vector whose length equals the molecule's atom count, aligned
    /// with atom indices.
    ///
    /// # Errors
    ///
    /// Returns [`SmilesError`] when the input does not parse. Pattern
    /// problems cannot occur here; they are rejected when the table is
    /// constructed.
    pub fn score(&self, input: &str) -> Result<Vec<i8>, SmilesError> {
        let molecule = smiles::parse(input)?;
        Ok(self.score_molecule(&molecule))
    }

    /// Scores an already-parsed molecule.
    pub fn score_molecule(&self, molecule: &Molecule) -> Vec<i8> {
        clip(&self.contributions(molecule))
    }

    /// The raw per-atom accumulator, before clipping.
    ///
    /// Useful when a caller wants to scale contributions instead of
    /// consuming hard labels.
    pub fn contributions(&self, molecule: &Molecule) -> Vec<f64> {
        let mut accumulator = vec![0.0; molecule.atom_count()];
        for rule in self.table.rules() {
            for matched in matcher::find_matches(&rule.pattern, molecule) {
                for atom_index in matched {
                    accumulator[atom_index] += rule.value;
                }
            }
        }
        accumulator
    }
}

/// Maps accumulated contributions onto `{-1, 0, 1}` labels. Both
/// boundaries are exclusive: a value of exactly `0.3` or `-0.3` stays
/// `0`.
pub fn clip(contributions: &[f64]) -> Vec<i8> {
    contributions
        .iter()
        .map(|&value| {
            if value > CLIP_THRESHOLD {
                1
            } else if value < -CLIP_THRESHOLD {
                -1
            } else {
                0
            }
        })
        .collect()
}
