use crate::chem::smarts::{SmartsError, SmartsPattern};
use std::path::Path;
use thiserror::Error;

/// The Wildman-Crippen atom-contribution rows shipped with the crate.
const BUILTIN_TABLE: &str = include_str!("../../data/crippen_logp.tsv");

#[derive(Debug, Error)]
pub enum TableError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error in rule table: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },
    #[error("Rule row {row} needs a group, a pattern, and a value")]
    MissingColumns { row: usize },
    #[error("Rule row {row} has a non-numeric {column} value '{value}'")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("Rule row {row} has an invalid pattern '{pattern}': {source}")]
    Pattern {
        row: usize,
        pattern: String,
        source: SmartsError,
    },
    #[error("Rule table contains no rules")]
    Empty,
}

/// One row of a contribution table: a substructure query and the value
/// added to every atom the query covers.
#[derive(Debug, Clone)]
pub struct AtomRule {
    /// Rule family label, e.g. `C1` or `Hal`. Several rows may share one.
    pub group: String,
    /// The pattern source text as it appeared in the table.
    pub smarts: String,
    /// The compiled query.
    pub pattern: SmartsPattern,
    /// Contribution added per matched atom.
    pub value: f64,
    /// Molar refractivity column, when the row carries one.
    pub molar_refractivity: Option<f64>,
    /// Free-text annotation column, when present and non-blank.
    pub note: Option<String>,
}

/// An ordered, immutable set of [`AtomRule`]s.
///
/// Row order is the order rules are applied in; tables that rely on a
/// deliberate ordering (the shipped one does, twice) survive loading
/// unchanged. Construct once and share by reference; the table is
/// immutable afterwards and safe to use from several scorers.
#[derive(Debug, Clone)]
pub struct ContributionTable {
    rules: Vec<AtomRule>,
}

impl ContributionTable {
    /// The built-in Crippen LogP table: 110 rules over carbon, hydrogen,
    /// nitrogen, oxygen, halogen, phosphorus, sulfur, and metal groups.
    ///
    /// The embedded asset is fixed at compile time and exercised in full
    /// by the test suite, so construction cannot fail at run time.
    pub fn builtin() -> Self {
        Self::from_tsv(BUILTIN_TABLE).expect("embedded rule table is valid")
    }

    /// Loads a table from a TSV file.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Io`] when the file cannot be read, or any of
    /// the row-level variants described on [`ContributionTable::from_tsv`].
    pub fn from_path(path: &Path) -> Result<Self, TableError> {
        let content = std::fs::read_to_string(path).map_err(|e| TableError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_tsv(&content)
    }

    /// Parses table text.
    ///
    /// The format is tab-separated with columns
    /// `group, pattern, value[, molar_refractivity[, note]]`. Lines
    /// beginning with `#` are comments, which covers the conventional
    /// `#ID` header line. Note fields may be double-quoted; quotes are
    /// stripped and blank notes dropped.
    ///
    /// Validation is fail-fast: the first short row, non-numeric value,
    /// or uncompilable pattern aborts loading with its rule row number,
    /// so a broken table can never half-apply.
    ///
    /// # Errors
    ///
    /// [`TableError::MissingColumns`], [`TableError::InvalidNumber`], or
    /// [`TableError::Pattern`] naming the offending row;
    /// [`TableError::Csv`] for malformed TSV; [`TableError::Empty`] when
    /// no rules remain.
    pub fn from_tsv(data: &str) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .comment(Some(b'#'))
            .flexible(true)
            .from_reader(data.as_bytes());

        let mut rules = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let row = index + 1;
            let record = result?;

            let group = record.get(0).map(str::trim).unwrap_or_default();
            let smarts = record.get(1).map(str::trim).unwrap_or_default();
            let value_text = record.get(2).map(str::trim).unwrap_or_default();
            if group.is_empty() || smarts.is_empty() || value_text.is_empty() {
                return Err(TableError::MissingColumns { row });
            }

            let value: f64 = value_text.parse().map_err(|_| TableError::InvalidNumber {
                row,
                column: "value",
                value: value_text.to_string(),
            })?;

            let molar_refractivity = match record.get(3).map(str::trim) {
                None | Some("") => None,
                Some(text) => Some(text.parse().map_err(|_| TableError::InvalidNumber {
                    row,
                    column: "molar refractivity",
                    value: text.to_string(),
                })?),
            };

            let note = record
                .get(4)
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(String::from);

            let pattern = SmartsPattern::parse(smarts).map_err(|source| TableError::Pattern {
                row,
                pattern: smarts.to_string(),
                source,
            })?;

            rules.push(AtomRule {
                group: group.to_string(),
                smarts: smarts.to_string(),
                pattern,
                value,
                molar_refractivity,
                note,
            });
        }

        if rules.is_empty() {
            return Err(TableError::Empty);
        }
        Ok(Self { rules })
    }

    /// The rules in application order.
    pub fn rules(&self) -> &[AtomRule] {
        &self.rules
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True for a table with no rules. Construction rejects such tables,
    /// so this is only ever false on a loaded table.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn builtin_table_loads_all_rules() {
        let table = ContributionTable::builtin();
        assert_eq!(table.len(), 110);

        let first = &table.rules()[0];
        assert_eq!(first.group, "C1");
        assert_eq!(first.smarts, "[CH4]");
        assert_eq!(first.value, 0.1441);
        assert_eq!(first.molar_refractivity, Some(2.503));
        assert!(first.note.is_none());

        let last = &table.rules()[109];
        assert_eq!(last.group, "Me2");
        assert_eq!(last.value, -0.0025);
        assert!(last.molar_refractivity.is_none());
    }

    #[test]
    fn builtin_table_keeps_the_deliberate_row_order() {
        let table = ContributionTable::builtin();
        let position = |group: &str| {
            table
                .rules()
                .iter()
                .position(|rule| rule.group == group)
                .unwrap()
        };
        // The shipped table flips O12 ahead of O7 on purpose; the loader
        // must not reorder rows behind the format's back.
        assert!(position("O12") < position("O7"));
        assert_eq!(
            table.rules()[position("O12")].note.as_deref(),
            Some("order flip here intentional")
        );
    }

    #[test]
    fn blank_quoted_notes_are_dropped() {
        let table = ContributionTable::builtin();
        let s2 = table
            .rules()
            .iter()
            .find(|rule| rule.group == "S2")
            .unwrap();
        assert!(s2.note.is_none());
    }

    #[test]
    fn rows_without_molar_refractivity_load_as_none() {
        let table = ContributionTable::builtin();
        let n10 = table
            .rules()
            .iter()
            .find(|rule| rule.group == "N10")
            .unwrap();
        assert_eq!(n10.value, -1.95);
        assert!(n10.molar_refractivity.is_none());
    }

    #[test]
    fn from_tsv_parses_a_minimal_table() {
        let table = ContributionTable::from_tsv(
            "#ID\tSMARTS\tvalue\nX1\t[CH4]\t0.5\t1.25\tnote text\nX2\t[OH2]\t-0.75\n",
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rules()[0].note.as_deref(), Some("note text"));
        assert_eq!(table.rules()[1].value, -0.75);
        assert!(table.rules()[1].molar_refractivity.is_none());
    }

    #[test]
    fn from_tsv_rejects_short_rows() {
        let result = ContributionTable::from_tsv("X1\t[CH4]\t0.5\nX2\t[OH2]\n");
        assert!(matches!(
            result,
            Err(TableError::MissingColumns { row: 2 })
        ));
    }

    #[test]
    fn from_tsv_rejects_non_numeric_values() {
        let result = ContributionTable::from_tsv("X1\t[CH4]\tlots\n");
        assert!(matches!(
            result,
            Err(TableError::InvalidNumber { row: 1, column: "value", .. })
        ));

        let result = ContributionTable::from_tsv("X1\t[CH4]\t0.5\tmuch\n");
        assert!(matches!(
            result,
            Err(TableError::InvalidNumber {
                row: 1,
                column: "molar refractivity",
                ..
            })
        ));
    }

    #[test]
    fn from_tsv_rejects_invalid_patterns_at_load_time() {
        let result = ContributionTable::from_tsv("X1\t[CH4]\t0.5\nX2\t[C\t0.1\n");
        match result {
            Err(TableError::Pattern { row, pattern, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(pattern, "[C");
            }
            other => panic!("expected pattern error, got {:?}", other),
        }
    }

    #[test]
    fn from_tsv_rejects_an_empty_table() {
        assert!(matches!(
            ContributionTable::from_tsv("#only\ta\tcomment\n"),
            Err(TableError::Empty)
        ));
    }

    #[test]
    fn from_path_reads_a_table_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rules.tsv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "#ID\tSMARTS\tlogP").unwrap();
        writeln!(file, "X1\t[CH4]\t0.25").unwrap();

        let table = ContributionTable::from_path(&path).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rules()[0].group, "X1");
    }

    #[test]
    fn from_path_reports_missing_files() {
        let result = ContributionTable::from_path(Path::new("/nonexistent/rules.tsv"));
        assert!(matches!(result, Err(TableError::Io { .. })));
    }
}
