use crate::cli::ScoreArgs;
use crate::error::{CliError, Result};
use ddikit::chem::smiles;
use ddikit::knowledge::scorer::ContributionScorer;
use ddikit::knowledge::table::ContributionTable;
use std::fs;
use std::path::Path;
use tracing::info;

pub fn run(args: ScoreArgs) -> Result<()> {
    let table = load_table(args.table.as_deref())?;
    info!(rules = table.len(), "Rule table ready.");
    let scorer = ContributionScorer::new(&table);

    let inputs = match (&args.smiles, &args.input) {
        (Some(smiles), _) => vec![smiles.clone()],
        (None, Some(path)) => read_smiles_file(path)?,
        (None, None) => {
            return Err(CliError::Argument(
                "either --smiles or --input is required".to_string(),
            ));
        }
    };
    info!(molecules = inputs.len(), "Scoring molecules.");

    for input in &inputs {
        let line = if args.raw {
            let molecule = smiles::parse(input).map_err(|source| CliError::Smiles {
                input: input.clone(),
                source,
            })?;
            format_values(&scorer.contributions(&molecule), |v| format!("{:.4}", v))
        } else {
            let labels = scorer.score(input).map_err(|source| CliError::Smiles {
                input: input.clone(),
                source,
            })?;
            format_values(&labels, i8::to_string)
        };
        println!("{}\t{}", input, line);
    }

    Ok(())
}

fn load_table(path: Option<&Path>) -> Result<ContributionTable> {
    Ok(match path {
        Some(path) => ContributionTable::from_path(path)?,
        None => ContributionTable::builtin(),
    })
}

fn read_smiles_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

fn format_values<T>(values: &[T], format: impl Fn(&T) -> String) -> String {
    values.iter().map(format).collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn smiles_files_skip_comments_and_blank_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("molecules.smi");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "# validation molecules").unwrap();
        writeln!(file, "CCO").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  c1ccccc1  ").unwrap();

        let inputs = read_smiles_file(&path).unwrap();
        assert_eq!(inputs, vec!["CCO".to_string(), "c1ccccc1".to_string()]);
    }

    #[test]
    fn labels_join_with_commas() {
        let line = format_values(&[1i8, 0, -1], i8::to_string);
        assert_eq!(line, "1,0,-1");
    }
}
