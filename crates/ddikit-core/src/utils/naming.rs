//! Filename templating for run artifacts.

use std::path::{Path, PathBuf};

/// Expands `{key}` placeholders in `template` and joins the result onto
/// `directory`.
///
/// Placeholders without a binding are left verbatim, so a stray brace
/// in a template shows up in the filename instead of being silently
/// dropped.
pub fn format_filename(directory: &Path, template: &str, bindings: &[(&str, &str)]) -> PathBuf {
    let mut name = template.to_string();
    for (key, value) in bindings {
        name = name.replace(&format!("{{{}}}", key), value);
    }
    directory.join(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_all_bound_placeholders() {
        let path = format_filename(
            Path::new("logs"),
            "ddi_{dataset}_{aggregator}_{fold}.log",
            &[("dataset", "drugbank"), ("aggregator", "sum"), ("fold", "1")],
        );
        assert_eq!(path, PathBuf::from("logs/ddi_drugbank_sum_1.log"));
    }

    #[test]
    fn repeated_placeholders_are_all_replaced() {
        let path = format_filename(
            Path::new("out"),
            "{tag}/{tag}.json",
            &[("tag", "kegg")],
        );
        assert_eq!(path, PathBuf::from("out/kegg/kegg.json"));
    }

    #[test]
    fn unbound_placeholders_stay_verbatim() {
        let path = format_filename(Path::new("."), "run_{missing}.txt", &[]);
        assert_eq!(path, PathBuf::from("./run_{missing}.txt"));
    }
}
