use crate::cli::AnnotateArgs;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use ddikit::knowledge::annotate::{self, KnowledgeDataset};
use ddikit::knowledge::table::ContributionTable;
use ddikit::progress::ProgressReporter;
use ddikit::utils::persist;
use std::fs::File;
use tracing::info;

pub fn run(args: AnnotateArgs) -> Result<()> {
    if let Some(snapshot) = &args.snapshot {
        if let Some(dataset) = persist::load_state::<KnowledgeDataset>(snapshot) {
            println!("✓ Reusing cached annotation snapshot: {}", snapshot.display());
            write_json(&args, &dataset)?;
            return Ok(());
        }
    }

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Annotating dataset: {}", args.input.display());
    let dataset = match &args.table {
        Some(table_path) => {
            info!(table = %table_path.display(), "Loading external rule table.");
            let table = ContributionTable::from_path(table_path)?;
            let mut dataset = KnowledgeDataset::from_path(&args.input)?;
            dataset.annotate_with_table(&table, args.factor, &reporter)?;
            dataset
        }
        None => annotate::load_crippen_knowledge(&args.input, args.factor, &reporter)?,
    };

    if let Some(snapshot) = &args.snapshot {
        persist::save_state(snapshot, &dataset)?;
    }

    write_json(&args, &dataset)?;
    Ok(())
}

fn write_json(args: &AnnotateArgs, dataset: &KnowledgeDataset) -> Result<()> {
    let file = File::create(&args.output)?;
    serde_json::to_writer_pretty(file, dataset.entries()).map_err(|e| CliError::FileWriting {
        path: args.output.clone(),
        source: e.into(),
    })?;

    println!(
        "✓ Annotated {} molecule(s) written to: {}",
        dataset.len(),
        args.output.display()
    );
    Ok(())
}
