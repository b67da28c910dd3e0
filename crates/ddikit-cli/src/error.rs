use ddikit::chem::smiles::SmilesError;
use ddikit::eval::callback::EvalError;
use ddikit::knowledge::annotate::DatasetError;
use ddikit::knowledge::table::TableError;
use ddikit::utils::persist::PersistError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error("Failed to parse SMILES '{input}': {source}")]
    Smiles {
        input: String,
        #[source]
        source: SmilesError,
    },

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to write '{path}': {source}", path = path.display())]
    FileWriting {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
