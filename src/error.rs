use crate::{config::ConfigError, export};
use std::io;
use thiserror::Error;

/// Top-level error type, one variant per pipeline stage.
#[derive(Debug, Error)]
pub enum VignetteError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("the diagram is empty: no nodes or relations were found in the input")]
    EmptyDiagram,

    #[error("relation refers to an undeclared node: {0}")]
    UnknownNode(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("export error: {0}")]
    Export(#[from] export::Error),
}
