//! All error types for the grdpost crate.
//!
//! These are returned from reading and writing GRD trees and from the post-processing passes.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid resource: {0}")]
    InvalidResource(String),

    #[error("unexpected tree structure: {0}")]
    Structure(String),
}

impl Error {
    /// Creates a new structure error, used when an expected node is missing.
    pub fn structure_error(message: impl Into<String>) -> Self {
        Error::Structure(message.into())
    }
}
