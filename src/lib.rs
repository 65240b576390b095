#![forbid(unsafe_code)]
//! Post-processing passes for GRIT resource (`.grd`) trees.
//!
//! The toolbar pass turns the flat `IDS_COMMAND_*` strings produced by an RC
//! to GRD conversion into one `<messages first_id="...">` group per command,
//! addressing each string by a `PCI_*` offset, and declares those offsets in an
//! `<identifiers>` table.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use grdpost::{GrdTree, PostProcessor, ToolbarPostProcessor, traits::Parser};
//!
//! let tree = GrdTree::read_from("toolbar.grd")?;
//! let tree = ToolbarPostProcessor::default().process("", "toolbar.rc", tree)?;
//! tree.write_to("toolbar_grouped.grd")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod formats;
pub mod grouping;
pub mod identifiers;
pub mod options;
pub mod postprocess;
pub mod traits;
pub mod types;

// Re-export most used types for easy consumption
pub use crate::{
    error::Error,
    grouping::{GroupSummary, GroupingReport, group_messages},
    identifiers::{IdentifierDef, TOOLBAR_IDENTIFIERS, add_identifiers},
    options::{GroupingOptions, TrailingRun},
    postprocess::{ToolbarPostProcessor, process_file, read_rc_text},
    traits::{Parser, PostProcessor},
    types::{GrdTree, NodeId, NodeKind},
};
