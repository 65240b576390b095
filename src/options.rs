//! Options controlling the message grouping pass.

use serde::{Deserialize, Serialize};

/// Offset prefix used by the toolbar resources, matching the `PCI_*` identifiers.
pub const DEFAULT_OFFSET_PREFIX: &str = "PCI_";

/// What happens to the last tracked command entry when the message sequence ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailingRun {
    /// Leave the final candidate in the flat sequence and the last opened
    /// group attached as it is. This is what the toolbar build has always produced.
    #[default]
    Leave,
    /// Relocate the final candidate into the open group and close it.
    /// An open group left without members is detached.
    Flush,
}

/// Grouping behavior for [`crate::ToolbarPostProcessor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingOptions {
    /// End-of-sequence behavior.
    pub trailing: TrailingRun,
    /// Prepended to a command suffix to form the `offset` attribute.
    pub offset_prefix: String,
}

impl Default for GroupingOptions {
    fn default() -> Self {
        Self {
            trailing: TrailingRun::default(),
            offset_prefix: DEFAULT_OFFSET_PREFIX.to_string(),
        }
    }
}

impl GroupingOptions {
    /// Creates default grouping options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the end-of-sequence behavior.
    pub fn with_trailing(mut self, trailing: TrailingRun) -> Self {
        self.trailing = trailing;
        self
    }

    /// Sets the offset prefix. An empty prefix writes the bare suffix.
    pub fn with_offset_prefix(mut self, offset_prefix: impl Into<String>) -> Self {
        self.offset_prefix = offset_prefix.into();
        self
    }

    pub(crate) fn offset_for(&self, suffix: &str) -> String {
        format!("{}{}", self.offset_prefix, suffix)
    }
}
