//! The toolbar post-processor and file-level helpers around it.

use std::{io::Read, path::Path};

use tracing::{info, instrument};

use crate::{
    error::Error,
    grouping::{GroupingReport, group_messages},
    identifiers::{IDENTIFIERS_TAG, add_identifiers},
    options::GroupingOptions,
    traits::{Parser, PostProcessor},
    types::{GrdTree, NodeId},
};

/// Position of `<release>` among the root's element children.
const RELEASE_INDEX: usize = 2;
/// Position of the flat `<messages>` among the release's element children.
const MESSAGES_INDEX: usize = 2;

/// Creates one `<messages>` group per `IDS_COMMAND_*` command and declares the
/// `PCI_*` identifiers those groups are offset by.
#[derive(Debug, Clone, Default)]
pub struct ToolbarPostProcessor {
    options: GroupingOptions,
}

impl ToolbarPostProcessor {
    pub fn new(options: GroupingOptions) -> Self {
        Self { options }
    }

    /// Runs the pass in place and reports what the grouping did.
    #[instrument(
        skip(self, rc_text, _rc_path, tree),
        fields(rc_path = %_rc_path, rc_len = rc_text.len())
    )]
    pub fn process_in_place(
        &self,
        rc_text: &str,
        _rc_path: &str,
        tree: &mut GrdTree,
    ) -> Result<GroupingReport, Error> {
        let (release, messages) = locate_messages(tree)?;

        let identifiers = tree.new_element(IDENTIFIERS_TAG);
        tree.append_child(release, identifiers)?;

        let report = group_messages(tree, release, messages, &self.options)?;

        add_identifiers(tree, identifiers)?;
        Ok(report)
    }
}

impl PostProcessor for ToolbarPostProcessor {
    fn process(&self, rc_text: &str, rc_path: &str, mut tree: GrdTree) -> Result<GrdTree, Error> {
        self.process_in_place(rc_text, rc_path, &mut tree)?;
        Ok(tree)
    }
}

/// Finds the release section and its flat message collection.
pub fn locate_messages(tree: &GrdTree) -> Result<(NodeId, NodeId), Error> {
    let release = tree
        .nth_element_child(tree.root(), RELEASE_INDEX)
        .ok_or_else(|| Error::structure_error("root has no release section"))?;
    let messages = tree
        .nth_element_child(release, MESSAGES_INDEX)
        .ok_or_else(|| Error::structure_error("release section has no messages"))?;
    Ok((release, messages))
}

/// Reads RC source text, honoring a UTF-8 or UTF-16 byte order mark.
pub fn read_rc_text<P: AsRef<Path>>(path: P) -> Result<String, Error> {
    let file = std::fs::File::open(path).map_err(Error::Io)?;
    let mut decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
        .bom_override(true)
        .build(file);

    let mut decoded = String::new();
    decoder.read_to_string(&mut decoded).map_err(Error::Io)?;
    Ok(decoded)
}

/// Reads `input`, runs the toolbar post-processor and writes the result to `output`.
///
/// Without an RC file the pass runs with empty source text.
pub fn process_file<P: AsRef<Path>>(
    input: P,
    rc: Option<P>,
    output: P,
    options: GroupingOptions,
) -> Result<GroupingReport, Error> {
    let (rc_text, rc_path) = match rc {
        Some(rc) => (
            read_rc_text(&rc)?,
            rc.as_ref().to_string_lossy().into_owned(),
        ),
        None => (String::new(), String::new()),
    };

    let mut tree = GrdTree::read_from(&input)?;
    let report = ToolbarPostProcessor::new(options).process_in_place(&rc_text, &rc_path, &mut tree)?;
    tree.write_to(&output)?;

    info!(
        output = %output.as_ref().display(),
        groups = report.groups.len(),
        "wrote processed resources"
    );
    Ok(report)
}
