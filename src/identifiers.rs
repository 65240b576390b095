//! Fixed identifiers the toolbar header generator expects in `<identifiers>`.
//!
//! `IDS_COMMAND_gcFirst` is the base of the command id range and
//! `IDS_COMMAND_PCI_SPACE` the stride between commands. The `PCI_*` values are
//! the per-command offsets written into grouped messages.

use crate::{
    error::Error,
    types::{GrdTree, NodeId},
};

pub const IDENTIFIERS_TAG: &str = "identifiers";
pub const IDENTIFIER_TAG: &str = "identifier";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierDef {
    pub name: &'static str,
    pub id: u32,
    pub comment: &'static str,
}

const fn def(name: &'static str, id: u32) -> IdentifierDef {
    IdentifierDef {
        name,
        id,
        comment: "",
    }
}

pub static TOOLBAR_IDENTIFIERS: &[IdentifierDef] = &[
    def("IDS_COMMAND_gcFirst", 12000),
    def("IDS_COMMAND_PCI_SPACE", 16),
    def("PCI_BUTTON", 0),
    def("PCI_MENU", 1),
    def("PCI_TIP", 2),
    def("PCI_OPTIONS_TEXT", 3),
    def("PCI_TIP_DISABLED", 4),
    def("PCI_TIP_MENU", 5),
    def("PCI_TIP_MENU_DISABLED", 6),
    def("PCI_TIP_OPTIONS", 7),
    def("PCI_TIP_OPTIONS_DISABLED", 8),
    def("PCI_TIP_DISABLED_BY_POLICY", 9),
];

/// Creates a detached `<identifier>` element for `def`. Empty comments are omitted.
pub fn identifier_node(tree: &mut GrdTree, def: &IdentifierDef) -> NodeId {
    let mut attrs = vec![("name", def.name.to_string()), ("id", def.id.to_string())];
    if !def.comment.is_empty() {
        attrs.push(("comment", def.comment.to_string()));
    }
    tree.element_with_attrs(IDENTIFIER_TAG, attrs)
}

/// Appends every entry of [`TOOLBAR_IDENTIFIERS`] to `identifiers`, in order.
pub fn add_identifiers(tree: &mut GrdTree, identifiers: NodeId) -> Result<(), Error> {
    for def in TOOLBAR_IDENTIFIERS {
        let node = identifier_node(tree, def);
        tree.append_child(identifiers, node)?;
    }
    Ok(())
}
