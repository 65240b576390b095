use grdpost::{GrdTree, NodeId, postprocess::locate_messages};
use serde::Serialize;

/// One `<messages>` group attached to the release after the flat collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupView {
    pub first_id: Option<String>,
    pub offsets: Vec<String>,
}

/// Summary of a release section, before or after post-processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseView {
    pub messages: Vec<String>,
    pub identifiers: Vec<String>,
    pub groups: Vec<GroupView>,
}

pub fn build_release_view(tree: &GrdTree) -> Result<ReleaseView, grdpost::Error> {
    let (release, messages) = locate_messages(tree)?;

    let names = |parent: NodeId| -> Vec<String> {
        tree.element_children(parent)
            .filter_map(|id| tree.attr(id, "name").map(str::to_string))
            .collect()
    };

    let mut view = ReleaseView {
        messages: names(messages),
        identifiers: Vec::new(),
        groups: Vec::new(),
    };

    for child in tree.element_children(release).filter(|&id| id != messages) {
        match tree.tag(child) {
            Some("identifiers") => view.identifiers.extend(names(child)),
            Some("messages") => view.groups.push(GroupView {
                first_id: tree.attr(child, "first_id").map(str::to_string),
                offsets: tree
                    .element_children(child)
                    .filter_map(|id| tree.attr(id, "offset").map(str::to_string))
                    .collect(),
            }),
            _ => {}
        }
    }
    Ok(view)
}

/// Print a release summary as text or JSON.
pub fn print_view(view: &ReleaseView, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
        return Ok(());
    }

    println!("Messages: {}", view.messages.len());
    for name in &view.messages {
        println!("  {}", name);
    }

    println!("\nIdentifiers: {}", view.identifiers.len());
    for name in &view.identifiers {
        println!("  {}", name);
    }

    println!("\nGroups: {}", view.groups.len());
    for (i, group) in view.groups.iter().enumerate() {
        let first_id = group.first_id.as_deref().unwrap_or("(open)");
        println!("\n  Group {}: {}", i + 1, first_id);
        for offset in &group.offsets {
            println!("    {}", offset);
        }
    }
    Ok(())
}
