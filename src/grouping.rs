//! Splits toolbar command strings into offset-addressed message groups.
//!
//! Command strings are named `IDS_COMMAND_<Command>_<Kind>`, e.g.
//! `IDS_COMMAND_Back_BUTTON` or `IDS_COMMAND_Back_TIP_MENU`. Adjacent entries
//! sharing `IDS_COMMAND_<Command>` are moved into one `<messages>` group whose
//! `first_id` is that prefix; each moved entry drops its `name` and gets an
//! `offset` built from its kind.
//!
//! The sweep looks back one entry: an entry is relocated when the entry after
//! it arrives, and that arrival decides whether the group stays open.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{
    error::Error,
    options::{GroupingOptions, TrailingRun},
    types::{GrdTree, NodeId},
};

pub const GROUP_TAG: &str = "messages";

lazy_static! {
    static ref COMMAND_MARKER: Regex = Regex::new(r"IDS_COMMAND_").unwrap();
    static ref COMMAND_PARTS: Regex =
        Regex::new(r"(IDS_COMMAND_[a-zA-Z0-9]+)_([a-zA-Z0-9_]+)").unwrap();
}

/// Whether `name` carries the command marker.
pub fn is_command(name: &str) -> bool {
    COMMAND_MARKER.is_match(name)
}

/// Splits a command name into its group prefix and offset suffix.
///
/// Returns `None` for names that carry the marker but lack a suffix, such as `IDS_COMMAND_Back`.
pub fn split_command(name: &str) -> Option<(&str, &str)> {
    let caps = COMMAND_PARTS.captures(name)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// A group closed during the pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub first_id: String,
    pub offsets: Vec<String>,
}

/// What one grouping pass did to the message sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupingReport {
    /// Closed groups in the order they were closed.
    pub groups: Vec<GroupSummary>,
    /// Number of entries moved out of the flat sequence.
    pub relocated: usize,
    /// Names of command entries left in place because no suffix could be extracted.
    pub skipped: Vec<String>,
    /// Name of the final command entry when it was left in the flat sequence.
    pub trailing: Option<String>,
}

enum RunState {
    /// The previous entry is not a command, or there is none yet.
    Idle,
    /// The previous entry is a command waiting to be relocated.
    Tracking { entry: NodeId, name: String },
}

struct GroupingPass<'a> {
    tree: &'a mut GrdTree,
    release: NodeId,
    messages: NodeId,
    options: &'a GroupingOptions,
    state: RunState,
    open_group: Option<NodeId>,
    open_offsets: Vec<String>,
    report: GroupingReport,
}

/// Runs the grouping pass over the `<message>` children of `messages`,
/// attaching new groups to `release`.
///
/// The first group is attached before any entry is examined, and a fresh one
/// every time a group closes.
#[instrument(skip(tree, options), fields(trailing = ?options.trailing))]
pub fn group_messages(
    tree: &mut GrdTree,
    release: NodeId,
    messages: NodeId,
    options: &GroupingOptions,
) -> Result<GroupingReport, Error> {
    // Snapshot: relocation edits the child list being walked.
    let entries: Vec<NodeId> = tree.element_children(messages).collect();

    let mut pass = GroupingPass {
        tree,
        release,
        messages,
        options,
        state: RunState::Idle,
        open_group: None,
        open_offsets: Vec::new(),
        report: GroupingReport::default(),
    };
    pass.open_group()?;

    for entry in entries {
        let name = pass.tree.attr(entry, "name").unwrap_or_default().to_string();
        pass.step(entry, name)?;
    }
    pass.finish()?;

    info!(
        groups = pass.report.groups.len(),
        relocated = pass.report.relocated,
        skipped = pass.report.skipped.len(),
        "grouped command messages"
    );
    Ok(pass.report)
}

impl GroupingPass<'_> {
    fn step(&mut self, entry: NodeId, name: String) -> Result<(), Error> {
        let state = std::mem::replace(&mut self.state, RunState::Idle);

        if let RunState::Tracking {
            entry: previous,
            name: previous_name,
        } = state
        {
            match split_command(&previous_name) {
                Some((prefix, suffix)) => {
                    self.relocate(previous, &previous_name, suffix)?;
                    let same_run = is_command(&name)
                        && split_command(&name).is_some_and(|(current, _)| current == prefix);
                    if !same_run {
                        self.close_group(prefix)?;
                        self.open_group()?;
                    }
                }
                None => self.skip(&previous_name),
            }
        }

        if is_command(&name) {
            self.state = RunState::Tracking { entry, name };
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Error> {
        let state = std::mem::replace(&mut self.state, RunState::Idle);

        match (self.options.trailing, state) {
            (_, RunState::Idle) => {}
            (TrailingRun::Leave, RunState::Tracking { name, .. }) => {
                debug!(name = %name, "leaving trailing command in place");
                self.report.trailing = Some(name);
            }
            (TrailingRun::Flush, RunState::Tracking { entry, name }) => match split_command(&name) {
                Some((prefix, suffix)) => {
                    self.relocate(entry, &name, suffix)?;
                    self.close_group(prefix)?;
                }
                None => self.skip(&name),
            },
        }

        if self.options.trailing == TrailingRun::Flush && self.open_offsets.is_empty() {
            if let Some(group) = self.open_group.take() {
                self.tree.detach(self.release, group)?;
            }
        }
        Ok(())
    }

    fn relocate(&mut self, entry: NodeId, name: &str, suffix: &str) -> Result<(), Error> {
        let group = self.open_group.ok_or_else(|| {
            Error::InvalidResource(format!("no open message group for {}", name))
        })?;
        let offset = self.options.offset_for(suffix);

        self.tree.detach(self.messages, entry)?;
        self.tree.set_attr(entry, "offset", offset.as_str())?;
        self.tree.remove_attr(entry, "name")?;
        self.tree.append_child(group, entry)?;

        debug!(name, offset = %offset, "relocated command message");
        self.open_offsets.push(offset);
        self.report.relocated += 1;
        Ok(())
    }

    fn skip(&mut self, name: &str) {
        debug!(name, "command name has no suffix, leaving it in place");
        self.report.skipped.push(name.to_string());
    }

    fn close_group(&mut self, first_id: &str) -> Result<(), Error> {
        if let Some(group) = self.open_group.take() {
            self.tree.set_attr(group, "first_id", first_id)?;
            self.report.groups.push(GroupSummary {
                first_id: first_id.to_string(),
                offsets: std::mem::take(&mut self.open_offsets),
            });
        }
        Ok(())
    }

    fn open_group(&mut self) -> Result<(), Error> {
        let group = self.tree.new_element(GROUP_TAG);
        self.tree.append_child(self.release, group)?;
        self.open_group = Some(group);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    struct Fixture {
        tree: GrdTree,
        release: NodeId,
        messages: NodeId,
        entries: Vec<NodeId>,
    }

    fn fixture(names: &[&str]) -> Fixture {
        let mut tree = GrdTree::new("release");
        let release = tree.root();
        let messages = tree.new_element("messages");
        tree.append_child(release, messages).unwrap();
        let entries = names
            .iter()
            .map(|name| {
                let entry = tree.element_with_attrs("message", [("name", *name)]);
                let text = tree.new_text(format!("text of {}", name));
                tree.append_child(entry, text).unwrap();
                tree.append_child(messages, entry).unwrap();
                entry
            })
            .collect();
        Fixture {
            tree,
            release,
            messages,
            entries,
        }
    }

    fn run(fx: &mut Fixture, trailing: TrailingRun) -> GroupingReport {
        let options = GroupingOptions::new().with_trailing(trailing);
        group_messages(&mut fx.tree, fx.release, fx.messages, &options).unwrap()
    }

    fn groups(fx: &Fixture) -> Vec<NodeId> {
        fx.tree.element_children(fx.release).skip(1).collect()
    }

    fn flat_names(fx: &Fixture) -> Vec<&str> {
        fx.tree
            .element_children(fx.messages)
            .filter_map(|id| fx.tree.attr(id, "name"))
            .collect()
    }

    fn offsets(fx: &Fixture, group: NodeId) -> Vec<&str> {
        fx.tree
            .element_children(group)
            .filter_map(|id| fx.tree.attr(id, "offset"))
            .collect()
    }

    #[test]
    fn test_split_command() {
        assert_eq!(
            split_command("IDS_COMMAND_Back_BUTTON"),
            Some(("IDS_COMMAND_Back", "BUTTON"))
        );
        assert_eq!(
            split_command("IDS_COMMAND_Back_TIP_MENU_DISABLED"),
            Some(("IDS_COMMAND_Back", "TIP_MENU_DISABLED"))
        );
        assert_eq!(split_command("IDS_COMMAND_Back"), None);
        assert_eq!(split_command("IDS_COMMAND_Back_"), None);
        assert_eq!(split_command("IDS_HELLO"), None);
        assert!(is_command("IDS_COMMAND_Back"));
        assert!(!is_command("IDS_HELLO"));
    }

    #[test]
    fn test_prefix_change_with_trailing_left_in_place() {
        let mut fx = fixture(&["IDS_COMMAND_Foo_1", "IDS_COMMAND_Foo_2", "IDS_COMMAND_Bar_1"]);
        let report = run(&mut fx, TrailingRun::Leave);

        let groups = groups(&fx);
        assert_eq!(groups.len(), 2);
        assert_eq!(fx.tree.attr(groups[0], "first_id"), Some("IDS_COMMAND_Foo"));
        assert_eq!(offsets(&fx, groups[0]), vec!["PCI_1", "PCI_2"]);

        // The group opened for the Bar run never receives its only member.
        assert_eq!(fx.tree.attr(groups[1], "first_id"), None);
        assert_eq!(fx.tree.children(groups[1]).len(), 0);
        assert_eq!(flat_names(&fx), vec!["IDS_COMMAND_Bar_1"]);

        assert_eq!(report.relocated, 2);
        assert_eq!(report.trailing.as_deref(), Some("IDS_COMMAND_Bar_1"));
        assert_eq!(
            report.groups,
            vec![GroupSummary {
                first_id: "IDS_COMMAND_Foo".to_string(),
                offsets: vec!["PCI_1".to_string(), "PCI_2".to_string()],
            }]
        );
    }

    #[test]
    fn test_prefix_change_with_trailing_flushed() {
        let mut fx = fixture(&["IDS_COMMAND_Foo_1", "IDS_COMMAND_Foo_2", "IDS_COMMAND_Bar_1"]);
        let report = run(&mut fx, TrailingRun::Flush);

        let groups = groups(&fx);
        assert_eq!(groups.len(), 2);
        assert_eq!(fx.tree.attr(groups[0], "first_id"), Some("IDS_COMMAND_Foo"));
        assert_eq!(offsets(&fx, groups[0]), vec!["PCI_1", "PCI_2"]);
        assert_eq!(fx.tree.attr(groups[1], "first_id"), Some("IDS_COMMAND_Bar"));
        assert_eq!(offsets(&fx, groups[1]), vec!["PCI_1"]);
        assert!(flat_names(&fx).is_empty());
        assert_eq!(report.relocated, 3);
        assert_eq!(report.trailing, None);
    }

    #[test]
    fn test_relocated_entries_lose_name_and_keep_payload() {
        let mut fx = fixture(&["IDS_COMMAND_Back_BUTTON", "IDS_COMMAND_Back_TIP", "IDS_OTHER"]);
        run(&mut fx, TrailingRun::Leave);

        let back = fx.entries[0];
        assert_eq!(fx.tree.attr(back, "name"), None);
        assert_eq!(fx.tree.attr(back, "offset"), Some("PCI_BUTTON"));
        assert_eq!(fx.tree.text_content(back), "text of IDS_COMMAND_Back_BUTTON");
        assert_eq!(fx.tree.parent(back), Some(groups(&fx)[0]));
        assert_eq!(fx.tree.parent(fx.entries[2]), Some(fx.messages));
    }

    #[test]
    fn test_non_candidates_are_never_grouped() {
        let mut fx = fixture(&[
            "IDS_HELLO",
            "IDS_COMMAND_Back_BUTTON",
            "IDS_COMMAND_Back_MENU",
            "IDS_WORLD",
            "IDS_AGAIN",
        ]);
        let report = run(&mut fx, TrailingRun::Flush);

        assert_eq!(flat_names(&fx), vec!["IDS_HELLO", "IDS_WORLD", "IDS_AGAIN"]);
        let groups = groups(&fx);
        assert_eq!(groups.len(), 1);
        assert_eq!(offsets(&fx, groups[0]), vec!["PCI_BUTTON", "PCI_MENU"]);
        assert_eq!(report.relocated, 2);
    }

    #[test]
    fn test_non_adjacent_runs_with_same_prefix_are_not_merged() {
        let mut fx = fixture(&[
            "IDS_COMMAND_Back_BUTTON",
            "IDS_SEPARATOR",
            "IDS_COMMAND_Back_MENU",
            "IDS_END",
        ]);
        run(&mut fx, TrailingRun::Leave);

        let groups = groups(&fx);
        assert_eq!(groups.len(), 3);
        assert_eq!(fx.tree.attr(groups[0], "first_id"), Some("IDS_COMMAND_Back"));
        assert_eq!(fx.tree.attr(groups[1], "first_id"), Some("IDS_COMMAND_Back"));
        assert_eq!(offsets(&fx, groups[0]), vec!["PCI_BUTTON"]);
        assert_eq!(offsets(&fx, groups[1]), vec!["PCI_MENU"]);
        assert!(fx.tree.children(groups[2]).is_empty());
    }

    #[test]
    fn test_singleton_between_non_candidates_is_grouped() {
        let mut fx = fixture(&["IDS_A", "IDS_COMMAND_Stop_BUTTON", "IDS_B"]);
        let report = run(&mut fx, TrailingRun::Leave);

        let groups = groups(&fx);
        assert_eq!(fx.tree.attr(groups[0], "first_id"), Some("IDS_COMMAND_Stop"));
        assert_eq!(offsets(&fx, groups[0]), vec!["PCI_BUTTON"]);
        assert_eq!(report.trailing, None);
    }

    #[test]
    fn test_singleton_trailing_candidate_depends_on_policy() {
        let mut left = fixture(&["IDS_A", "IDS_COMMAND_Stop_BUTTON"]);
        let report = run(&mut left, TrailingRun::Leave);
        assert_eq!(flat_names(&left), vec!["IDS_A", "IDS_COMMAND_Stop_BUTTON"]);
        assert_eq!(report.relocated, 0);
        assert_eq!(groups(&left).len(), 1);

        let mut flushed = fixture(&["IDS_A", "IDS_COMMAND_Stop_BUTTON"]);
        let report = run(&mut flushed, TrailingRun::Flush);
        assert_eq!(flat_names(&flushed), vec!["IDS_A"]);
        assert_eq!(report.relocated, 1);
        let groups = groups(&flushed);
        assert_eq!(groups.len(), 1);
        assert_eq!(
            flushed.tree.attr(groups[0], "first_id"),
            Some("IDS_COMMAND_Stop")
        );
    }

    #[test]
    fn test_candidate_without_suffix_is_skipped_and_closes_run() {
        let mut fx = fixture(&[
            "IDS_COMMAND_Back_BUTTON",
            "IDS_COMMAND_Back",
            "IDS_COMMAND_Fwd_BUTTON",
            "IDS_COMMAND_Fwd_MENU",
            "IDS_END",
        ]);
        let report = run(&mut fx, TrailingRun::Leave);

        assert_eq!(report.skipped, vec!["IDS_COMMAND_Back".to_string()]);
        assert_eq!(flat_names(&fx), vec!["IDS_COMMAND_Back", "IDS_END"]);
        let groups = groups(&fx);
        assert_eq!(groups.len(), 3);
        assert_eq!(offsets(&fx, groups[0]), vec!["PCI_BUTTON"]);
        assert_eq!(fx.tree.attr(groups[1], "first_id"), Some("IDS_COMMAND_Fwd"));
        assert_eq!(offsets(&fx, groups[1]), vec!["PCI_BUTTON", "PCI_MENU"]);
    }

    #[test]
    fn test_flush_skips_trailing_candidate_without_suffix() {
        let mut fx = fixture(&["IDS_A", "IDS_COMMAND_Back"]);
        let report = run(&mut fx, TrailingRun::Flush);

        assert_eq!(report.skipped, vec!["IDS_COMMAND_Back".to_string()]);
        assert_eq!(report.relocated, 0);
        assert_eq!(report.trailing, None);
        assert!(report.groups.is_empty());
        assert_eq!(flat_names(&fx), vec!["IDS_A", "IDS_COMMAND_Back"]);
        assert!(groups(&fx).is_empty());
        assert!(
            fx.tree
                .element_children(fx.release)
                .all(|id| fx.tree.attr(id, "first_id").is_none())
        );
    }

    #[test]
    fn test_flush_drops_empty_open_group() {
        let mut fx = fixture(&["IDS_COMMAND_Back_BUTTON", "IDS_END"]);
        run(&mut fx, TrailingRun::Flush);
        assert_eq!(groups(&fx).len(), 1);

        let mut fx = fixture(&["IDS_COMMAND_Back_BUTTON", "IDS_END"]);
        run(&mut fx, TrailingRun::Leave);
        assert_eq!(groups(&fx).len(), 2);
    }

    #[test]
    fn test_empty_sequence_leaves_one_group() {
        let mut fx = fixture(&[]);
        let report = run(&mut fx, TrailingRun::Leave);
        assert_eq!(groups(&fx).len(), 1);
        assert_eq!(report, GroupingReport::default());
    }

    #[test]
    fn test_duplicate_names_are_removed_by_handle() {
        let mut fx = fixture(&[
            "IDS_COMMAND_Back_BUTTON",
            "IDS_COMMAND_Back_BUTTON",
            "IDS_END",
        ]);
        run(&mut fx, TrailingRun::Leave);

        let groups = groups(&fx);
        assert_eq!(fx.tree.parent(fx.entries[0]), Some(groups[0]));
        assert_eq!(fx.tree.parent(fx.entries[1]), Some(groups[0]));
        assert_eq!(flat_names(&fx), vec!["IDS_END"]);
    }

    #[test]
    fn test_bare_suffix_offsets() {
        let mut fx = fixture(&["IDS_COMMAND_Foo_1", "IDS_COMMAND_Foo_2", "IDS_END"]);
        let options = GroupingOptions::new().with_offset_prefix("");
        group_messages(&mut fx.tree, fx.release, fx.messages, &options).unwrap();
        assert_eq!(offsets(&fx, groups(&fx)[0]), vec!["1", "2"]);
    }

    #[test]
    #[traced_test]
    fn test_logs_relocations() {
        let mut fx = fixture(&["IDS_COMMAND_Foo_1", "IDS_END"]);
        run(&mut fx, TrailingRun::Leave);
        assert!(logs_contain("relocated command message"));
        assert!(logs_contain("grouped command messages"));
    }
}
