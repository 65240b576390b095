use grdpost::{GroupingOptions, GroupingReport, TrailingRun, process_file};
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    pub rc: Option<String>,
    pub flush_trailing: bool,
    pub offset_prefix: Option<String>,
}

impl ProcessOptions {
    fn grouping_options(&self) -> GroupingOptions {
        let mut options = GroupingOptions::new();
        if self.flush_trailing {
            options = options.with_trailing(TrailingRun::Flush);
        }
        if let Some(prefix) = &self.offset_prefix {
            options = options.with_offset_prefix(prefix.clone());
        }
        options
    }
}

/// Run the process command: group the command messages of `input` into `output`.
pub fn run_process_command(
    input: String,
    output: String,
    options: ProcessOptions,
) -> Result<GroupingReport, grdpost::Error> {
    let grouping = options.grouping_options();
    let report = process_file(
        input.as_str(),
        options.rc.as_deref(),
        output.as_str(),
        grouping,
    )?;

    for group in &report.groups {
        info!(
            first_id = %group.first_id,
            members = group.offsets.len(),
            "message group"
        );
    }
    if let Some(name) = &report.trailing {
        info!(name = %name, "final command left ungrouped, pass --flush-trailing to group it");
    }
    Ok(report)
}
