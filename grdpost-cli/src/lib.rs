//! CLI library for testing purposes

pub mod process;
pub mod view;

pub use process::{ProcessOptions, run_process_command};
pub use view::{GroupView, ReleaseView, build_release_view, print_view};
