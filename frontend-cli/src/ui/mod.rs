//! Plain-text renderers for the terminal frontend.

pub mod command_report;
pub mod process_detail;
