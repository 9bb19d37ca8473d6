//! Application layer - use cases and orchestration.
//!
//! Pagination, history and catalog retrieval, day-bucket archiving,
//! conversation selection, and the export run that ties them together.

pub mod archiver;
pub mod catalog;
pub mod exporter;
pub mod formatter;
pub mod history;
pub mod pagination;
pub mod resolver;

#[cfg(test)]
mod test_support;

pub use exporter::{ExportOptions, Exporter};
pub use formatter::{format_selection, format_summary};
pub use resolver::SelectionRequest;
