//! Source trait for the upstream employee feeds.

use crate::bamboo::TransportError;
use crate::models::{CustomReport, DirectoryRecord, FieldDescriptor};

/// Trait for producers of the raw feeds the reconciler consumes.
///
/// Implementations must be shareable across threads: the directory fetch runs
/// on a worker while the report pipeline runs on the caller.
pub trait EmployeeSource: Send + Sync {
    /// Fetch every field the remote schema advertises.
    fn fetch_field_list(&self) -> Result<Vec<FieldDescriptor>, TransportError>;

    /// Run a custom report for the given field labels.
    fn fetch_report(&self, fields: &[String]) -> Result<CustomReport, TransportError>;

    /// Fetch the employee directory.
    fn fetch_directory(&self) -> Result<Vec<DirectoryRecord>, TransportError>;
}
