//! Projection of the remote field list onto the fields the reconciler reads.

use crate::models::FieldDescriptor;

/// Field labels the reconciler understands, as requested from the report API.
pub const RELEVANT_FIELDS: [&str; 16] = [
    "id",
    "firstName",
    "middleName",
    "lastName",
    "preferredName",
    "nickname",
    "dateOfBirth",
    "mobilePhone",
    "homePhone",
    "workEmail",
    "jobTitle",
    "department",
    "Reporting To",
    "hireDate",
    "GPA",
    "location",
];

/// Request labels for each descriptor (alias preferred over name).
pub fn field_labels(fields: &[FieldDescriptor]) -> Vec<String> {
    fields.iter().map(|f| f.label().to_string()).collect()
}

/// Keep only the labels in [`RELEVANT_FIELDS`], preserving input order.
pub fn project_fields<S: AsRef<str>>(labels: &[S]) -> Vec<String> {
    labels
        .iter()
        .map(AsRef::as_ref)
        .filter(|label| RELEVANT_FIELDS.contains(label))
        .map(str::to_string)
        .collect()
}
