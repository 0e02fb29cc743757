//! Data models for Roster entities.
//!
//! This module defines the core data structures:
//! - `FieldDescriptor` - A field advertised by the remote schema
//! - `DirectoryRecord` - Raw employee profile from the directory feed
//! - `ReportRecord` - Raw employee row from the custom report feed
//! - `CustomReport` - A custom report response (field labels + rows)
//! - `Employee` - The canonical, reconciled employee
//! - `HierarchyNode` - A node of the management forest

pub mod hierarchy;

pub use hierarchy::{HierarchyNode, build_hierarchy, unplaced_ids};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A JSON scalar that upstream sends either quoted or bare.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Number(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

/// Deserialize an optional scalar (string, number or bool) as a string.
///
/// BambooHR is inconsistent about quoting identifiers and numeric custom
/// fields, so `"42"` and `42` both become `Some("42")`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_string))
}

/// A field advertised by the `meta/fields` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Remote field id (numeric for built-in fields, string for custom ones)
    #[serde(default, deserialize_with = "lenient_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Human-facing field name (e.g. "Reporting To")
    #[serde(default)]
    pub name: String,

    /// API alias (e.g. "firstName"), preferred over `name` when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl FieldDescriptor {
    /// Create a descriptor with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            alias: None,
        }
    }

    /// Create a descriptor with a name and an alias.
    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            alias: Some(alias.into()),
        }
    }

    /// The label used to request this field: alias if present, else name.
    pub fn label(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// Employee profile from the directory feed.
///
/// Every attribute is optional; the directory makes no completeness promise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub preferred_name: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub work_phone: Option<String>,
    #[serde(default)]
    pub work_phone_extension: Option<String>,
    #[serde(default)]
    pub mobile_phone: Option<String>,
    #[serde(default)]
    pub work_email: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub division: Option<String>,
    #[serde(default)]
    pub linked_in: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub pronouns: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub supervisor: Option<String>,
}

/// Employee row from the custom report feed.
///
/// Only the fields that were requested and that the remote schema exposes
/// are populated. Fields the directory also carries are double options:
/// `None` when the key is absent, `Some(None)` when the report sent `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<Option<String>>,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<Option<String>>,
    #[serde(default)]
    pub preferred_name: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub mobile_phone: Option<Option<String>>,
    #[serde(default)]
    pub home_phone: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub work_email: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub job_title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub department: Option<Option<String>>,
    /// Free-text manager reference (the manager's display name)
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub supervisor: Option<Option<String>>,
    /// Same reference under the report's field name
    #[serde(
        default,
        rename = "Reporting To",
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub reporting_to: Option<Option<String>>,
    #[serde(default)]
    pub hire_date: Option<String>,
    #[serde(default, rename = "GPA", deserialize_with = "lenient_string")]
    pub gpa: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub location: Option<Option<String>>,
}

impl ReportRecord {
    /// The manager reference: `supervisor`, else `Reporting To`.
    ///
    /// A non-null value under either key wins; `Some(None)` means the report
    /// carried the key but sent `null`.
    pub fn manager_reference(&self) -> Option<Option<String>> {
        match (&self.supervisor, &self.reporting_to) {
            (Some(Some(name)), _) | (_, Some(Some(name))) => Some(Some(name.clone())),
            (supervisor, reporting_to) => supervisor.clone().or_else(|| reporting_to.clone()),
        }
    }
}

/// Deserialize a value whose key was present, keeping an explicit `null`.
///
/// Paired with `#[serde(default)]`: a missing key stays `None`, `null`
/// becomes `Some(None)`.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// A column entry of a custom report response: a bare label or a descriptor.
#[derive(Deserialize)]
#[serde(untagged)]
enum ReportColumn {
    Label(String),
    Descriptor(FieldDescriptor),
}

fn column_labels<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let columns = Option::<Vec<ReportColumn>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(columns
        .into_iter()
        .map(|column| match column {
            ReportColumn::Label(label) => label,
            ReportColumn::Descriptor(field) => match field.id {
                Some(id) if field.alias.is_none() => id,
                _ => field.label().to_string(),
            },
        })
        .collect())
}

/// A custom report: the fields it contains and one row per employee.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CustomReport {
    /// Field labels present in the report
    #[serde(default, deserialize_with = "column_labels")]
    pub fields: Vec<String>,

    /// Report rows
    #[serde(default)]
    pub employees: Vec<ReportRecord>,
}

/// A reconciled employee.
///
/// Unset optional attributes are omitted from the serialized form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier from the report feed
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    /// Derived full name
    #[serde(default)]
    pub name: String,

    /// Directory display name, or "First Last" when the directory has none
    #[serde(default)]
    pub display_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,

    /// Mobile phone, falling back to home phone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_phone_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    /// Set only when the manager reference resolves to a known employee
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,

    /// Whole years since `start_date`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenure: Option<i64>,

    /// Next occurrence of the start date's month/day (today or later)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_anniversary: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpa: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}
