//! Merging of directory and report records that share an identifier.
//!
//! The report feed is the authoritative identifier universe: only ids it
//! carries produce a composite record. Every field the report carries
//! overwrites the directory's, including an explicit `null`. Only a field
//! the report does not carry at all keeps the directory value.

use std::collections::HashMap;

use crate::models::{DirectoryRecord, ReportRecord};

/// A raw record that can be keyed by identifier.
pub trait Keyed {
    /// The record's identifier, if it has a non-empty one.
    fn key(&self) -> Option<&str>;
}

impl Keyed for DirectoryRecord {
    fn key(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

impl Keyed for ReportRecord {
    fn key(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Records keyed by identifier, iterated in first-seen order.
///
/// A repeated identifier keeps its first position but the last record wins.
/// Records without an identifier are skipped.
#[derive(Debug, Clone)]
pub struct KeyedRecords<T> {
    order: Vec<String>,
    by_id: HashMap<String, T>,
}

impl<T: Keyed> KeyedRecords<T> {
    /// Key the given records.
    pub fn new(records: impl IntoIterator<Item = T>) -> Self {
        let mut order = Vec::new();
        let mut by_id = HashMap::new();
        for record in records {
            let Some(id) = record.key().map(str::to_string) else {
                continue;
            };
            if !by_id.contains_key(&id) {
                order.push(id.clone());
            }
            by_id.insert(id, record);
        }
        Self { order, by_id }
    }
}

impl<T> KeyedRecords<T> {
    /// Look up a record by identifier.
    pub fn get(&self, id: &str) -> Option<&T> {
        self.by_id.get(id)
    }

    /// Iterate over `(id, record)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.order
            .iter()
            .filter_map(|id| self.by_id.get(id).map(|record| (id.as_str(), record)))
    }

    /// Number of distinct identifiers.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no record was keyed.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Union of a directory record and a report record for one identifier.
///
/// Holds the attributes the normalizer reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct CompositeRecord {
    pub id: String,
    pub display_name: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub mobile_phone: Option<String>,
    pub home_phone: Option<String>,
    pub work_email: Option<String>,
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub photo_url: Option<String>,
    pub supervisor: Option<String>,
    pub hire_date: Option<String>,
    pub gpa: Option<String>,
}

impl CompositeRecord {
    /// Merge `report` over `directory` (a missing directory record is empty).
    pub fn merge(id: &str, directory: Option<&DirectoryRecord>, report: &ReportRecord) -> Self {
        let empty = DirectoryRecord::default();
        let directory = directory.unwrap_or(&empty);
        let pick = |reported: &Option<Option<String>>, fallback: &Option<String>| match reported {
            Some(value) => value.clone(),
            None => fallback.clone(),
        };

        Self {
            id: id.to_string(),
            display_name: directory.display_name.clone(),
            first_name: pick(&report.first_name, &directory.first_name),
            middle_name: report.middle_name.clone(),
            last_name: pick(&report.last_name, &directory.last_name),
            date_of_birth: report.date_of_birth.clone(),
            mobile_phone: pick(&report.mobile_phone, &directory.mobile_phone),
            home_phone: report.home_phone.clone(),
            work_email: pick(&report.work_email, &directory.work_email),
            job_title: pick(&report.job_title, &directory.job_title),
            department: pick(&report.department, &directory.department),
            location: pick(&report.location, &directory.location),
            photo_url: directory.photo_url.clone(),
            supervisor: pick(&report.manager_reference(), &directory.supervisor),
            hire_date: report.hire_date.clone(),
            gpa: report.gpa.clone(),
        }
    }
}

/// Merge every report-keyed record with its directory counterpart.
///
/// Output follows the report's keyed order. Directory-only ids are dropped.
pub(crate) fn merge_records(
    directory: &KeyedRecords<DirectoryRecord>,
    report: &KeyedRecords<ReportRecord>,
) -> Vec<CompositeRecord> {
    report
        .iter()
        .map(|(id, record)| CompositeRecord::merge(id, directory.get(id), record))
        .collect()
}
