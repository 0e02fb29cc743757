//! Record reconciliation and hierarchy construction.
//!
//! The pipeline, leaf-first:
//! - `fields` - project the remote field list onto the fields we read
//! - `merge` - union directory and report records by id (report wins)
//! - `normalize` - derive names, dates, tenure and anniversary
//! - `resolve` - link each employee to a manager by display name
//! - [`build_hierarchy`] - turn manager links into a forest
//!
//! Fetching happens first and completely: the directory is fetched on a
//! worker thread while the field list and report are fetched in sequence on
//! the caller's thread. Reconciliation only starts once both have succeeded.

pub mod fields;
pub mod merge;
pub mod normalize;
pub mod resolve;
pub mod source;

pub use fields::{RELEVANT_FIELDS, field_labels, project_fields};
pub use merge::{Keyed, KeyedRecords};
pub use normalize::{NormalizedRoster, RunClock};
pub use resolve::{resolve_managers, unresolved_managers};
pub use source::EmployeeSource;

use std::fmt;
use std::thread;

use thiserror::Error;

use crate::bamboo::TransportError;
use crate::models::{
    CustomReport, DirectoryRecord, Employee, HierarchyNode, ReportRecord, build_hierarchy,
    unplaced_ids,
};

/// A fetch stage of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    EmployeeDirectory,
    AvailableFields,
    CustomReport,
}

impl Stage {
    /// Human-facing label used in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::EmployeeDirectory => "employee directory",
            Stage::AvailableFields => "available fields",
            Stage::CustomReport => "custom report",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A fetch stage failed; the whole run is aborted.
#[derive(Debug, Error)]
pub enum ReconciliationError {
    #[error("Failed to fetch {stage}: {source}")]
    Fetch {
        stage: Stage,
        #[source]
        source: TransportError,
    },

    #[error("Failed to fetch {0}: worker thread panicked")]
    Panicked(Stage),
}

impl ReconciliationError {
    fn fetch(stage: Stage) -> impl FnOnce(TransportError) -> Self {
        move |source| ReconciliationError::Fetch { stage, source }
    }

    /// The stage that failed.
    pub fn stage(&self) -> Stage {
        match self {
            ReconciliationError::Fetch { stage, .. } => *stage,
            ReconciliationError::Panicked(stage) => *stage,
        }
    }
}

/// The result of a full run.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// The reconciled roster, in report order
    pub employees: Vec<Employee>,

    /// Management forest roots, in first-encountered order
    pub hierarchy: Vec<HierarchyNode>,

    /// Employees whose manager reference matched no display name
    pub unresolved_managers: Vec<String>,

    /// Employees left out of the hierarchy (dangling or cyclic chains)
    pub unplaced: Vec<String>,
}

/// Reconcile already-fetched feeds into a roster and hierarchy.
pub fn reconcile(
    directory: Vec<DirectoryRecord>,
    report: Vec<ReportRecord>,
    clock: &RunClock,
) -> Reconciliation {
    let directory = KeyedRecords::new(directory);
    let report = KeyedRecords::new(report);
    tracing::debug!(
        directory = directory.len(),
        report = report.len(),
        "keyed feed records"
    );

    let composites = merge::merge_records(&directory, &report);
    let roster = normalize::normalize(composites, clock);
    let unresolved = unresolved_managers(&roster);
    let employees = resolve_managers(&roster);
    let hierarchy = build_hierarchy(&employees);
    let unplaced = unplaced_ids(&employees, &hierarchy);

    if !unresolved.is_empty() {
        tracing::warn!(
            count = unresolved.len(),
            ids = ?unresolved,
            "manager references did not match any display name"
        );
    }
    if !unplaced.is_empty() {
        tracing::warn!(
            count = unplaced.len(),
            ids = ?unplaced,
            "employees left out of the hierarchy"
        );
    }
    tracing::debug!(
        employees = employees.len(),
        roots = hierarchy.len(),
        "reconciled roster"
    );

    Reconciliation {
        employees,
        hierarchy,
        unresolved_managers: unresolved,
        unplaced,
    }
}

/// Fetch the field list, project it, and run the custom report.
pub fn fetch_report<S: EmployeeSource + ?Sized>(
    source: &S,
) -> Result<CustomReport, ReconciliationError> {
    let fields = source
        .fetch_field_list()
        .map_err(ReconciliationError::fetch(Stage::AvailableFields))?;
    let projected = project_fields(&field_labels(&fields));
    tracing::debug!(
        available = fields.len(),
        requested = projected.len(),
        "projected report fields"
    );

    source
        .fetch_report(&projected)
        .map_err(ReconciliationError::fetch(Stage::CustomReport))
}

/// Fetch the directory and the report concurrently.
///
/// If both pipelines fail, the report pipeline's error is returned.
pub fn fetch_feeds<S: EmployeeSource + ?Sized>(
    source: &S,
) -> Result<(Vec<DirectoryRecord>, CustomReport), ReconciliationError> {
    thread::scope(|scope| {
        let directory = scope.spawn(|| source.fetch_directory());
        let report = fetch_report(source);
        let directory = directory.join();

        let report = report?;
        let directory = directory
            .map_err(|_| ReconciliationError::Panicked(Stage::EmployeeDirectory))?
            .map_err(ReconciliationError::fetch(Stage::EmployeeDirectory))?;
        tracing::debug!(
            directory = directory.len(),
            report = report.employees.len(),
            "fetched feeds"
        );
        Ok((directory, report))
    })
}

/// Fetch both feeds and reconcile them.
pub fn generate_employees<S: EmployeeSource + ?Sized>(
    source: &S,
    clock: &RunClock,
) -> Result<Reconciliation, ReconciliationError> {
    let (directory, report) = fetch_feeds(source)?;
    Ok(reconcile(directory, report.employees, clock))
}
