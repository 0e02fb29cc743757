//! Command implementations for Roster CLI.
//!
//! Each command returns a result that prints as JSON (default) or as
//! human-readable text:
//! - `sync` - Fetch, reconcile, and write the output files
//! - `employees` - Fetch and reconcile, print the roster
//! - `hierarchy` - Print the management forest (live or from a file)
//! - `fields` - Show remote fields and the requested subset
//! - `config show` - Show resolved configuration

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;

use crate::Result;
use crate::config::{Resolved, ResolvedConfig};
use crate::models::{Employee, HierarchyNode, build_hierarchy, unplaced_ids};
use crate::output::{self, OutputPaths};
use crate::reconcile::{
    EmployeeSource, Reconciliation, ReconciliationError, RunClock, Stage, field_labels,
    generate_employees, project_fields,
};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait CommandResult: Serialize {
    /// Serialize to JSON string.
    fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
    }

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// Result of `roster sync`.
#[derive(Debug, Serialize)]
pub struct SyncResult {
    pub employee_count: usize,
    pub root_count: usize,
    pub unresolved_managers: Vec<String>,
    pub unplaced: Vec<String>,
    pub files: OutputPaths,
}

impl CommandResult for SyncResult {
    fn to_human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Reconciled {} employees into {} top-level managers.",
            self.employee_count, self.root_count
        );
        let _ = writeln!(out, "Employee JSON file: {}", self.files.employees.display());
        let _ = writeln!(out, "Hierarchy JSON file: {}", self.files.hierarchy.display());
        push_diagnostics(&mut out, &self.unresolved_managers, &self.unplaced);
        out.trim_end().to_string()
    }
}

/// Result of `roster employees`.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct EmployeesResult {
    pub employees: Vec<Employee>,
}

impl CommandResult for EmployeesResult {
    fn to_human(&self) -> String {
        if self.employees.is_empty() {
            return "No employees.".to_string();
        }

        let mut out = String::new();
        for e in &self.employees {
            let _ = write!(out, "[{}] {}", e.id, e.display_name);
            if let Some(ref title) = e.job_title {
                let _ = write!(out, " - {}", title);
            }
            if let Some(ref department) = e.department {
                let _ = write!(out, " ({})", department);
            }
            if let Some(ref manager) = e.manager_name {
                let _ = write!(out, ", reports to {}", manager);
            }
            out.push('\n');
        }
        let _ = write!(out, "{} employees", self.employees.len());
        out
    }
}

/// Result of `roster hierarchy`.
///
/// JSON output is the forest itself.
#[derive(Debug)]
pub struct HierarchyResult {
    pub hierarchy: Vec<HierarchyNode>,
    pub unplaced: Vec<String>,
    labels: HashMap<String, String>,
}

impl HierarchyResult {
    fn new(employees: &[Employee], hierarchy: Vec<HierarchyNode>, unplaced: Vec<String>) -> Self {
        let labels = employees
            .iter()
            .map(|e| {
                let label = match e.job_title {
                    Some(ref title) => format!("{} ({})", e.display_name, title),
                    None => e.display_name.clone(),
                };
                (e.id.clone(), label)
            })
            .collect();
        Self {
            hierarchy,
            unplaced,
            labels,
        }
    }

    fn label(&self, id: &str) -> String {
        node_label(id, &self.labels)
    }
}

impl Serialize for HierarchyResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.hierarchy.serialize(serializer)
    }
}

impl CommandResult for HierarchyResult {
    fn to_human(&self) -> String {
        if self.hierarchy.is_empty() {
            return "No hierarchy.".to_string();
        }

        let mut out = String::new();
        for root in &self.hierarchy {
            let _ = writeln!(out, "{}", self.label(&root.id));
            render_reports(root.reports(), "", &self.labels, &mut out);
        }
        push_diagnostics(&mut out, &[], &self.unplaced);
        out.trim_end().to_string()
    }
}

fn node_label(id: &str, labels: &HashMap<String, String>) -> String {
    match labels.get(id) {
        Some(label) => format!("{} [{}]", label, id),
        None => format!("[{}]", id),
    }
}

fn render_reports(
    nodes: &[HierarchyNode],
    prefix: &str,
    labels: &HashMap<String, String>,
    out: &mut String,
) {
    for (i, node) in nodes.iter().enumerate() {
        let last = i + 1 == nodes.len();
        let (branch, extension) = if last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        let _ = writeln!(out, "{}{}{}", prefix, branch, node_label(&node.id, labels));
        render_reports(
            node.reports(),
            &format!("{}{}", prefix, extension),
            labels,
            out,
        );
    }
}

fn push_diagnostics(out: &mut String, unresolved: &[String], unplaced: &[String]) {
    if !unresolved.is_empty() {
        let _ = writeln!(
            out,
            "Unresolved manager references ({}): {}",
            unresolved.len(),
            unresolved.join(", ")
        );
    }
    if !unplaced.is_empty() {
        let _ = writeln!(
            out,
            "Left out of hierarchy ({}): {}",
            unplaced.len(),
            unplaced.join(", ")
        );
    }
}

/// Result of `roster fields`.
#[derive(Debug, Serialize)]
pub struct FieldsResult {
    pub available: Vec<String>,
    pub requested: Vec<String>,
}

impl CommandResult for FieldsResult {
    fn to_human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} fields available.", self.available.len());
        let _ = writeln!(out, "Requested ({}):", self.requested.len());
        for field in &self.requested {
            let _ = writeln!(out, "  {}", field);
        }
        out.trim_end().to_string()
    }
}

/// One resolved configuration value for display.
#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub source: String,
}

/// Result of `roster config show`.
#[derive(Debug, Serialize)]
pub struct ConfigShowResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<String>,
    pub settings: Vec<ConfigEntry>,
    pub missing: Vec<String>,
}

impl CommandResult for ConfigShowResult {
    fn to_human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Config file: {}",
            self.config_file.as_deref().unwrap_or("(none)")
        );
        for entry in &self.settings {
            let _ = writeln!(
                out,
                "  {}: {} [{}]",
                entry.key,
                entry.value.as_deref().unwrap_or("(not set)"),
                entry.source
            );
        }
        if !self.missing.is_empty() {
            let _ = writeln!(out, "Missing: {}", self.missing.join(", "));
        }
        out.trim_end().to_string()
    }
}

/// Fetch, reconcile, and write both output files into `output_dir`.
pub fn sync<S: EmployeeSource + ?Sized>(
    source: &S,
    output_dir: &Path,
    clock: &RunClock,
) -> Result<SyncResult> {
    let Reconciliation {
        employees,
        hierarchy,
        unresolved_managers,
        unplaced,
    } = generate_employees(source, clock)?;

    let files = output::write_outputs(output_dir, &employees, &hierarchy)?;
    tracing::info!(
        employees = employees.len(),
        dir = %output_dir.display(),
        "wrote roster and hierarchy"
    );

    Ok(SyncResult {
        employee_count: employees.len(),
        root_count: hierarchy.len(),
        unresolved_managers,
        unplaced,
        files,
    })
}

/// Fetch and reconcile, returning the roster.
pub fn employees<S: EmployeeSource + ?Sized>(
    source: &S,
    clock: &RunClock,
) -> Result<EmployeesResult> {
    let reconciliation = generate_employees(source, clock)?;
    Ok(EmployeesResult {
        employees: reconciliation.employees,
    })
}

/// Fetch and reconcile, returning the hierarchy.
pub fn hierarchy<S: EmployeeSource + ?Sized>(
    source: &S,
    clock: &RunClock,
) -> Result<HierarchyResult> {
    let reconciliation = generate_employees(source, clock)?;
    Ok(HierarchyResult::new(
        &reconciliation.employees,
        reconciliation.hierarchy,
        reconciliation.unplaced,
    ))
}

/// Build the hierarchy from a previously written roster file.
pub fn hierarchy_from_file(path: &Path) -> Result<HierarchyResult> {
    let employees = output::read_employees(path)?;
    let hierarchy = build_hierarchy(&employees);
    let unplaced = unplaced_ids(&employees, &hierarchy);
    Ok(HierarchyResult::new(&employees, hierarchy, unplaced))
}

/// List available field labels and the projected subset.
pub fn fields<S: EmployeeSource + ?Sized>(source: &S) -> Result<FieldsResult> {
    let descriptors = source
        .fetch_field_list()
        .map_err(|source| ReconciliationError::Fetch {
            stage: Stage::AvailableFields,
            source,
        })?;
    let available = field_labels(&descriptors);
    let requested = project_fields(&available);
    Ok(FieldsResult {
        available,
        requested,
    })
}

/// Describe the resolved configuration.
pub fn config_show(config: &ResolvedConfig) -> ConfigShowResult {
    fn entry<T>(key: &str, resolved: Option<&Resolved<T>>, value: Option<String>) -> ConfigEntry {
        ConfigEntry {
            key: key.to_string(),
            value,
            source: resolved
                .map(|r| r.source.to_string())
                .unwrap_or_else(|| "unset".to_string()),
        }
    }

    let settings = vec![
        entry(
            "company-domain",
            config.company_domain.as_ref(),
            config.company_domain().map(str::to_string),
        ),
        entry("api-key", config.api_key.as_ref(), config.masked_api_key()),
        entry(
            "base-url",
            Some(&config.base_url),
            Some(config.base_url.value.clone()),
        ),
        entry(
            "output-dir",
            Some(&config.output_dir),
            Some(config.output_dir().display().to_string()),
        ),
        entry(
            "timeout-secs",
            Some(&config.timeout_secs),
            Some(config.timeout_secs.value.to_string()),
        ),
    ];

    ConfigShowResult {
        config_file: config
            .config_file
            .as_ref()
            .map(|p| p.display().to_string()),
        settings,
        missing: config.missing(),
    }
}
