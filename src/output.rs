//! JSON file output for reconciled data.
//!
//! Files are written to a temporary file in the target directory and then
//! persisted over the destination, so readers never see a partial file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::models::{Employee, HierarchyNode};
use crate::{Error, Result};

/// File name of the written roster.
pub const EMPLOYEES_FILE: &str = "employees.json";

/// File name of the written hierarchy.
pub const HIERARCHY_FILE: &str = "hierarchy.json";

/// Paths of the files written by [`write_outputs`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputPaths {
    pub employees: PathBuf,
    pub hierarchy: PathBuf,
}

/// Write `value` as pretty-printed JSON to `path`, atomically.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut file = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut file, value)?;
    file.write_all(b"\n")?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::debug!(path = %path.display(), "wrote JSON file");
    Ok(())
}

/// Write the roster, then the hierarchy, into `dir`.
///
/// The hierarchy is not written if the roster fails.
pub fn write_outputs(
    dir: &Path,
    employees: &[Employee],
    hierarchy: &[HierarchyNode],
) -> Result<OutputPaths> {
    let paths = OutputPaths {
        employees: dir.join(EMPLOYEES_FILE),
        hierarchy: dir.join(HIERARCHY_FILE),
    };

    write_json(&paths.employees, employees)?;
    write_json(&paths.hierarchy, hierarchy)?;
    Ok(paths)
}

/// Read a roster previously written by [`write_outputs`].
pub fn read_employees(path: &Path) -> Result<Vec<Employee>> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
