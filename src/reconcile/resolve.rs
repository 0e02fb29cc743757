//! Manager resolution by display name.
//!
//! Resolution reads the normalized roster as an immutable snapshot and
//! returns a new employee list, so no lookup can observe a partially
//! updated manager.

use super::normalize::NormalizedRoster;
use crate::models::Employee;

/// Return the roster with manager links filled in.
///
/// An employee whose manager reference matches a display name gets that
/// employee's id, derived name and job title. Unmatched references leave the
/// manager fields unset.
pub fn resolve_managers(roster: &NormalizedRoster) -> Vec<Employee> {
    roster
        .employees
        .iter()
        .map(|employee| {
            let mut resolved = employee.clone();
            if let Some(manager) = manager_of(roster, &employee.id) {
                resolved.manager_id = Some(manager.id.clone());
                resolved.manager_name = Some(manager.name.clone());
                resolved.manager_title = manager.job_title.clone();
            }
            resolved
        })
        .collect()
}

/// Ids of employees whose manager reference matches no display name.
pub fn unresolved_managers(roster: &NormalizedRoster) -> Vec<String> {
    roster
        .employees
        .iter()
        .filter(|e| roster.manager_ref(&e.id).is_some() && manager_of(roster, &e.id).is_none())
        .map(|e| e.id.clone())
        .collect()
}

fn manager_of<'a>(roster: &'a NormalizedRoster, id: &str) -> Option<&'a Employee> {
    roster
        .manager_ref(id)
        .and_then(|reference| roster.by_display_name(reference))
}
