//! Normalization of composite records into canonical employees.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use super::merge::CompositeRecord;
use crate::models::Employee;

/// Milliseconds in a 365.25-day year.
const MILLIS_PER_YEAR: f64 = 1000.0 * 60.0 * 60.0 * 24.0 * 365.25;

/// Middle-name placeholder BambooHR sends for "no middle name".
pub const NO_MIDDLE_NAME: &str = "null";

/// The instant a run is evaluated at.
///
/// Captured once per run so every derived date uses the same "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunClock {
    now: DateTime<Utc>,
}

impl RunClock {
    /// Capture the current time.
    pub fn now() -> Self {
        Self { now: Utc::now() }
    }

    /// A clock fixed at the given instant.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// The run instant.
    pub fn instant(&self) -> DateTime<Utc> {
        self.now
    }

    /// The run's calendar year.
    pub fn year(&self) -> i32 {
        self.now.year()
    }
}

/// Output of the normalization pass.
///
/// The two indexes are read-only inputs to manager resolution.
#[derive(Debug, Clone, Default)]
pub struct NormalizedRoster {
    /// Employees in report order, without manager links
    pub employees: Vec<Employee>,

    /// Display name to position in `employees` (last inserted wins)
    pub by_display_name: HashMap<String, usize>,

    /// Employee id to raw manager reference text (non-empty only)
    pub manager_refs: HashMap<String, String>,
}

impl NormalizedRoster {
    /// The employee registered under `display_name`, if any.
    pub fn by_display_name(&self, display_name: &str) -> Option<&Employee> {
        self.by_display_name
            .get(display_name)
            .and_then(|&index| self.employees.get(index))
    }

    /// The raw manager reference recorded for `id`, if any.
    pub fn manager_ref(&self, id: &str) -> Option<&str> {
        self.manager_refs.get(id).map(String::as_str)
    }
}

/// Normalize composite records into employees and build the lookup indexes.
pub(crate) fn normalize(records: Vec<CompositeRecord>, clock: &RunClock) -> NormalizedRoster {
    let mut roster = NormalizedRoster {
        employees: Vec::with_capacity(records.len()),
        ..Default::default()
    };

    for record in records {
        let employee = to_employee(&record, clock);

        roster
            .by_display_name
            .insert(employee.display_name.clone(), roster.employees.len());
        if let Some(supervisor) = record.supervisor.filter(|s| !s.is_empty()) {
            roster.manager_refs.insert(employee.id.clone(), supervisor);
        }
        roster.employees.push(employee);
    }

    roster
}

fn to_employee(record: &CompositeRecord, clock: &RunClock) -> Employee {
    let start_date = record.hire_date.as_deref().and_then(parse_date);
    let first = record.first_name.as_deref().unwrap_or_default();
    let last = record.last_name.as_deref().unwrap_or_default();

    Employee {
        id: record.id.clone(),
        first_name: record.first_name.clone(),
        last_name: record.last_name.clone(),
        name: full_name(first, record.middle_name.as_deref(), last),
        display_name: record
            .display_name
            .clone()
            .unwrap_or_else(|| format!("{} {}", first, last)),
        date_of_birth: record.date_of_birth.as_deref().and_then(parse_date),
        avatar_url: record.photo_url.clone(),
        personal_phone_number: record
            .mobile_phone
            .clone()
            .or_else(|| record.home_phone.clone()),
        work_email: record.work_email.clone(),
        job_title: record.job_title.clone(),
        department: record.department.clone(),
        manager_id: None,
        manager_name: None,
        manager_title: None,
        start_date,
        tenure: start_date.map(|start| tenure(start, clock)),
        work_anniversary: start_date.and_then(|start| work_anniversary(start, clock)),
        gpa: record.gpa.clone(),
        location: record.location.clone(),
    }
}

/// Derived full name, "First Last".
///
/// Known defect: the middle-name check is inverted. Only the `"null"`
/// placeholder is ever inserted; a real middle name is dropped. Kept as-is
/// until the intended behavior is confirmed.
pub fn full_name(first: &str, middle: Option<&str>, last: &str) -> String {
    match middle {
        Some(middle) if middle == NO_MIDDLE_NAME => format!("{} {} {}", first, middle, last),
        _ => format!("{} {}", first, last),
    }
}

/// Parse an upstream date: `YYYY-MM-DD` (UTC midnight) or RFC 3339.
///
/// Returns `None` for empty or unparseable values such as `0000-00-00`.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            tracing::debug!(value, error = %e, "ignoring unparseable date");
            None
        }
    }
}

/// Whole years elapsed since `start`, using a 365.25-day year.
pub fn tenure(start: DateTime<Utc>, clock: &RunClock) -> i64 {
    let elapsed = (clock.instant() - start).num_milliseconds() as f64;
    (elapsed / MILLIS_PER_YEAR).floor() as i64
}

/// The next occurrence of `start`'s month and day that is not before now.
///
/// Returns `None` only if the date cannot be represented in the target year.
pub fn work_anniversary(start: DateTime<Utc>, clock: &RunClock) -> Option<DateTime<Utc>> {
    let this_year = in_year(start, clock.year())?;
    if this_year < clock.instant() {
        in_year(start, clock.year() + 1)
    } else {
        Some(this_year)
    }
}

/// Move `moment` to `year`, keeping month, day and time of day.
///
/// Feb 29 rolls over to Mar 1 in years without it.
fn in_year(moment: DateTime<Utc>, year: i32) -> Option<DateTime<Utc>> {
    let date = NaiveDate::from_ymd_opt(year, moment.month(), moment.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))?;
    Some(date.and_time(moment.time()).and_utc())
}
