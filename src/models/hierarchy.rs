//! Management hierarchy construction.
//!
//! Employees carry a flat `manager_id` pointer. This module turns that list
//! into a forest rooted at every employee without a manager.
//!
//! Each employee is assigned its position in the input list as a stable
//! index, and a manager-id → child-indices adjacency map is built in a single
//! pass. The forest is then produced by one walk over that map, so the cost is
//! O(n) instead of rescanning the remaining pool at every level.
//!
//! Employees whose manager chain never reaches a root (dangling or cyclic
//! references) are not placed anywhere. Use [`unplaced_ids`] to find them.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::Employee;

/// A node of the management forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNode {
    /// Employee identifier
    pub id: String,

    /// Direct reports, in roster order. Omitted when there are none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employees: Option<Vec<HierarchyNode>>,
}

impl HierarchyNode {
    /// Create a node without reports.
    pub fn leaf(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            employees: None,
        }
    }

    /// Create a node with the given reports (stored as `None` when empty).
    pub fn with_reports(id: impl Into<String>, reports: Vec<HierarchyNode>) -> Self {
        Self {
            id: id.into(),
            employees: if reports.is_empty() {
                None
            } else {
                Some(reports)
            },
        }
    }

    /// Direct reports of this node.
    pub fn reports(&self) -> &[HierarchyNode] {
        self.employees.as_deref().unwrap_or_default()
    }

    /// Number of nodes in this subtree, including this one.
    pub fn size(&self) -> usize {
        1 + self.reports().iter().map(HierarchyNode::size).sum::<usize>()
    }
}

/// Build the management forest from a flat employee list.
///
/// Roots are the employees with no `manager_id`, in roster order. Children are
/// attached in roster order, never re-sorted. Each employee is placed at most
/// once; an employee whose manager is never placed is left out of the forest.
pub fn build_hierarchy(employees: &[Employee]) -> Vec<HierarchyNode> {
    let mut reports: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();

    for (index, employee) in employees.iter().enumerate() {
        match employee.manager_id.as_deref() {
            Some(manager_id) => reports.entry(manager_id).or_default().push(index),
            None => roots.push(index),
        }
    }

    let mut placed = vec![false; employees.len()];
    roots
        .into_iter()
        .filter_map(|root| place(root, employees, &reports, &mut placed))
        .collect()
}

/// Place the employee at `index` and, recursively, everyone reporting to it.
///
/// Returns `None` if the employee was already placed.
fn place(
    index: usize,
    employees: &[Employee],
    reports: &HashMap<&str, Vec<usize>>,
    placed: &mut [bool],
) -> Option<HierarchyNode> {
    if placed[index] {
        return None;
    }
    placed[index] = true;

    let id = employees[index].id.as_str();
    let children = reports
        .get(id)
        .map(|children| {
            children
                .iter()
                .filter_map(|&child| place(child, employees, reports, placed))
                .collect()
        })
        .unwrap_or_default();

    Some(HierarchyNode::with_reports(id, children))
}

/// Employee ids that do not appear anywhere in `forest`, in roster order.
pub fn unplaced_ids(employees: &[Employee], forest: &[HierarchyNode]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&HierarchyNode> = forest.iter().collect();
    while let Some(node) = stack.pop() {
        seen.insert(node.id.as_str());
        stack.extend(node.reports());
    }

    employees
        .iter()
        .filter(|e| !seen.contains(e.id.as_str()))
        .map(|e| e.id.clone())
        .collect()
}
