// Department rollup.
//
// Groups every timesheet row (orphans included) by department name. Names
// are opaque keys: no case folding, multi-byte text compared as-is.
use crate::aggregate::{canonical_entry_order, ProjectMetrics};
use crate::config::AnalysisConfig;
use crate::types::TimesheetEntry;
use crate::util::{average, ratio_or_zero};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentSummary {
    pub department: String,
    pub total_hours: f64,
    pub total_labor_cost: f64,
    /// Distinct non-blank project codes referenced, orphans included.
    pub project_count: usize,
    pub entry_count: usize,
    pub average_hours_per_project: f64,
    pub hourly_rate: f64,
    pub cost_per_hour: f64,
    /// Mean efficiency of the known projects this department worked on.
    pub average_efficiency: f64,
    /// Whether the rate came from the configured salary table.
    pub rated: bool,
}

#[derive(Default)]
struct Acc<'a> {
    hours: f64,
    labor_cost: f64,
    entries: usize,
    projects: BTreeSet<&'a str>,
}

/// One summary per department, sorted by department name.
pub fn rollup_departments(
    entries: &[TimesheetEntry],
    projects: &[ProjectMetrics],
    config: &AnalysisConfig,
) -> Vec<DepartmentSummary> {
    let mut sorted: Vec<&TimesheetEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| canonical_entry_order(a, b));

    let mut map: BTreeMap<&str, Acc> = BTreeMap::new();
    for e in sorted {
        let acc = map.entry(e.department.as_str()).or_default();
        acc.hours += e.hours;
        acc.labor_cost += e.labor_cost;
        acc.entries += 1;
        if !e.project_code.is_empty() {
            acc.projects.insert(e.project_code.as_str());
        }
    }

    let efficiency: HashMap<&str, f64> = projects
        .iter()
        .map(|p| (p.code.as_str(), p.efficiency))
        .collect();

    map.into_iter()
        .map(|(department, acc)| {
            let (hourly_rate, rated) = config.hourly_rate(department);
            let project_effs: Vec<f64> = acc
                .projects
                .iter()
                .filter_map(|code| efficiency.get(code).copied())
                .collect();
            let project_count = acc.projects.len();
            debug!(department, hours = acc.hours, projects = project_count, "department rollup");
            DepartmentSummary {
                department: department.to_string(),
                total_hours: acc.hours,
                total_labor_cost: acc.labor_cost,
                project_count,
                entry_count: acc.entries,
                average_hours_per_project: ratio_or_zero(acc.hours, project_count as f64),
                hourly_rate,
                cost_per_hour: ratio_or_zero(acc.labor_cost, acc.hours),
                average_efficiency: average(&project_effs),
                rated,
            }
        })
        .collect()
}
