//! Per-project financial metrics.
//!
//! Timesheet rows are joined to project records through an explicit partial
//! join ([`partition_entries`]) so that orphan rows are a visible partition,
//! not a silent dictionary miss. Each project then gets revenue, purchase and
//! labor cost, profit, margin and an efficiency score.
//!
//! Two degenerate cases have fixed answers:
//! - revenue of zero with a positive total cost yields [`SENTINEL_MARGIN_PCT`]
//!   (revenue and cost both zero yields a margin of 0);
//! - zero recorded hours yields an efficiency of 0, and that 0 takes part in
//!   every efficiency statistic.

use crate::normalize::DataQualityReport;
use crate::types::{ProjectRecord, ProjectStatus, ProjectType, TimesheetEntry};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{info, warn};

/// Margin reported for a project with cost but no revenue, in percent.
pub const SENTINEL_MARGIN_PCT: f64 = -200.0;

/// Result of the partial join between timesheet rows and project records.
#[derive(Debug, Clone, Default)]
pub struct JoinPartition {
    /// Project code -> its entries, in canonical order.
    pub matched: BTreeMap<String, Vec<TimesheetEntry>>,
    /// Entries whose code matches no project (including blank codes).
    pub unmatched: Vec<TimesheetEntry>,
}

impl JoinPartition {
    pub fn unmatched_hours(&self) -> f64 {
        self.unmatched.iter().map(|e| e.hours).sum()
    }

    pub fn matched_entry_count(&self) -> usize {
        self.matched.values().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectMetrics {
    pub code: String,
    pub name: String,
    pub project_type: ProjectType,
    pub status: ProjectStatus,
    pub revenue: f64,
    pub purchase_cost: f64,
    pub labor_cost: f64,
    pub total_cost: f64,
    pub total_hours: f64,
    pub profit: f64,
    pub margin_pct: f64,
    pub efficiency: f64,
    pub entry_count: usize,
    /// Departments that logged hours on this project, sorted.
    pub departments: Vec<String>,
}

/// Canonical entry order: code, department, hours. Sums taken in this order
/// come out bit-identical however the input rows were shuffled.
pub fn canonical_entry_order(a: &TimesheetEntry, b: &TimesheetEntry) -> Ordering {
    a.project_code
        .cmp(&b.project_code)
        .then_with(|| a.department.cmp(&b.department))
        .then_with(|| a.hours.total_cmp(&b.hours))
        .then_with(|| a.labor_cost.total_cmp(&b.labor_cost))
}

pub fn partition_entries(projects: &[ProjectRecord], entries: &[TimesheetEntry]) -> JoinPartition {
    let known: HashSet<&str> = projects.iter().map(|p| p.code.as_str()).collect();
    let mut sorted: Vec<TimesheetEntry> = entries.to_vec();
    sorted.sort_by(canonical_entry_order);

    let mut partition = JoinPartition::default();
    for entry in sorted {
        if known.contains(entry.project_code.as_str()) {
            partition
                .matched
                .entry(entry.project_code.clone())
                .or_default()
                .push(entry);
        } else {
            partition.unmatched.push(entry);
        }
    }
    partition
}

/// Profit over revenue as a percentage. With no revenue, a positive total
/// cost gives [`SENTINEL_MARGIN_PCT`]; zero or negative cost (refunds) gives 0.
pub fn profit_margin_pct(revenue: f64, total_cost: f64, profit: f64) -> f64 {
    if revenue != 0.0 {
        profit / revenue * 100.0
    } else if total_cost > 0.0 {
        SENTINEL_MARGIN_PCT
    } else {
        0.0
    }
}

pub fn efficiency_score(profit: f64, total_hours: f64) -> f64 {
    if total_hours > 0.0 {
        profit / total_hours
    } else {
        0.0
    }
}

pub fn aggregate_projects(
    projects: &[ProjectRecord],
    partition: &JoinPartition,
    quality: &mut DataQualityReport,
) -> Vec<ProjectMetrics> {
    let mut sorted: Vec<&ProjectRecord> = projects.iter().collect();
    sorted.sort_by(|a, b| a.code.cmp(&b.code));

    let no_entries: &[TimesheetEntry] = &[];
    let metrics: Vec<ProjectMetrics> = sorted
        .into_iter()
        .map(|p| {
            let entries = partition
                .matched
                .get(&p.code)
                .map(Vec::as_slice)
                .unwrap_or(no_entries);
            let total_hours: f64 = entries.iter().map(|e| e.hours).sum();
            let labor_cost: f64 = entries.iter().map(|e| e.labor_cost).sum();
            let departments: BTreeSet<&str> =
                entries.iter().map(|e| e.department.as_str()).collect();

            if total_hours <= 0.0 {
                quality.projects_without_hours += 1;
            }

            let total_cost = p.cost + labor_cost;
            let profit = p.revenue - total_cost;
            ProjectMetrics {
                code: p.code.clone(),
                name: p.name.clone(),
                project_type: p.project_type,
                status: p.status,
                revenue: p.revenue,
                purchase_cost: p.cost,
                labor_cost,
                total_cost,
                total_hours,
                profit,
                margin_pct: profit_margin_pct(p.revenue, total_cost, profit),
                efficiency: efficiency_score(profit, total_hours),
                entry_count: entries.len(),
                departments: departments.into_iter().map(str::to_string).collect(),
            }
        })
        .collect();

    quality.orphan_entries = partition.unmatched.len();
    quality.orphan_hours = partition.unmatched_hours();
    if quality.orphan_entries > 0 {
        warn!(
            entries = quality.orphan_entries,
            hours = quality.orphan_hours,
            "timesheet rows reference unknown projects"
        );
    }
    info!(
        projects = metrics.len(),
        matched_entries = partition.matched_entry_count(),
        without_hours = quality.projects_without_hours,
        "aggregated project metrics"
    );
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn project(code: &str, revenue: f64, cost: f64) -> ProjectRecord {
        ProjectRecord {
            code: code.to_string(),
            name: String::new(),
            project_type: ProjectType::Gs,
            status: ProjectStatus::Unknown,
            revenue,
            cost,
        }
    }

    fn entry(code: &str, dept: &str, hours: f64, rate: f64) -> TimesheetEntry {
        TimesheetEntry {
            project_code: code.to_string(),
            department: dept.to_string(),
            hours,
            hourly_rate: rate,
            labor_cost: hours * rate,
        }
    }

    #[test]
    fn partition_separates_orphans() {
        let projects = vec![project("GS-1", 0.0, 0.0)];
        let entries = vec![
            entry("GS-1", "A", 2.0, 0.0),
            entry("GS-9", "A", 3.0, 0.0),
            entry("", "B", 1.0, 0.0),
        ];
        let part = partition_entries(&projects, &entries);
        assert_eq!(part.matched["GS-1"].len(), 1);
        assert_eq!(part.unmatched.len(), 2);
        assert_eq!(part.unmatched_hours(), 4.0);
    }

    #[test]
    fn three_project_scenario() {
        let projects = vec![
            project("P1", 100.0, 50.0),
            project("P2", 0.0, 20.0),
            project("P3", 200.0, 200.0),
        ];
        let entries = vec![
            entry("P1", "Design", 4.0, 0.0),
            entry("P1", "Build", 6.0, 0.0),
            entry("P3", "Design", 5.0, 0.0),
        ];
        let part = partition_entries(&projects, &entries);
        let mut q = DataQualityReport::default();
        let m = aggregate_projects(&projects, &part, &mut q);

        let profits: Vec<f64> = m.iter().map(|p| p.profit).collect();
        let margins: Vec<f64> = m.iter().map(|p| p.margin_pct).collect();
        let effs: Vec<f64> = m.iter().map(|p| p.efficiency).collect();
        assert_eq!(profits, vec![50.0, -20.0, 0.0]);
        assert_eq!(margins, vec![50.0, -200.0, 0.0]);
        assert_eq!(effs, vec![5.0, 0.0, 0.0]);
        assert_eq!(m[0].total_hours, 10.0);
        assert_eq!(m[0].departments, vec!["Build".to_string(), "Design".to_string()]);
        assert_eq!(q.projects_without_hours, 1);
        assert_eq!(q.orphan_entries, 0);
    }

    #[test]
    fn labor_cost_is_a_separate_ledger() {
        let projects = vec![project("GS-1", 1000.0, 300.0)];
        let entries = vec![entry("GS-1", "Design", 10.0, 20.0)];
        let part = partition_entries(&projects, &entries);
        let m = aggregate_projects(&projects, &part, &mut DataQualityReport::default());
        assert_eq!(m[0].labor_cost, 200.0);
        assert_eq!(m[0].total_cost, 500.0);
        assert_eq!(m[0].profit, 500.0);
        assert_eq!(m[0].margin_pct, 50.0);
        assert_eq!(m[0].efficiency, 50.0);
    }

    #[test]
    fn zero_revenue_margin_rules() {
        assert_eq!(profit_margin_pct(0.0, 20.0, -20.0), SENTINEL_MARGIN_PCT);
        assert_eq!(profit_margin_pct(0.0, 0.0, 0.0), 0.0);
        assert_eq!(profit_margin_pct(50.0, 100.0, -50.0), -100.0);
    }

    #[test]
    fn refund_without_revenue_has_zero_margin() {
        assert_eq!(profit_margin_pct(0.0, -20.0, 20.0), 0.0);

        let mut quality = DataQualityReport::default();
        let projects = vec![project("GS-1", 0.0, -20.0)];
        let partition = partition_entries(&projects, &[]);
        let m = aggregate_projects(&projects, &partition, &mut quality);
        assert_eq!(m[0].profit, 20.0);
        assert_eq!(m[0].margin_pct, 0.0);
    }

    #[test]
    fn zero_hours_efficiency_is_zero() {
        assert_eq!(efficiency_score(-500.0, 0.0), 0.0);
        assert_eq!(efficiency_score(90.0, 3.0), 30.0);
    }
}
