//! Assembly of the complete [`AnalysisResult`].
//!
//! Runs the stages in order (normalize, join and aggregate, then the three
//! independent summaries) and bundles everything into one immutable value for
//! the report and export collaborators. The result is either complete or not
//! produced at all.

use crate::aggregate::{aggregate_projects, partition_entries, ProjectMetrics};
use crate::categories::{compare_by_type, compare_gs_by_status, StatusSummary, TypeSummary};
use crate::config::AnalysisConfig;
use crate::departments::{rollup_departments, DepartmentSummary};
use crate::normalize::{normalize, DataQualityReport, NormalizedInput};
use crate::stats::{summarize, DistributionSummary};
use crate::types::{RawProjectRow, RawTimesheetRow};
use crate::util::average;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Totals {
    pub project_count: usize,
    pub total_revenue: f64,
    pub total_purchase_cost: f64,
    /// Labor cost of hours joined to known projects.
    pub total_labor_cost: f64,
    pub total_cost: f64,
    pub total_profit: f64,
    /// Hours joined to known projects.
    pub total_project_hours: f64,
    /// Every timesheet hour, orphans included; equals the department hour total.
    pub total_timesheet_hours: f64,
    pub orphan_hours: f64,
    pub average_margin_pct: f64,
    pub profitable_count: usize,
    pub loss_count: usize,
    pub break_even_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub totals: Totals,
    /// Every project, sorted by code.
    pub projects: Vec<ProjectMetrics>,
    /// Profit > 0, highest first, ties by code.
    pub top_profitable: Vec<ProjectMetrics>,
    /// Profit < 0, largest loss first, ties by code.
    pub top_losses: Vec<ProjectMetrics>,
    pub efficiency: DistributionSummary,
    pub departments: BTreeMap<String, DepartmentSummary>,
    pub by_type: Vec<TypeSummary>,
    pub gs_by_status: Vec<StatusSummary>,
    pub data_quality: DataQualityReport,
}

pub fn is_break_even(profit: f64) -> bool {
    profit.abs() < f64::EPSILON
}

pub fn analyze(
    project_rows: &[RawProjectRow],
    timesheet_rows: &[RawTimesheetRow],
    config: &AnalysisConfig,
) -> AnalysisResult {
    analyze_normalized(normalize(project_rows, timesheet_rows, config), config)
}

pub fn analyze_normalized(input: NormalizedInput, config: &AnalysisConfig) -> AnalysisResult {
    let NormalizedInput {
        projects,
        entries,
        mut quality,
    } = input;

    let partition = partition_entries(&projects, &entries);
    let metrics = aggregate_projects(&projects, &partition, &mut quality);

    let efficiency = summarize(&metrics.iter().map(|p| p.efficiency).collect::<Vec<_>>());
    let departments: BTreeMap<String, DepartmentSummary> =
        rollup_departments(&entries, &metrics, config)
            .into_iter()
            .map(|d| (d.department.clone(), d))
            .collect();
    let by_type = compare_by_type(&metrics);
    let gs_by_status = compare_gs_by_status(&metrics);

    let mut totals = compute_totals(&metrics);
    totals.total_timesheet_hours = departments.values().map(|d| d.total_hours).sum();
    totals.orphan_hours = quality.orphan_hours;

    let top_profitable = top_by(&metrics, config.top_n, |p| p.profit > 0.0, |a, b| {
        b.profit.total_cmp(&a.profit)
    });
    let top_losses = top_by(&metrics, config.top_n, |p| p.profit < 0.0, |a, b| {
        a.profit.total_cmp(&b.profit)
    });

    if quality.has_issues() {
        warn!(issues = quality.issue_count(), "input had data-quality issues");
    }
    info!(
        projects = totals.project_count,
        revenue = totals.total_revenue,
        profit = totals.total_profit,
        departments = departments.len(),
        "analysis complete"
    );

    AnalysisResult {
        totals,
        projects: metrics,
        top_profitable,
        top_losses,
        efficiency,
        departments,
        by_type,
        gs_by_status,
        data_quality: quality,
    }
}

fn compute_totals(projects: &[ProjectMetrics]) -> Totals {
    let mut t = Totals {
        project_count: projects.len(),
        ..Totals::default()
    };
    for p in projects {
        t.total_revenue += p.revenue;
        t.total_purchase_cost += p.purchase_cost;
        t.total_labor_cost += p.labor_cost;
        t.total_cost += p.total_cost;
        t.total_profit += p.profit;
        t.total_project_hours += p.total_hours;
        if is_break_even(p.profit) {
            t.break_even_count += 1;
        } else if p.profit > 0.0 {
            t.profitable_count += 1;
        } else {
            t.loss_count += 1;
        }
    }
    t.average_margin_pct = average(&projects.iter().map(|p| p.margin_pct).collect::<Vec<_>>());
    t
}

fn top_by(
    projects: &[ProjectMetrics],
    n: usize,
    keep: impl Fn(&ProjectMetrics) -> bool,
    order: impl Fn(&ProjectMetrics, &ProjectMetrics) -> Ordering,
) -> Vec<ProjectMetrics> {
    let mut picked: Vec<&ProjectMetrics> = projects
        .iter()
        .filter(|&p| keep(p) && !is_break_even(p.profit))
        .collect();
    picked.sort_by(|&a, &b| order(a, b).then_with(|| a.code.cmp(&b.code)));
    picked.into_iter().take(n).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProjectType;
    use pretty_assertions::assert_eq;

    fn project(code: &str, price: &str, cost: &str, status: Option<&str>) -> RawProjectRow {
        RawProjectRow {
            project_code: Some(code.to_string()),
            project_name: None,
            project_type: None,
            status: status.map(str::to_string),
            contract_price: Some(price.to_string()),
            purchase_cost: Some(cost.to_string()),
        }
    }

    fn entry(code: &str, dept: &str, hours: &str) -> RawTimesheetRow {
        RawTimesheetRow {
            project_code: Some(code.to_string()),
            department: Some(dept.to_string()),
            hours: Some(hours.to_string()),
            ..RawTimesheetRow::default()
        }
    }

    fn scenario() -> (Vec<RawProjectRow>, Vec<RawTimesheetRow>) {
        (
            vec![
                project("P1", "100", "50", None),
                project("P2", "0", "20", None),
                project("P3", "200", "200", None),
            ],
            vec![entry("P1", "Design", "10"), entry("P3", "Design", "5")],
        )
    }

    #[test]
    fn scenario_totals_and_lists() {
        let (p, t) = scenario();
        let r = analyze(&p, &t, &AnalysisConfig::default());

        assert_eq!(r.totals.project_count, 3);
        assert_eq!(r.totals.total_revenue, 300.0);
        assert_eq!(r.totals.total_cost, 270.0);
        assert_eq!(r.totals.total_profit, 30.0);
        assert_eq!(r.totals.profitable_count, 1);
        assert_eq!(r.totals.loss_count, 1);
        assert_eq!(r.totals.break_even_count, 1);
        assert_eq!(r.totals.average_margin_pct, -50.0);
        assert_eq!(r.totals.total_project_hours, 15.0);
        assert_eq!(r.totals.total_timesheet_hours, 15.0);

        let profitable: Vec<&str> = r.top_profitable.iter().map(|p| p.code.as_str()).collect();
        let losses: Vec<&str> = r.top_losses.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(profitable, vec!["P1"]);
        assert_eq!(losses, vec!["P2"]);

        assert_eq!(r.efficiency.median, 0.0);
        assert_eq!(r.efficiency.mean, 5.0 / 3.0);
        assert_eq!(r.departments["Design"].total_hours, 15.0);
        assert_eq!(r.by_type.len(), 1);
        assert_eq!(r.by_type[0].project_type, ProjectType::Unknown);
    }

    #[test]
    fn profit_equals_revenue_minus_cost() {
        let (p, t) = scenario();
        let mut cfg = AnalysisConfig::default();
        cfg.departments.insert("Design".to_string(), 20_800.0);
        let r = analyze(&p, &t, &cfg);
        assert_eq!(r.totals.total_labor_cost, 150.0);
        assert_eq!(
            r.totals.total_profit,
            r.totals.total_revenue - r.totals.total_purchase_cost - r.totals.total_labor_cost
        );
    }

    #[test]
    fn top_lists_break_ties_by_code_and_respect_n() {
        let rows = vec![
            project("GS-C", "100", "50", Some("Success")),
            project("GS-A", "100", "50", Some("Success")),
            project("GS-B", "300", "50", Some("Success")),
            project("GS-D", "10", "60", Some("Fail")),
        ];
        let cfg = AnalysisConfig {
            top_n: 2,
            ..AnalysisConfig::default()
        };
        let r = analyze(&rows, &[], &cfg);
        let codes: Vec<&str> = r.top_profitable.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, vec!["GS-B", "GS-A"]);
        assert_eq!(r.top_losses.len(), 1);
    }

    #[test]
    fn orphan_hours_are_reported_not_dropped() {
        let (p, mut t) = scenario();
        t.push(entry("ISS-404", "Support", "7"));
        let r = analyze(&p, &t, &AnalysisConfig::default());
        assert_eq!(r.data_quality.orphan_entries, 1);
        assert_eq!(r.totals.orphan_hours, 7.0);
        assert_eq!(r.totals.total_project_hours, 15.0);
        assert_eq!(r.totals.total_timesheet_hours, 22.0);
        assert_eq!(r.departments["Support"].project_count, 1);
    }

    #[test]
    fn reordered_rows_give_identical_results() {
        let (mut p, mut t) = scenario();
        t.push(entry("p1", "Build", "2.5"));
        let a = analyze(&p, &t, &AnalysisConfig::default());
        p.reverse();
        t.reverse();
        let b = analyze(&p, &t, &AnalysisConfig::default());
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
