use crate::aggregate::ProjectMetrics;
use crate::analysis::AnalysisResult;
use crate::departments::DepartmentSummary;
use crate::types::{DepartmentRow, FinancialSummaryRow, ProjectTypeRow, StatusRow};
use crate::util::format_number;
use std::cmp::Ordering;
use std::collections::HashMap;

pub fn financial_summary_rows(projects: &[ProjectMetrics]) -> Vec<FinancialSummaryRow> {
    projects
        .iter()
        .map(|p| FinancialSummaryRow {
            project_code: p.code.clone(),
            project_name: p.name.clone(),
            project_type: p.project_type.to_string(),
            status: p.status.to_string(),
            contract_price: format_number(p.revenue, 2),
            purchase_cost: format_number(p.purchase_cost, 2),
            labor_cost: format_number(p.labor_cost, 2),
            total_cost: format_number(p.total_cost, 2),
            profit: format_number(p.profit, 2),
            profit_margin: format_number(p.margin_pct, 2),
            total_hours: format_number(p.total_hours, 2),
            efficiency_score: format_number(p.efficiency, 2),
        })
        .collect()
}

fn ranked<'a>(
    result: &'a AnalysisResult,
    keep: impl Fn(&DepartmentSummary) -> bool,
    order: impl Fn(&DepartmentSummary, &DepartmentSummary) -> Ordering,
) -> Vec<&'a DepartmentSummary> {
    let mut depts: Vec<&DepartmentSummary> =
        result.departments.values().filter(|&d| keep(d)).collect();
    depts.sort_by(|&a, &b| order(a, b).then_with(|| a.department.cmp(&b.department)));
    depts
}

/// Most hours first.
pub fn rank_by_hours(result: &AnalysisResult) -> Vec<&DepartmentSummary> {
    ranked(result, |_| true, |a, b| b.total_hours.total_cmp(&a.total_hours))
}

/// Most distinct projects first.
pub fn rank_by_projects(result: &AnalysisResult) -> Vec<&DepartmentSummary> {
    ranked(result, |_| true, |a, b| b.project_count.cmp(&a.project_count))
}

/// Cheapest labor per hour first. Departments without hours have no rate
/// to compare and are left out.
pub fn rank_by_cost_per_hour(result: &AnalysisResult) -> Vec<&DepartmentSummary> {
    ranked(
        result,
        |d| d.total_hours > 0.0,
        |a, b| a.cost_per_hour.total_cmp(&b.cost_per_hour),
    )
}

fn positions(ranking: &[&DepartmentSummary]) -> HashMap<String, usize> {
    ranking
        .iter()
        .enumerate()
        .map(|(i, d)| (d.department.clone(), i + 1))
        .collect()
}

/// Department rows, highest labor cost first (ties by name).
pub fn department_rows(result: &AnalysisResult) -> Vec<DepartmentRow> {
    let by_hours = positions(&rank_by_hours(result));
    let by_projects = positions(&rank_by_projects(result));
    let by_cost = positions(&rank_by_cost_per_hour(result));

    ranked(
        result,
        |_| true,
        |a, b| b.total_labor_cost.total_cmp(&a.total_labor_cost),
    )
    .into_iter()
    .map(|d| DepartmentRow {
        department: d.department.clone(),
        total_hours: format_number(d.total_hours, 2),
        total_labor_cost: format_number(d.total_labor_cost, 2),
        num_projects: d.project_count,
        num_tasks: d.entry_count,
        hours_per_project: format_number(d.average_hours_per_project, 1),
        hourly_rate: format_number(d.hourly_rate, 2),
        cost_per_hour: format_number(d.cost_per_hour, 2),
        avg_efficiency: format_number(d.average_efficiency, 2),
        hours_rank: by_hours.get(&d.department).copied().unwrap_or_default(),
        projects_rank: by_projects.get(&d.department).copied().unwrap_or_default(),
        cost_per_hour_rank: by_cost
            .get(&d.department)
            .map(|r| r.to_string())
            .unwrap_or_default(),
    })
    .collect()
}

pub fn project_type_rows(result: &AnalysisResult) -> Vec<ProjectTypeRow> {
    result
        .by_type
        .iter()
        .map(|t| ProjectTypeRow {
            project_type: t.project_type.to_string(),
            count: t.count,
            total_revenue: format_number(t.total_revenue, 2),
            total_profit: format_number(t.total_profit, 2),
            avg_margin: format_number(t.average_margin_pct, 2),
            avg_efficiency: format_number(t.average_efficiency, 2),
        })
        .collect()
}

pub fn status_rows(result: &AnalysisResult) -> Vec<StatusRow> {
    result
        .gs_by_status
        .iter()
        .map(|s| StatusRow {
            status: s.status.to_string(),
            count: s.count,
            total_profit: format_number(s.total_profit, 2),
            avg_profit: format_number(s.average_profit, 2),
            avg_margin: format_number(s.average_margin_pct, 2),
        })
        .collect()
}
