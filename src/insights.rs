// Executive findings and alerts derived from a finished analysis.
//
// Nothing here recomputes metrics; it only ranks and thresholds values that
// are already in the `AnalysisResult`.
use crate::aggregate::ProjectMetrics;
use crate::analysis::AnalysisResult;
use crate::categories::TypeSummary;
use crate::config::AnalysisConfig;
use crate::departments::DepartmentSummary;
use crate::types::{ProjectStatus, ProjectType};
use crate::util::{average, format_number, ratio_or_zero};
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    LossMakingProjects,
    LowEfficiency,
    HighFailureRate,
    LowAverageMargin,
    HighLaborCost,
    EfficiencyVariance,
    OverloadedDepartments,
    DataQuality,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectHighlight {
    pub project_code: String,
    pub project_name: String,
    pub profit: f64,
    pub margin_pct: f64,
    pub efficiency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub top_performer: Option<ProjectHighlight>,
    pub biggest_concern: Option<ProjectHighlight>,
    pub most_efficient_department: Option<String>,
    pub highest_labor_cost_department: Option<String>,
    /// Only set when more than one project type is present.
    pub most_profitable_type: Option<ProjectType>,
    /// Highest efficiency first among projects with logged hours.
    pub top_efficient: Vec<ProjectHighlight>,
    pub success_rate_pct: f64,
    pub labor_cost_pct: f64,
    pub average_project_size: f64,
    pub alerts: Vec<Alert>,
}

fn highlight(p: &ProjectMetrics) -> ProjectHighlight {
    ProjectHighlight {
        project_code: p.code.clone(),
        project_name: p.name.clone(),
        profit: p.profit,
        margin_pct: p.margin_pct,
        efficiency: p.efficiency,
    }
}

// Profit ties resolve to the smaller code on both ends.
fn highest_profit(a: &&ProjectMetrics, b: &&ProjectMetrics) -> Ordering {
    a.profit
        .total_cmp(&b.profit)
        .then_with(|| b.code.cmp(&a.code))
}

fn lowest_profit(a: &&ProjectMetrics, b: &&ProjectMetrics) -> Ordering {
    a.profit
        .total_cmp(&b.profit)
        .then_with(|| a.code.cmp(&b.code))
}

/// GS success share among GS projects with a known status.
pub fn success_rate_pct(projects: &[ProjectMetrics]) -> f64 {
    let gs = projects.iter().filter(|p| p.project_type == ProjectType::Gs);
    let known = gs.clone().filter(|p| p.status != ProjectStatus::Unknown).count();
    let success = gs.filter(|p| p.status == ProjectStatus::Success).count();
    ratio_or_zero(success as f64, known as f64) * 100.0
}

/// GS failure share among all GS projects.
pub fn failure_rate_pct(projects: &[ProjectMetrics]) -> f64 {
    let gs = projects.iter().filter(|p| p.project_type == ProjectType::Gs);
    let total = gs.clone().count();
    let failed = gs.filter(|p| p.status == ProjectStatus::Fail).count();
    ratio_or_zero(failed as f64, total as f64) * 100.0
}

pub fn labor_cost_pct(result: &AnalysisResult) -> f64 {
    let labor: f64 = result.departments.values().map(|d| d.total_labor_cost).sum();
    if result.totals.total_cost > 0.0 {
        labor / result.totals.total_cost * 100.0
    } else {
        0.0
    }
}

/// Department with the most projects per thousand hours.
pub fn most_efficient_department(result: &AnalysisResult) -> Option<String> {
    result
        .departments
        .values()
        .filter(|d| d.total_hours > 0.0)
        .map(|d| (d.project_count as f64 / d.total_hours * 1000.0, &d.department))
        // Departments iterate in name order; keep the first on ties.
        .fold(None, |best: Option<(f64, &String)>, (score, name)| match best {
            Some((b, _)) if b >= score => best,
            _ => Some((score, name)),
        })
        .map(|(_, name)| name.clone())
}

pub fn highest_labor_cost_department(result: &AnalysisResult) -> Option<String> {
    result
        .departments
        .values()
        .filter(|d| d.total_labor_cost > 0.0)
        .fold(None, |best: Option<&DepartmentSummary>, d| match best {
            Some(b) if b.total_labor_cost >= d.total_labor_cost => best,
            _ => Some(d),
        })
        .map(|d| d.department.clone())
}

/// Type with the largest total profit; ties go to the earlier type.
pub fn most_profitable_type(result: &AnalysisResult) -> Option<ProjectType> {
    if result.by_type.len() < 2 {
        return None;
    }
    result
        .by_type
        .iter()
        .fold(None, |best: Option<&TypeSummary>, t| match best {
            Some(b) if b.total_profit >= t.total_profit => best,
            _ => Some(t),
        })
        .map(|t| t.project_type)
}

pub fn top_efficient_projects(projects: &[ProjectMetrics], n: usize) -> Vec<ProjectHighlight> {
    let mut ranked: Vec<&ProjectMetrics> =
        projects.iter().filter(|p| p.total_hours > 0.0).collect();
    ranked.sort_by(|a, b| {
        b.efficiency
            .total_cmp(&a.efficiency)
            .then_with(|| a.code.cmp(&b.code))
    });
    ranked.into_iter().take(n).map(highlight).collect()
}

pub fn derive_insights(result: &AnalysisResult, config: &AnalysisConfig) -> Insights {
    let projects = &result.projects;
    let labor_pct = labor_cost_pct(result);
    Insights {
        top_performer: projects.iter().max_by(highest_profit).map(highlight),
        biggest_concern: projects.iter().min_by(lowest_profit).map(highlight),
        most_efficient_department: most_efficient_department(result),
        highest_labor_cost_department: highest_labor_cost_department(result),
        most_profitable_type: most_profitable_type(result),
        top_efficient: top_efficient_projects(projects, config.top_n),
        success_rate_pct: success_rate_pct(projects),
        labor_cost_pct: labor_pct,
        average_project_size: average(&projects.iter().map(|p| p.revenue).collect::<Vec<_>>()),
        alerts: build_alerts(result, config, labor_pct),
    }
}

fn build_alerts(result: &AnalysisResult, config: &AnalysisConfig, labor_pct: f64) -> Vec<Alert> {
    let th = &config.thresholds;
    let projects = &result.projects;
    let mut alerts = Vec::new();
    let mut push = |kind, severity, message: String| {
        alerts.push(Alert {
            kind,
            severity,
            message,
        })
    };

    let losses: Vec<&ProjectMetrics> = projects.iter().filter(|p| p.profit < 0.0).collect();
    if !losses.is_empty() {
        let total_loss: f64 = losses.iter().map(|p| p.profit).sum();
        push(
            AlertKind::LossMakingProjects,
            Severity::High,
            format!(
                "{} projects with total loss of ¥{}",
                losses.len(),
                format_number(total_loss.abs(), 2)
            ),
        );
    }

    let low_eff = projects
        .iter()
        .filter(|p| p.total_hours > 0.0 && p.efficiency < th.low_efficiency)
        .count();
    if low_eff > 0 {
        push(
            AlertKind::LowEfficiency,
            Severity::Medium,
            format!("{low_eff} projects with low efficiency scores"),
        );
    }

    let fail_rate = failure_rate_pct(projects);
    if fail_rate > th.high_failure_rate_pct {
        push(
            AlertKind::HighFailureRate,
            Severity::High,
            format!("High GS failure rate ({fail_rate:.1}%) requires root cause analysis"),
        );
    }

    let avg_margin = result.totals.average_margin_pct;
    if !projects.is_empty() && avg_margin < th.min_average_margin_pct {
        push(
            AlertKind::LowAverageMargin,
            Severity::Medium,
            format!("Average profit margin ({avg_margin:.1}%) below target"),
        );
    }

    if labor_pct > th.max_labor_cost_pct {
        push(
            AlertKind::HighLaborCost,
            Severity::Medium,
            format!("High labor cost percentage ({labor_pct:.1}%)"),
        );
    }

    if result.efficiency.std_dev > th.efficiency_std_alert {
        push(
            AlertKind::EfficiencyVariance,
            Severity::Low,
            format!(
                "Efficiency standard deviation {} exceeds {}",
                format_number(result.efficiency.std_dev, 2),
                format_number(th.efficiency_std_alert, 2)
            ),
        );
    }

    let counts: Vec<f64> = result
        .departments
        .values()
        .map(|d| d.project_count as f64)
        .collect();
    let limit = average(&counts) * th.overloaded_department_factor;
    let overloaded = counts.iter().filter(|c| **c > limit).count();
    if overloaded > 0 {
        push(
            AlertKind::OverloadedDepartments,
            Severity::Low,
            format!("Balance workload for {overloaded} overloaded departments"),
        );
    }

    let issues = result.data_quality.issue_count();
    if issues > 0 {
        push(
            AlertKind::DataQuality,
            Severity::Low,
            format!("{issues} data-quality issues were corrected with defaults"),
        );
    }

    alerts
}
