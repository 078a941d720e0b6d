// Plain-text reports: the combined financial report, the department
// rankings and the per-status listing of GS projects.
//
// Every figure is read from an `AnalysisResult` (plus `Insights` for the
// recommendations), so the text always agrees with the CSV and JSON exports.
use crate::analysis::AnalysisResult;
use crate::insights::Insights;
use crate::reports::{rank_by_cost_per_hour, rank_by_hours, rank_by_projects};
use crate::types::{ProjectStatus, ProjectType};
use crate::util::{average, format_number};
use chrono::NaiveDateTime;

const WIDTH: usize = 80;
const NAME_LIMIT: usize = 50;

/// GS status sections in report order.
pub const STATUS_REPORT_ORDER: [ProjectStatus; 5] = [
    ProjectStatus::Success,
    ProjectStatus::Negotiation,
    ProjectStatus::InProgress,
    ProjectStatus::Fail,
    ProjectStatus::Unknown,
];

#[derive(Default)]
struct Lines(Vec<String>);

impl Lines {
    fn push(&mut self, line: impl Into<String>) {
        self.0.push(line.into());
    }

    fn blank(&mut self) {
        self.0.push(String::new());
    }

    fn banner(&mut self, title: &str) {
        self.push("=".repeat(WIDTH));
        self.push(title);
        self.push("=".repeat(WIDTH));
    }

    fn section(&mut self, title: &str) {
        self.banner(title);
        self.blank();
    }

    fn sub(&mut self, title: &str, rule: usize) {
        self.push(title);
        self.push("-".repeat(rule));
    }

    fn finish(self) -> String {
        let mut text = self.0.join("\n");
        text.push('\n');
        text
    }
}

fn money(v: f64) -> String {
    format!("¥{}", format_number(v, 2))
}

fn stamp(generated_at: NaiveDateTime) -> String {
    format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S"))
}

fn short_name(name: &str) -> String {
    if name.chars().count() > NAME_LIMIT {
        let head: String = name.chars().take(NAME_LIMIT).collect();
        format!("{head}...")
    } else {
        name.to_string()
    }
}

pub fn financial_report(
    result: &AnalysisResult,
    insights: &Insights,
    generated_at: NaiveDateTime,
) -> String {
    let t = &result.totals;
    let mut out = Lines::default();
    out.banner("PROJECT FINANCIAL ANALYSIS REPORT");
    out.push(stamp(generated_at));
    out.blank();

    out.section("EXECUTIVE SUMMARY");
    out.push(format!("Total Revenue: {}", money(t.total_revenue)));
    out.push(format!("Total Cost: {}", money(t.total_cost)));
    out.push(format!("Total Profit: {}", money(t.total_profit)));
    out.push(format!("Average Profit Margin: {:.2}%", t.average_margin_pct));
    out.push(format!("Total Projects Analyzed: {}", t.project_count));
    out.push(format!("  - Profitable: {}", t.profitable_count));
    out.push(format!("  - Loss-making: {}", t.loss_count));
    out.push(format!("  - Break-even: {}", t.break_even_count));
    if t.orphan_hours > 0.0 {
        out.push(format!(
            "Unmatched timesheet hours: {}",
            format_number(t.orphan_hours, 1)
        ));
    }
    out.blank();

    out.section("PROJECT PERFORMANCE ANALYSIS");
    out.sub(&format!("TOP {} PROFITABLE PROJECTS:", result.top_profitable.len()), 40);
    for p in &result.top_profitable {
        out.push(format!(
            "{}: {} (Margin: {:.1}%, Hours: {})",
            p.code,
            money(p.profit),
            p.margin_pct,
            format_number(p.total_hours, 0)
        ));
    }
    out.blank();
    out.sub("SIGNIFICANT LOSS-MAKING PROJECTS:", 40);
    if result.top_losses.is_empty() {
        out.push("No significant loss-making projects found.");
    }
    for p in &result.top_losses {
        out.push(format!("{}: {} (Margin: {:.1}%)", p.code, money(p.profit), p.margin_pct));
    }
    out.blank();

    let e = &result.efficiency;
    out.section("EFFICIENCY ANALYSIS");
    out.push(format!("Average Efficiency Score: {:.2}", e.mean));
    out.push(format!("Median Efficiency Score: {:.2}", e.median));
    out.push(format!("Standard Deviation: {:.2}", e.std_dev));
    out.blank();
    out.push("Efficiency Percentiles:");
    out.push(format!("  25th: {:.2}", e.percentiles.p25));
    out.push(format!("  50th: {:.2}", e.percentiles.p50));
    out.push(format!("  75th: {:.2}", e.percentiles.p75));
    out.push(format!("  90th: {:.2}", e.percentiles.p90));
    out.blank();
    if !insights.top_efficient.is_empty() {
        out.sub("MOST EFFICIENT PROJECTS:", 40);
        for h in &insights.top_efficient {
            out.push(format!("{}: {:.2} per hour", h.project_code, h.efficiency));
        }
        out.blank();
    }

    out.section("DEPARTMENT ANALYSIS");
    let mut depts: Vec<_> = result.departments.values().collect();
    depts.sort_by(|a, b| {
        b.total_labor_cost
            .total_cmp(&a.total_labor_cost)
            .then_with(|| a.department.cmp(&b.department))
    });
    for d in depts {
        out.push(format!("{}:", d.department));
        out.push(format!("  Total Hours: {}", format_number(d.total_hours, 0)));
        out.push(format!("  Total Labor Cost: {}", money(d.total_labor_cost)));
        out.push(format!("  Projects Involved: {}", d.project_count));
        out.push(format!(
            "  Average Hours per Project: {:.1}",
            d.average_hours_per_project
        ));
        out.push(format!("  Hourly Rate: {}", money(d.hourly_rate)));
        out.blank();
    }

    out.section("PROJECT TYPE COMPARISON");
    for ty in &result.by_type {
        out.push(format!("{} Projects:", ty.project_type));
        out.push(format!("  Count: {}", ty.count));
        out.push(format!("  Total Revenue: {}", money(ty.total_revenue)));
        out.push(format!("  Total Profit: {}", money(ty.total_profit)));
        out.push(format!("  Average Profit Margin: {:.2}%", ty.average_margin_pct));
        out.push(format!("  Average Efficiency: {:.2}", ty.average_efficiency));
        out.blank();
    }

    if !result.gs_by_status.is_empty() {
        out.section("GS PROJECT STATUS ANALYSIS");
        for s in &result.gs_by_status {
            out.push(format!("{}:", s.status));
            out.push(format!("  Projects: {}", s.count));
            out.push(format!("  Total Profit: {}", money(s.total_profit)));
            out.push(format!("  Average Profit: {}", money(s.average_profit)));
            out.push(format!("  Average Margin: {:.2}%", s.average_margin_pct));
            out.blank();
        }
    }

    out.section("RECOMMENDATIONS");
    if let Some(dept) = &insights.highest_labor_cost_department {
        out.push(format!("- {dept} has the highest labor cost; review resource utilization"));
    }
    if let Some(ty) = insights.most_profitable_type {
        out.push(format!("- {ty} projects show the highest total profit"));
    }
    for alert in &insights.alerts {
        out.push(format!("- [{:?}] {}", alert.severity, alert.message));
    }
    out.blank();
    out.push("=".repeat(WIDTH));
    out.finish()
}

pub fn department_report(result: &AnalysisResult, generated_at: NaiveDateTime) -> String {
    let mut out = Lines::default();
    out.banner("DEPARTMENT PERFORMANCE REPORT");
    out.push(stamp(generated_at));
    out.blank();
    out.push("DEPARTMENT RANKINGS");
    out.push("=".repeat(40));
    out.blank();

    out.sub("By Total Hours Worked:", 30);
    for (i, d) in rank_by_hours(result).into_iter().enumerate() {
        out.push(format!(
            "{}. {}: {} hours",
            i + 1,
            d.department,
            format_number(d.total_hours, 0)
        ));
    }
    out.blank();

    out.sub("By Number of Projects:", 30);
    for (i, d) in rank_by_projects(result).into_iter().enumerate() {
        out.push(format!("{}. {}: {} projects", i + 1, d.department, d.project_count));
    }
    out.blank();

    out.sub("By Labor Cost Efficiency (Cost per Hour):", 30);
    for (i, d) in rank_by_cost_per_hour(result).into_iter().enumerate() {
        out.push(format!("{}. {}: {}/hour", i + 1, d.department, money(d.cost_per_hour)));
    }
    out.finish()
}

/// GS projects listed under each status. `None` when there are no GS projects.
pub fn gs_status_report(result: &AnalysisResult, generated_at: NaiveDateTime) -> Option<String> {
    let gs: Vec<_> = result
        .projects
        .iter()
        .filter(|p| p.project_type == ProjectType::Gs)
        .collect();
    if gs.is_empty() {
        return None;
    }

    let mut out = Lines::default();
    out.banner("GS PROJECT STATUS REPORT");
    out.push(stamp(generated_at));
    out.blank();

    for status in STATUS_REPORT_ORDER {
        let group: Vec<_> = gs.iter().filter(|p| p.status == status).collect();
        if group.is_empty() {
            continue;
        }
        out.push(format!(
            "{} PROJECTS ({} projects)",
            status.as_str().to_uppercase(),
            group.len()
        ));
        out.push("=".repeat(40));
        out.blank();
        let revenue: f64 = group.iter().map(|p| p.revenue).sum();
        let profit: f64 = group.iter().map(|p| p.profit).sum();
        let hours: f64 = group.iter().map(|p| p.total_hours).sum();
        let margins: Vec<f64> = group.iter().map(|p| p.margin_pct).collect();
        out.push(format!("Total Revenue: {}", money(revenue)));
        out.push(format!("Total Profit: {}", money(profit)));
        out.push(format!("Average Profit Margin: {:.2}%", average(&margins)));
        out.push(format!("Total Hours: {}", format_number(hours, 0)));
        out.blank();
        out.push("Projects:");
        for p in group {
            out.push(format!("  - {}: {}", p.code, short_name(&p.name)));
        }
        out.blank();
    }
    Some(out.finish())
}
