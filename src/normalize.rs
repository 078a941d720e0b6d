//! Record normalization.
//!
//! Turns loosely typed sheet rows into [`ProjectRecord`] and [`TimesheetEntry`]
//! values. Nothing in here fails: blanks and junk degrade to documented
//! defaults (zero, `Unknown`, `Unassigned`) and every such fallback is counted
//! in a [`DataQualityReport`] so callers can surface it.

use crate::config::AnalysisConfig;
use crate::types::{
    ProjectRecord, ProjectStatus, ProjectType, RawProjectRow, RawTimesheetRow, TimesheetEntry,
};
use crate::util::{clean_text, normalize_code, parse_f64_safe};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Department name used for timesheet rows with a blank department.
pub const UNASSIGNED_DEPARTMENT: &str = "Unassigned";

/// Counters for every fallback taken while normalizing and joining.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataQualityReport {
    pub blank_project_ids: usize,
    pub blank_revenue: usize,
    pub blank_cost: usize,
    pub unknown_project_type: usize,
    pub missing_gs_status: usize,
    pub unrecognized_status: usize,
    pub duplicate_project_rows: usize,
    pub blank_entry_project_ids: usize,
    pub blank_departments: usize,
    pub blank_hours: usize,
    pub negative_hours: usize,
    pub unrated_department_entries: usize,
    pub orphan_entries: usize,
    pub orphan_hours: f64,
    pub projects_without_hours: usize,
}

impl DataQualityReport {
    /// Number of flagged rows, not counting projects that simply logged no hours.
    pub fn issue_count(&self) -> usize {
        self.blank_project_ids
            + self.blank_revenue
            + self.blank_cost
            + self.unknown_project_type
            + self.missing_gs_status
            + self.unrecognized_status
            + self.duplicate_project_rows
            + self.blank_entry_project_ids
            + self.blank_departments
            + self.blank_hours
            + self.negative_hours
            + self.unrated_department_entries
            + self.orphan_entries
    }

    pub fn has_issues(&self) -> bool {
        self.issue_count() > 0
    }
}

#[derive(Debug, Clone)]
pub struct NormalizedInput {
    /// Sorted by code, codes unique.
    pub projects: Vec<ProjectRecord>,
    pub entries: Vec<TimesheetEntry>,
    pub quality: DataQualityReport,
}

pub fn normalize(
    project_rows: &[RawProjectRow],
    timesheet_rows: &[RawTimesheetRow],
    config: &AnalysisConfig,
) -> NormalizedInput {
    let mut quality = DataQualityReport::default();
    let projects = normalize_projects(project_rows, &mut quality);
    let entries = normalize_timesheet(timesheet_rows, config, &mut quality);
    info!(
        projects = projects.len(),
        entries = entries.len(),
        flagged = quality.issue_count(),
        "normalized input rows"
    );
    NormalizedInput {
        projects,
        entries,
        quality,
    }
}

/// Infer the project type: an explicit, recognized type column wins, then the
/// identifier prefix (`ISS` is checked before `GS`).
pub fn infer_project_type(code: &str, explicit: Option<&str>) -> ProjectType {
    match explicit.map(|t| t.trim().to_ascii_uppercase()).as_deref() {
        Some("GS") => return ProjectType::Gs,
        Some("ISS") => return ProjectType::Iss,
        _ => {}
    }
    if code.starts_with("ISS") {
        ProjectType::Iss
    } else if code.starts_with("GS") {
        ProjectType::Gs
    } else {
        ProjectType::Unknown
    }
}

/// Parse a status cell. `None` means the cell held text we do not recognize.
pub fn parse_status(s: &str) -> Option<ProjectStatus> {
    let key: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '_'))
        .collect::<String>()
        .to_lowercase();
    match key.as_str() {
        "success" | "successful" | "won" => Some(ProjectStatus::Success),
        "fail" | "failed" | "failure" | "lost" => Some(ProjectStatus::Fail),
        "inprogress" | "ongoing" => Some(ProjectStatus::InProgress),
        "negotiation" | "negotiating" => Some(ProjectStatus::Negotiation),
        "unknown" => Some(ProjectStatus::Unknown),
        _ => None,
    }
}

pub fn normalize_projects(
    rows: &[RawProjectRow],
    quality: &mut DataQualityReport,
) -> Vec<ProjectRecord> {
    let mut by_code: BTreeMap<String, Vec<ProjectRecord>> = BTreeMap::new();

    for (idx, row) in rows.iter().enumerate() {
        let Some(code) = normalize_code(row.project_code.as_deref()) else {
            quality.blank_project_ids += 1;
            debug!(row = idx, "skipping project row with blank identifier");
            continue;
        };

        let revenue = parse_f64_safe(row.contract_price.as_deref()).unwrap_or_else(|| {
            quality.blank_revenue += 1;
            debug!(code = %code, "revenue blank or not numeric; using 0");
            0.0
        });
        let cost = parse_f64_safe(row.purchase_cost.as_deref()).unwrap_or_else(|| {
            quality.blank_cost += 1;
            debug!(code = %code, "cost blank or not numeric; using 0");
            0.0
        });

        let project_type = infer_project_type(&code, row.project_type.as_deref());
        if project_type == ProjectType::Unknown {
            quality.unknown_project_type += 1;
            debug!(code = %code, "project type could not be inferred");
        }

        // ISS sheets carry no status at all, so a blank is only a problem for GS.
        let status = match clean_text(row.status.as_deref()) {
            Some(text) => parse_status(&text).unwrap_or_else(|| {
                quality.unrecognized_status += 1;
                debug!(code = %code, status = %text, "unrecognized status");
                ProjectStatus::Unknown
            }),
            None => {
                if project_type == ProjectType::Gs {
                    quality.missing_gs_status += 1;
                }
                ProjectStatus::Unknown
            }
        };

        by_code.entry(code.clone()).or_default().push(ProjectRecord {
            code,
            name: clean_text(row.project_name.as_deref()).unwrap_or_default(),
            project_type,
            status,
            revenue,
            cost,
        });
    }

    by_code
        .into_values()
        .filter_map(|dups| {
            if dups.len() > 1 {
                quality.duplicate_project_rows += dups.len() - 1;
                debug!(code = %dups[0].code, rows = dups.len(), "merging duplicate project rows");
            }
            merge_duplicates(dups)
        })
        .collect()
}

// Sums money fields in a canonical order so the merge does not depend on row order.
fn merge_duplicates(mut dups: Vec<ProjectRecord>) -> Option<ProjectRecord> {
    dups.sort_by(|a, b| {
        a.revenue
            .total_cmp(&b.revenue)
            .then(a.cost.total_cmp(&b.cost))
            .then(a.status.cmp(&b.status))
            .then(a.name.cmp(&b.name))
    });
    let mut iter = dups.into_iter();
    let mut merged = iter.next()?;
    for other in iter {
        merged.revenue += other.revenue;
        merged.cost += other.cost;
        merged.status = merged.status.min(other.status);
        merged.project_type = merged.project_type.min(other.project_type);
        if merged.name.is_empty() || (!other.name.is_empty() && other.name < merged.name) {
            merged.name = other.name;
        }
    }
    Some(merged)
}

pub fn normalize_timesheet(
    rows: &[RawTimesheetRow],
    config: &AnalysisConfig,
    quality: &mut DataQualityReport,
) -> Vec<TimesheetEntry> {
    let mut entries = Vec::with_capacity(rows.len());

    for (idx, row) in rows.iter().enumerate() {
        // Blank codes are kept so their hours still reach the department rollup;
        // an empty code never matches a project in the join.
        let project_code = normalize_code(row.project_code.as_deref()).unwrap_or_else(|| {
            quality.blank_entry_project_ids += 1;
            debug!(row = idx, "timesheet row with blank project identifier");
            String::new()
        });

        let department = clean_text(row.department.as_deref()).unwrap_or_else(|| {
            quality.blank_departments += 1;
            UNASSIGNED_DEPARTMENT.to_string()
        });

        let mut hours = parse_f64_safe(row.hours.as_deref()).unwrap_or_else(|| {
            quality.blank_hours += 1;
            0.0
        });
        if hours < 0.0 {
            quality.negative_hours += 1;
            debug!(row = idx, hours, "negative hours clamped to 0");
            hours = 0.0;
        }

        let (hourly_rate, rated) = config.hourly_rate(&department);
        if !rated {
            quality.unrated_department_entries += 1;
        }

        entries.push(TimesheetEntry {
            project_code,
            department,
            hours,
            hourly_rate,
            labor_cost: hours * hourly_rate,
        });
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn project(code: &str, status: Option<&str>, price: &str, cost: &str) -> RawProjectRow {
        RawProjectRow {
            project_code: Some(code.to_string()),
            project_name: Some(format!("{code} name")),
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

    #[test]
    fn infers_type_from_prefix() {
        assert_eq!(infer_project_type("GS-001", None), ProjectType::Gs);
        assert_eq!(infer_project_type("ISS2023", None), ProjectType::Iss);
        assert_eq!(infer_project_type("X-9", None), ProjectType::Unknown);
        assert_eq!(infer_project_type("X-9", Some(" iss ")), ProjectType::Iss);
        assert_eq!(infer_project_type("GS-1", Some("other")), ProjectType::Gs);
    }

    #[test]
    fn parses_status_variants() {
        assert_eq!(parse_status("In Progress"), Some(ProjectStatus::InProgress));
        assert_eq!(parse_status("in-progress"), Some(ProjectStatus::InProgress));
        assert_eq!(parse_status(" SUCCESS "), Some(ProjectStatus::Success));
        assert_eq!(parse_status("Fail"), Some(ProjectStatus::Fail));
        assert_eq!(parse_status("pending review"), None);
    }

    #[test]
    fn trims_and_uppercases_identifiers() {
        let mut q = DataQualityReport::default();
        let out = normalize_projects(&[project("  gs-01 ", Some("Success"), "100", "50")], &mut q);
        assert_eq!(out[0].code, "GS-01");
        assert_eq!(out[0].project_type, ProjectType::Gs);
        assert_eq!(out[0].status, ProjectStatus::Success);
    }

    #[test]
    fn blank_money_coerces_to_zero_and_is_flagged() {
        let mut q = DataQualityReport::default();
        let out = normalize_projects(&[project("GS-1", Some("Fail"), "", "abc")], &mut q);
        assert_eq!(out[0].revenue, 0.0);
        assert_eq!(out[0].cost, 0.0);
        assert_eq!(q.blank_revenue, 1);
        assert_eq!(q.blank_cost, 1);
    }

    #[test]
    fn missing_iss_status_is_not_flagged() {
        let mut q = DataQualityReport::default();
        let out = normalize_projects(
            &[project("ISS-1", None, "1", "1"), project("GS-2", None, "1", "1")],
            &mut q,
        );
        assert!(out.iter().all(|p| p.status == ProjectStatus::Unknown));
        assert_eq!(q.missing_gs_status, 1);
        assert_eq!(q.unrecognized_status, 0);
    }

    #[test]
    fn blank_identifier_rows_are_dropped_and_counted() {
        let mut q = DataQualityReport::default();
        let out = normalize_projects(&[project("   ", None, "1", "1")], &mut q);
        assert!(out.is_empty());
        assert_eq!(q.blank_project_ids, 1);
    }

    #[test]
    fn duplicates_merge_regardless_of_order() {
        let rows = vec![
            project("GS-1", None, "100", "10"),
            project("gs-1", Some("Success"), "50", "5"),
        ];
        let mut reversed = rows.clone();
        reversed.reverse();

        let mut q1 = DataQualityReport::default();
        let mut q2 = DataQualityReport::default();
        let a = normalize_projects(&rows, &mut q1);
        let b = normalize_projects(&reversed, &mut q2);
        assert_eq!(a, b);
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].revenue, 150.0);
        assert_eq!(a[0].cost, 15.0);
        assert_eq!(a[0].status, ProjectStatus::Success);
        assert_eq!(q1.duplicate_project_rows, 1);
    }

    #[test]
    fn timesheet_rows_get_department_rates() {
        let mut cfg = AnalysisConfig::default();
        cfg.departments.insert("设计部".to_string(), 208_000.0);
        let mut q = DataQualityReport::default();
        let out = normalize_timesheet(
            &[
                entry("gs-1", "设计部", "4"),
                entry("GS-1", "", "-2"),
                entry("", "Ops", ""),
            ],
            &cfg,
            &mut q,
        );
        assert_eq!(out[0].hourly_rate, 100.0);
        assert_eq!(out[0].labor_cost, 400.0);
        assert_eq!(out[1].department, UNASSIGNED_DEPARTMENT);
        assert_eq!(out[1].hours, 0.0);
        assert_eq!(out[2].project_code, "");
        assert_eq!(q.negative_hours, 1);
        assert_eq!(q.blank_departments, 1);
        assert_eq!(q.blank_hours, 1);
        assert_eq!(q.blank_entry_project_ids, 1);
        assert_eq!(q.unrated_department_entries, 2);
    }
}
