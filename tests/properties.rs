use proptest::prelude::*;
use std::collections::BTreeSet;
use wtl_report::types::{ProjectType, RawProjectRow, RawTimesheetRow};
use wtl_report::{analyze, AnalysisConfig};

fn config() -> AnalysisConfig {
    let mut cfg = AnalysisConfig::default();
    cfg.departments.insert("Design".to_string(), 124_800.0);
    cfg.departments.insert("Build".to_string(), 93_600.0);
    cfg
}

fn project_row() -> impl Strategy<Value = RawProjectRow> {
    (
        prop_oneof![Just("GS-"), Just("ISS-"), Just("X-")],
        0u8..12,
        prop::option::of(prop_oneof![
            Just("Success"),
            Just("Fail"),
            Just("In Progress"),
            Just("Negotiation"),
        ]),
        prop::option::of(0u32..500_000),
        prop::option::of(0u32..500_000),
    )
        .prop_map(|(prefix, n, status, price, cost)| RawProjectRow {
            project_code: Some(format!("{prefix}{n}")),
            project_name: None,
            project_type: None,
            status: status.map(str::to_string),
            contract_price: price.map(|v| v.to_string()),
            purchase_cost: cost.map(|v| v.to_string()),
        })
}

fn timesheet_row() -> impl Strategy<Value = RawTimesheetRow> {
    (
        prop_oneof![Just("GS-"), Just("ISS-"), Just("X-")],
        0u8..14,
        prop_oneof![Just("Design"), Just("Build"), Just("QA")],
        0u32..400,
    )
        .prop_map(|(prefix, n, dept, quarter_hours)| RawTimesheetRow {
            project_code: Some(format!("{prefix}{n}")),
            department: Some(dept.to_string()),
            hours: Some(format!("{}", quarter_hours as f64 / 4.0)),
            ..RawTimesheetRow::default()
        })
}

proptest! {
    #[test]
    fn shuffled_input_gives_identical_scalars(
        projects in prop::collection::vec(project_row(), 0..30),
        entries in prop::collection::vec(timesheet_row(), 0..60),
        seed in any::<u64>(),
    ) {
        let cfg = config();
        let a = analyze(&projects, &entries, &cfg);

        let mut p2 = projects.clone();
        let mut e2 = entries.clone();
        // Deterministic shuffle: rotate and reverse.
        if !p2.is_empty() {
            let k = (seed as usize) % p2.len();
            p2.rotate_left(k);
        }
        if !e2.is_empty() {
            let k = (seed as usize) % e2.len();
            e2.rotate_left(k);
        }
        e2.reverse();
        let b = analyze(&p2, &e2, &cfg);

        prop_assert_eq!(
            serde_json::to_string(&a.totals).unwrap(),
            serde_json::to_string(&b.totals).unwrap()
        );
        prop_assert_eq!(
            serde_json::to_string(&a.efficiency).unwrap(),
            serde_json::to_string(&b.efficiency).unwrap()
        );
        prop_assert_eq!(a, b);
    }

    #[test]
    fn groupings_partition_every_project(
        projects in prop::collection::vec(project_row(), 0..30),
        entries in prop::collection::vec(timesheet_row(), 0..60),
    ) {
        let r = analyze(&projects, &entries, &config());

        let type_total: usize = r.by_type.iter().map(|t| t.count).sum();
        prop_assert_eq!(type_total, r.projects.len());
        let distinct: BTreeSet<ProjectType> = r.by_type.iter().map(|t| t.project_type).collect();
        prop_assert_eq!(distinct.len(), r.by_type.len());

        let gs = r.projects.iter().filter(|p| p.project_type == ProjectType::Gs).count();
        let status_total: usize = r.gs_by_status.iter().map(|s| s.count).sum();
        prop_assert_eq!(status_total, gs);

        let p = &r.efficiency.percentiles;
        prop_assert!(p.p25 <= p.p50 && p.p50 <= p.p75 && p.p75 <= p.p90);
    }

    #[test]
    fn department_hours_cover_every_entry(
        projects in prop::collection::vec(project_row(), 0..30),
        entries in prop::collection::vec(timesheet_row(), 0..60),
    ) {
        let r = analyze(&projects, &entries, &config());
        let rolled: f64 = r.departments.values().map(|d| d.total_hours).sum();
        // Quarter hours sum exactly in f64 at these magnitudes.
        let raw: f64 = entries
            .iter()
            .filter_map(|e| e.hours.as_deref())
            .map(|h| h.parse::<f64>().unwrap())
            .sum();
        prop_assert_eq!(rolled, raw);
        prop_assert_eq!(r.totals.total_project_hours + r.totals.orphan_hours, raw);
    }
}
