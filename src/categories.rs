// Project-type and status comparisons.
//
// Both groupings partition the project list: every project lands in exactly
// one type bucket, and every GS project in exactly one status bucket
// (`Unknown` included). ISS projects carry no status and are left out of the
// status table.
use crate::aggregate::ProjectMetrics;
use crate::types::{ProjectStatus, ProjectType};
use crate::util::average;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeSummary {
    pub project_type: ProjectType,
    pub count: usize,
    pub total_revenue: f64,
    pub total_cost: f64,
    pub total_profit: f64,
    pub total_hours: f64,
    /// Mean of per-project margins, sentinel values included.
    pub average_margin_pct: f64,
    pub average_efficiency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSummary {
    pub status: ProjectStatus,
    pub count: usize,
    pub total_revenue: f64,
    pub total_profit: f64,
    pub average_profit: f64,
    pub average_margin_pct: f64,
    pub total_hours: f64,
}

#[derive(Default)]
struct Acc {
    revenue: f64,
    cost: f64,
    profit: f64,
    hours: f64,
    margins: Vec<f64>,
    efficiencies: Vec<f64>,
}

impl Acc {
    fn add(&mut self, p: &ProjectMetrics) {
        self.revenue += p.revenue;
        self.cost += p.total_cost;
        self.profit += p.profit;
        self.hours += p.total_hours;
        self.margins.push(p.margin_pct);
        self.efficiencies.push(p.efficiency);
    }

    fn count(&self) -> usize {
        self.margins.len()
    }
}

// Callers pass projects sorted by code, so bucket sums are order independent.
fn group_by<K: Ord>(
    projects: &[ProjectMetrics],
    key: impl Fn(&ProjectMetrics) -> Option<K>,
) -> BTreeMap<K, Acc> {
    let mut map: BTreeMap<K, Acc> = BTreeMap::new();
    for p in projects {
        if let Some(k) = key(p) {
            map.entry(k).or_default().add(p);
        }
    }
    map
}

/// Non-empty type buckets in `GS, ISS, Unknown` order.
pub fn compare_by_type(projects: &[ProjectMetrics]) -> Vec<TypeSummary> {
    group_by(projects, |p| Some(p.project_type))
        .into_iter()
        .map(|(project_type, acc)| TypeSummary {
            project_type,
            count: acc.count(),
            total_revenue: acc.revenue,
            total_cost: acc.cost,
            total_profit: acc.profit,
            total_hours: acc.hours,
            average_margin_pct: average(&acc.margins),
            average_efficiency: average(&acc.efficiencies),
        })
        .collect()
}

/// Non-empty status buckets over GS projects, in declaration order.
pub fn compare_gs_by_status(projects: &[ProjectMetrics]) -> Vec<StatusSummary> {
    group_by(projects, |p| (p.project_type == ProjectType::Gs).then_some(p.status))
        .into_iter()
        .map(|(status, acc)| {
            let count = acc.count();
            StatusSummary {
                status,
                count,
                total_revenue: acc.revenue,
                total_profit: acc.profit,
                average_profit: acc.profit / count as f64,
                average_margin_pct: average(&acc.margins),
                total_hours: acc.hours,
            }
        })
        .collect()
}
