use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// One row of the project-financial table as it comes off the sheet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProjectRow {
    #[serde(rename = "ProjectCode")]
    pub project_code: Option<String>,
    #[serde(rename = "ProjectName", default)]
    pub project_name: Option<String>,
    #[serde(rename = "ProjectType", default)]
    pub project_type: Option<String>,
    #[serde(rename = "Status", default)]
    pub status: Option<String>,
    #[serde(rename = "ContractPrice")]
    pub contract_price: Option<String>,
    #[serde(rename = "PurchaseCost")]
    pub purchase_cost: Option<String>,
}

/// One row of the timesheet table as it comes off the sheet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTimesheetRow {
    #[serde(rename = "ProjectCode")]
    pub project_code: Option<String>,
    #[serde(rename = "Department")]
    pub department: Option<String>,
    #[serde(rename = "Hours")]
    pub hours: Option<String>,
    #[serde(rename = "Date", default)]
    pub date: Option<String>,
    #[serde(rename = "Employee", default)]
    pub employee: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ProjectType {
    #[serde(rename = "GS")]
    Gs,
    #[serde(rename = "ISS")]
    Iss,
    Unknown,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Gs => "GS",
            ProjectType::Iss => "ISS",
            ProjectType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declaration order is also the preference order when duplicate rows
/// disagree on status: the earliest known status wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ProjectStatus {
    Success,
    Fail,
    #[serde(rename = "In Progress")]
    InProgress,
    Negotiation,
    Unknown,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Success => "Success",
            ProjectStatus::Fail => "Fail",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::Negotiation => "Negotiation",
            ProjectStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized project-financial row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRecord {
    pub code: String,
    pub name: String,
    pub project_type: ProjectType,
    pub status: ProjectStatus,
    pub revenue: f64,
    /// Purchase cost only; labor is a separate ledger joined in from timesheets.
    pub cost: f64,
}

/// A normalized timesheet row. `labor_cost` is hours times the department rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimesheetEntry {
    pub project_code: String,
    pub department: String,
    pub hours: f64,
    pub hourly_rate: f64,
    pub labor_cost: f64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct FinancialSummaryRow {
    #[serde(rename = "ProjectCode")]
    #[tabled(rename = "ProjectCode")]
    pub project_code: String,
    #[serde(rename = "ProjectName")]
    #[tabled(rename = "ProjectName")]
    pub project_name: String,
    #[serde(rename = "ProjectType")]
    #[tabled(rename = "ProjectType")]
    pub project_type: String,
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: String,
    #[serde(rename = "ContractPrice")]
    #[tabled(rename = "ContractPrice")]
    pub contract_price: String,
    #[serde(rename = "PurchaseCost")]
    #[tabled(rename = "PurchaseCost")]
    pub purchase_cost: String,
    #[serde(rename = "LaborCost")]
    #[tabled(rename = "LaborCost")]
    pub labor_cost: String,
    #[serde(rename = "TotalCost")]
    #[tabled(rename = "TotalCost")]
    pub total_cost: String,
    #[serde(rename = "Profit")]
    #[tabled(rename = "Profit")]
    pub profit: String,
    #[serde(rename = "ProfitMargin")]
    #[tabled(rename = "ProfitMargin")]
    pub profit_margin: String,
    #[serde(rename = "TotalHours")]
    #[tabled(rename = "TotalHours")]
    pub total_hours: String,
    #[serde(rename = "EfficiencyScore")]
    #[tabled(rename = "EfficiencyScore")]
    pub efficiency_score: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DepartmentRow {
    #[serde(rename = "Department")]
    #[tabled(rename = "Department")]
    pub department: String,
    #[serde(rename = "TotalHours")]
    #[tabled(rename = "TotalHours")]
    pub total_hours: String,
    #[serde(rename = "TotalLaborCost")]
    #[tabled(rename = "TotalLaborCost")]
    pub total_labor_cost: String,
    #[serde(rename = "NumProjects")]
    #[tabled(rename = "NumProjects")]
    pub num_projects: usize,
    #[serde(rename = "NumTasks")]
    #[tabled(rename = "NumTasks")]
    pub num_tasks: usize,
    #[serde(rename = "HoursPerProject")]
    #[tabled(rename = "HoursPerProject")]
    pub hours_per_project: String,
    #[serde(rename = "HourlyRate")]
    #[tabled(rename = "HourlyRate")]
    pub hourly_rate: String,
    #[serde(rename = "CostPerHour")]
    #[tabled(rename = "CostPerHour")]
    pub cost_per_hour: String,
    #[serde(rename = "AvgEfficiency")]
    #[tabled(rename = "AvgEfficiency")]
    pub avg_efficiency: String,
    #[serde(rename = "HoursRank")]
    #[tabled(rename = "HoursRank")]
    pub hours_rank: usize,
    #[serde(rename = "ProjectsRank")]
    #[tabled(rename = "ProjectsRank")]
    pub projects_rank: usize,
    /// Blank for departments with no hours.
    #[serde(rename = "CostPerHourRank")]
    #[tabled(rename = "CostPerHourRank")]
    pub cost_per_hour_rank: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ProjectTypeRow {
    #[serde(rename = "ProjectType")]
    #[tabled(rename = "ProjectType")]
    pub project_type: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
    #[serde(rename = "TotalRevenue")]
    #[tabled(rename = "TotalRevenue")]
    pub total_revenue: String,
    #[serde(rename = "TotalProfit")]
    #[tabled(rename = "TotalProfit")]
    pub total_profit: String,
    #[serde(rename = "AvgMargin")]
    #[tabled(rename = "AvgMargin")]
    pub avg_margin: String,
    #[serde(rename = "AvgEfficiency")]
    #[tabled(rename = "AvgEfficiency")]
    pub avg_efficiency: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct StatusRow {
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: String,
    #[serde(rename = "Projects")]
    #[tabled(rename = "Projects")]
    pub count: usize,
    #[serde(rename = "TotalProfit")]
    #[tabled(rename = "TotalProfit")]
    pub total_profit: String,
    #[serde(rename = "AvgProfit")]
    #[tabled(rename = "AvgProfit")]
    pub avg_profit: String,
    #[serde(rename = "AvgMargin")]
    #[tabled(rename = "AvgMargin")]
    pub avg_margin: String,
}
