use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tabled::Tabled;

/// A record amount as the API sent it. Numbers are typed; anything else
/// (a placeholder string, say) is kept verbatim. `null` is `None` on the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Other(serde_json::Value),
}

impl Amount {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Amount::Number(v) => Some(*v),
            Amount::Other(_) => None,
        }
    }
}

impl From<f64> for Amount {
    fn from(v: f64) -> Self {
        Amount::Number(v)
    }
}

/// One amount per financial year.
pub type PhaseMap = BTreeMap<String, Option<Amount>>;

/// Per-year amounts, one slot per phase record.
pub type MultiplesMap = BTreeMap<String, Vec<Option<Amount>>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub amount: Option<Amount>,
    pub financial_year: String,
    pub phase: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

/// CSV row for a flat record list. Everything is optional so a bad cell
/// becomes a typed error instead of a deserializer failure.
#[derive(Debug, Deserialize)]
pub struct RawRecordRow {
    pub financial_year: Option<String>,
    pub phase: Option<String>,
    pub amount: Option<String>,
    pub province: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenditurePhasePayload {
    #[serde(default)]
    pub base_financial_year: Option<String>,
    pub nominal: Vec<FinancialRecord>,
    pub real: Vec<FinancialRecord>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PhaseSeries {
    pub nominal: PhaseMap,
    pub real: PhaseMap,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AlignedMultiples {
    pub data: MultiplesMap,
    #[serde(skip)]
    pub rejected: Vec<crate::error::Rejection>,
}

/// Budget phases ordered from lowest to highest priority.
///
/// A later phase supersedes an earlier one for the same year, and the
/// position of a phase is its slot in aligned multiples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseOrder {
    phases: Vec<String>,
}

pub const MAIN_APPROPRIATION: &str = "Main appropriation";
pub const ADJUSTED_APPROPRIATION: &str = "Adjusted appropriation";
pub const FINAL_APPROPRIATION: &str = "Final Appropriation";
pub const AUDITED_OUTCOME: &str = "Audited Outcome";

impl PhaseOrder {
    pub fn new<I, S>(phases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            phases: phases.into_iter().map(Into::into).collect(),
        }
    }

    /// Main, Adjusted, Final, Audited.
    pub fn standard() -> Self {
        Self::new([
            MAIN_APPROPRIATION,
            ADJUSTED_APPROPRIATION,
            FINAL_APPROPRIATION,
            AUDITED_OUTCOME,
        ])
    }

    pub fn rank(&self, phase: &str) -> Option<usize> {
        self.phases.iter().position(|p| p == phase)
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn phases(&self) -> &[String] {
        &self.phases
    }
}

impl Default for PhaseOrder {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmallMultiplesItem {
    pub name: String,
    pub total_budget: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmallMultiplesGroup {
    pub name: String,
    pub items: Vec<SmallMultiplesItem>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SmallMultiples {
    pub data: BTreeMap<String, BTreeMap<String, f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentRecord {
    pub name: String,
    #[serde(default)]
    pub province: Option<String>,
    pub amount: f64,
    pub slug: String,
    #[serde(default)]
    pub percentage_of_total: Option<f64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub sphere: Vec<String>,
}

/// Departments endpoint: `{ total, items }` with a province on each item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentsPayload {
    #[serde(default)]
    pub total: Option<f64>,
    pub items: Vec<DepartmentRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTree {
    pub name: String,
    pub id: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub children: Option<Vec<GroupTree>>,
}

impl GroupTree {
    pub fn leaf(name: impl Into<String>, id: impl Into<String>, amount: f64) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            amount,
            percentage: None,
            url: None,
            children: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvinceBucket {
    pub name: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    pub children: Vec<GroupTree>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProvinceGrouping {
    pub buckets: BTreeMap<String, ProvinceBucket>,
    #[serde(skip)]
    pub rejected: Vec<crate::error::Rejection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreemapItem {
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub percentage_of_total: Option<f64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub children: Option<Vec<TreemapItem>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreemapPayload {
    pub total: f64,
    pub items: Vec<TreemapItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Treemap {
    pub total: f64,
    pub items: Vec<GroupTree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioInput {
    pub title: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioItem {
    pub title: String,
    pub amount: f64,
    pub ratio: f64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct PhaseRow {
    #[serde(rename = "FinancialYear")]
    #[tabled(rename = "FinancialYear")]
    pub financial_year: String,
    #[serde(rename = "Nominal")]
    #[tabled(rename = "Nominal")]
    pub nominal: String,
    #[serde(rename = "Real")]
    #[tabled(rename = "Real")]
    pub real: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MultiplesRow {
    #[serde(rename = "FinancialYear")]
    #[tabled(rename = "FinancialYear")]
    pub financial_year: String,
    #[serde(rename = "Slot")]
    #[tabled(rename = "Slot")]
    pub slot: usize,
    #[serde(rename = "Amount")]
    #[tabled(rename = "Amount")]
    pub amount: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ProvinceRow {
    #[serde(rename = "Province")]
    #[tabled(rename = "Province")]
    pub province: String,
    #[serde(rename = "Departments")]
    #[tabled(rename = "Departments")]
    pub departments: usize,
    #[serde(rename = "TotalAmount")]
    #[tabled(rename = "TotalAmount")]
    pub total_amount: String,
    #[serde(rename = "Percentage")]
    #[tabled(rename = "Percentage")]
    pub percentage: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RatioRow {
    #[serde(rename = "Title")]
    #[tabled(rename = "Title")]
    pub title: String,
    #[serde(rename = "Amount")]
    #[tabled(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "Ratio")]
    #[tabled(rename = "Ratio")]
    pub ratio: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TreemapRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Name")]
    #[tabled(rename = "Name")]
    pub name: String,
    #[serde(rename = "Amount")]
    #[tabled(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "Percentage")]
    #[tabled(rename = "Percentage")]
    pub percentage: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub base_financial_year: Option<String>,
    pub years_covered: usize,
    pub provinces_with_data: usize,
    pub rejected_records: usize,
    pub provincial_total: f64,
    pub treemap_total: Option<f64>,
}
