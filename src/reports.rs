use crate::adaptors::{
    normalise_expenditure_multiples_ordered, normalise_expenditure_phase_ordered,
    normalise_small_multiples,
};
use crate::loader::Payloads;
use crate::ratios::add_ratios;
use crate::treemap::{add_province_to_object, transform_data};
use crate::types::{
    MultiplesMap, MultiplesRow, PhaseOrder, PhaseRow, PhaseSeries, ProvinceGrouping, ProvinceRow,
    RatioItem, RatioRow, SmallMultiples, SummaryStats, Treemap, TreemapRow,
};
use crate::util::{format_amount, format_number};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Everything the chart components consume, one entry per loaded payload.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChartData {
    pub expenditure_phase: Option<PhaseSeries>,
    pub expenditure_multiples: Option<MultiplesMap>,
    pub small_multiples: Option<SmallMultiples>,
    pub provinces: Option<ProvinceGrouping>,
    pub treemap: Option<Treemap>,
    pub ratios: Option<Vec<RatioItem>>,
}

impl ChartData {
    pub fn rejected_records(&self) -> usize {
        self.provinces.as_ref().map_or(0, |p| p.rejected.len())
    }
}

pub fn generate_chart_data(
    payloads: &Payloads,
    order: &PhaseOrder,
    province_names: &[&str],
) -> ChartData {
    let expenditure_multiples = payloads.expenditure_multiples.as_ref().map(|records| {
        let aligned = normalise_expenditure_multiples_ordered(records, order);
        for rejection in &aligned.rejected {
            warn!("Expenditure multiples: {}", rejection);
        }
        aligned.data
    });

    let provinces = payloads.provincial_departments.as_ref().map(|payload| {
        let grouping = add_province_to_object(&payload.items, province_names, payload.total);
        if !grouping.rejected.is_empty() {
            warn!(
                "{} department records were left out of the provincial grouping",
                grouping.rejected.len()
            );
        }
        grouping
    });

    let data = ChartData {
        expenditure_phase: payloads
            .expenditure_phase
            .as_ref()
            .map(|p| normalise_expenditure_phase_ordered(p, order)),
        expenditure_multiples,
        small_multiples: payloads
            .economic_classification
            .as_deref()
            .map(normalise_small_multiples),
        provinces,
        treemap: payloads.treemap.as_ref().map(transform_data),
        ratios: payloads.ratios.as_deref().map(add_ratios),
    };
    info!("Chart data generated");
    data
}

pub fn phase_rows(series: &PhaseSeries) -> Vec<PhaseRow> {
    let years: BTreeSet<&String> = series.nominal.keys().chain(series.real.keys()).collect();
    years
        .into_iter()
        .map(|year| PhaseRow {
            financial_year: year.clone(),
            nominal: format_amount(series.nominal.get(year).and_then(Option::as_ref)),
            real: format_amount(series.real.get(year).and_then(Option::as_ref)),
        })
        .collect()
}

pub fn multiples_rows(data: &MultiplesMap) -> Vec<MultiplesRow> {
    data.iter()
        .flat_map(|(year, amounts)| {
            amounts.iter().enumerate().map(move |(slot, amount)| MultiplesRow {
                financial_year: year.clone(),
                slot,
                amount: format_amount(amount.as_ref()),
            })
        })
        .collect()
}

/// One row per province, largest total first.
pub fn province_rows(grouping: &ProvinceGrouping) -> Vec<ProvinceRow> {
    let mut buckets: Vec<_> = grouping.buckets.values().collect();
    buckets.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    buckets
        .into_iter()
        .map(|b| ProvinceRow {
            province: b.name.clone(),
            departments: b.children.len(),
            total_amount: format_number(b.amount, 2),
            percentage: b
                .percentage
                .map(|p| format_number(p, 2))
                .unwrap_or_else(|| "n/a".to_string()),
        })
        .collect()
}

pub fn treemap_rows(treemap: &Treemap) -> Vec<TreemapRow> {
    treemap
        .items
        .iter()
        .enumerate()
        .map(|(idx, item)| TreemapRow {
            rank: idx + 1,
            name: item.name.clone(),
            amount: format_number(item.amount, 2),
            percentage: item
                .percentage
                .map(|p| format_number(p, 2))
                .unwrap_or_else(|| "n/a".to_string()),
        })
        .collect()
}

pub fn ratio_rows(items: &[RatioItem]) -> Vec<RatioRow> {
    items
        .iter()
        .map(|i| RatioRow {
            title: i.title.clone(),
            amount: format_number(i.amount, 2),
            ratio: format_number(i.ratio, 2),
        })
        .collect()
}

pub fn generate_summary(payloads: &Payloads, data: &ChartData) -> SummaryStats {
    let years_covered = data
        .expenditure_phase
        .as_ref()
        .map_or(0, |s| s.nominal.len().max(s.real.len()));
    let (provinces_with_data, provincial_total) = data.provinces.as_ref().map_or((0, 0.0), |p| {
        (
            p.buckets.values().filter(|b| !b.children.is_empty()).count(),
            p.buckets.values().map(|b| b.amount).sum(),
        )
    });
    SummaryStats {
        base_financial_year: payloads
            .expenditure_phase
            .as_ref()
            .and_then(|p| p.base_financial_year.clone()),
        years_covered,
        provinces_with_data,
        rejected_records: data.rejected_records(),
        provincial_total,
        treemap_total: data.treemap.as_ref().map(|t| t.total),
    }
}
