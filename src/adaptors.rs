// Chart adaptors: reshape per-year budget records for line and bar charts.
//
// All functions borrow their input and build fresh maps. Keys are financial
// year labels, which sort chronologically in a `BTreeMap`.
use crate::error::{RejectReason, Rejection};
use crate::types::{
    AlignedMultiples, ExpenditurePhasePayload, FinancialRecord, MultiplesMap, PhaseMap,
    PhaseOrder, PhaseSeries, SmallMultiples, SmallMultiplesGroup,
};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Collapse a series into one amount per year. The last record for a year wins.
pub fn last_wins<'a, I>(records: I) -> PhaseMap
where
    I: IntoIterator<Item = &'a FinancialRecord>,
{
    records.into_iter().fold(PhaseMap::new(), |mut acc, r| {
        acc.insert(r.financial_year.clone(), r.amount.clone());
        acc
    })
}

/// Normalise both currency series of an expenditure-by-phase payload.
///
/// Records are taken in input order, so callers that rely on this variant
/// must supply each year's records from lowest to highest phase priority.
pub fn normalise_expenditure_phase(payload: &ExpenditurePhasePayload) -> PhaseSeries {
    debug!(
        "Normalising expenditure phase: {} nominal, {} real records",
        payload.nominal.len(),
        payload.real.len()
    );
    PhaseSeries {
        nominal: last_wins(&payload.nominal),
        real: last_wins(&payload.real),
    }
}

/// Same as [`normalise_expenditure_phase`], but the highest-priority phase in
/// `order` wins for each year regardless of input order. Phases missing from
/// `order` rank below every known phase.
pub fn normalise_expenditure_phase_ordered(
    payload: &ExpenditurePhasePayload,
    order: &PhaseOrder,
) -> PhaseSeries {
    PhaseSeries {
        nominal: last_wins(by_phase_rank(&payload.nominal, order)),
        real: last_wins(by_phase_rank(&payload.real, order)),
    }
}

fn by_phase_rank<'a>(records: &'a [FinancialRecord], order: &PhaseOrder) -> Vec<&'a FinancialRecord> {
    let mut sorted: Vec<&FinancialRecord> = records.iter().collect();
    // stable: records of equal rank keep their relative order
    sorted.sort_by_key(|r| order.rank(&r.phase).map_or(0, |rank| rank + 1));
    sorted
}

/// Group amounts by year, one slot per record in input order. Arrays are
/// neither padded nor aligned across years.
pub fn normalise_expenditure_multiples(records: &[FinancialRecord]) -> MultiplesMap {
    let mut acc = MultiplesMap::new();
    for r in records {
        acc.entry(r.financial_year.clone()).or_default().push(r.amount.clone());
    }
    acc
}

/// Group amounts by year into exactly `order.len()` slots, slot `i` holding
/// the last amount seen for phase `order[i]`.
pub fn normalise_expenditure_multiples_ordered(
    records: &[FinancialRecord],
    order: &PhaseOrder,
) -> AlignedMultiples {
    let mut data = MultiplesMap::new();
    let mut rejected = Vec::new();

    for (index, r) in records.iter().enumerate() {
        let Some(slot) = order.rank(&r.phase) else {
            warn!(
                "Skipping record {} for {}: phase '{}' is not in the phase order",
                index, r.financial_year, r.phase
            );
            rejected.push(Rejection::new(
                index,
                RejectReason::UnrecognizedPhase(r.phase.clone()),
            ));
            continue;
        };
        let slots = data
            .entry(r.financial_year.clone())
            .or_insert_with(|| vec![None; order.len()]);
        slots[slot] = r.amount.clone();
    }

    AlignedMultiples { data, rejected }
}

/// Turn parent groups of `{name, total_budget}` items into a nested map.
/// Duplicate names at either level are last-wins.
pub fn normalise_small_multiples(groups: &[SmallMultiplesGroup]) -> SmallMultiples {
    let data = groups
        .iter()
        .map(|group| {
            let children: BTreeMap<String, f64> = group
                .items
                .iter()
                .map(|item| (item.name.clone(), item.total_budget))
                .collect();
            (group.name.clone(), children)
        })
        .collect();
    SmallMultiples { data }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        Amount, SmallMultiplesItem, ADJUSTED_APPROPRIATION, AUDITED_OUTCOME, FINAL_APPROPRIATION,
        MAIN_APPROPRIATION,
    };

    fn num(v: f64) -> Option<Amount> {
        Some(Amount::Number(v))
    }

    fn rec(year: &str, phase: &str, amount: Option<f64>) -> FinancialRecord {
        FinancialRecord {
            amount: amount.map(Amount::from),
            financial_year: year.to_string(),
            phase: phase.to_string(),
            province: None,
            slug: None,
        }
    }

    #[test]
    fn phase_last_record_for_year_wins() {
        let payload = ExpenditurePhasePayload {
            base_financial_year: Some("2018-19".to_string()),
            nominal: vec![
                rec("2017-18", MAIN_APPROPRIATION, Some(100.0)),
                rec("2017-18", AUDITED_OUTCOME, Some(200.0)),
                rec("2018-19", MAIN_APPROPRIATION, None),
            ],
            real: vec![rec("2017-18", MAIN_APPROPRIATION, Some(90.0))],
        };
        let out = normalise_expenditure_phase(&payload);
        assert_eq!(out.nominal.len(), 2);
        assert_eq!(out.nominal["2017-18"], num(200.0));
        assert_eq!(out.nominal["2018-19"], None);
        assert_eq!(out.real["2017-18"], num(90.0));
    }

    #[test]
    fn phase_empty_series_give_empty_maps() {
        let payload = ExpenditurePhasePayload {
            base_financial_year: None,
            nominal: vec![],
            real: vec![],
        };
        assert_eq!(normalise_expenditure_phase(&payload), PhaseSeries::default());
    }

    #[test]
    fn phase_passes_non_numeric_amounts_through() {
        let payload: ExpenditurePhasePayload = serde_json::from_str(
            r#"{"nominal":[{"financial_year":"2017-18","phase":"Main appropriation","amount":"n/a"}],"real":[]}"#,
        )
        .unwrap();
        let out = normalise_expenditure_phase(&payload);
        assert_eq!(
            out.nominal["2017-18"],
            Some(Amount::Other(serde_json::Value::String("n/a".to_string())))
        );
        assert_eq!(out.nominal["2017-18"].as_ref().and_then(Amount::as_f64), None);

        let multiples = normalise_expenditure_multiples(&payload.nominal);
        assert_eq!(multiples["2017-18"], vec![out.nominal["2017-18"].clone()]);

        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["nominal"]["2017-18"], serde_json::json!("n/a"));
    }

    #[test]
    fn ordered_phase_prefers_highest_priority() {
        let payload = ExpenditurePhasePayload {
            base_financial_year: None,
            nominal: vec![
                rec("2017-18", AUDITED_OUTCOME, Some(300.0)),
                rec("2017-18", MAIN_APPROPRIATION, Some(100.0)),
                rec("2017-18", "Medium Term Estimates", Some(50.0)),
            ],
            real: vec![],
        };
        let out = normalise_expenditure_phase_ordered(&payload, &PhaseOrder::standard());
        assert_eq!(out.nominal["2017-18"], num(300.0));

        // the unordered variant keeps input order
        let plain = normalise_expenditure_phase(&payload);
        assert_eq!(plain.nominal["2017-18"], num(50.0));
    }

    #[test]
    fn multiples_keep_input_order_without_padding() {
        let records = vec![
            rec("2018-19", MAIN_APPROPRIATION, Some(1.0)),
            rec("2017-18", MAIN_APPROPRIATION, Some(2.0)),
            rec("2018-19", ADJUSTED_APPROPRIATION, None),
            rec("2018-19", FINAL_APPROPRIATION, Some(3.0)),
        ];
        let out = normalise_expenditure_multiples(&records);
        assert_eq!(out["2018-19"], vec![num(1.0), None, num(3.0)]);
        assert_eq!(out["2017-18"], vec![num(2.0)]);
    }

    #[test]
    fn ordered_multiples_align_slots_and_reject_unknown_phases() {
        let records = vec![
            rec("2019-20", FINAL_APPROPRIATION, Some(3.0)),
            rec("2019-20", MAIN_APPROPRIATION, Some(1.0)),
            rec("2019-20", "Voted", Some(9.0)),
        ];
        let out = normalise_expenditure_multiples_ordered(&records, &PhaseOrder::standard());
        assert_eq!(out.data["2019-20"], vec![num(1.0), None, num(3.0), None]);
        assert_eq!(
            out.rejected,
            vec![Rejection::new(2, RejectReason::UnrecognizedPhase("Voted".into()))]
        );
    }

    #[test]
    fn small_multiples_duplicate_child_is_last_wins() {
        let groups = vec![SmallMultiplesGroup {
            name: "Transfers".to_string(),
            items: vec![
                SmallMultiplesItem {
                    name: "Households".to_string(),
                    total_budget: 1.0,
                },
                SmallMultiplesItem {
                    name: "Households".to_string(),
                    total_budget: 2.0,
                },
            ],
        }];
        let out = normalise_small_multiples(&groups);
        assert_eq!(out.data["Transfers"].len(), 1);
        assert_eq!(out.data["Transfers"]["Households"], 2.0);
    }
}
