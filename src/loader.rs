use crate::config::ReportConfig;
use crate::error::{BudgetError, Result};
use crate::types::{
    Amount, DepartmentsPayload, ExpenditurePhasePayload, FinancialRecord, RatioInput, RawRecordRow,
    SmallMultiplesGroup, TreemapPayload,
};
use crate::util::{parse_f64_safe, parse_financial_year};
use csv::ReaderBuilder;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub files_loaded: usize,
    pub files_missing: usize,
    pub total_rows: usize,
    pub parse_errors: usize,
}

/// Every payload the report CLI knows about. Absent files stay `None`.
#[derive(Debug, Clone, Default)]
pub struct Payloads {
    pub expenditure_phase: Option<ExpenditurePhasePayload>,
    pub expenditure_multiples: Option<Vec<FinancialRecord>>,
    pub economic_classification: Option<Vec<SmallMultiplesGroup>>,
    pub provincial_departments: Option<DepartmentsPayload>,
    pub treemap: Option<TreemapPayload>,
    pub ratios: Option<Vec<RatioInput>>,
}

impl Payloads {
    pub fn is_empty(&self) -> bool {
        self.expenditure_phase.is_none()
            && self.expenditure_multiples.is_none()
            && self.economic_classification.is_none()
            && self.provincial_departments.is_none()
            && self.treemap.is_none()
            && self.ratios.is_none()
    }
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Reject any record whose year label is not `YYYY-YY`.
pub fn check_financial_years(records: &[FinancialRecord]) -> Result<()> {
    for r in records {
        parse_financial_year(&r.financial_year)?;
    }
    Ok(())
}

fn parse_record(index: usize, row: RawRecordRow) -> Result<FinancialRecord> {
    let financial_year = row
        .financial_year
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(BudgetError::MissingField {
            record: index,
            field: "financial_year",
        })?;
    parse_financial_year(&financial_year)?;
    let phase = row
        .phase
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(BudgetError::MissingField {
            record: index,
            field: "phase",
        })?;

    // an empty amount cell is a valid null; other text is kept as-is
    let amount = row.amount.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(|cell| {
        parse_f64_safe(Some(cell))
            .map(Amount::Number)
            .unwrap_or_else(|| Amount::Other(serde_json::Value::String(cell.to_string())))
    });

    Ok(FinancialRecord {
        amount,
        financial_year,
        phase,
        province: row.province.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
        slug: row.slug.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
    })
}

/// Load a flat `financial_year,phase,amount` CSV. Rows that cannot be parsed
/// are counted and skipped; row order is preserved.
pub fn load_records_csv(path: &Path) -> Result<(Vec<FinancialRecord>, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut report = LoadReport::default();
    let mut records = Vec::new();

    for (index, result) in rdr.deserialize::<RawRecordRow>().enumerate() {
        report.total_rows += 1;
        let parsed = result.map_err(BudgetError::from).and_then(|row| parse_record(index, row));
        match parsed {
            Ok(r) => records.push(r),
            Err(e) => {
                warn!("Skipping row {} of {}: {}", index + 1, path.display(), e);
                report.parse_errors += 1;
            }
        }
    }
    report.files_loaded = 1;
    Ok((records, report))
}

fn load_optional<T: DeserializeOwned>(path: &Path, report: &mut LoadReport) -> Result<Option<T>> {
    if !path.exists() {
        debug!("No payload at {}", path.display());
        report.files_missing += 1;
        return Ok(None);
    }
    let value = load_json(path)?;
    info!("Loaded {}", path.display());
    report.files_loaded += 1;
    Ok(Some(value))
}

/// Load every payload present in the configured data directory.
///
/// Missing files are skipped; a file that exists but does not decode is an error.
pub fn load_payloads(config: &ReportConfig) -> Result<(Payloads, LoadReport)> {
    let mut report = LoadReport::default();
    let path = |key: &str| {
        config
            .payload_path(key)
            .ok_or_else(|| BudgetError::DegenerateInput(format!("no payload file for '{}'", key)))
    };

    let expenditure_phase: Option<ExpenditurePhasePayload> =
        load_optional(&path("expenditure_phase")?, &mut report)?;
    if let Some(p) = &expenditure_phase {
        check_financial_years(&p.nominal)?;
        check_financial_years(&p.real)?;
    }

    let mut expenditure_multiples: Option<Vec<FinancialRecord>> =
        load_optional(&path("expenditure_multiples")?, &mut report)?;
    if let Some(records) = &expenditure_multiples {
        check_financial_years(records)?;
    } else {
        let csv_path = path("expenditure_multiples_csv")?;
        if csv_path.exists() {
            let (records, csv_report) = load_records_csv(&csv_path)?;
            info!("Loaded {} ({} rows)", csv_path.display(), csv_report.total_rows);
            report.files_loaded += csv_report.files_loaded;
            report.total_rows += csv_report.total_rows;
            report.parse_errors += csv_report.parse_errors;
            expenditure_multiples = Some(records);
        }
    }

    let payloads = Payloads {
        expenditure_phase,
        expenditure_multiples,
        economic_classification: load_optional(&path("economic_classification")?, &mut report)?,
        provincial_departments: load_optional(&path("provincial_departments")?, &mut report)?,
        treemap: load_optional(&path("treemap")?, &mut report)?,
        ratios: load_optional(&path("ratios")?, &mut report)?,
    };
    Ok((payloads, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn csv_rows_keep_nulls_and_skip_bad_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.csv");
        let mut f = File::create(&path).unwrap();
        writeln!(f, "financial_year,phase,amount").unwrap();
        writeln!(f, "2019-20,Main appropriation,\"7,855,371,000\"").unwrap();
        writeln!(f, "2019-20,Adjusted appropriation,").unwrap();
        writeln!(f, ",Final Appropriation,12").unwrap();
        writeln!(f, "2019-21,Audited Outcome,12").unwrap();
        writeln!(f, "2020-21,Audited Outcome,pending").unwrap();
        drop(f);

        let (records, report) = load_records_csv(&path).unwrap();
        assert_eq!(report.total_rows, 5);
        assert_eq!(report.parse_errors, 2);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].amount, Some(Amount::Number(7_855_371_000.0)));
        assert_eq!(records[1].amount, None);
        assert_eq!(
            records[2].amount,
            Some(Amount::Other(serde_json::Value::String("pending".to_string())))
        );
        assert_eq!(records[1].phase, "Adjusted appropriation");
    }

    #[test]
    fn missing_payloads_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("ratios.json"),
            r#"[{"title": "Health", "amount": 10.0}]"#,
        )
        .unwrap();
        let config = ReportConfig {
            data_dir: dir.path().to_path_buf(),
            output_dir: dir.path().join("out"),
        };
        let (payloads, report) = load_payloads(&config).unwrap();
        assert_eq!(report.files_loaded, 1);
        assert_eq!(report.files_missing, 5);
        assert_eq!(payloads.ratios.unwrap()[0].title, "Health");
        assert!(payloads.treemap.is_none());
    }

    #[test]
    fn malformed_year_in_phase_payload_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("expenditure_phase.json"),
            r#"{"nominal": [{"amount": 1.0, "financial_year": "2018", "phase": "Main appropriation"}], "real": []}"#,
        )
        .unwrap();
        let config = ReportConfig {
            data_dir: dir.path().to_path_buf(),
            output_dir: dir.path().join("out"),
        };
        let err = load_payloads(&config).unwrap_err();
        assert!(matches!(err, BudgetError::InvalidFinancialYear(y) if y == "2018"));
    }
}
