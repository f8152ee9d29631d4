use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

pub const DATA_DIR_ENV: &str = "BUDGET_DATA_DIR";
pub const OUTPUT_DIR_ENV: &str = "BUDGET_OUTPUT_DIR";
pub const DEFAULT_LOG_FILTER: &str = "budget_adaptors=info,budget_report=info";

/// Payload files read from the data directory, keyed by endpoint shape.
pub fn payload_files() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("expenditure_phase", "expenditure_phase.json"),
        ("expenditure_multiples", "expenditure_multiples.json"),
        ("expenditure_multiples_csv", "expenditure_multiples.csv"),
        ("economic_classification", "economic_classification.json"),
        ("provincial_departments", "provincial_departments.json"),
        ("treemap", "treemap.json"),
        ("ratios", "ratios.json"),
    ])
}

/// Report files written to the output directory.
pub fn report_files() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("expenditure_phase", "report_expenditure_phase.csv"),
        ("expenditure_multiples", "report_expenditure_multiples.csv"),
        ("provinces", "report_provinces.csv"),
        ("treemap", "report_treemap.csv"),
        ("ratios", "report_ratios.csv"),
        ("chart_data", "chart_data.json"),
        ("summary", "summary.json"),
    ])
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl ReportConfig {
    pub fn from_env() -> Self {
        Self {
            data_dir: env::var_os(DATA_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
            output_dir: env::var_os(OUTPUT_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("out")),
        }
    }

    pub fn payload_path(&self, key: &str) -> Option<PathBuf> {
        payload_files().get(key).map(|f| self.data_dir.join(f))
    }

    pub fn report_path(&self, key: &str) -> Option<PathBuf> {
        report_files().get(key).map(|f| self.output_dir.join(f))
    }
}
