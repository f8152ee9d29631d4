// Entry point and high-level CLI flow.
//
// - Option [1] loads every payload found in the data directory.
// - Option [2] normalises the loaded payloads, writes CSV reports plus the
//   chart data and summary as JSON, and previews each report.
// - After generating reports the user can go back to the menu or exit.
use budget_adaptors::config::{ReportConfig, DEFAULT_LOG_FILTER};
use budget_adaptors::loader::{self, Payloads};
use budget_adaptors::reports::{self, ChartData};
use budget_adaptors::{output, util, BudgetError, PhaseOrder, Result, PROVINCES};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::sync::{Mutex, MutexGuard};
use tabled::Tabled;
use tracing::{error, info};

// Payloads are loaded once and can be reported on several times per run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { payloads: None }));

struct AppState {
    payloads: Option<Payloads>,
}

fn app_state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Read one trimmed line. `None` at end of input or on a read error.
fn read_line_from<R: BufRead>(input: &mut R) -> Option<String> {
    let mut buf = String::new();
    match input.read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn read_choice<R: BufRead>(input: &mut R) -> Option<String> {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    read_line_from(input)
}

/// Returns `true` if the user chose `Y`; `N` or end of input returns `false`.
fn prompt_back_to_menu<R: BufRead>(input: &mut R) -> bool {
    loop {
        print!("Back to Report Selection (Y/N): ");
        let _ = io::stdout().flush();
        let Some(answer) = read_line_from(input) else {
            return false;
        };
        match answer.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn handle_load(config: &ReportConfig) {
    match loader::load_payloads(config) {
        Ok((payloads, load_report)) => {
            println!(
                "Loaded {} payload files from {} ({} missing).",
                util::format_int(load_report.files_loaded),
                config.data_dir.display(),
                util::format_int(load_report.files_missing)
            );
            if load_report.parse_errors > 0 {
                println!(
                    "Note: {} CSV rows skipped due to parse/validation errors.",
                    util::format_int(load_report.parse_errors)
                );
            }
            println!();
            app_state().payloads = Some(payloads);
        }
        Err(e) => {
            error!("Failed to load payloads: {}", e);
            eprintln!("Failed to load payloads: {}\n", e);
        }
    }
}

/// Write one CSV report and preview it. Returns `false` if nothing was written.
fn export_report<T>(
    config: &ReportConfig,
    key: &str,
    title: &str,
    rows: &[T],
    preview: usize,
) -> bool
where
    T: Serialize + Tabled + Clone,
{
    let Some(path) = config.report_path(key) else {
        return false;
    };
    if let Err(e) = output::write_csv(&path, rows) {
        error!("Write error for {}: {}", path.display(), e);
        eprintln!("Could not export {}: {}\n", title, e);
        return false;
    }
    println!("{}\n", title);
    output::preview_table_rows(rows, preview);
    println!("(Full table exported to {})\n", path.display());
    true
}

fn write_reports(config: &ReportConfig, payloads: &Payloads, data: &ChartData) -> Result<()> {
    if let Some(series) = &data.expenditure_phase {
        let rows = reports::phase_rows(series);
        export_report(config, "expenditure_phase", "Expenditure by Financial Year", &rows, 5);
    }
    if let Some(multiples) = &data.expenditure_multiples {
        let rows = reports::multiples_rows(multiples);
        export_report(config, "expenditure_multiples", "Expenditure by Phase", &rows, 8);
    }
    if let Some(grouping) = &data.provinces {
        let rows = reports::province_rows(grouping);
        export_report(config, "provinces", "Provincial Department Budgets", &rows, 9);
    }
    if let Some(treemap) = &data.treemap {
        let rows = reports::treemap_rows(treemap);
        export_report(config, "treemap", "Treemap (Top Level)", &rows, 5);
    }
    if let Some(ratios) = &data.ratios {
        let rows = reports::ratio_rows(ratios);
        export_report(config, "ratios", "Bar Chart Ratios", &rows, 5);
    }

    let missing = |key: &str| BudgetError::DegenerateInput(format!("no report file for '{}'", key));
    let chart_path = config.report_path("chart_data").ok_or_else(|| missing("chart_data"))?;
    output::write_json(&chart_path, data)?;

    let summary = reports::generate_summary(payloads, data);
    let summary_path = config.report_path("summary").ok_or_else(|| missing("summary"))?;
    output::write_json(&summary_path, &summary)?;
    println!("Summary Stats ({}):", summary_path.display());
    println!(
        "{{\"years_covered\": {}, \"provincial_total\": {}, \"rejected_records\": {}}}\n",
        summary.years_covered,
        util::format_number(summary.provincial_total, 2),
        summary.rejected_records
    );
    Ok(())
}

fn handle_generate_reports(config: &ReportConfig) {
    let payloads = app_state().payloads.clone();
    let Some(payloads) = payloads.filter(|p| !p.is_empty()) else {
        println!("Error: No payloads loaded. Please load the data directory first (option 1).\n");
        return;
    };

    println!("Generating reports...\n");
    let data = reports::generate_chart_data(&payloads, &PhaseOrder::standard(), &PROVINCES);
    if let Err(e) = write_reports(config, &payloads, &data) {
        error!("Report generation failed: {}", e);
        eprintln!("Report generation failed: {}\n", e);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();

    let config = ReportConfig::from_env();
    info!(
        "Reading payloads from {}, writing reports to {}",
        config.data_dir.display(),
        config.output_dir.display()
    );

    let mut input = io::stdin().lock();
    loop {
        println!("Budget Chart Data:");
        println!("[1] Load payloads");
        println!("[2] Generate Reports\n");
        let Some(choice) = read_choice(&mut input) else {
            println!("\nExiting the program.");
            break;
        };
        match choice.as_str() {
            "1" => handle_load(&config),
            "2" => {
                println!();
                handle_generate_reports(&config);
                if !prompt_back_to_menu(&mut input) {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1 or 2.\n"),
        }
    }
}
