use crate::error::Result;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    ensure_parent(path)?;
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let s = serde_json::to_string_pretty(value)?;
    fs::write(path, s)?;
    Ok(())
}

/// Render the first `max_rows` rows as a markdown table.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> Option<String>
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return None;
    }
    Some(Table::new(slice).with(Style::markdown()).to_string())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    match render_table(rows, max_rows) {
        Some(table) => println!("{}\n", table),
        None => println!("(no rows)\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RatioRow;

    fn rows() -> Vec<RatioRow> {
        vec![
            RatioRow {
                title: "Health".to_string(),
                amount: "400.00".to_string(),
                ratio: "75.19".to_string(),
            },
            RatioRow {
                title: "Police".to_string(),
                amount: "100.00".to_string(),
                ratio: "18.80".to_string(),
            },
        ]
    }

    #[test]
    fn csv_has_renamed_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ratios.csv");
        write_csv(&path, &rows()).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Title,Amount,Ratio\n"));
        assert!(text.contains("Health,400.00,75.19"));
    }

    #[test]
    fn table_preview_is_truncated() {
        let table = render_table(&rows(), 1).unwrap();
        assert!(table.contains("Health"));
        assert!(!table.contains("Police"));
        assert!(render_table::<RatioRow>(&[], 3).is_none());
    }
}
