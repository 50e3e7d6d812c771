use anyhow::Context;
use lockagent_core::Lock;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print locks as an aligned table, one row per lock.
pub fn print_locks(locks: &[Lock]) {
    const HEADERS: [&str; 5] = ["ID", "STATUS", "NAMESPACE", "WORKFLOW", "LAST CHANGE"];

    let rows: Vec<[String; 5]> = locks
        .iter()
        .map(|lock| {
            [
                lock.id.clone(),
                lock.status
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "-".into()),
                lock.namespace.clone(),
                lock.workflow.clone(),
                lock.last_change
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                    .unwrap_or_else(|| "-".into()),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    println!("{}", render_row(&HEADERS, &widths));
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", rule.join("  "));
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        println!("{}", render_row(&cells, &widths));
    }
}

fn render_row(cells: &[&str], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:w$}"))
        .collect();
    padded.join("  ").trim_end().to_string()
}

/// Atomically write a command result to `path` via a tempfile in the same
/// directory, so readers never observe a partial file.
pub fn write_result(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("cannot create result file in {}", dir.display()))?;
    tmp.write_all(data)?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("failed to write result file {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_result_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("result");
        write_result(&path, b"L100").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "L100");
    }

    #[test]
    fn write_result_replaces_existing_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("result");
        std::fs::write(&path, "old and much longer content").unwrap();
        write_result(&path, b"new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn write_result_fails_for_missing_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing/result");
        assert!(write_result(&path, b"x").is_err());
    }
}
