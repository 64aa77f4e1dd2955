//! Rendering a [`ResultTable`] to the terminal or to a results file.

use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::table::ResultTable;

const DATETIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Where a table goes once a pipeline has produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// One line per row, cells separated by a space.
    #[default]
    Lines,
    /// Bordered, left-aligned table.
    Pretty,
    /// CSV file under the results directory.
    File,
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to write results to {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to print results: {0}")]
    Stdout(#[from] io::Error),
}

/// Send `table` to its destination. Returns the file path for
/// [`OutputMode::File`].
pub fn emit(
    table: &ResultTable,
    mode: OutputMode,
    kind: &str,
    results_dir: &Path,
) -> Result<Option<PathBuf>, OutputError> {
    match mode {
        OutputMode::Lines => {
            print_to_stdout(&render_lines(table))?;
            Ok(None)
        }
        OutputMode::Pretty => {
            print_to_stdout(&render_pretty(table))?;
            Ok(None)
        }
        OutputMode::File => write_results_file(table, kind, results_dir, Local::now()).map(Some),
    }
}

fn print_to_stdout(text: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    out.write_all(text.as_bytes())?;
    out.flush()
}

/// Header first, then each row; cells joined by a single space.
pub fn render_lines(table: &ResultTable) -> String {
    let mut out = String::new();
    for row in table.all_rows() {
        out.push_str(&row.join(" "));
        out.push('\n');
    }
    out
}

/// Box table with a rule under the header:
///
/// ```text
/// +--------+-------+
/// | status | count |
/// +--------+-------+
/// | Final  | 2     |
/// +--------+-------+
/// ```
pub fn render_pretty(table: &ResultTable) -> String {
    let mut widths: Vec<usize> = table.header().iter().map(|h| h.chars().count()).collect();
    for row in table.rows() {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let rule: String = widths
        .iter()
        .map(|w| format!("+{}", "-".repeat(w + 2)))
        .chain(std::iter::once("+\n".to_string()))
        .collect();
    let line = |row: &[String]| -> String {
        let mut line = String::new();
        for (cell, width) in row.iter().zip(&widths) {
            let pad = width - cell.chars().count();
            line.push_str("| ");
            line.push_str(cell);
            line.push_str(&" ".repeat(pad + 1));
        }
        line.push_str("|\n");
        line
    };

    let mut out = String::new();
    out.push_str(&rule);
    out.push_str(&line(table.header()));
    out.push_str(&rule);
    for row in table.rows() {
        out.push_str(&line(row.as_slice()));
    }
    if !table.is_empty() {
        out.push_str(&rule);
    }
    out
}

/// Write one CSV row with every field quoted and a `\n` terminator.
pub fn write_row<W: Write>(mut w: W, row: &[String]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            w.write_all(b",")?;
        } else {
            first = false;
        }
        write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
    }
    w.write_all(b"\n")
}

pub fn write_csv<W: Write>(mut w: W, table: &ResultTable) -> io::Result<()> {
    for row in table.all_rows() {
        write_row(&mut w, row)?;
    }
    w.flush()
}

pub fn results_file_name(kind: &str, now: DateTime<Local>) -> String {
    format!("{}_{}.csv", kind, now.format(DATETIME_FORMAT))
}

/// Write `table` as CSV to `results_dir/<kind>_<timestamp>.csv`, creating the
/// directory if needed.
pub fn write_results_file(
    table: &ResultTable,
    kind: &str,
    results_dir: &Path,
    now: DateTime<Local>,
) -> Result<PathBuf, OutputError> {
    let path = results_dir.join(results_file_name(kind, now));
    let write_err = |source: io::Error| OutputError::Write {
        path: path.clone(),
        source,
    };

    fs::create_dir_all(results_dir).map_err(write_err)?;
    let file = File::create(&path).map_err(write_err)?;
    write_csv(BufWriter::new(file), table).map_err(write_err)?;

    info!(path = %path.display(), rows = table.len(), "results saved");
    Ok(path)
}
