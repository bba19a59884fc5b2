// Rendering of result tables for the terminal.

use std::io::Write;

use anyhow::Result;
use datastore::{ColumnKind, ResultTable, Value};

use crate::common::OutputFormat;

pub fn write_table<W: Write>(out: &mut W, table: &ResultTable, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => out.write_all(format_table(table).as_bytes())?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, table)?;
            writeln!(out)?;
        }
        OutputFormat::Count => writeln!(out, "{}", table.row_count())?,
    }
    Ok(())
}

/// Fixed-width text rendering. Numbers are right-aligned, everything else
/// left-aligned; nulls print as empty cells.
pub fn format_table(table: &ResultTable) -> String {
    let widths: Vec<usize> = table
        .columns()
        .iter()
        .map(|c| c.width.max(c.name.chars().count()))
        .collect();

    let mut text = String::new();
    let header: Vec<String> = table
        .columns()
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:<w$}", c.name, w = *w))
        .collect();
    push_line(&mut text, &header.join(" | "));

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut text, &rule.join("-+-"));

    for row in table.rows() {
        let cells: Vec<String> = row
            .iter()
            .zip(table.columns())
            .zip(&widths)
            .map(|((value, column), w)| cell(value, column.kind, *w))
            .collect();
        push_line(&mut text, &cells.join(" | "));
    }
    text.push_str(&format!("({} rows)\n", table.row_count()));
    text
}

fn cell(value: &Value, kind: ColumnKind, width: usize) -> String {
    let shown = value.to_string();
    match kind {
        ColumnKind::Integer | ColumnKind::Float => format!("{shown:>width$}"),
        _ => format!("{shown:<width$}"),
    }
}

fn push_line(text: &mut String, line: &str) {
    text.push_str(line.trim_end());
    text.push('\n');
}
