use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use datastore::DatastoreRegistry;
use diagnostics::*;
use sqlcmd::{CommandReport, ProcessorContext, Severity, Status, open_command_file, run_all};

use crate::common::{OutputFormat, to_map};
use crate::output::write_table;

/// Options for `tsql run`.
pub struct RunOptions<'a> {
    pub command_file: &'a Path,
    pub vars: &'a [(String, String)],
    pub properties: &'a [(String, String)],
    pub format: OutputFormat,
}

/// Run every command in a command file. Returns false when any command failed.
pub fn run_command<W: Write>(
    out: &mut W,
    datastores: DatastoreRegistry,
    options: &RunOptions<'_>,
) -> Result<bool> {
    let commands = open_command_file(options.command_file, &to_map(options.vars))
        .with_context(|| format!("Failed to load {}", options.command_file.display()))?;
    let shown = options.command_file.display().to_string();
    info!(
        "Running {count} commands from {file}",
        count: commands.len(),
        file: shown.as_str()
    );

    let working_dir = options
        .command_file
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let mut ctx = ProcessorContext::new(datastores, working_dir);
    for (name, value) in options.properties {
        ctx.properties.set(name.as_str(), value.as_str());
    }

    let reports = run_all(&commands, &mut ctx);
    for report in &reports {
        write_report(out, report)?;
    }

    for table in ctx.tables.iter() {
        writeln!(out)?;
        writeln!(out, "Table {}:", table.id())?;
        write_table(out, table, options.format)?;
    }

    if !ctx.properties.is_empty() {
        writeln!(out)?;
        writeln!(out, "Properties:")?;
        for (name, value) in ctx.properties.iter() {
            writeln!(out, "  {name} = {value}")?;
        }
    }

    Ok(reports.iter().all(|r| r.status() != Status::Failure))
}

fn write_report<W: Write>(out: &mut W, report: &CommandReport) -> Result<()> {
    writeln!(out, "{:<8} {}", report.status(), report.command)?;
    for entry in &report.entries {
        let tag = match entry.severity {
            Severity::Warning => "warning",
            Severity::Failure => "error",
        };
        writeln!(out, "  {tag} ({}): {}", entry.phase, entry.message)?;
    }
    Ok(())
}
