//! Datastore commands and the YAML command files that list them.
//!
//! ```yaml
//! - kind: ReadTableFromDatastore
//!   name: recent-flows
//!   spec:
//!     datastore: hydro
//!     table: obs
//!     columns: station, flow
//!     orderBy: id DESC
//!     top: 10
//!     rowCountProperty: FlowRows
//! ```

mod read_table;
mod run_sql;
mod template;

pub use read_table::ReadTableSpec;
pub use run_sql::RunSqlSpec;
pub use template::expand_template;

use crate::builder::{
    build_routine_call, build_select_sql, build_sql, build_table_query, check_routine_arguments,
};
use crate::context::ProcessorContext;
use crate::error::{CommandError, CommandFileError};
use crate::invocation::{CommandLog, CommandReport};
use crate::mapper::map_result_set;
use crate::query::{QueryParameters, QuerySource, TableQuery};
use crate::signature::RoutineSignature;
use crate::sql_text::starts_with_select;

use datastore::{Datastore, Execution, ResultTable, RoutineKind, Statement, Value};
use diagnostics::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// One entry of a command file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandDoc<T> {
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
    pub spec: T,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind")]
pub enum Command {
    ReadTableFromDatastore(CommandDoc<ReadTableSpec>),
    RunSql(CommandDoc<RunSqlSpec>),
}

impl Command {
    pub fn name(&self) -> &str {
        match self {
            Command::ReadTableFromDatastore(doc) => &doc.name,
            Command::RunSql(doc) => &doc.name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Command::ReadTableFromDatastore(_) => "ReadTableFromDatastore",
            Command::RunSql(_) => "RunSql",
        }
    }

    pub fn run(&self, ctx: &mut ProcessorContext) -> CommandReport {
        match self {
            Command::ReadTableFromDatastore(doc) => doc.spec.run(&doc.name, ctx),
            Command::RunSql(doc) => doc.spec.run(&doc.name, ctx),
        }
    }
}

/// Runs `commands` in order. A failed command does not stop the ones after it.
pub fn run_all(commands: &[Command], ctx: &mut ProcessorContext) -> Vec<CommandReport> {
    commands
        .iter()
        .map(|command| {
            let report = command.run(ctx);
            let status = report.status().to_string();
            info!(
                "{kind} {name}: {status}",
                kind: command.kind(),
                name: command.name(),
                status: status.as_str()
            );
            report
        })
        .collect()
}

pub fn parse_commands(
    text: &str,
    vars: &BTreeMap<String, String>,
) -> Result<Vec<Command>, CommandFileError> {
    let expanded = expand_template(text, vars)?;
    Ok(serde_yaml_ng::from_str(&expanded)?)
}

pub fn open_command_file<P: AsRef<Path>>(
    path: P,
    vars: &BTreeMap<String, String>,
) -> Result<Vec<Command>, CommandFileError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| CommandFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_commands(&text, vars)
}

/// A scalar written in YAML, kept as the text a user would have typed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParamText {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl fmt::Display for ParamText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamText::Text(s) => f.write_str(s),
            ParamText::Integer(i) => write!(f, "{i}"),
            ParamText::Float(x) => write!(f, "{x}"),
            ParamText::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// A query source after validation: signatures parsed and SQL files read.
#[derive(Debug)]
pub(crate) enum Source {
    Table(TableQuery),
    Sql(String),
    Routine {
        kind: RoutineKind,
        signature: RoutineSignature,
        values: BTreeMap<String, String>,
    },
}

impl Source {
    pub(crate) fn is_function(&self) -> bool {
        matches!(
            self,
            Source::Routine {
                kind: RoutineKind::Function,
                ..
            }
        )
    }
}

/// Expands `${Name}` in one field; each unresolved name is logged as a warning.
pub(crate) fn expand_field(
    ctx: &ProcessorContext,
    log: &mut CommandLog,
    field: &str,
    text: &str,
) -> String {
    let (text, unresolved) = ctx.expand(text);
    for name in unresolved {
        log.warning(format!("{field}: no value for property ${{{name}}}"));
    }
    text
}

pub(crate) fn expand_optional(
    ctx: &ProcessorContext,
    log: &mut CommandLog,
    field: &str,
    text: Option<&str>,
) -> Option<String> {
    text.map(|t| expand_field(ctx, log, field, t))
        .filter(|t| !t.trim().is_empty())
}

fn expand_parameters(
    ctx: &ProcessorContext,
    log: &mut CommandLog,
    params: &QueryParameters,
) -> QueryParameters {
    let mut field =
        |name: &str, value: &Option<String>| expand_optional(ctx, log, name, value.as_deref());
    QueryParameters {
        catalog: field("catalog", &params.catalog),
        schema: field("schema", &params.schema),
        table: field("table", &params.table),
        columns: field("columns", &params.columns),
        order_by: field("orderBy", &params.order_by),
        top: params.top,
        sql: field("sql", &params.sql),
        sql_file: field("sqlFile", &params.sql_file),
        function: field("function", &params.function),
        procedure: field("procedure", &params.procedure),
    }
}

fn expand_values(
    ctx: &ProcessorContext,
    log: &mut CommandLog,
    field: &str,
    values: &BTreeMap<String, ParamText>,
) -> BTreeMap<String, String> {
    values
        .iter()
        .map(|(name, value)| {
            let label = format!("{field}.{name}");
            (name.clone(), expand_field(ctx, log, &label, &value.to_string()))
        })
        .collect()
}

/// Checks the query parameters and turns them into a [`Source`].
pub(crate) fn validate_source(
    ctx: &ProcessorContext,
    log: &mut CommandLog,
    params: &QueryParameters,
    function_parameters: &BTreeMap<String, ParamText>,
    procedure_parameters: &BTreeMap<String, ParamText>,
    select_only: bool,
) -> Result<Source, CommandError> {
    let params = expand_parameters(ctx, log, params);
    let source = QuerySource::from_parameters(&params)?;

    if !matches!(source, QuerySource::Function(_)) && !function_parameters.is_empty() {
        return Err(CommandError::validation(
            "functionParameters given but no function is specified",
        ));
    }
    if !matches!(source, QuerySource::Procedure(_)) && !procedure_parameters.is_empty() {
        return Err(CommandError::validation(
            "procedureParameters given but no procedure is specified",
        ));
    }

    let source = match source {
        QuerySource::Table(query) => Source::Table(query),
        QuerySource::Sql(sql) => Source::Sql(sql),
        QuerySource::SqlFile(file) => {
            let path = ctx.resolve_path(&file);
            let text = std::fs::read_to_string(&path).map_err(|e| {
                CommandError::validation(format!(
                    "could not read SQL file \"{}\": {e}",
                    path.display()
                ))
            })?;
            let shown = path.display().to_string();
            debug!("Read SQL file {path}", path: shown.as_str());
            Source::Sql(expand_field(ctx, log, "sqlFile contents", &text))
        }
        QuerySource::Function(text) => {
            let values = expand_values(ctx, log, "functionParameters", function_parameters);
            routine_source(RoutineKind::Function, &text, values)?
        }
        QuerySource::Procedure(text) => {
            let values = expand_values(ctx, log, "procedureParameters", procedure_parameters);
            routine_source(RoutineKind::Procedure, &text, values)?
        }
    };

    if select_only && matches!(&source, Source::Sql(text) if !starts_with_select(text)) {
        return Err(CommandError::validation(
            "SQL must start with SELECT (comments and whitespace are ignored)",
        ));
    }
    Ok(source)
}

fn routine_source(
    kind: RoutineKind,
    text: &str,
    values: BTreeMap<String, String>,
) -> Result<Source, CommandError> {
    let signature = RoutineSignature::parse(text)?;
    check_routine_arguments(&signature, &values)?;
    Ok(Source::Routine {
        kind,
        signature,
        values,
    })
}

pub(crate) fn lookup_datastore<'a>(
    ctx: &'a ProcessorContext,
    name: &str,
) -> Result<&'a Datastore, CommandError> {
    ctx.datastores.lookup(name).map_err(|e| {
        CommandError::lookup(format!("datastore \"{name}\" is not available"), Some(e))
    })
}

/// Builds the statement for `source`. With `select_only`, literal SQL must be
/// a SELECT.
pub(crate) fn build_statement(
    store: &Datastore,
    source: &Source,
    select_only: bool,
) -> Result<Statement, CommandError> {
    match source {
        Source::Table(query) => build_table_query(store.client(), query),
        Source::Sql(text) if select_only => build_select_sql(text, store.strips_block_comments()),
        Source::Sql(text) => build_sql(text, store.strips_block_comments()),
        Source::Routine {
            kind,
            signature,
            values,
        } => build_routine_call(store.client(), *kind, signature, values),
    }
}

pub(crate) fn execute(store: &Datastore, statement: &Statement) -> Result<Execution, CommandError> {
    let text = statement.to_string();
    debug!("Executing on {store}: {statement}", store: store.name(), statement: text.as_str());
    store
        .client()
        .execute(statement)
        .map_err(|source| CommandError::Execution {
            statement: statement.to_string(),
            source,
        })
}

/// Maps the execution's result set, if any, into a table named `table_id`.
pub(crate) fn map_execution(
    execution: Execution,
    table_id: &str,
    log: &mut CommandLog,
) -> Result<(Option<ResultTable>, Option<Value>), CommandError> {
    let table = match execution.result_set {
        Some(result_set) => {
            let (table, warnings) = map_result_set(result_set, table_id)?;
            log.warnings(warnings);
            Some(table)
        }
        None => None,
    };
    Ok((table, execution.return_value))
}
