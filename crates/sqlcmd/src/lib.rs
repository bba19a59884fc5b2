//! SQL commands against datastores.
//!
//! A command validates its parameters, builds one statement (table query,
//! literal SQL, or a routine call bound from a parsed signature), executes
//! it through the datastore's [`datastore::DatabaseClient`], and maps the
//! result into a [`datastore::ResultTable`] and named properties. Each
//! invocation ends in a [`CommandReport`]; failures of one command never
//! stop the commands after it.

mod builder;
mod coerce;
mod commands;
mod context;
mod error;
mod invocation;
mod mapper;
mod properties;
mod query;
mod signature;
mod sql_text;

pub use builder::{
    build_routine_call, build_select_sql, build_sql, build_table_query, check_routine_arguments,
};
pub use coerce::{CoercionKind, bind_parameters, coerce, strip_single_quotes};
pub use commands::{
    Command, CommandDoc, ParamText, ReadTableSpec, RunSqlSpec, expand_template,
    open_command_file, parse_commands, run_all,
};
pub use context::{ProcessorContext, TableRegistry};
pub use error::{CoercionError, CommandError, CommandFileError, MappingWarning, SignatureError};
pub use invocation::{CommandLog, CommandReport, LogEntry, Phase, Severity, Status};
pub use mapper::{ColumnProperty, OutputTargets, check_string_widths, extract_outputs, map_result_set};
pub use properties::{Expanded, Properties, PropertyExpander};
pub use query::{QueryParameters, QuerySource, TableQuery};
pub use signature::{Parameter, RoutineSignature};
pub use sql_text::{returns_rows, split_list, starts_with_select, strip_block_comments};
