//! Datastore access for tsql commands.
//!
//! A datastore is a named database connection. Commands reach the database
//! only through [`DatabaseClient`]: statement execution plus the table, column
//! and routine metadata used to validate identifiers. DuckDB is the backing
//! engine; results come back as arrow batches and are converted into
//! [`ResultTable`]s.

mod client;
mod config;
mod duck;
mod error;
mod metadata;
mod registry;
mod result_set;
mod statement;
mod table;
mod value;

pub use client::DatabaseClient;
pub use config::{DatastoreConfig, DatastoresFile, load_config, parse_config};
pub use duck::DuckDbClient;
pub use error::DatastoreError;
pub use metadata::{ColumnInfo, RoutineInfo, RoutineKind, TableName};
pub use registry::{Datastore, DatastoreRegistry};
pub use result_set::{ResultSet, column_kind};
pub use statement::{Execution, Statement, StatementKind};
pub use table::{ColumnDef, ColumnKind, ResultTable};
pub use value::{BindValue, Value};

// Re-exported so callers build SELECTs against the same sea-query version.
pub use sea_query;
