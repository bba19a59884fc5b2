pub mod browse;
pub mod query;
pub mod run;

pub use browse::{columns_command, routines_command, tables_command};
pub use query::query_command;
pub use run::{RunOptions, run_command};
