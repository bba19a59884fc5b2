pub mod commands;
pub mod common;
pub mod output;

pub use commands::{
    RunOptions, columns_command, query_command, routines_command, run_command, tables_command,
};
pub use common::{OutputFormat, open_datastores, parse_key_val};
