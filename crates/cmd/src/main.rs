use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use datastore::{RoutineKind, TableName};

use cmd::{
    OutputFormat, RunOptions, columns_command, open_datastores, parse_key_val, query_command,
    routines_command, run_command, tables_command,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "tsql")]
struct Cli {
    /// Datastores file (defaults to the TSQL_DATASTORES environment variable)
    #[arg(short, long, global = true)]
    datastores: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the commands in a command file
    Run {
        /// Command file (YAML list of commands)
        #[arg(short, long)]
        file: PathBuf,

        /// Template variable for the command file (key=value)
        #[arg(short = 'v', long = "var", value_parser = parse_key_val)]
        vars: Vec<(String, String)>,

        /// Initial property value (key=value)
        #[arg(short = 'p', long = "property", value_parser = parse_key_val)]
        properties: Vec<(String, String)>,

        /// How output tables are printed
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// List the tables of a datastore
    Tables {
        #[arg(long)]
        datastore: String,
        #[arg(long)]
        catalog: Option<String>,
        #[arg(long)]
        schema: Option<String>,
    },
    /// List the columns of a table
    Columns {
        #[arg(long)]
        datastore: String,
        /// Table name
        table: String,
        #[arg(long)]
        catalog: Option<String>,
        #[arg(long)]
        schema: Option<String>,
    },
    /// List user-defined functions and procedures as signatures
    Routines {
        #[arg(long)]
        datastore: String,
        #[arg(long, value_enum)]
        kind: Option<RoutineFilter>,
    },
    /// Run an ad hoc SELECT
    Query {
        #[arg(long)]
        datastore: String,
        /// SELECT statement
        sql: String,
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RoutineFilter {
    Function,
    Procedure,
}

impl From<RoutineFilter> for RoutineKind {
    fn from(filter: RoutineFilter) -> Self {
        match filter {
            RoutineFilter::Function => RoutineKind::Function,
            RoutineFilter::Procedure => RoutineKind::Procedure,
        }
    }
}

fn main() -> Result<ExitCode> {
    diagnostics::init_diagnostics();

    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let datastores = open_datastores(cli.datastores)?;
    let ok = match cli.command {
        Commands::Run {
            file,
            vars,
            properties,
            format,
        } => run_command(
            &mut out,
            datastores,
            &RunOptions {
                command_file: &file,
                vars: &vars,
                properties: &properties,
                format,
            },
        )?,
        Commands::Tables {
            datastore,
            catalog,
            schema,
        } => {
            tables_command(
                &mut out,
                &datastores,
                &datastore,
                catalog.as_deref(),
                schema.as_deref(),
            )?;
            true
        }
        Commands::Columns {
            datastore,
            table,
            catalog,
            schema,
        } => {
            let table = TableName::new(table)
                .with_schema(schema)
                .with_catalog(catalog);
            columns_command(&mut out, &datastores, &datastore, table)?;
            true
        }
        Commands::Routines { datastore, kind } => {
            routines_command(&mut out, &datastores, &datastore, kind.map(Into::into))?;
            true
        }
        Commands::Query {
            datastore,
            sql,
            format,
        } => {
            query_command(&mut out, &datastores, &datastore, &sql, format)?;
            true
        }
    };
    out.flush()?;

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
