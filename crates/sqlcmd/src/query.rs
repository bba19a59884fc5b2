use crate::error::CommandError;
use crate::sql_text::split_list;

use datastore::TableName;

/// Query parameters exactly as they appear in a command.
#[derive(Debug, Clone, Default)]
pub struct QueryParameters {
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub table: Option<String>,
    /// Comma-separated column names; `*` or absent selects all columns.
    pub columns: Option<String>,
    /// Comma-separated column names, each optionally followed by ASC or DESC.
    pub order_by: Option<String>,
    pub top: Option<u64>,
    pub sql: Option<String>,
    pub sql_file: Option<String>,
    pub function: Option<String>,
    pub procedure: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableQuery {
    pub table: TableName,
    /// Empty selects every column.
    pub columns: Vec<String>,
    pub order_by: Vec<String>,
    pub top: Option<u64>,
}

/// Where a command's rows come from. Exactly one mode is ever set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuerySource {
    Table(TableQuery),
    Sql(String),
    SqlFile(String),
    Function(String),
    Procedure(String),
}

impl QuerySource {
    pub fn mode(&self) -> &'static str {
        match self {
            QuerySource::Table(_) => "table",
            QuerySource::Sql(_) => "sql",
            QuerySource::SqlFile(_) => "sqlFile",
            QuerySource::Function(_) => "function",
            QuerySource::Procedure(_) => "procedure",
        }
    }

    pub fn from_parameters(params: &QueryParameters) -> Result<Self, CommandError> {
        let mut set: Vec<(&str, &str)> = Vec::new();
        for (mode, value) in [
            ("table", &params.table),
            ("sql", &params.sql),
            ("sqlFile", &params.sql_file),
            ("function", &params.function),
            ("procedure", &params.procedure),
        ] {
            if let Some(v) = non_blank(value) {
                set.push((mode, v));
            }
        }

        let (mode, value) = match set.as_slice() {
            [] => {
                return Err(CommandError::validation(
                    "one of table, sql, sqlFile, function or procedure must be specified",
                ));
            }
            [single] => *single,
            many => {
                let modes: Vec<&str> = many.iter().map(|(m, _)| *m).collect();
                return Err(CommandError::validation(format!(
                    "only one of table, sql, sqlFile, function or procedure may be specified (found {})",
                    modes.join(", ")
                )));
            }
        };

        Ok(match mode {
            "table" => {
                if params.top == Some(0) {
                    return Err(CommandError::validation("top must be greater than zero"));
                }
                let columns = non_blank(&params.columns)
                    .map(split_list)
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|c| c != "*")
                    .collect();
                QuerySource::Table(TableQuery {
                    table: TableName::new(value)
                        .with_schema(non_blank(&params.schema).map(str::to_string))
                        .with_catalog(non_blank(&params.catalog).map(str::to_string)),
                    columns,
                    order_by: non_blank(&params.order_by).map(split_list).unwrap_or_default(),
                    top: params.top,
                })
            }
            "sql" => QuerySource::Sql(value.to_string()),
            "sqlFile" => QuerySource::SqlFile(value.to_string()),
            "function" => QuerySource::Function(value.to_string()),
            _ => QuerySource::Procedure(value.to_string()),
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
