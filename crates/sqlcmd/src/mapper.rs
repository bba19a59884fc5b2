//! Result mapping: result sets into tables, tables into properties.

use crate::error::{CommandError, MappingWarning};
use crate::properties::Properties;

use datastore::{ColumnKind, ResultSet, ResultTable, Value};

/// A `column -> property` output pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnProperty {
    pub column: String,
    pub property: String,
}

impl ColumnProperty {
    /// Parses `Col1:Prop1, Col2:Prop2`. A pair without `:` uses the column
    /// name as the property name.
    pub fn parse_list(text: &str) -> Result<Vec<Self>, CommandError> {
        text.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|pair| {
                let (column, property) = pair.split_once(':').unwrap_or((pair, pair));
                let (column, property) = (column.trim(), property.trim());
                if column.is_empty() || property.is_empty() {
                    return Err(CommandError::validation(format!(
                        "output property pair \"{pair}\" must be Column:Property"
                    )));
                }
                Ok(Self {
                    column: column.to_string(),
                    property: property.to_string(),
                })
            })
            .collect()
    }
}

/// Where a command's outputs go.
#[derive(Debug, Clone, Default)]
pub struct OutputTargets {
    pub row_count_property: Option<String>,
    pub column_properties: Vec<ColumnProperty>,
}

pub fn map_result_set(
    result_set: ResultSet,
    table_id: &str,
) -> Result<(ResultTable, Vec<MappingWarning>), CommandError> {
    let table = result_set
        .into_table(table_id)
        .map_err(|source| CommandError::ResultMapping {
            table: table_id.to_string(),
            source,
        })?;

    let mut warnings = Vec::new();
    if let Some(warning) = check_string_widths(&table) {
        warnings.push(warning);
    }
    Ok((table, warnings))
}

/// Flags a table whose string columns all have zero width while rows exist.
pub fn check_string_widths(table: &ResultTable) -> Option<MappingWarning> {
    let mut strings = table
        .columns()
        .iter()
        .filter(|c| c.kind == ColumnKind::String)
        .peekable();
    if table.row_count() == 0 || strings.peek().is_none() {
        return None;
    }
    strings
        .all(|c| c.width == 0)
        .then(|| MappingWarning::ZeroWidthStrings {
            table: table.id().to_string(),
            rows: table.row_count(),
        })
}

/// Writes the row count and single-row column values into `properties`.
///
/// With no table the row count is 0 and column outputs are skipped.
pub fn extract_outputs(
    table: Option<&ResultTable>,
    targets: &OutputTargets,
    properties: &mut Properties,
) -> Vec<MappingWarning> {
    if let Some(name) = &targets.row_count_property {
        properties.set(name.as_str(), table.map_or(0, ResultTable::row_count));
    }

    let mut warnings = Vec::new();
    let Some(table) = table else {
        return warnings;
    };
    if targets.column_properties.is_empty() {
        return warnings;
    }
    if table.row_count() != 1 {
        warnings.push(MappingWarning::NotSingleRow {
            table: table.id().to_string(),
            rows: table.row_count(),
        });
        return warnings;
    }

    for pair in &targets.column_properties {
        match table.column_index(&pair.column) {
            Some(index) => {
                let value = table.value(0, index).cloned().unwrap_or(Value::Null);
                properties.set(pair.property.as_str(), value);
            }
            None => warnings.push(MappingWarning::UnmatchedColumn {
                table: table.id().to_string(),
                column: pair.column.clone(),
                property: pair.property.clone(),
            }),
        }
    }
    warnings
}
