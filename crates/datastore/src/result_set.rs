// Conversion of arrow result batches into ResultTable rows.

use crate::error::DatastoreError;
use crate::table::{ColumnDef, ColumnKind, ResultTable};
use crate::value::Value;

use duckdb::arrow::array::{Array, ArrayRef, AsArray};
use duckdb::arrow::compute::cast;
use duckdb::arrow::datatypes::{DataType, Float64Type, Int64Type, SchemaRef};
use duckdb::arrow::record_batch::RecordBatch;
use duckdb::arrow::util::display::{ArrayFormatter, FormatOptions};

/// A fully drained query result.
#[derive(Debug, Clone)]
pub struct ResultSet {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl ResultSet {
    pub fn new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Self {
        Self { schema, batches }
    }

    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(|b| b.num_rows()).sum()
    }

    /// Value of the first column of the first row, if any.
    pub fn first_value(&self) -> Result<Option<Value>, DatastoreError> {
        let Some(batch) = self.batches.iter().find(|b| b.num_rows() > 0) else {
            return Ok(None);
        };
        if batch.num_columns() == 0 {
            return Ok(None);
        }
        let array = batch.column(0);
        let kind = column_kind(array.data_type());
        Ok(column_values(array, kind)?.into_iter().next())
    }

    /// Converts the batches into a table. Column widths are the widest
    /// displayed value of each column.
    pub fn into_table(self, id: &str) -> Result<ResultTable, DatastoreError> {
        let kinds: Vec<ColumnKind> = self
            .schema
            .fields()
            .iter()
            .map(|f| column_kind(f.data_type()))
            .collect();

        let mut rows: Vec<Vec<Value>> = Vec::with_capacity(self.num_rows());
        for batch in &self.batches {
            let columns = batch
                .columns()
                .iter()
                .zip(&kinds)
                .map(|(array, kind)| column_values(array, *kind))
                .collect::<Result<Vec<_>, _>>()?;

            for r in 0..batch.num_rows() {
                rows.push(columns.iter().map(|c| c[r].clone()).collect());
            }
        }

        let columns = self
            .schema
            .fields()
            .iter()
            .zip(&kinds)
            .enumerate()
            .map(|(i, (field, kind))| ColumnDef {
                name: field.name().clone(),
                kind: *kind,
                width: rows
                    .iter()
                    .map(|row| row[i].display_width())
                    .max()
                    .unwrap_or(0),
            })
            .collect();

        let mut table = ResultTable::new(id, columns);
        for row in rows {
            table.push_row(row);
        }
        Ok(table)
    }
}

pub fn column_kind(data_type: &DataType) -> ColumnKind {
    match data_type {
        DataType::Boolean => ColumnKind::Boolean,
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => ColumnKind::Integer,
        DataType::Float16
        | DataType::Float32
        | DataType::Float64
        | DataType::Decimal128(_, _)
        | DataType::Decimal256(_, _) => ColumnKind::Float,
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => ColumnKind::String,
        DataType::Date32
        | DataType::Date64
        | DataType::Timestamp(_, _)
        | DataType::Time32(_)
        | DataType::Time64(_) => ColumnKind::DateTime,
        _ => ColumnKind::Other,
    }
}

fn column_values(array: &ArrayRef, kind: ColumnKind) -> Result<Vec<Value>, DatastoreError> {
    let values = match kind {
        ColumnKind::Boolean => {
            let bools = array.as_boolean();
            (0..bools.len())
                .map(|i| {
                    if bools.is_null(i) {
                        Value::Null
                    } else {
                        Value::Boolean(bools.value(i))
                    }
                })
                .collect()
        }
        ColumnKind::Integer => {
            let cast = cast(array, &DataType::Int64)?;
            let ints = cast.as_primitive::<Int64Type>();
            (0..ints.len())
                .map(|i| {
                    if ints.is_null(i) {
                        Value::Null
                    } else {
                        Value::Integer(ints.value(i))
                    }
                })
                .collect()
        }
        ColumnKind::Float => {
            let cast = cast(array, &DataType::Float64)?;
            let floats = cast.as_primitive::<Float64Type>();
            (0..floats.len())
                .map(|i| {
                    if floats.is_null(i) {
                        Value::Null
                    } else {
                        Value::Float(floats.value(i))
                    }
                })
                .collect()
        }
        ColumnKind::String => {
            let cast = cast(array, &DataType::Utf8)?;
            let strings = cast.as_string::<i32>();
            (0..strings.len())
                .map(|i| {
                    if strings.is_null(i) {
                        Value::Null
                    } else {
                        Value::Text(strings.value(i).to_string())
                    }
                })
                .collect()
        }
        ColumnKind::DateTime | ColumnKind::Other => {
            let options = FormatOptions::default();
            let formatter = ArrayFormatter::try_new(array.as_ref(), &options)?;
            (0..array.len())
                .map(|i| {
                    if array.is_null(i) {
                        Value::Null
                    } else {
                        Value::Text(formatter.value(i).to_string())
                    }
                })
                .collect()
        }
    };
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use duckdb::arrow::array::{Int32Array, StringArray};
    use duckdb::arrow::datatypes::{Field, Schema};
    use std::sync::Arc;

    fn sample() -> ResultSet {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int32, false),
            Field::new("label", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int32Array::from(vec![7, 12])),
                Arc::new(StringArray::from(vec![Some("north"), None])),
            ],
        )
        .expect("valid batch");
        ResultSet::new(schema, vec![batch])
    }

    #[test]
    fn test_into_table() {
        let rs = sample();
        assert_eq!(rs.num_rows(), 2);
        assert_eq!(rs.first_value().expect("convert"), Some(Value::Integer(7)));

        let table = rs.into_table("stations").expect("convert");
        assert_eq!(table.id(), "stations");
        assert_eq!(table.columns()[0].kind, ColumnKind::Integer);
        assert_eq!(table.columns()[0].width, 2);
        assert_eq!(table.columns()[1].kind, ColumnKind::String);
        assert_eq!(table.columns()[1].width, 5);
        assert_eq!(
            table.rows()[1],
            vec![Value::Integer(12), Value::Null]
        );
    }

    #[test]
    fn test_empty_result() {
        let schema = Arc::new(Schema::new(vec![Field::new("s", DataType::Utf8, true)]));
        let rs = ResultSet::new(schema, Vec::new());
        assert_eq!(rs.first_value().expect("convert"), None);
        let table = rs.into_table("empty").expect("convert");
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.columns()[0].width, 0);
    }
}
