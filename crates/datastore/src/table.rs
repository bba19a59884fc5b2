use crate::value::Value;
use serde::Serialize;

/// Semantic type of a result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Boolean,
    Integer,
    Float,
    String,
    DateTime,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDef {
    pub name: String,
    pub kind: ColumnKind,
    /// Display width reported for the column, in characters.
    pub width: usize,
}

/// In-memory tabular result of one query.
///
/// Every row holds exactly one value per column, in column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultTable {
    id: String,
    columns: Vec<ColumnDef>,
    rows: Vec<Vec<Value>>,
}

impl ResultTable {
    pub fn new(id: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        Self {
            id: id.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Appends a row, padding with nulls or truncating to the column count.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn value(&self, row: usize, column: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str) -> ColumnDef {
        ColumnDef {
            name: name.to_string(),
            kind: ColumnKind::Integer,
            width: 1,
        }
    }

    #[test]
    fn test_push_row_aligns_to_columns() {
        let mut table = ResultTable::new("t", vec![column("a"), column("b")]);
        table.push_row(vec![Value::Integer(1)]);
        table.push_row(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]);

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[0], vec![Value::Integer(1), Value::Null]);
        assert_eq!(table.rows()[1].len(), 2);
        assert_eq!(table.column_index("b"), Some(1));
        assert_eq!(table.value(1, 1), Some(&Value::Integer(2)));
        assert_eq!(table.value(5, 0), None);
    }
}
