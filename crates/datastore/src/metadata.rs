use serde::Serialize;
use std::fmt;

/// A possibly catalog- and schema-qualified table name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct TableName {
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub name: String,
}

impl TableName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            catalog: None,
            schema: None,
            name: name.into(),
        }
    }

    pub fn with_schema(mut self, schema: Option<String>) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_catalog(mut self, catalog: Option<String>) -> Self {
        self.catalog = catalog;
        self
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(catalog) = &self.catalog {
            write!(f, "{catalog}.")?;
        }
        if let Some(schema) = &self.schema {
            write!(f, "{schema}.")?;
        }
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutineKind {
    Function,
    Procedure,
}

/// A user-defined routine as reported by the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutineInfo {
    pub kind: RoutineKind,
    pub catalog: String,
    pub schema: String,
    pub name: String,
    /// Parameter names and declared types, in declaration order.
    pub parameters: Vec<(String, String)>,
    pub return_type: Option<String>,
}

impl RoutineInfo {
    /// The `name(p1 t1, p2 t2) -> r` form accepted by routine commands.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .parameters
            .iter()
            .map(|(name, ty)| format!("{name} {ty}"))
            .collect();
        let mut sig = format!("{}({})", self.name, params.join(", "));
        if let Some(ret) = &self.return_type {
            sig.push_str(" -> ");
            sig.push_str(ret);
        }
        sig
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_name_display() {
        let t = TableName::new("obs")
            .with_schema(Some("main".to_string()))
            .with_catalog(Some("memory".to_string()));
        assert_eq!(t.to_string(), "memory.main.obs");
        assert_eq!(TableName::new("obs").to_string(), "obs");
    }

    #[test]
    fn test_routine_signature() {
        let r = RoutineInfo {
            kind: RoutineKind::Function,
            catalog: "memory".to_string(),
            schema: "main".to_string(),
            name: "get_rate".to_string(),
            parameters: vec![
                ("id".to_string(), "INTEGER".to_string()),
                ("as_of".to_string(), "TIMESTAMP".to_string()),
            ],
            return_type: Some("FLOAT".to_string()),
        };
        assert_eq!(r.signature(), "get_rate(id INTEGER, as_of TIMESTAMP) -> FLOAT");
    }
}
