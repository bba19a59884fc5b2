use crate::result_set::ResultSet;
use crate::value::{BindValue, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// A statement that returns a result set.
    Query,
    /// One or more statements run for effect, no result set.
    Batch,
    /// A scalar routine call; its single value is the return value.
    Function,
    /// A routine call returning a result set.
    Procedure,
}

/// A statement ready to hand to a [`crate::DatabaseClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    kind: StatementKind,
    sql: String,
    params: Vec<BindValue>,
}

impl Statement {
    pub fn query(sql: impl Into<String>) -> Self {
        Self {
            kind: StatementKind::Query,
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn batch(sql: impl Into<String>) -> Self {
        Self {
            kind: StatementKind::Batch,
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Wraps routine-call text produced by [`crate::DatabaseClient::routine_call_sql`].
    /// `params` fill the positional slots in order.
    pub fn call(kind: StatementKind, sql: impl Into<String>, params: Vec<BindValue>) -> Self {
        Self {
            kind,
            sql: sql.into(),
            params,
        }
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[BindValue] {
        &self.params
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)?;
        if !self.params.is_empty() {
            let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
            write!(f, " [{}]", params.join(", "))?;
        }
        Ok(())
    }
}

/// Outcome of executing one statement.
#[derive(Debug, Default)]
pub struct Execution {
    pub result_set: Option<ResultSet>,
    pub return_value: Option<Value>,
}
