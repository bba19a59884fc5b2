// Error and warning types for SQL commands
use datastore::DatastoreError;
use std::path::PathBuf;

/// Reasons a single command invocation fails.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Missing or contradictory parameters, found before anything runs.
    #[error("Invalid parameters: {message}")]
    ParameterValidation { message: String },

    /// One or more routine arguments could not be coerced; the call is not issued.
    #[error("{} routine parameter(s) could not be coerced", .errors.len())]
    Coercion { errors: Vec<CoercionError> },

    /// Datastore, table or column not found.
    #[error("Metadata lookup failed: {message}")]
    MetadataLookup {
        message: String,
        #[source]
        source: Option<DatastoreError>,
    },

    #[error("Error executing \"{statement}\": {source}")]
    Execution {
        statement: String,
        #[source]
        source: DatastoreError,
    },

    #[error("Could not convert results for table \"{table}\": {source}")]
    ResultMapping {
        table: String,
        #[source]
        source: DatastoreError,
    },
}

impl CommandError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        CommandError::ParameterValidation {
            message: message.into(),
        }
    }

    pub fn lookup<S: Into<String>>(message: S, source: Option<DatastoreError>) -> Self {
        CommandError::MetadataLookup {
            message: message.into(),
            source,
        }
    }
}

impl From<SignatureError> for CommandError {
    fn from(err: SignatureError) -> Self {
        CommandError::validation(err.to_string())
    }
}

/// A routine argument that does not fit its declared type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoercionError {
    #[error("Parameter \"{parameter}\" value \"{value}\" is not a valid {declared_type}")]
    InvalidValue {
        parameter: String,
        value: String,
        declared_type: String,
    },

    #[error(
        "Don't know how to handle parameter \"{parameter}\" type \"{declared_type}\" (value \"{value}\")"
    )]
    UnsupportedType {
        parameter: String,
        value: String,
        declared_type: String,
    },

    #[error("No value given for parameter \"{parameter}\" ({declared_type})")]
    MissingValue {
        parameter: String,
        declared_type: String,
    },
}

impl CoercionError {
    pub fn parameter(&self) -> &str {
        match self {
            CoercionError::InvalidValue { parameter, .. }
            | CoercionError::UnsupportedType { parameter, .. }
            | CoercionError::MissingValue { parameter, .. } => parameter,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("routine signature is blank")]
    Blank,

    #[error("routine signature \"{signature}\" has no parameter list")]
    MissingParenthesis { signature: String },

    #[error("routine signature \"{signature}\" has unbalanced parentheses")]
    Unbalanced { signature: String },

    #[error("routine signature \"{signature}\" has no routine name")]
    MissingName { signature: String },

    #[error("parameter \"{parameter}\" in \"{signature}\" has no type")]
    MissingType { signature: String, parameter: String },

    #[error("routine signature \"{signature}\" has an empty parameter")]
    EmptyParameter { signature: String },

    #[error("parameter \"{parameter}\" appears twice in \"{signature}\"")]
    DuplicateParameter { signature: String, parameter: String },

    #[error("unexpected \"{text}\" after parameter list in \"{signature}\"")]
    TrailingText { signature: String, text: String },
}

/// Non-fatal problems found while mapping results to outputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingWarning {
    #[error(
        "Table \"{table}\" has {rows} row(s) but all string columns have zero width; \
         the database driver may not report column metadata"
    )]
    ZeroWidthStrings { table: String, rows: usize },

    #[error("Column \"{column}\" for property \"{property}\" is not in table \"{table}\"")]
    UnmatchedColumn {
        table: String,
        column: String,
        property: String,
    },

    #[error("Output properties need exactly one row but table \"{table}\" has {rows}")]
    NotSingleRow { table: String, rows: usize },

    #[error("Routine returned no value for property \"{property}\"")]
    NoReturnValue { property: String },

    #[error("Statement returned no result set for table \"{table}\"")]
    NoResultSet { table: String },
}

/// Problems loading a command file.
#[derive(Debug, thiserror::Error)]
pub enum CommandFileError {
    #[error("could not read command file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not expand command file template: {0}")]
    Template(#[from] tera::Error),

    #[error("could not parse command file: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}
