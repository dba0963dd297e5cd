//! Schema bundle handling for the confee toolchain.
//!
//! A project's schema is fetched once from the admin service and cached on
//! disk under `.confee/config.json`; [`fetch_schema`] prefers the cache and
//! only goes to the network on a miss. [`SchemaBundle`] keeps the top-level
//! collections typed while leaving deeply nested attribute payloads as raw
//! JSON — templates read those through the evaluator, not through Rust code.

pub mod bundle;
pub mod fetch;

pub use bundle::{
    DataType, Enum, EnumItem, MainPage, Pagination, PaginationField, PaginationOption, Project,
    SchemaBundle, SchemaComputed, Table, TableColumn, Ui,
};
pub use fetch::{fetch_schema, FetchOptions};

/// Failure while loading or querying a schema bundle.
#[derive(Debug)]
pub enum SchemaError {
    /// `CONFEE_ACCESS_TOKEN` is not set in the environment.
    MissingAccessToken,
    Http(reqwest::Error),
    /// The service answered with `success: false`.
    RejectedByServer,
    Cache(std::io::Error),
    Decode(serde_json::Error),
    /// A configured template names a pagination option the schema does not
    /// contain. This aborts setup; it is a configuration error, not a
    /// transient condition.
    MissingPaginationOption { name: String },
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaError::MissingAccessToken => {
                write!(f, "CONFEE_ACCESS_TOKEN environment variable is not set")
            }
            SchemaError::Http(err) => write!(f, "schema request failed: {}", err),
            SchemaError::RejectedByServer => {
                write!(f, "the schema service rejected the request")
            }
            SchemaError::Cache(err) => write!(f, "schema cache i/o failed: {}", err),
            SchemaError::Decode(err) => write!(f, "schema bundle is not valid JSON: {}", err),
            SchemaError::MissingPaginationOption { name } => {
                write!(f, "cannot find pagination option with name {}", name)
            }
        }
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SchemaError::Http(err) => Some(err),
            SchemaError::Cache(err) => Some(err),
            SchemaError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SchemaError {
    fn from(err: reqwest::Error) -> Self {
        SchemaError::Http(err)
    }
}

impl From<std::io::Error> for SchemaError {
    fn from(err: std::io::Error) -> Self {
        SchemaError::Cache(err)
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        SchemaError::Decode(err)
    }
}
