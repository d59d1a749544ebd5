//! Error types for es-mcp.

use thiserror::Error;

/// Result type alias using EsMcpError.
pub type Result<T> = std::result::Result<T, EsMcpError>;

/// Errors that can occur in es-mcp.
#[derive(Error, Debug)]
pub enum EsMcpError {
    /// Missing or invalid configuration. Fatal at startup.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Cluster unreachable at startup. Fatal.
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// Index does not exist.
    #[error("Index '{name}' does not exist")]
    IndexNotFound { name: String },

    /// The cluster rejected or failed a request.
    #[error("{}", cluster_message(.status, .message))]
    Cluster {
        status: Option<u16>,
        message: String,
    },

    /// A caller-supplied query could not be used.
    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn cluster_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(status) => format!("Cluster error (HTTP {status}): {message}"),
        None => format!("Cluster error: {message}"),
    }
}

impl EsMcpError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create an index-not-found error.
    pub fn index_not_found(name: impl Into<String>) -> Self {
        Self::IndexNotFound { name: name.into() }
    }

    /// Create a cluster error without a status code.
    pub fn cluster(message: impl Into<String>) -> Self {
        Self::Cluster {
            status: None,
            message: message.into(),
        }
    }

    /// Create a cluster error carrying the HTTP status of the response.
    pub fn cluster_status(status: u16, message: impl Into<String>) -> Self {
        Self::Cluster {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Create an invalid query error.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// Get the error code for MCP responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "CONFIG_ERROR",
            Self::Connection { .. } => "CONNECTION_ERROR",
            Self::IndexNotFound { .. } => "INDEX_NOT_FOUND",
            Self::Cluster { .. } => "CLUSTER_ERROR",
            Self::InvalidQuery { .. } => "INVALID_QUERY",
            Self::Io(_) => "IO_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}
