//! Error types for the PowerSchool MCP server

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PowerSchoolError>;

#[derive(Error, Debug)]
pub enum PowerSchoolError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("MCP protocol error: {0}")]
    Mcp(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<pulseengine_mcp_server::BackendError> for PowerSchoolError {
    fn from(err: pulseengine_mcp_server::BackendError) -> Self {
        PowerSchoolError::Mcp(err.to_string())
    }
}

impl From<PowerSchoolError> for pulseengine_mcp_protocol::Error {
    fn from(err: PowerSchoolError) -> Self {
        pulseengine_mcp_protocol::Error::internal_error(err.to_string())
    }
}
