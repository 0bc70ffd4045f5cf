//! Error types for the agents SDK
//!
//! Two families live here. [`AgentsError`] terminates a run and is surfaced to
//! the caller. [`ToolError`] and [`ArgumentValidationError`] are contained at
//! the tool-dispatch boundary and travel back to the model as
//! `{"error": "<message>"}` payloads.

use thiserror::Error;

use crate::schema::SchemaKind;

/// Result type alias for the agents SDK
pub type Result<T> = std::result::Result<T, AgentsError>;

/// Boxed error accepted from tool handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for the agents SDK
#[derive(Debug, Error)]
pub enum AgentsError {
    /// No credential could be resolved; raised before any network activity
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// Error from the OpenAI API
    #[error("OpenAI API error: {0}")]
    OpenAIError(#[from] async_openai::error::OpenAIError),

    /// Transport failure reported by a non-OpenAI provider
    #[error("Transport error: {message}")]
    TransportError { message: String },

    /// The model replied with something the runner cannot use
    #[error("Model behavior error: {message}")]
    ModelBehaviorError { message: String },

    /// A callable could not be registered as a tool
    #[error("Tool registration error: {message}")]
    ToolRegistrationError { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Malformed TOML configuration
    #[error("Config file error: {0}")]
    ConfigFileError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AgentsError {
    /// Whether this error came from the completion API round trip.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AgentsError::OpenAIError(_) | AgentsError::TransportError { .. }
        )
    }
}

/// Failure raised while invoking a single tool.
///
/// The `Display` output is what the model sees inside the error payload, so
/// `Failed` renders the handler's message verbatim.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}")]
    Failed(String),

    #[error("missing required argument '{name}'")]
    MissingArgument { name: String },

    #[error("invalid value for argument '{name}': {source}")]
    InvalidArgument {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    InvalidArguments(#[from] ArgumentValidationError),
}

impl ToolError {
    /// Wrap any handler error, keeping only its message.
    pub fn failed<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        ToolError::Failed(err.into().to_string())
    }

    pub(crate) fn missing_argument(name: &str) -> Self {
        ToolError::MissingArgument {
            name: name.to_string(),
        }
    }

    pub(crate) fn invalid_argument(name: &str, source: serde_json::Error) -> Self {
        ToolError::InvalidArgument {
            name: name.to_string(),
            source,
        }
    }
}

impl From<BoxError> for ToolError {
    fn from(err: BoxError) -> Self {
        ToolError::Failed(err.to_string())
    }
}

/// Structured rejection of a tool-call argument payload.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArgumentValidationError {
    #[error("arguments are not valid JSON: {0}")]
    Malformed(String),

    #[error("arguments must be a JSON object, got {found}")]
    NotAnObject { found: &'static str },

    #[error("missing required argument '{name}'")]
    Missing { name: String },

    #[error("unexpected argument '{name}'")]
    Unexpected { name: String },

    #[error("argument '{name}' must be of type {expected}, got {found}")]
    WrongType {
        name: String,
        expected: SchemaKind,
        found: &'static str,
    },
}
