//! Error types for asset mapping operations

use thiserror::Error;

/// Errors that can occur while turning a refresh event stream into asset nodes
#[derive(Debug, Error)]
pub enum MapperError {
    /// Integration store could not be read
    #[error("Integration lookup error: {0}")]
    IntegrationLookup(String),

    /// Stack record could not be read
    #[error("Stack lookup error: {0}")]
    StackLookup(String),

    /// Stack record could not be updated
    #[error("Stack update error: {0}")]
    StackUpdate(String),

    /// More than one cluster integration matched the observed cluster objects
    #[error("Ambiguous cluster: {count} cluster integrations match the observed resources")]
    AmbiguousCluster { count: usize },

    /// Cluster id could not be resolved for a matched integration
    #[error("Cluster lookup error: {0}")]
    ClusterLookup(String),

    /// Event source failed while producing events
    #[error("Event source error: {0}")]
    EventSource(String),

    /// Artifact could not be written
    #[error("Artifact error: {0}")]
    Artifact(String),

    /// Downstream trigger could not be invoked
    #[error("Trigger error: {0}")]
    Trigger(String),

    /// NATS connection error
    #[error("NATS connection error: {0}")]
    NatsConnection(String),

    /// NATS publish error
    #[error("NATS publish error: {0}")]
    NatsPublish(String),

    /// NATS subscribe error
    #[error("NATS subscribe error: {0}")]
    NatsSubscribe(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),
}

/// Result type for asset mapping operations
pub type MapperResult<T> = Result<T, MapperError>;

impl From<serde_json::Error> for MapperError {
    fn from(err: serde_json::Error) -> Self {
        MapperError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for MapperError {
    fn from(err: std::io::Error) -> Self {
        MapperError::Io(err.to_string())
    }
}
