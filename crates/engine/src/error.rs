//! Error types for the evacuation engine

use safepath_geo::Coordinate;
use thiserror::Error;

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine and collaborator errors
///
/// None of these are fatal to a running engine: collaborator failures are
/// logged and the engine keeps its previous state or degrades.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The hazard signal could not be read
    #[error("Hazard signal unavailable: {0}")]
    SignalUnavailable(String),

    /// The nearby-places lookup failed
    #[error("Places lookup failed: {0}")]
    PlacesUnavailable(String),

    /// The walking-route service failed
    #[error("Routing service failed: {0}")]
    Routing(String),

    /// A hazard declaration that cannot describe a zone
    #[error("Invalid hazard declaration: {0}")]
    InvalidDeclaration(String),

    /// A position outside the valid coordinate range
    #[error("Invalid position: {0}")]
    InvalidPosition(Coordinate),

    /// The engine loop is no longer accepting events
    #[error("Engine stopped")]
    Stopped,
}

impl EngineError {
    /// Create a signal error
    pub fn signal(msg: impl Into<String>) -> Self {
        Self::SignalUnavailable(msg.into())
    }

    /// Create a places error
    pub fn places(msg: impl Into<String>) -> Self {
        Self::PlacesUnavailable(msg.into())
    }

    /// Create a routing error
    pub fn routing(msg: impl Into<String>) -> Self {
        Self::Routing(msg.into())
    }
}
