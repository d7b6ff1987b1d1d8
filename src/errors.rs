//! # Error Types
//!
//! Failure modes of recipe generation and meal planning. Provider failures
//! are absorbed by the planner's fallback path; planner errors reach the
//! caller only for the explicit quality-bar policy and invalid configuration.

/// Failure of a text-generation provider call
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Transport or HTTP status failure
    Request(String),
    /// Response did not match the recipe schema
    Schema(String),
    /// The call did not complete in time
    Timeout(String),
    /// Calls are blocked after repeated failures
    CircuitOpen,
    /// Provider is not configured (e.g. missing API key)
    Unavailable(String),
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::Request(msg) => write!(f, "Provider request error: {msg}"),
            ProviderError::Schema(msg) => write!(f, "Provider schema error: {msg}"),
            ProviderError::Timeout(msg) => write!(f, "Provider timeout: {msg}"),
            ProviderError::CircuitOpen => write!(f, "Provider circuit breaker is open"),
            ProviderError::Unavailable(msg) => write!(f, "Provider unavailable: {msg}"),
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Schema(err.to_string())
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(err.to_string())
        } else {
            ProviderError::Request(err.to_string())
        }
    }
}

/// Failure of a planning run
#[derive(Debug, Clone, PartialEq)]
pub enum PlannerError {
    /// No candidate passed the quality gate and the policy forbids best effort
    QualityBarNotMet { day_index: Option<u32>, reasons: Vec<String> },
    /// Configuration outside the accepted ranges
    InvalidConfig(String),
}

impl std::fmt::Display for PlannerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlannerError::QualityBarNotMet { day_index, reasons } => match day_index {
                Some(day) => write!(f, "Quality bar not met for day {day}: {}", reasons.join("; ")),
                None => write!(f, "Quality bar not met: {}", reasons.join("; ")),
            },
            PlannerError::InvalidConfig(msg) => write!(f, "Invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for PlannerError {}

impl From<anyhow::Error> for PlannerError {
    fn from(err: anyhow::Error) -> Self {
        PlannerError::InvalidConfig(err.to_string())
    }
}
