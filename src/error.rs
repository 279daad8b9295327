//! Error types for marga

use crate::core::WorldPoint;
use thiserror::Error;

/// Which endpoint of a planning request failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    Goal,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Start => write!(f, "start"),
            Endpoint::Goal => write!(f, "goal"),
        }
    }
}

/// Planner error type
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("{endpoint} {point:?} lies outside the cost grid")]
    OutOfBounds {
        endpoint: Endpoint,
        point: WorldPoint,
    },

    #[error("No reference route has been received")]
    NoReferenceRoute,

    #[error("No cost grid snapshot has been received")]
    NoCostGrid,

    #[error("Cost grid is empty or does not match its dimensions")]
    EmptyGrid,

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Relaxation stopped after {iterations} iterations (residual {residual:.4})")]
    ConvergenceIncomplete { iterations: usize, residual: f32 },

    #[error("Cannot {operation} while planner is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for PlannerError {
    fn from(e: toml::de::Error) -> Self {
        PlannerError::Config(e.to_string())
    }
}

impl From<serde_yaml::Error> for PlannerError {
    fn from(e: serde_yaml::Error) -> Self {
        PlannerError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;
