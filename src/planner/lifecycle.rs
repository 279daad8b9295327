//! Planner lifecycle states.

use serde::Serialize;

use crate::error::{PlannerError, Result};

/// Lifecycle state of a [`Planner`](super::Planner).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    /// Created, no resources allocated
    #[default]
    Unconfigured,
    /// Configured but not accepting plan requests
    Inactive,
    /// Accepting plan requests
    Active,
}

/// Lifecycle transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Configure,
    Activate,
    Deactivate,
    Cleanup,
}

impl Transition {
    pub fn name(&self) -> &'static str {
        match self {
            Transition::Configure => "configure",
            Transition::Activate => "activate",
            Transition::Deactivate => "deactivate",
            Transition::Cleanup => "cleanup",
        }
    }
}

impl Lifecycle {
    pub fn name(&self) -> &'static str {
        match self {
            Lifecycle::Unconfigured => "unconfigured",
            Lifecycle::Inactive => "inactive",
            Lifecycle::Active => "active",
        }
    }

    /// State reached by applying `transition`, or `InvalidState`.
    pub fn apply(self, transition: Transition) -> Result<Lifecycle> {
        use Lifecycle::*;
        match (self, transition) {
            (Unconfigured, Transition::Configure) => Ok(Inactive),
            (Inactive, Transition::Activate) => Ok(Active),
            (Active, Transition::Deactivate) => Ok(Inactive),
            (Inactive, Transition::Cleanup) => Ok(Unconfigured),
            (state, transition) => Err(PlannerError::InvalidState {
                operation: transition.name(),
                state: state.name(),
            }),
        }
    }

    /// Fail with `InvalidState` unless in `expected`.
    pub fn require(self, expected: Lifecycle, operation: &'static str) -> Result<()> {
        if self == expected {
            Ok(())
        } else {
            Err(PlannerError::InvalidState {
                operation,
                state: self.name(),
            })
        }
    }
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
