// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for the saga engine.
//!
//! The taxonomy follows the propagation policy of the engine: only the first
//! forward-effect failure or an acceptance timeout ever becomes the saga's
//! reported outcome. Compensation failures are diagnostics, never the result.

use std::time::Duration;
use thiserror::Error;

/// Result type using SagaError.
pub type Result<T> = std::result::Result<T, SagaError>;

/// Failure returned by an effect port invocation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EffectError {
    /// The named effect ran and reported failure.
    #[error("effect '{name}' failed: {message}")]
    Failed {
        /// Name of the effect that failed.
        name: String,
        /// Failure detail reported by the port.
        message: String,
    },

    /// The named effect did not return within its time budget.
    #[error("effect '{name}' exceeded its {budget_ms}ms budget")]
    TimedOut {
        /// Name of the effect that timed out.
        name: String,
        /// The budget that was exceeded, in milliseconds.
        budget_ms: u64,
    },
}

impl EffectError {
    /// Name of the effect this failure refers to.
    pub fn effect_name(&self) -> &str {
        match self {
            Self::Failed { name, .. } | Self::TimedOut { name, .. } => name,
        }
    }
}

/// Terminal saga outcomes.
///
/// Exactly one of these is reported to the caller when a saga does not
/// complete; rollback-induced secondary failures are never wrapped in here.
#[derive(Debug, Clone, Error)]
pub enum SagaError {
    /// A forward step's effect invocation failed.
    #[error("step '{step_id}' failed: {source}")]
    Effect {
        /// Identifier of the step whose forward effect failed.
        step_id: String,
        /// The underlying effect failure.
        source: EffectError,
    },

    /// The acceptance gate did not flip before the deadline.
    #[error("acceptance not received within {} seconds", waited.as_secs())]
    AcceptanceTimeout {
        /// How long the waiter was prepared to wait.
        waited: Duration,
    },

    /// A checkpoint could not be recorded.
    #[error("checkpoint '{checkpoint_id}' failed: {reason}")]
    Checkpoint {
        /// Identifier of the checkpoint that failed to save.
        checkpoint_id: String,
        /// The reason for failure.
        reason: String,
    },

    /// State or checkpoint payload serialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SagaError {
    fn from(err: serde_json::Error) -> Self {
        SagaError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_error_display() {
        let err = EffectError::Failed {
            name: "charge-customer".to_string(),
            message: "card declined".to_string(),
        };
        assert_eq!(err.to_string(), "effect 'charge-customer' failed: card declined");

        let err = EffectError::TimedOut {
            name: "create-account".to_string(),
            budget_ms: 5_000,
        };
        assert_eq!(err.to_string(), "effect 'create-account' exceeded its 5000ms budget");
    }

    #[test]
    fn test_acceptance_timeout_names_duration() {
        let err = SagaError::AcceptanceTimeout {
            waited: Duration::from_secs(120),
        };
        assert_eq!(err.to_string(), "acceptance not received within 120 seconds");
    }

    #[test]
    fn test_effect_name_accessor() {
        let err = EffectError::TimedOut {
            name: "send-claim-code".to_string(),
            budget_ms: 5_000,
        };
        assert_eq!(err.effect_name(), "send-claim-code");
    }
}
