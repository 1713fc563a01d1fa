// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Saga engine configuration.

use std::env;
use std::time::Duration;

/// Default per-effect time budget (5 seconds).
pub const DEFAULT_EFFECT_BUDGET: Duration = Duration::from_secs(5);

/// Default acceptance wait timeout (120 seconds).
pub const DEFAULT_ACCEPTANCE_TIMEOUT: Duration = Duration::from_secs(120);

/// Timing configuration consumed by the sequencer and the waiter.
#[derive(Debug, Clone)]
pub struct SagaConfig {
    /// Time budget applied to each forward or compensating effect call
    /// (default: 5s).
    pub effect_budget: Duration,
    /// How long the signal-gated waiter holds for the acceptance gate
    /// before failing the saga (default: 120s).
    pub acceptance_timeout: Duration,
}

impl Default for SagaConfig {
    fn default() -> Self {
        Self {
            effect_budget: DEFAULT_EFFECT_BUDGET,
            acceptance_timeout: DEFAULT_ACCEPTANCE_TIMEOUT,
        }
    }
}

impl SagaConfig {
    /// Create a configuration with the default budgets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// # Optional Environment Variables
    /// - `SAGA_EFFECT_BUDGET_MS` - per-effect time budget (default: 5000)
    /// - `SAGA_ACCEPTANCE_TIMEOUT_MS` - acceptance wait timeout (default: 120000)
    pub fn from_env() -> Self {
        let effect_budget = env::var("SAGA_EFFECT_BUDGET_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_EFFECT_BUDGET);

        let acceptance_timeout = env::var("SAGA_ACCEPTANCE_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_ACCEPTANCE_TIMEOUT);

        Self {
            effect_budget,
            acceptance_timeout,
        }
    }

    /// Set the per-effect time budget.
    pub fn with_effect_budget(mut self, budget: Duration) -> Self {
        self.effect_budget = budget;
        self
    }

    /// Set the acceptance wait timeout.
    pub fn with_acceptance_timeout(mut self, timeout: Duration) -> Self {
        self.acceptance_timeout = timeout;
        self
    }
}
