// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Compensation stack for saga rollback.
//!
//! Entries are pushed as forward steps succeed and unwound in strict
//! reverse-of-push order on failure. Entries are plain tagged records (step
//! id plus an undo effect call), not closures, so the stack serializes into
//! checkpoints and a single routine interprets every rollback.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::effect::{invoke_with_budget, EffectCall, EffectPort};
use crate::error::EffectError;

/// A single rollback action, paired with the forward step that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompensationEntry {
    /// Identifier of the forward step this entry undoes.
    pub step_id: String,
    /// The effect that semantically reverses the forward step.
    pub undo: EffectCall,
}

/// Diagnostic record of a compensation that failed during unwind.
///
/// Never elevated to the saga's result; the unwind keeps going.
#[derive(Debug, Clone)]
pub struct CompensationFailure {
    /// Identifier of the step whose compensation failed.
    pub step_id: String,
    /// The underlying effect failure.
    pub error: EffectError,
}

/// Ordered ledger of rollback actions for one saga run.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CompensationStack {
    entries: Vec<CompensationEntry>,
}

impl CompensationStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rollback action for a step that just succeeded.
    pub fn push(&mut self, entry: CompensationEntry) {
        self.entries.push(entry);
    }

    /// Number of pending rollback actions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether any rollback actions are pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Execute every entry in reverse-of-push order, draining the stack.
    ///
    /// Best-effort total unwind: a failing compensation is logged and
    /// collected, and every remaining compensation still executes. No retries
    /// happen here; retry policy belongs to the port.
    pub async fn unwind_all(
        &mut self,
        port: &dyn EffectPort,
        budget: Duration,
    ) -> Vec<CompensationFailure> {
        let mut failures = Vec::new();

        info!(pending = self.entries.len(), "Unwinding compensation stack");

        while let Some(entry) = self.entries.pop() {
            match invoke_with_budget(port, &entry.undo, budget).await {
                Ok(_) => {
                    info!(step = %entry.step_id, undo = %entry.undo.name, "Compensation succeeded");
                }
                Err(err) => {
                    error!(step = %entry.step_id, undo = %entry.undo.name, %err, "Compensation failed");
                    failures.push(CompensationFailure {
                        step_id: entry.step_id,
                        error: err,
                    });
                }
            }
        }

        failures
    }
}
