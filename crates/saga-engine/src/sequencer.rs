// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Saga step sequencer.
//!
//! Drives an ordered list of forward steps through the effect port, one at a
//! time: a step does not start until the previous one has fully returned.
//! Compensations are pushed only after forward success. On the first forward
//! failure the sequencer stops advancing, unwinds the compensation stack if
//! the failed step's policy asks for it, and reports the original failure —
//! never a rollback-induced secondary one. Phase transitions are checkpointed
//! before the new phase's first step runs.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::checkpoint::Checkpointer;
use crate::compensation::{CompensationEntry, CompensationStack};
use crate::config::SagaConfig;
use crate::effect::{invoke_with_budget, EffectCall, EffectPort};
use crate::error::{Result, SagaError};
use crate::gate::AcceptanceGate;
use crate::state::{Phase, SagaState, StateCell};

/// What the sequencer does with the compensation stack when a forward step
/// fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Unwind every pushed compensation, then fail the saga.
    Unwind,
    /// Fail the saga directly, leaving prior steps in place.
    Abort,
}

/// One forward step of a saga.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// Stable identifier, used in logs, errors, and compensation entries.
    pub id: String,
    /// Phase the saga is in while this step runs.
    pub phase: Phase,
    /// The forward effect.
    pub forward: EffectCall,
    /// Rollback effect pushed after forward success, if the step is
    /// reversible.
    pub compensation: Option<EffectCall>,
    /// Failure handling for this step (default: unwind).
    pub on_failure: FailurePolicy,
}

impl Step {
    /// Create a step that unwinds prior compensations on failure.
    pub fn new(id: impl Into<String>, phase: Phase, forward: EffectCall) -> Self {
        Self {
            id: id.into(),
            phase,
            forward,
            compensation: None,
            on_failure: FailurePolicy::Unwind,
        }
    }

    /// Attach the effect that reverses this step.
    pub fn with_compensation(mut self, undo: EffectCall) -> Self {
        self.compensation = Some(undo);
        self
    }

    /// Fail the saga directly on forward failure, without unwinding.
    pub fn abort_on_failure(mut self) -> Self {
        self.on_failure = FailurePolicy::Abort;
        self
    }
}

// Serialize-only view for checkpoint payloads; the owned counterpart for
// resume is `checkpoint::CheckpointPayload`.
#[derive(Serialize)]
struct PayloadRef<'a> {
    state: &'a SagaState,
    compensations: &'a CompensationStack,
}

/// Drives forward steps, the acceptance wait, and rollback for one saga
/// instance. The sequencer is the only writer of the instance's state.
pub struct Sequencer {
    instance_id: String,
    port: Arc<dyn EffectPort>,
    checkpointer: Arc<dyn Checkpointer>,
    config: SagaConfig,
}

impl Sequencer {
    /// Create a sequencer for one saga instance.
    pub fn new(
        instance_id: impl Into<String>,
        port: Arc<dyn EffectPort>,
        checkpointer: Arc<dyn Checkpointer>,
        config: SagaConfig,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            port,
            checkpointer,
            config,
        }
    }

    /// The configuration this sequencer runs under.
    pub fn config(&self) -> &SagaConfig {
        &self.config
    }

    /// Execute `steps` strictly in order.
    ///
    /// Returns the output of the last step, or `Value::Null` for an empty
    /// list. On the first failure the step's [`FailurePolicy`] decides
    /// whether the stack unwinds; either way the originating failure is the
    /// one returned.
    pub async fn run_steps(
        &self,
        steps: &[Step],
        stack: &mut CompensationStack,
        state: &StateCell,
    ) -> Result<Value> {
        let mut last_output = Value::Null;

        for step in steps {
            // A checkpoint failure is as terminal as a forward failure:
            // apply the step's failure policy before reporting it.
            if let Err(err) = self.enter_phase(step.phase, stack, state).await {
                self.fail(step.on_failure, stack, state).await;
                return Err(err);
            }

            match invoke_with_budget(self.port.as_ref(), &step.forward, self.config.effect_budget)
                .await
            {
                Ok(output) => {
                    info!(
                        instance_id = %self.instance_id,
                        step = %step.id,
                        effect = %step.forward.name,
                        "Step succeeded"
                    );
                    if let Some(undo) = &step.compensation {
                        stack.push(CompensationEntry {
                            step_id: step.id.clone(),
                            undo: undo.clone(),
                        });
                    }
                    last_output = output;
                }
                Err(err) => {
                    error!(
                        instance_id = %self.instance_id,
                        step = %step.id,
                        effect = %step.forward.name,
                        %err,
                        "Step failed"
                    );
                    self.fail(step.on_failure, stack, state).await;
                    return Err(SagaError::Effect {
                        step_id: step.id.clone(),
                        source: err,
                    });
                }
            }
        }

        Ok(last_output)
    }

    /// Suspend on the acceptance gate for the configured timeout.
    ///
    /// On acceptance every participant is marked accepted. On timeout the
    /// saga fails terminally with [`SagaError::AcceptanceTimeout`]; prior
    /// steps are left in place, not unwound.
    pub async fn await_acceptance(
        &self,
        gate: &AcceptanceGate,
        stack: &mut CompensationStack,
        state: &StateCell,
    ) -> Result<()> {
        if let Err(err) = self
            .enter_phase(Phase::AwaitingAcceptance, stack, state)
            .await
        {
            // Same no-unwind discipline as an acceptance timeout.
            self.fail(FailurePolicy::Abort, stack, state).await;
            return Err(err);
        }

        let timeout = self.config.acceptance_timeout;
        if !gate.wait(timeout).await {
            error!(
                instance_id = %self.instance_id,
                waited_secs = timeout.as_secs(),
                "Acceptance gate did not open before the deadline"
            );
            state.set_phase(Phase::Failed);
            self.checkpoint(stack, state).await;
            return Err(SagaError::AcceptanceTimeout { waited: timeout });
        }

        state.update(|s| {
            for participant in &mut s.participants {
                participant.accepted = true;
            }
        });
        info!(instance_id = %self.instance_id, "Acceptance received");
        Ok(())
    }

    /// Mark the saga completed and record the final checkpoint.
    pub async fn complete(&self, stack: &mut CompensationStack, state: &StateCell) {
        state.set_phase(Phase::Completed);
        self.checkpoint(stack, state).await;
        info!(instance_id = %self.instance_id, "Saga completed");
    }

    /// Transition into `phase` (if not already there) and checkpoint the
    /// boundary.
    async fn enter_phase(
        &self,
        phase: Phase,
        stack: &CompensationStack,
        state: &StateCell,
    ) -> Result<()> {
        if state.snapshot().phase == phase {
            return Ok(());
        }
        state.set_phase(phase);
        let payload = serde_json::to_vec(&PayloadRef {
            state: &state.snapshot(),
            compensations: stack,
        })?;
        self.checkpointer
            .save(&self.instance_id, phase.as_str(), &payload)
            .await
            .map_err(|e| SagaError::Checkpoint {
                checkpoint_id: phase.as_str().to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    /// Apply a step's failure policy and move the saga to `Failed`.
    async fn fail(&self, policy: FailurePolicy, stack: &mut CompensationStack, state: &StateCell) {
        if policy == FailurePolicy::Unwind && !stack.is_empty() {
            state.set_phase(Phase::Compensating);
            self.checkpoint(stack, state).await;
            let failures = stack
                .unwind_all(self.port.as_ref(), self.config.effect_budget)
                .await;
            if !failures.is_empty() {
                error!(
                    instance_id = %self.instance_id,
                    failed = failures.len(),
                    "Some compensations failed during unwind"
                );
            }
        }
        state.set_phase(Phase::Failed);
        self.checkpoint(stack, state).await;
    }

    /// Best-effort checkpoint on a path that is already failing; a store
    /// error must not mask the saga's real outcome.
    async fn checkpoint(&self, stack: &CompensationStack, state: &StateCell) {
        let snapshot = state.snapshot();
        let checkpoint_id = snapshot.phase.as_str();
        let payload = match serde_json::to_vec(&PayloadRef {
            state: &snapshot,
            compensations: stack,
        }) {
            Ok(payload) => payload,
            Err(err) => {
                error!(instance_id = %self.instance_id, %err, "Checkpoint payload serialization failed");
                return;
            }
        };
        if let Err(err) = self
            .checkpointer
            .save(&self.instance_id, checkpoint_id, &payload)
            .await
        {
            error!(instance_id = %self.instance_id, checkpoint_id, %err, "Checkpoint save failed");
        }
    }
}
