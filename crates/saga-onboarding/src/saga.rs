// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The customer onboarding saga.
//!
//! Forward sequence: charge the customer, create the account, create admin
//! users, send each participant their claim code, suspend until a claim code
//! is accepted (bounded by the acceptance timeout), then send the welcome and
//! feedback emails. The first three steps are reversible and unwind in
//! reverse order if a later provisioning step fails. Claim-code delivery and
//! the post-acceptance emails fail the saga directly without rolling back the
//! provisioned account.

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use saga_engine::{
    AcceptanceGate, Checkpointer, CompensationStack, EffectCall, EffectPort, Phase, QueryHandle,
    Result, SagaConfig, SagaState, Sequencer, StateCell, Step,
};

use crate::input::{effects, generate_claim_code, OnboardingInput};

/// One onboarding run: the saga's single thread of control plus the handles
/// it exposes while running.
pub struct OnboardingSaga {
    input: OnboardingInput,
    sequencer: Sequencer,
    state: StateCell,
    gate: AcceptanceGate,
}

impl OnboardingSaga {
    /// Set up a run for `input`. Claim codes are issued here, one per email;
    /// nothing externally-effecting happens until [`run`](Self::run).
    pub fn new(
        input: OnboardingInput,
        port: Arc<dyn EffectPort>,
        checkpointer: Arc<dyn Checkpointer>,
        config: SagaConfig,
    ) -> Self {
        let participants = input
            .emails
            .iter()
            .map(|email| saga_engine::Participant::new(email.clone(), generate_claim_code()))
            .collect();
        let state = StateCell::new(SagaState::new(&input.account_name, participants));

        let instance_id = format!("onboarding-{}", input.account_name);
        let sequencer = Sequencer::new(instance_id, port, checkpointer, config);

        Self {
            input,
            sequencer,
            state,
            gate: AcceptanceGate::new(),
        }
    }

    /// Read-only handle for the query surface. May be cloned and called at
    /// any time, including while the saga is suspended or compensating.
    pub fn query_handle(&self) -> QueryHandle {
        self.state.query_handle()
    }

    /// Handle for the accept-update surface. Flipping it is idempotent and
    /// is the only external mutation the saga accepts.
    pub fn acceptance_gate(&self) -> AcceptanceGate {
        self.gate.clone()
    }

    /// Execute the saga to its terminal phase.
    ///
    /// Returns the output of the final forward step (the feedback email), or
    /// the originating failure. The state handle stays queryable after the
    /// run, in `Completed` or `Failed` phase.
    pub async fn run(self) -> Result<String> {
        let account = &self.input.account_name;
        info!(account = %account, participants = self.input.emails.len(), "Starting onboarding");

        let mut stack = CompensationStack::new();

        let mut steps = vec![
            Step::new(
                "charge",
                Phase::Charging,
                EffectCall::new(effects::CHARGE_CUSTOMER, json!(account)),
            )
            .with_compensation(EffectCall::new(effects::REFUND_CUSTOMER, json!(account))),
            Step::new(
                "account",
                Phase::ProvisioningAccount,
                EffectCall::new(effects::CREATE_ACCOUNT, json!(account)),
            )
            .with_compensation(EffectCall::new(effects::DELETE_ACCOUNT, json!(account))),
            Step::new(
                "admin-users",
                Phase::ProvisioningUsers,
                EffectCall::new(effects::CREATE_ADMIN_USERS, json!(self.input.emails)),
            )
            .with_compensation(EffectCall::new(
                effects::DELETE_ADMIN_USERS,
                json!(self.input.emails),
            )),
        ];

        // Claim-code delivery failures abort the run without tearing down
        // the account that was just provisioned.
        for participant in &self.state.snapshot().participants {
            steps.push(
                Step::new(
                    format!("claim-code-{}", participant.contact_address),
                    Phase::DistributingCodes,
                    EffectCall::new(
                        effects::SEND_CLAIM_CODE,
                        json!({
                            "account": account,
                            "email": participant.contact_address,
                            "code": participant.access_code,
                        }),
                    ),
                )
                .abort_on_failure(),
            );
        }

        self.sequencer
            .run_steps(&steps, &mut stack, &self.state)
            .await?;

        self.sequencer
            .await_acceptance(&self.gate, &mut stack, &self.state)
            .await?;

        let finalize = vec![
            Step::new(
                "welcome-email",
                Phase::Finalizing,
                EffectCall::new(effects::SEND_WELCOME_EMAIL, json!(self.input.emails)),
            )
            .abort_on_failure(),
            Step::new(
                "feedback-email",
                Phase::Finalizing,
                EffectCall::new(effects::SEND_FEEDBACK_EMAIL, json!(self.input.emails)),
            )
            .abort_on_failure(),
        ];

        let output = self
            .sequencer
            .run_steps(&finalize, &mut stack, &self.state)
            .await?;

        self.sequencer.complete(&mut stack, &self.state).await;

        Ok(match output.as_str() {
            Some(s) => s.to_string(),
            None => output.to_string(),
        })
    }
}
