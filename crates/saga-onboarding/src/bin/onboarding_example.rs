// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Onboarding Example - runs the full onboarding saga against a stub port.
//!
//! This example shows:
//! - Wiring a saga with an effect port, a checkpointer, and a config
//! - Querying saga progress concurrently while it runs and while it waits
//! - Accepting a claim code out-of-band to unblock the suspended saga
//!
//! Run with: cargo run -p saga-onboarding --bin onboarding-example

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use saga_engine::{EffectError, EffectPort, MemoryCheckpointer, SagaConfig};
use saga_onboarding::{OnboardingInput, OnboardingSaga};

/// Stub port: every effect "succeeds" after a short simulated latency.
struct StubPort;

#[async_trait]
impl EffectPort for StubPort {
    async fn invoke(&self, name: &str, args: Value) -> Result<Value, EffectError> {
        info!(effect = name, %args, "Invoking effect");
        tokio::time::sleep(Duration::from_millis(150)).await;
        Ok(json!(format!("{name}: done")))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("=== Onboarding Example: saga with acceptance gate ===");

    let input = OnboardingInput::new(
        "acme",
        vec![
            "admin@acme.test".to_string(),
            "ops@acme.test".to_string(),
        ],
    );

    let saga = OnboardingSaga::new(
        input,
        Arc::new(StubPort),
        Arc::new(MemoryCheckpointer::new()),
        SagaConfig::from_env(),
    );

    let query = saga.query_handle();
    let gate = saga.acceptance_gate();

    // Poll the query surface while the saga runs.
    let watcher = tokio::spawn(async move {
        loop {
            let snapshot = query.query();
            info!(
                phase = snapshot.phase.as_str(),
                accepted = snapshot.all_accepted(),
                "Progress"
            );
            if snapshot.phase.is_terminal() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    });

    // Simulate a participant accepting their claim code after a delay.
    let accepter = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(2)).await;
        info!("Participant accepted their claim code");
        gate.accept();
        gate.accept(); // duplicate accepts are no-ops
    });

    let output = saga.run().await?;

    accepter.await?;
    watcher.await?;

    info!(%output, "=== Onboarding Example Complete ===");
    Ok(())
}
