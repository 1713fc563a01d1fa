// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Shared test helpers for saga-engine integration tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use saga_engine::{CheckpointError, Checkpointer, EffectError, EffectPort};

/// Checkpoint store whose saves always fail, as if the backing store were
/// unreachable.
pub struct OfflineStore;

#[async_trait]
impl Checkpointer for OfflineStore {
    async fn save(
        &self,
        _instance_id: &str,
        _checkpoint_id: &str,
        _payload: &[u8],
    ) -> Result<(), CheckpointError> {
        Err(CheckpointError("store offline".to_string()))
    }

    async fn latest(
        &self,
        _instance_id: &str,
    ) -> Result<Option<(String, Vec<u8>)>, CheckpointError> {
        Err(CheckpointError("store offline".to_string()))
    }
}

/// Effect port that records invocation order and fails or delays effects on
/// demand.
#[derive(Default)]
pub struct ScriptedPort {
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<String, String>>,
    delays: Mutex<HashMap<String, Duration>>,
}

impl ScriptedPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every invocation of `effect` fail with `message`.
    pub fn fail(self, effect: &str, message: &str) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(effect.to_string(), message.to_string());
        self
    }

    /// Delay every invocation of `effect` by `delay` before succeeding.
    pub fn delay(self, effect: &str, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(effect.to_string(), delay);
        self
    }

    /// Every effect name invoked so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// How many times `effect` was invoked.
    pub fn count(&self, effect: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == effect).count()
    }
}

#[async_trait]
impl EffectPort for ScriptedPort {
    async fn invoke(&self, name: &str, _args: Value) -> Result<Value, EffectError> {
        self.calls.lock().unwrap().push(name.to_string());

        let delay = self.delays.lock().unwrap().get(name).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.failures.lock().unwrap().get(name).cloned();
        if let Some(message) = failure {
            return Err(EffectError::Failed {
                name: name.to_string(),
                message,
            });
        }
        Ok(json!(format!("{name}: ok")))
    }
}
