// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Shared test helpers for onboarding saga tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use saga_engine::{EffectError, EffectPort};

/// Effect port that records every invocation (name and args) and fails the
/// effects it is told to fail.
#[derive(Default)]
pub struct FakeBackends {
    calls: Mutex<Vec<(String, Value)>>,
    failures: Mutex<HashMap<String, String>>,
}

impl FakeBackends {
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

    /// Effect names invoked so far, in order.
    pub fn call_names(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
    }

    /// Arguments of every invocation of `effect`.
    pub fn args_of(&self, effect: &str) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(n, _)| n == effect)
            .map(|(_, a)| a.clone())
            .collect()
    }

    /// How many times `effect` was invoked.
    pub fn count(&self, effect: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|(n, _)| n == effect).count()
    }
}

#[async_trait]
impl EffectPort for FakeBackends {
    async fn invoke(&self, name: &str, args: Value) -> Result<Value, EffectError> {
        self.calls.lock().unwrap().push((name.to_string(), args));

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
