// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Effect invocation port.
//!
//! Every external side effect a saga performs (charging a customer, creating
//! an account, sending an email) goes through [`EffectPort`]. The engine
//! treats all named effects identically: synchronous from the sequencer's
//! view, time-budgeted, fallible. Idempotency and retries are the port
//! implementation's responsibility.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::EffectError;

/// A named effect invocation with its arguments.
///
/// Calls are plain data so that steps and compensation entries stay
/// serializable for checkpointing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectCall {
    /// Name of the effect to invoke.
    pub name: String,
    /// Arguments passed to the port.
    pub args: Value,
}

impl EffectCall {
    /// Create a new effect call.
    pub fn new(name: impl Into<String>, args: Value) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// Capability to invoke a single named side-effecting operation.
///
/// Implementations decide how the effect physically executes (activity
/// worker, HTTP call, stub). They may retry internally; the engine applies
/// only the configured time budget around each invocation.
#[async_trait]
pub trait EffectPort: Send + Sync {
    /// Invoke the named effect and return its result.
    async fn invoke(&self, name: &str, args: Value) -> Result<Value, EffectError>;
}

/// Invoke an effect through the port with a time budget applied.
///
/// Budget expiry surfaces as [`EffectError::TimedOut`]; the port's own error
/// is passed through unchanged.
pub async fn invoke_with_budget(
    port: &dyn EffectPort,
    call: &EffectCall,
    budget: Duration,
) -> Result<Value, EffectError> {
    match tokio::time::timeout(budget, port.invoke(&call.name, call.args.clone())).await {
        Ok(result) => result,
        Err(_) => {
            warn!(effect = %call.name, budget_ms = budget.as_millis() as u64, "Effect exceeded budget");
            Err(EffectError::TimedOut {
                name: call.name.clone(),
                budget_ms: budget.as_millis() as u64,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct SlowPort;

    #[async_trait]
    impl EffectPort for SlowPort {
        async fn invoke(&self, _name: &str, _args: Value) -> Result<Value, EffectError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(json!("done"))
        }
    }

    struct EchoPort;

    #[async_trait]
    impl EffectPort for EchoPort {
        async fn invoke(&self, name: &str, args: Value) -> Result<Value, EffectError> {
            Ok(json!({ "effect": name, "args": args }))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_expiry_maps_to_timed_out() {
        let call = EffectCall::new("charge-customer", json!({"account": "acme"}));
        let err = invoke_with_budget(&SlowPort, &call, Duration::from_secs(5))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            EffectError::TimedOut {
                name: "charge-customer".to_string(),
                budget_ms: 5_000,
            }
        );
    }

    #[tokio::test]
    async fn test_result_passes_through_within_budget() {
        let call = EffectCall::new("create-account", json!("acme"));
        let value = invoke_with_budget(&EchoPort, &call, Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(value["effect"], "create-account");
        assert_eq!(value["args"], "acme");
    }

    #[test]
    fn test_effect_call_roundtrips_through_json() {
        let call = EffectCall::new("refund-customer", json!({"account": "acme"}));
        let encoded = serde_json::to_string(&call).unwrap();
        let decoded: EffectCall = serde_json::from_str(&encoded).unwrap();
        assert_eq!(call, decoded);
    }
}
