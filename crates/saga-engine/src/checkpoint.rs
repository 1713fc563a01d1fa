// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Checkpoint port for durable resume.
//!
//! The engine checkpoints a serialized [`CheckpointPayload`] after every
//! phase transition, so a restarted instance can resume at the last completed
//! phase without re-running forward effects or re-pushing duplicate
//! compensations. Replay itself is the durable-execution substrate's job; the
//! engine only guarantees that the payload it hands over is complete.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compensation::CompensationStack;
use crate::state::SagaState;

/// Failure while recording or reading a checkpoint.
#[derive(Debug, Clone, Error)]
#[error("checkpoint store error: {0}")]
pub struct CheckpointError(pub String);

/// Everything needed to resume a saga at a phase boundary.
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckpointPayload {
    /// The saga state as of the transition.
    pub state: SagaState,
    /// Rollback actions accumulated so far.
    pub compensations: CompensationStack,
}

/// Capability to persist checkpoints for a saga instance.
#[async_trait]
pub trait Checkpointer: Send + Sync {
    /// Record a checkpoint. Overwrites any previous payload for the same
    /// `checkpoint_id`.
    async fn save(
        &self,
        instance_id: &str,
        checkpoint_id: &str,
        payload: &[u8],
    ) -> Result<(), CheckpointError>;

    /// The most recently saved checkpoint for an instance, if any.
    async fn latest(
        &self,
        instance_id: &str,
    ) -> Result<Option<(String, Vec<u8>)>, CheckpointError>;
}

/// In-memory checkpoint store, for tests and embedded runs.
#[derive(Debug, Default)]
pub struct MemoryCheckpointer {
    // instance_id -> ordered (checkpoint_id, payload) history
    inner: Mutex<HashMap<String, Vec<(String, Vec<u8>)>>>,
}

impl MemoryCheckpointer {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Checkpoint IDs recorded for an instance, in save order.
    pub fn checkpoint_ids(&self, instance_id: &str) -> Result<Vec<String>, CheckpointError> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| CheckpointError("lock poisoned".to_string()))?;
        Ok(inner
            .get(instance_id)
            .map(|history| history.iter().map(|(id, _)| id.clone()).collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl Checkpointer for MemoryCheckpointer {
    async fn save(
        &self,
        instance_id: &str,
        checkpoint_id: &str,
        payload: &[u8],
    ) -> Result<(), CheckpointError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| CheckpointError("lock poisoned".to_string()))?;
        let history = inner.entry(instance_id.to_string()).or_default();
        history.retain(|(id, _)| id != checkpoint_id);
        history.push((checkpoint_id.to_string(), payload.to_vec()));
        Ok(())
    }

    async fn latest(
        &self,
        instance_id: &str,
    ) -> Result<Option<(String, Vec<u8>)>, CheckpointError> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| CheckpointError("lock poisoned".to_string()))?;
        Ok(inner
            .get(instance_id)
            .and_then(|history| history.last().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Participant;

    #[tokio::test]
    async fn test_save_and_latest() {
        let store = MemoryCheckpointer::new();
        store.save("inst-1", "charging", b"one").await.unwrap();
        store.save("inst-1", "provisioning_account", b"two").await.unwrap();

        let (id, payload) = store.latest("inst-1").await.unwrap().unwrap();
        assert_eq!(id, "provisioning_account");
        assert_eq!(payload, b"two");

        assert!(store.latest("inst-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resave_replaces_without_duplicating() {
        let store = MemoryCheckpointer::new();
        store.save("inst-1", "charging", b"one").await.unwrap();
        store.save("inst-1", "charging", b"one-again").await.unwrap();

        assert_eq!(store.checkpoint_ids("inst-1").unwrap(), vec!["charging"]);
        let (_, payload) = store.latest("inst-1").await.unwrap().unwrap();
        assert_eq!(payload, b"one-again");
    }

    #[test]
    fn test_checkpoint_ids_for_unknown_instance() {
        let store = MemoryCheckpointer::new();
        assert!(store.checkpoint_ids("nope").unwrap().is_empty());
    }

    #[test]
    fn test_payload_roundtrips() {
        let payload = CheckpointPayload {
            state: SagaState::new("acme", vec![Participant::new("a@example.com", "C-1")]),
            compensations: CompensationStack::new(),
        };
        let bytes = serde_json::to_vec(&payload).unwrap();
        let restored: CheckpointPayload = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(restored.state.subject_name, "acme");
        assert!(restored.compensations.is_empty());
    }
}
