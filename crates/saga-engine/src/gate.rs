// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The acceptance gate and its signal-gated wait primitive.
//!
//! The gate is a single boolean flipped out-of-band by an accept handler.
//! The saga suspends on [`AcceptanceGate::wait`] without consuming a worker
//! thread, resuming when the gate flips or the deadline elapses, whichever
//! comes first. A flip strictly before the deadline is guaranteed to read as
//! accepted; once the deadline has expired, expiry is authoritative and the
//! wait reads as a timeout.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

/// A one-way boolean gate shared between a suspended saga and an external
/// accept handler.
///
/// Cloning yields another handle to the same gate, so the accept surface can
/// be handed out while the saga keeps its own handle to wait on.
#[derive(Debug, Clone)]
pub struct AcceptanceGate {
    tx: Arc<watch::Sender<bool>>,
}

impl AcceptanceGate {
    /// Create a closed gate.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Flip the gate. Idempotent: repeated accepts after the first are no-ops.
    ///
    /// This is the entire accept surface; it carries no business logic. Any
    /// waiter re-evaluates its predicate when the gate flips.
    pub fn accept(&self) {
        let already = self.tx.send_replace(true);
        if already {
            debug!("Accept received on already-open gate (no-op)");
        } else {
            info!("Acceptance gate opened");
        }
    }

    /// Whether the gate has flipped.
    pub fn is_accepted(&self) -> bool {
        *self.tx.borrow()
    }

    /// Suspend until the gate satisfies `predicate` or `timeout` elapses.
    ///
    /// A predicate satisfied strictly before the deadline is guaranteed to
    /// return `true`; after the deadline has expired the wait returns
    /// `false`. On `false` the caller must treat the wait as a terminal saga
    /// failure; the gate performs no retries.
    pub async fn wait_until(
        &self,
        mut predicate: impl FnMut(bool) -> bool,
        timeout: Duration,
    ) -> bool {
        let mut rx = self.tx.subscribe();
        match tokio::time::timeout(timeout, rx.wait_for(|open| predicate(*open))).await {
            Ok(Ok(_)) => true,
            // The sender lives inside self, so recv can only fail if the
            // runtime is tearing down; treat it like a timeout.
            Ok(Err(_)) => false,
            Err(_) => false,
        }
    }

    /// Suspend until the gate flips open or `timeout` elapses.
    pub async fn wait(&self, timeout: Duration) -> bool {
        self.wait_until(|open| open, timeout).await
    }
}

impl Default for AcceptanceGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_wait_returns_false_on_timeout() {
        let gate = AcceptanceGate::new();
        let ok = gate.wait(Duration::from_secs(120)).await;
        assert!(!ok);
        assert!(!gate.is_accepted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_returns_true_on_flip_before_deadline() {
        let gate = AcceptanceGate::new();
        let signaller = gate.clone();

        let waiter = tokio::spawn(async move { gate.wait(Duration::from_secs(120)).await });

        tokio::time::sleep(Duration::from_secs(10)).await;
        signaller.accept();

        assert!(waiter.await.unwrap());
    }

    #[tokio::test]
    async fn test_wait_resolves_immediately_when_already_open() {
        let gate = AcceptanceGate::new();
        gate.accept();
        assert!(gate.wait(Duration::from_millis(1)).await);
    }

    #[tokio::test]
    async fn test_accept_is_idempotent() {
        let gate = AcceptanceGate::new();
        for _ in 0..5 {
            gate.accept();
        }
        assert!(gate.is_accepted());
        assert!(gate.wait(Duration::from_millis(1)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_predicate_gates_resumption() {
        let gate = AcceptanceGate::new();
        let signaller = gate.clone();

        // A predicate that is never satisfied times out even though the
        // gate flips.
        let waiter = tokio::spawn(async move {
            gate.wait_until(|_| false, Duration::from_secs(30)).await
        });
        tokio::time::sleep(Duration::from_secs(1)).await;
        signaller.accept();

        assert!(!waiter.await.unwrap());
    }
}
