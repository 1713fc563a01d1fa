// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Saga state, phase transitions, and the concurrent query surface.
//!
//! A saga's state is a single-writer/multi-reader resource. The sequencer and
//! waiter hold the only [`StateCell`] (the writer); any number of
//! [`QueryHandle`]s read torn-free snapshots concurrently, without ever
//! blocking forward progress. The split is enforced with a
//! `tokio::sync::watch` channel: mutations go through `send_modify`, which is
//! atomic from the reading side's perspective, and queries clone the latest
//! observed value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::info;

/// Progress phase of a saga run.
///
/// Monotonic except for the jump to `Compensating`/`Failed`, which is legal
/// from any active phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Charging the customer.
    Charging,
    /// Creating the account.
    ProvisioningAccount,
    /// Creating admin users.
    ProvisioningUsers,
    /// Sending access codes to participants.
    DistributingCodes,
    /// Suspended on the acceptance gate.
    AwaitingAcceptance,
    /// Post-acceptance follow-up effects.
    Finalizing,
    /// Terminal: all steps succeeded.
    Completed,
    /// Rollback in progress.
    Compensating,
    /// Terminal: saga failed. State is retained for inspection.
    Failed,
}

impl Phase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Charging => "charging",
            Self::ProvisioningAccount => "provisioning_account",
            Self::ProvisioningUsers => "provisioning_users",
            Self::DistributingCodes => "distributing_codes",
            Self::AwaitingAcceptance => "awaiting_acceptance",
            Self::Finalizing => "finalizing",
            Self::Completed => "completed",
            Self::Compensating => "compensating",
            Self::Failed => "failed",
        }
    }

    /// Whether this phase ends the saga's logical run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// A participant in the onboarding run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Where the participant's access code is delivered.
    pub contact_address: String,
    /// Credential issued at creation, one per participant.
    pub access_code: String,
    /// Set only by the waiter once the acceptance gate flips.
    pub accepted: bool,
}

impl Participant {
    /// Create a participant with its access code; `accepted` starts false.
    pub fn new(contact_address: impl Into<String>, access_code: impl Into<String>) -> Self {
        Self {
            contact_address: contact_address.into(),
            access_code: access_code.into(),
            accepted: false,
        }
    }
}

/// The single source of truth for a saga run's progress.
///
/// Created once per saga instance; `subject_name` and the participant list
/// length are immutable after creation. Never erased: on terminal failure the
/// state persists in `Failed` phase for inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SagaState {
    /// Identifier of the entity being onboarded.
    pub subject_name: String,
    /// Fixed at creation time, never resized.
    pub participants: Vec<Participant>,
    /// Current progress phase.
    pub phase: Phase,
    /// When the state last changed.
    pub updated_at: DateTime<Utc>,
}

impl SagaState {
    /// Create the initial state for a saga run, starting in [`Phase::Charging`].
    pub fn new(subject_name: impl Into<String>, participants: Vec<Participant>) -> Self {
        Self {
            subject_name: subject_name.into(),
            participants,
            phase: Phase::Charging,
            updated_at: Utc::now(),
        }
    }

    /// Whether every participant has accepted.
    pub fn all_accepted(&self) -> bool {
        self.participants.iter().all(|p| p.accepted)
    }
}

/// Writer side of a saga's state. Owned exclusively by the saga's single
/// thread of control; there is no way to obtain a second writer.
#[derive(Debug)]
pub struct StateCell {
    tx: watch::Sender<SagaState>,
}

impl StateCell {
    /// Wrap an initial state, returning the writer cell.
    pub fn new(initial: SagaState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Create a read-only query handle. Cheap; may be called any number of times.
    pub fn query_handle(&self) -> QueryHandle {
        QueryHandle {
            rx: self.tx.subscribe(),
        }
    }

    /// Apply a mutation atomically with respect to readers.
    pub fn update(&self, f: impl FnOnce(&mut SagaState)) {
        self.tx.send_modify(|state| {
            f(state);
            state.updated_at = Utc::now();
        });
    }

    /// Transition to a new phase.
    pub fn set_phase(&self, phase: Phase) {
        self.update(|state| {
            info!(
                subject = %state.subject_name,
                from = state.phase.as_str(),
                to = phase.as_str(),
                "Phase transition"
            );
            state.phase = phase;
        });
    }

    /// Snapshot the current state from the writer side.
    pub fn snapshot(&self) -> SagaState {
        self.tx.borrow().clone()
    }
}

/// Read-only projection of a saga's progress.
///
/// Safe to call at any time, including concurrently with an in-progress
/// sequencer step, an active wait, or mid-compensation. A query never delays
/// the writer.
#[derive(Debug, Clone)]
pub struct QueryHandle {
    rx: watch::Receiver<SagaState>,
}

impl QueryHandle {
    /// Return a torn-free snapshot of the current saga state.
    pub fn query(&self) -> SagaState {
        self.rx.borrow().clone()
    }
}
