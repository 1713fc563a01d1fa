// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Saga Engine - durable saga orchestration primitives.
//!
//! This crate provides the execution core for sagas: ordered sequences of
//! externally-effecting steps, each paired with an optional compensating
//! action, executed with at-most-one-in-flight semantics, able to suspend
//! on an external signal with a bounded timeout, and exposing a live,
//! concurrently-queryable snapshot of progress at any point — including
//! while suspended or mid-compensation.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Saga caller                           │
//! │              (e.g. saga-onboarding workflow)                 │
//! └──────────────────────────────────────────────────────────────┘
//!         │ run_steps / await_acceptance            ▲ Result
//!         ▼                                         │
//! ┌───────────────────────┐  push/unwind  ┌─────────────────────┐
//! │       Sequencer       │◄─────────────►│  CompensationStack  │
//! │ (single writer of     │               │  (LIFO, tagged      │
//! │  SagaState)           │               │   effect calls)     │
//! └───────────────────────┘               └─────────────────────┘
//!    │ invoke     │ mutate      │ wait
//!    ▼            ▼             ▼
//! ┌──────────┐ ┌───────────┐ ┌────────────────┐
//! │EffectPort│ │ StateCell │ │ AcceptanceGate │◄── accept() (external)
//! │(external)│ │           │ └────────────────┘
//! └──────────┘ └───────────┘
//!                  │ subscribe
//!                  ▼
//!            ┌─────────────┐
//!            │ QueryHandle │◄── query() (external, any time)
//!            └─────────────┘
//! ```
//!
//! # Concurrency model
//!
//! One logical thread of control per saga instance drives the sequencer, the
//! waiter, and all state mutation. Suspension happens only at the acceptance
//! gate and consumes no worker thread. Queries run concurrently with the
//! writer and always observe a consistent snapshot. Independent instances
//! share no mutable state.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use saga_engine::{
//!     CompensationStack, EffectCall, MemoryCheckpointer, Phase, SagaConfig,
//!     SagaState, Sequencer, StateCell, Step,
//! };
//!
//! let sequencer = Sequencer::new("inst-1", port, Arc::new(MemoryCheckpointer::new()),
//!     SagaConfig::default());
//! let state = StateCell::new(SagaState::new("acme", participants));
//! let query = state.query_handle(); // hand out to the query surface
//! let mut stack = CompensationStack::new();
//!
//! let steps = vec![
//!     Step::new("charge", Phase::Charging, EffectCall::new("charge-customer", args))
//!         .with_compensation(EffectCall::new("refund-customer", args)),
//! ];
//! let output = sequencer.run_steps(&steps, &mut stack, &state).await?;
//! ```

pub mod checkpoint;
pub mod compensation;
pub mod config;
pub mod effect;
pub mod error;
pub mod gate;
pub mod sequencer;
pub mod state;

pub use checkpoint::{CheckpointError, CheckpointPayload, Checkpointer, MemoryCheckpointer};
pub use compensation::{CompensationEntry, CompensationFailure, CompensationStack};
pub use config::{SagaConfig, DEFAULT_ACCEPTANCE_TIMEOUT, DEFAULT_EFFECT_BUDGET};
pub use effect::{invoke_with_budget, EffectCall, EffectPort};
pub use error::{EffectError, Result, SagaError};
pub use gate::AcceptanceGate;
pub use sequencer::{FailurePolicy, Sequencer, Step};
pub use state::{Participant, Phase, QueryHandle, SagaState, StateCell};
