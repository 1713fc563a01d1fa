// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! SaaS customer onboarding saga, built on [`saga_engine`].
//!
//! One run onboards an account: charge, provision the account and its admin
//! users (all three reversible), deliver a claim code to every invited
//! participant, suspend until someone accepts a claim code (up to the
//! configured acceptance timeout, 120 seconds by default), then send the
//! welcome and feedback emails.
//!
//! While the saga runs — including while it is suspended on the acceptance
//! gate or mid-rollback — its progress can be queried through a
//! [`QueryHandle`](saga_engine::QueryHandle), and the acceptance can be
//! signalled through an [`AcceptanceGate`](saga_engine::AcceptanceGate).
//! Both handles are obtained from the saga before starting it:
//!
//! ```ignore
//! use std::sync::Arc;
//! use saga_engine::{MemoryCheckpointer, SagaConfig};
//! use saga_onboarding::{OnboardingInput, OnboardingSaga};
//!
//! let input = OnboardingInput::new("acme", vec!["admin@acme.test".into()]);
//! let saga = OnboardingSaga::new(input, port, Arc::new(MemoryCheckpointer::new()),
//!     SagaConfig::default());
//!
//! let query = saga.query_handle();     // read-only, callable at any time
//! let gate = saga.acceptance_gate();   // idempotent accept signal
//!
//! let outcome = tokio::spawn(saga.run());
//! gate.accept();
//! let output = outcome.await??;
//! ```

pub mod input;
pub mod saga;

pub use input::{effects, generate_claim_code, OnboardingInput};
pub use saga::OnboardingSaga;
