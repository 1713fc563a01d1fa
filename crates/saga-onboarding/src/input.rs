// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Onboarding input and the named effects the saga invokes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Effect names the onboarding saga sends through the effect port.
///
/// The port decides what each name physically does (payment processor call,
/// account service, mail relay); the saga only sequences them.
pub mod effects {
    /// Charge the customer for the subscription.
    pub const CHARGE_CUSTOMER: &str = "charge-customer";
    /// Reverse a charge.
    pub const REFUND_CUSTOMER: &str = "refund-customer";
    /// Provision the customer account.
    pub const CREATE_ACCOUNT: &str = "create-account";
    /// Tear down a provisioned account.
    pub const DELETE_ACCOUNT: &str = "delete-account";
    /// Provision admin users for the account.
    pub const CREATE_ADMIN_USERS: &str = "create-admin-users";
    /// Remove provisioned admin users.
    pub const DELETE_ADMIN_USERS: &str = "delete-admin-users";
    /// Deliver one participant's claim code.
    pub const SEND_CLAIM_CODE: &str = "send-claim-code";
    /// Post-acceptance welcome email.
    pub const SEND_WELCOME_EMAIL: &str = "send-welcome-email";
    /// Post-acceptance feedback request email.
    pub const SEND_FEEDBACK_EMAIL: &str = "send-feedback-email";
}

/// Input for one onboarding run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingInput {
    /// Account being onboarded.
    pub account_name: String,
    /// Admin users to invite; one claim code is issued per email.
    pub emails: Vec<String>,
}

impl OnboardingInput {
    /// Create an onboarding input.
    pub fn new(account_name: impl Into<String>, emails: Vec<String>) -> Self {
        Self {
            account_name: account_name.into(),
            emails,
        }
    }
}

/// Generate a claim code for one participant.
///
/// Codes are unique per participant within a run (and across runs, short of
/// a truncated-UUID collision).
pub fn generate_claim_code() -> String {
    let id = Uuid::new_v4().simple().to_string();
    id[..8].to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_codes_are_distinct() {
        let a = generate_claim_code();
        let b = generate_claim_code();
        assert_eq!(a.len(), 8);
        assert_eq!(b.len(), 8);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_input_roundtrips_through_json() {
        let input = OnboardingInput::new("acme", vec!["a@example.com".to_string()]);
        let encoded = serde_json::to_string(&input).unwrap();
        let decoded: OnboardingInput = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.account_name, "acme");
        assert_eq!(decoded.emails.len(), 1);
    }
}
