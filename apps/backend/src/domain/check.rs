use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::ids::AccountId;

/// Bearer check. The amount was escrowed from the issuer at issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Check {
    pub issuer: AccountId,
    pub amount: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub activated: bool,
    #[serde(default)]
    pub activated_by: Option<AccountId>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub activated_at: Option<OffsetDateTime>,
}

impl Check {
    pub fn new(issuer: AccountId, amount: i64, now: OffsetDateTime) -> Self {
        Self {
            issuer,
            amount,
            created_at: now,
            activated: false,
            activated_by: None,
            activated_at: None,
        }
    }

    pub fn mark_redeemed(&mut self, by: AccountId, now: OffsetDateTime) {
        self.activated = true;
        self.activated_by = Some(by);
        self.activated_at = Some(now);
    }
}
