use std::sync::Arc;

use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::info;

use super::Dice;
use crate::domain::rules::{holiday_on, DAILY_BASE_REWARD, DAILY_COOLDOWN, DAILY_HOLIDAY_BONUS};
use crate::domain::AccountId;
use crate::errors::{DomainError, ValidationKind};
use crate::ledger::Ledger;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyClaim {
    pub base: i64,
    pub bonus: i64,
    pub holiday: Option<&'static str>,
    pub balance: i64,
}

/// Once-a-day reward with a bonus on fixed holidays.
pub struct DailyRewardService {
    ledger: Arc<Ledger>,
    dice: Arc<Dice>,
}

impl DailyRewardService {
    pub fn new(ledger: Arc<Ledger>, dice: Arc<Dice>) -> Self {
        Self { ledger, dice }
    }

    pub fn claim_daily(&self, id: &AccountId) -> Result<DailyClaim, DomainError> {
        let claim = self.ledger.update_account(id, |account, now| {
            if let Some(next) = account.last_daily_claim.map(|last| last + DAILY_COOLDOWN) {
                if now < next {
                    let at = next.format(&Rfc3339).unwrap_or_else(|_| next.to_string());
                    return Err(DomainError::validation(
                        ValidationKind::DailyCooldown,
                        format!("next claim available at {at}"),
                    ));
                }
            }

            let base = self.dice.roll(DAILY_BASE_REWARD);
            account.apply_delta(base, "daily reward", now)?;

            let holiday = holiday_on(now.date());
            let bonus = match holiday {
                Some(name) => {
                    let bonus = self.dice.roll(DAILY_HOLIDAY_BONUS);
                    account.apply_delta(bonus, format!("{name} bonus"), now)?;
                    bonus
                }
                None => 0,
            };
            account.last_daily_claim = Some(now);

            Ok(DailyClaim {
                base,
                bonus,
                holiday,
                balance: account.balance,
            })
        })?;
        info!(account_id = %id, base = claim.base, bonus = claim.bonus, "daily reward claimed");
        Ok(claim)
    }

    /// When `id` may claim next; `None` means now.
    pub fn next_claim_at(&self, id: &AccountId) -> Result<Option<OffsetDateTime>, DomainError> {
        let account = self.ledger.account(id)?;
        let now = self.ledger.now();
        Ok(account
            .last_daily_claim
            .map(|last| last + DAILY_COOLDOWN)
            .filter(|next| *next > now))
    }
}
