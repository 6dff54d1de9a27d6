//! Ledger store: accounts, balances, history and bearer checks.
//!
//! Every mutation follows the same path:
//!
//! 1. take the per-key locks for the accounts and checks it touches,
//! 2. validate against the committed records and stage the new ones,
//! 3. under the commit lock, merge the staged records over the committed
//!    state, save the full snapshot and only then publish in memory.
//!
//! A failed save leaves memory untouched, so the caller sees
//! `Infra(Persistence)` and no partial mutation.

mod codes;
mod locks;
mod stats;

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, error, info, warn};

pub use codes::{CodeSource, RandomCodes};
pub use locks::{KeyGuard, KeyLocks, LockKey};
pub use stats::{Ranked, Statistics};

use crate::clock::Clock;
use crate::domain::rules::MAX_CODE_ATTEMPTS;
use crate::domain::{Account, AccountId, Check, CheckCode, LedgerEntry};
use crate::errors::{
    ConflictKind, DomainError, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::persistence::{LedgerSnapshot, SnapshotStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Registration {
    Created,
    Existing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransferReceipt {
    pub amount: i64,
    pub from_balance: i64,
    pub to_balance: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedCheck {
    pub code: CheckCode,
    pub amount: i64,
    pub issuer_balance: i64,
}

/// Result of redeeming a check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Redemption {
    /// Another account was credited; the check is kept as activated.
    Credited {
        amount: i64,
        issuer: AccountId,
        balance: i64,
    },
    /// The issuer took the escrow back; the check no longer exists.
    SelfCancelled { amount: i64, balance: i64 },
}

/// Records to publish once the snapshot containing them is saved.
/// A `None` check deletes that code.
#[derive(Default)]
struct Staged {
    accounts: Vec<(AccountId, Account)>,
    checks: Vec<(CheckCode, Option<Check>)>,
}

impl Staged {
    fn account(mut self, id: AccountId, account: Account) -> Self {
        self.accounts.push((id, account));
        self
    }

    fn check(mut self, code: CheckCode, check: Option<Check>) -> Self {
        self.checks.push((code, check));
        self
    }
}

pub struct Ledger {
    accounts: DashMap<AccountId, Account>,
    checks: DashMap<CheckCode, Check>,
    locks: KeyLocks,
    commit_lock: Mutex<()>,
    store: Arc<dyn SnapshotStore>,
    codes: Arc<dyn CodeSource>,
    clock: Arc<dyn Clock>,
}

impl Ledger {
    /// Load the committed state from `store`.
    pub fn load(
        store: Arc<dyn SnapshotStore>,
        codes: Arc<dyn CodeSource>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DomainError> {
        let snapshot = store.load()?;
        info!(
            accounts = snapshot.accounts.len(),
            checks = snapshot.checks.len(),
            "ledger loaded"
        );
        Ok(Self {
            accounts: snapshot.accounts.into_iter().collect(),
            checks: snapshot.checks.into_iter().collect(),
            locks: KeyLocks::new(),
            commit_lock: Mutex::new(()),
            store,
            codes,
            clock,
        })
    }

    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    // ---------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------

    /// Create the account on first contact. Existing accounts are left as is.
    pub fn register(
        &self,
        id: &AccountId,
        display_name: &str,
    ) -> Result<Registration, DomainError> {
        let _guard = self.locks.acquire([LockKey::Account(id.clone())]);
        if self.accounts.contains_key(id) {
            return Ok(Registration::Existing);
        }

        let account = Account::open(display_name, self.now());
        self.commit(Staged::default().account(id.clone(), account))?;
        info!(account_id = %id, "account registered");
        Ok(Registration::Created)
    }

    /// Credit `amount` to `id`, creating an empty account if it is unknown.
    /// Returns the new balance.
    pub fn credit(&self, id: &AccountId, amount: i64, reason: &str) -> Result<i64, DomainError> {
        require_positive(amount)?;
        let _guard = self.locks.acquire([LockKey::Account(id.clone())]);

        let mut account = self.committed_account(id).unwrap_or_default();
        let balance = account.apply_delta(amount, reason, self.now())?;
        self.commit(Staged::default().account(id.clone(), account))?;

        info!(account_id = %id, amount, balance, reason, "credit committed");
        Ok(balance)
    }

    pub fn transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: i64,
    ) -> Result<TransferReceipt, DomainError> {
        require_positive(amount)?;
        if from == to {
            return Err(DomainError::validation(
                ValidationKind::SelfTransfer,
                "cannot transfer to the same account",
            ));
        }

        let _guard = self.locks.acquire([
            LockKey::Account(from.clone()),
            LockKey::Account(to.clone()),
        ]);
        debug!(from = %from, to = %to, amount, "transfer locks held");

        let mut sender = self.require_account(from)?;
        let mut receiver = self.require_account(to)?;
        require_funds(&sender, amount)?;

        let now = self.now();
        let from_balance = sender.apply_delta(-amount, format!("transfer to {to}"), now)?;
        let to_balance = receiver.apply_delta(amount, format!("transfer from {from}"), now)?;

        self.commit(
            Staged::default()
                .account(from.clone(), sender)
                .account(to.clone(), receiver),
        )?;

        info!(from = %from, to = %to, amount, "transfer committed");
        Ok(TransferReceipt {
            amount,
            from_balance,
            to_balance,
        })
    }

    /// Escrow `amount` from the issuer and register a check under a fresh code.
    pub fn issue_check(&self, issuer: &AccountId, amount: i64) -> Result<IssuedCheck, DomainError> {
        require_positive(amount)?;
        let _issuer_guard = self.locks.acquire([LockKey::Account(issuer.clone())]);

        let mut account = self.require_account(issuer)?;
        require_funds(&account, amount)?;

        let (code, _code_guard) = self.reserve_code()?;
        let now = self.now();
        let issuer_balance = account.apply_delta(-amount, format!("check {code} issued"), now)?;
        let check = Check::new(issuer.clone(), amount, now);

        self.commit(
            Staged::default()
                .account(issuer.clone(), account)
                .check(code.clone(), Some(check)),
        )?;

        info!(account_id = %issuer, amount, code = %code, "check issued");
        Ok(IssuedCheck {
            code,
            amount,
            issuer_balance,
        })
    }

    /// Redeem a check. Missing and already-activated codes are both
    /// rejected without touching any balance.
    pub fn redeem_check(&self, redeemer: &AccountId, raw_code: &str) -> Result<Redemption, DomainError> {
        let code = CheckCode::normalise(raw_code);
        if !code.is_well_formed() {
            warn!(account_id = %redeemer, len = raw_code.len(), "redeem of malformed check code");
            return Err(DomainError::not_found(
                NotFoundKind::Check,
                "no check has that code",
            ));
        }
        let _guard = self.locks.acquire([
            LockKey::Account(redeemer.clone()),
            LockKey::Check(code.clone()),
        ]);

        let Some(mut check) = self.checks.get(&code).map(|c| c.value().clone()) else {
            warn!(account_id = %redeemer, code = %code, "redeem of unknown check");
            return Err(DomainError::not_found(
                NotFoundKind::Check,
                format!("check {code} does not exist"),
            ));
        };
        if check.activated {
            warn!(account_id = %redeemer, code = %code, "redeem of activated check");
            return Err(DomainError::conflict(
                ConflictKind::CheckAlreadyRedeemed,
                format!("check {code} was already redeemed"),
            ));
        }

        let now = self.now();
        let amount = check.amount;

        if &check.issuer == redeemer {
            let mut issuer = self.committed_account(redeemer).unwrap_or_default();
            let balance = issuer.apply_delta(amount, format!("check {code} cancelled"), now)?;
            self.commit(
                Staged::default()
                    .account(redeemer.clone(), issuer)
                    .check(code.clone(), None),
            )?;
            info!(account_id = %redeemer, amount, code = %code, "check cancelled by issuer");
            return Ok(Redemption::SelfCancelled { amount, balance });
        }

        let mut account = self.committed_account(redeemer).unwrap_or_default();
        let balance = account.apply_delta(amount, format!("check {code} redeemed"), now)?;
        let issuer = check.issuer.clone();
        check.mark_redeemed(redeemer.clone(), now);

        self.commit(
            Staged::default()
                .account(redeemer.clone(), account)
                .check(code.clone(), Some(check)),
        )?;

        info!(account_id = %redeemer, amount, code = %code, "check redeemed");
        Ok(Redemption::Credited {
            amount,
            issuer,
            balance,
        })
    }

    /// Run `f` against a copy of one existing account under its lock and
    /// commit the copy if `f` succeeds.
    pub fn update_account<T>(
        &self,
        id: &AccountId,
        f: impl FnOnce(&mut Account, OffsetDateTime) -> Result<T, DomainError>,
    ) -> Result<T, DomainError> {
        let _guard = self.locks.acquire([LockKey::Account(id.clone())]);
        let mut account = self.require_account(id)?;
        let out = f(&mut account, self.now())?;
        self.commit(Staged::default().account(id.clone(), account))?;
        Ok(out)
    }

    pub fn record_message(&self, id: &AccountId) -> Result<u64, DomainError> {
        self.update_account(id, |account, _| {
            account.messages += 1;
            Ok(account.messages)
        })
    }

    // ---------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------

    pub fn account(&self, id: &AccountId) -> Result<Account, DomainError> {
        self.require_account(id)
    }

    pub fn balance(&self, id: &AccountId) -> Result<i64, DomainError> {
        self.accounts
            .get(id)
            .map(|a| a.balance)
            .ok_or_else(|| unknown_account(id))
    }

    /// The newest `limit` entries, oldest first.
    pub fn history(&self, id: &AccountId, limit: usize) -> Result<Vec<LedgerEntry>, DomainError> {
        let account = self.require_account(id)?;
        let skip = account.history.len().saturating_sub(limit);
        Ok(account.history.into_iter().skip(skip).collect())
    }

    pub fn check(&self, code: &CheckCode) -> Option<Check> {
        self.checks.get(code).map(|c| c.value().clone())
    }

    pub fn account_ids(&self) -> Vec<AccountId> {
        let mut ids: Vec<AccountId> = self.accounts.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Sum of unredeemed check amounts, i.e. currency held in escrow.
    pub fn escrowed(&self) -> i64 {
        self.checks
            .iter()
            .filter(|c| !c.activated)
            .map(|c| c.amount)
            .sum()
    }

    pub fn statistics(&self, top_n: usize) -> Statistics {
        let accounts: Vec<(AccountId, Account)> = self
            .accounts
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        Statistics::compute(&accounts, self.escrowed(), top_n)
    }

    // ---------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------

    fn committed_account(&self, id: &AccountId) -> Option<Account> {
        self.accounts.get(id).map(|a| a.value().clone())
    }

    fn require_account(&self, id: &AccountId) -> Result<Account, DomainError> {
        self.committed_account(id).ok_or_else(|| unknown_account(id))
    }

    /// Draw codes until one is free, returning it with its lock held.
    fn reserve_code(&self) -> Result<(CheckCode, KeyGuard<'_>), DomainError> {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let candidate = self.codes.next_code();
            let guard = self.locks.acquire([LockKey::Check(candidate.clone())]);
            if !self.checks.contains_key(&candidate) {
                return Ok((candidate, guard));
            }
            debug!(attempt, code = %candidate, "check code collision");
        }
        error!(attempts = MAX_CODE_ATTEMPTS, "check code space exhausted");
        Err(DomainError::infra(
            InfraErrorKind::CodeSpaceExhausted,
            format!("no free check code after {MAX_CODE_ATTEMPTS} attempts"),
        ))
    }

    fn commit(&self, staged: Staged) -> Result<(), DomainError> {
        let _commit = self.commit_lock.lock();

        let mut snapshot = LedgerSnapshot {
            accounts: self
                .accounts
                .iter()
                .map(|e| (e.key().clone(), e.value().clone()))
                .collect(),
            checks: self
                .checks
                .iter()
                .map(|e| (e.key().clone(), e.value().clone()))
                .collect(),
        };
        for (id, account) in &staged.accounts {
            snapshot.accounts.insert(id.clone(), account.clone());
        }
        for (code, check) in &staged.checks {
            match check {
                Some(check) => snapshot.checks.insert(code.clone(), check.clone()),
                None => snapshot.checks.remove(code),
            };
        }

        if let Err(e) = self.store.save(&snapshot) {
            error!(error = %e, "snapshot save failed, mutation discarded");
            return Err(e.into());
        }

        for (id, account) in staged.accounts {
            self.accounts.insert(id, account);
        }
        for (code, check) in staged.checks {
            match check {
                Some(check) => {
                    self.checks.insert(code, check);
                }
                None => {
                    self.checks.remove(&code);
                }
            }
        }
        Ok(())
    }
}

fn require_positive(amount: i64) -> Result<(), DomainError> {
    if amount <= 0 {
        return Err(DomainError::validation(
            ValidationKind::InvalidAmount,
            format!("amount must be positive, got {amount}"),
        ));
    }
    Ok(())
}

fn require_funds(account: &Account, amount: i64) -> Result<(), DomainError> {
    if account.balance < amount {
        return Err(DomainError::validation(
            ValidationKind::InsufficientFunds,
            format!("balance {} does not cover {amount}", account.balance),
        ));
    }
    Ok(())
}

fn unknown_account(id: &AccountId) -> DomainError {
    DomainError::not_found(NotFoundKind::Account, format!("account {id} does not exist"))
}
