use serde::Serialize;

use crate::domain::{Account, AccountId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ranked {
    pub account_id: AccountId,
    pub display_name: String,
    pub value: i64,
}

/// Aggregate figures over every account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub accounts: usize,
    pub messages: u64,
    pub circulating: i64,
    pub escrowed: i64,
    pub top_by_messages: Vec<Ranked>,
    pub top_by_balance: Vec<Ranked>,
}

impl Statistics {
    pub(crate) fn compute(accounts: &[(AccountId, Account)], escrowed: i64, top_n: usize) -> Self {
        let rank = |value: fn(&Account) -> i64| {
            let mut ranked: Vec<Ranked> = accounts
                .iter()
                .map(|(id, a)| Ranked {
                    account_id: id.clone(),
                    display_name: a.display_name.clone(),
                    value: value(a),
                })
                .collect();
            // Ties broken by id so output is stable.
            ranked.sort_by(|x, y| y.value.cmp(&x.value).then_with(|| x.account_id.cmp(&y.account_id)));
            ranked.truncate(top_n);
            ranked
        };

        Self {
            accounts: accounts.len(),
            messages: accounts.iter().map(|(_, a)| a.messages).sum(),
            circulating: accounts.iter().map(|(_, a)| a.balance).sum(),
            escrowed,
            top_by_messages: rank(|a| i64::try_from(a.messages).unwrap_or(i64::MAX)),
            top_by_balance: rank(|a| a.balance),
        }
    }
}
