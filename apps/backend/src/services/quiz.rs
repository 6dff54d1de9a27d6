//! Multiple-choice quiz paying a small reward for a correct answer.
//!
//! Each account has at most one open question. Answering closes it, right
//! or wrong, so a question pays out at most once.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use tracing::{info, warn};

use super::Dice;
use crate::domain::rules::{QUIZ_REASON, QUIZ_REWARD};
use crate::domain::AccountId;
use crate::errors::{DomainError, ValidationKind};
use crate::ledger::Ledger;

pub const DEFAULT_CATEGORY: &str = "general";

#[derive(Debug)]
struct Question {
    category: &'static str,
    prompt: &'static str,
    options: [&'static str; 4],
    answer: usize,
}

const QUESTIONS: &[Question] = &[
    Question {
        category: "general",
        prompt: "What is the capital of France?",
        options: ["London", "Berlin", "Paris", "Madrid"],
        answer: 2,
    },
    Question {
        category: "general",
        prompt: "How many planets are in the Solar System?",
        options: ["7", "8", "9", "10"],
        answer: 1,
    },
    Question {
        category: "general",
        prompt: "Who wrote 'War and Peace'?",
        options: ["Dostoevsky", "Tolstoy", "Chekhov", "Turgenev"],
        answer: 1,
    },
    Question {
        category: "science",
        prompt: "Which chemical element has the symbol 'O'?",
        options: ["Gold", "Oxygen", "Osmium", "Tin"],
        answer: 1,
    },
    Question {
        category: "science",
        prompt: "What is the largest planet in the Solar System?",
        options: ["Earth", "Jupiter", "Saturn", "Neptune"],
        answer: 1,
    },
];

/// Question as shown to the player. Options are numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizPrompt {
    pub category: &'static str,
    pub question: &'static str,
    pub options: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizOutcome {
    pub correct: bool,
    pub answer: &'static str,
    pub reward: Option<i64>,
    pub balance: i64,
}

pub struct QuizService {
    ledger: Arc<Ledger>,
    dice: Arc<Dice>,
    open: DashMap<AccountId, usize>,
}

impl QuizService {
    pub fn new(ledger: Arc<Ledger>, dice: Arc<Dice>) -> Self {
        Self {
            ledger,
            dice,
            open: DashMap::new(),
        }
    }

    pub fn categories() -> Vec<&'static str> {
        let mut names: Vec<&'static str> = QUESTIONS.iter().map(|q| q.category).collect();
        names.dedup();
        names
    }

    /// Draw a question for `id`, replacing any unanswered one.
    pub fn ask(&self, id: &AccountId, category: Option<&str>) -> Result<QuizPrompt, DomainError> {
        self.ledger.account(id)?;
        let category = category.unwrap_or(DEFAULT_CATEGORY).to_ascii_lowercase();
        let pool: Vec<usize> = QUESTIONS
            .iter()
            .enumerate()
            .filter(|(_, q)| q.category == category)
            .map(|(i, _)| i)
            .collect();
        if pool.is_empty() {
            return Err(DomainError::validation(
                ValidationKind::InvalidInput,
                format!(
                    "no quiz questions in category {category:?}; try {}",
                    Self::categories().join(", ")
                ),
            ));
        }

        let last = i64::try_from(pool.len() - 1).unwrap_or(0);
        let pick = pool[usize::try_from(self.dice.roll(0..=last)).unwrap_or(0)];
        self.open.insert(id.clone(), pick);

        let question = &QUESTIONS[pick];
        info!(account_id = %id, category = question.category, "quiz question asked");
        Ok(QuizPrompt {
            category: question.category,
            question: question.prompt,
            options: question.options.to_vec(),
        })
    }

    /// Answer the open question with a 1-based option number.
    pub fn answer(&self, id: &AccountId, choice: usize) -> Result<QuizOutcome, DomainError> {
        let Some((_, pick)) = self.open.remove(id) else {
            warn!(account_id = %id, "quiz answer without an open question");
            return Err(DomainError::validation(
                ValidationKind::InvalidInput,
                "no quiz question is waiting for an answer",
            ));
        };
        let question = &QUESTIONS[pick];
        let answer = question.options[question.answer];

        if choice.checked_sub(1) != Some(question.answer) {
            info!(account_id = %id, choice, "quiz answered wrong");
            return Ok(QuizOutcome {
                correct: false,
                answer,
                reward: None,
                balance: self.ledger.balance(id)?,
            });
        }

        let reward = self.dice.roll(QUIZ_REWARD);
        let balance = match self.ledger.credit(id, reward, QUIZ_REASON) {
            Ok(balance) => balance,
            Err(e) => {
                // Unpaid: leave the question open for another try.
                self.open.insert(id.clone(), pick);
                return Err(e);
            }
        };
        info!(account_id = %id, reward, "quiz answered correctly");
        Ok(QuizOutcome {
            correct: true,
            answer,
            reward: Some(reward),
            balance,
        })
    }

    /// Correct option number for the open question, for tests.
    #[cfg(test)]
    pub(crate) fn expected(&self, id: &AccountId) -> Option<usize> {
        self.open.get(id).map(|pick| QUESTIONS[*pick].answer + 1)
    }
}
