//! Session lifecycle: start, move, payout, teardown.

use std::sync::Arc;

use serde::Serialize;
use time::Duration;
use tracing::{info, warn};

use super::registry::{no_session, SessionRegistry};
use super::session::{GameSession, Seat, SessionView};
use crate::clock::Clock;
use crate::domain::rules::VICTORY_REASON;
use crate::domain::{AccountId, ConversationId};
use crate::errors::{ConflictKind, DomainError, ValidationKind};
use crate::games::{GameResult, GameStatus, Side, TurnBasedGame, Variant};
use crate::ledger::Ledger;
use crate::services::Dice;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reward {
    pub account_id: AccountId,
    pub amount: i64,
    pub balance: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MoveOutcome {
    Continue {
        notation: String,
        status: GameStatus,
        turn: Side,
        on_turn: Seat,
        board: String,
    },
    /// The session ended and has been removed.
    Finished {
        notation: String,
        status: GameStatus,
        result: GameResult,
        winner: Option<Seat>,
        reward: Option<Reward>,
        duration: String,
        board: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbortSummary {
    pub variant: Variant,
    pub moves: Vec<String>,
    pub duration: String,
    pub board: String,
}

pub struct SessionCoordinator {
    registry: Arc<SessionRegistry>,
    ledger: Arc<Ledger>,
    dice: Arc<Dice>,
    clock: Arc<dyn Clock>,
}

impl SessionCoordinator {
    pub fn new(
        registry: Arc<SessionRegistry>,
        ledger: Arc<Ledger>,
        dice: Arc<Dice>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            ledger,
            dice,
            clock,
        }
    }

    /// Start a game against the placeholder. The player takes the first seat.
    pub fn start(
        &self,
        conversation: &ConversationId,
        variant: Variant,
        player: &AccountId,
    ) -> Result<SessionView, DomainError> {
        self.open(conversation, variant, player, Seat::Placeholder)
    }

    /// Start a game between two humans; the challenger takes the first seat.
    pub fn challenge(
        &self,
        conversation: &ConversationId,
        variant: Variant,
        player: &AccountId,
        opponent: &AccountId,
    ) -> Result<SessionView, DomainError> {
        if player == opponent {
            return Err(DomainError::validation(
                ValidationKind::InvalidInput,
                "cannot challenge yourself",
            ));
        }
        self.open(conversation, variant, player, Seat::Human(opponent.clone()))
    }

    fn open(
        &self,
        conversation: &ConversationId,
        variant: Variant,
        player: &AccountId,
        second: Seat,
    ) -> Result<SessionView, DomainError> {
        let session = GameSession::new(variant, player.clone(), second, self.clock.now());
        let view = session.view();
        self.registry.create(conversation, session)?;
        info!(
            conversation_id = %conversation,
            account_id = %player,
            variant = variant.name(),
            "game session started"
        );
        Ok(view)
    }

    /// Apply a move for `actor`. On a decisive result the winning human is
    /// paid before the session is removed; if the payout fails the move is
    /// discarded and the session stays as it was.
    pub fn make_move(
        &self,
        conversation: &ConversationId,
        actor: &AccountId,
        args: &str,
    ) -> Result<MoveOutcome, DomainError> {
        self.registry.with_slot(conversation, |slot| {
            let current = slot.as_ref().ok_or_else(|| no_session(conversation))?;
            if !current.may_act(actor) {
                warn!(conversation_id = %conversation, account_id = %actor, "move out of turn");
                return Err(DomainError::conflict(
                    ConflictKind::NotYourTurn,
                    format!("it is not {actor}'s turn"),
                ));
            }

            let mut next = current.clone();
            if !next.engine.apply_move(args) {
                return Err(DomainError::validation(
                    ValidationKind::IllegalMove,
                    format!("{args:?} is not a legal move"),
                ));
            }
            let notation = next.engine.moves().last().cloned().unwrap_or_default();
            let status = next.engine.status();
            let board = next.engine.render();

            let Some(result) = next.engine.winner() else {
                let outcome = MoveOutcome::Continue {
                    notation,
                    status,
                    turn: next.engine.turn(),
                    on_turn: next.on_turn().clone(),
                    board,
                };
                *slot = Some(next);
                return Ok(outcome);
            };

            let winner = match result {
                GameResult::Won(side) => Some(next.seat(side).clone()),
                GameResult::Draw => None,
            };
            let reward = match winner.as_ref().and_then(Seat::account) {
                Some(account_id) => Some(self.pay_reward(next.variant, account_id)?),
                None => None,
            };
            let duration = format_duration(self.clock.now() - next.created_at);

            *slot = None;
            info!(
                conversation_id = %conversation,
                variant = next.variant.name(),
                moves = next.engine.moves().len(),
                ?result,
                "game session finished"
            );
            Ok(MoveOutcome::Finished {
                notation,
                status,
                result,
                winner,
                reward,
                duration,
                board,
            })
        })
    }

    fn pay_reward(&self, variant: Variant, account_id: &AccountId) -> Result<Reward, DomainError> {
        let amount = self.dice.roll(variant.reward_range());
        let balance = self.ledger.credit(account_id, amount, VICTORY_REASON)?;
        Ok(Reward {
            account_id: account_id.clone(),
            amount,
            balance,
        })
    }

    pub fn abort(&self, conversation: &ConversationId) -> Result<AbortSummary, DomainError> {
        let session = self.registry.remove(conversation)?;
        info!(conversation_id = %conversation, "game session aborted");
        Ok(AbortSummary {
            variant: session.variant,
            moves: session.engine.moves().to_vec(),
            duration: format_duration(self.clock.now() - session.created_at),
            board: session.engine.render(),
        })
    }

    pub fn session(&self, conversation: &ConversationId) -> Result<SessionView, DomainError> {
        self.registry
            .get(conversation)
            .map(|s| s.view())
            .ok_or_else(|| no_session(conversation))
    }
}

/// `HH:MM:SS`; negative spans (clock moved back) read as zero.
pub fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.whole_seconds().max(0);
    format!("{:02}:{:02}:{:02}", secs / 3600, secs % 3600 / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::clock::ManualClock;
    use crate::errors::ErrorCode;
    use crate::ledger::RandomCodes;
    use crate::persistence::MemoryStore;

    struct Fixture {
        coordinator: SessionCoordinator,
        ledger: Arc<Ledger>,
        store: Arc<MemoryStore>,
        clock: ManualClock,
    }

    fn fixture() -> Fixture {
        let clock = ManualClock::new(datetime!(2026-06-01 18:00 UTC));
        let store = Arc::new(MemoryStore::new());
        let ledger = Arc::new(
            Ledger::load(
                store.clone(),
                Arc::new(RandomCodes::new(Some(5))),
                Arc::new(clock.clone()),
            )
            .unwrap(),
        );
        let coordinator = SessionCoordinator::new(
            Arc::new(SessionRegistry::new()),
            Arc::clone(&ledger),
            Arc::new(Dice::new(Some(9))),
            Arc::new(clock.clone()),
        );
        Fixture {
            coordinator,
            ledger,
            store,
            clock,
        }
    }

    fn conv() -> ConversationId {
        ConversationId::from("chat")
    }

    #[test]
    fn duration_format() {
        assert_eq!(format_duration(Duration::seconds(3725)), "01:02:05");
        assert_eq!(format_duration(Duration::seconds(-4)), "00:00:00");
    }

    #[test]
    fn second_start_in_a_conversation_is_rejected() {
        let f = fixture();
        let p = AccountId::from("p");
        f.coordinator.start(&conv(), Variant::Chess, &p).unwrap();
        let err = f
            .coordinator
            .start(&conv(), Variant::Checkers, &p)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::SessionAlreadyActive);
        assert_eq!(f.coordinator.session(&conv()).unwrap().variant, Variant::Chess);
    }

    #[test]
    fn illegal_move_keeps_the_session() {
        let f = fixture();
        let p = AccountId::from("p");
        let started = f.coordinator.start(&conv(), Variant::Chess, &p).unwrap();
        let err = f.coordinator.make_move(&conv(), &p, "e5").unwrap_err();
        assert_eq!(err.code(), ErrorCode::IllegalMove);
        let view = f.coordinator.session(&conv()).unwrap();
        assert_eq!(view.board, started.board);
        assert_eq!(view.turn, Side::First);
    }

    #[test]
    fn non_turn_human_gets_not_your_turn() {
        let f = fixture();
        let (a, b) = (AccountId::from("a"), AccountId::from("b"));
        f.coordinator
            .challenge(&conv(), Variant::Chess, &a, &b)
            .unwrap();
        let err = f.coordinator.make_move(&conv(), &b, "e5").unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotYourTurn);
        f.coordinator.make_move(&conv(), &a, "e4").unwrap();
        let err = f.coordinator.make_move(&conv(), &a, "e5").unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotYourTurn);
    }

    #[test]
    fn self_challenge_is_invalid() {
        let f = fixture();
        let a = AccountId::from("a");
        let err = f
            .coordinator
            .challenge(&conv(), Variant::Chess, &a, &a)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidInput);
    }

    #[test]
    fn checkmate_pays_the_human_and_ends_the_session() {
        let f = fixture();
        let p = AccountId::from("p");
        f.ledger.register(&p, "p").unwrap();
        f.coordinator.start(&conv(), Variant::Chess, &p).unwrap();

        let line = ["e4", "e5", "Bc4", "Nc6", "Qh5", "Nf6"];
        for m in line {
            let outcome = f.coordinator.make_move(&conv(), &p, m).unwrap();
            assert!(matches!(outcome, MoveOutcome::Continue { .. }));
        }
        f.clock.advance(Duration::minutes(3));

        let outcome = f.coordinator.make_move(&conv(), &p, "Qxf7#").unwrap();
        let MoveOutcome::Finished {
            result,
            reward,
            duration,
            notation,
            ..
        } = outcome
        else {
            panic!("expected a finished game, got {outcome:?}");
        };
        assert_eq!(result, GameResult::Won(Side::First));
        assert_eq!(notation, "Qxf7#");
        assert_eq!(duration, "00:03:00");
        let reward = reward.unwrap();
        assert!((20..=50).contains(&reward.amount));
        assert_eq!(f.ledger.balance(&p).unwrap(), 100 + reward.amount);

        let history = f.ledger.history(&p, 1).unwrap();
        assert_eq!(history[0].reason, VICTORY_REASON);

        let err = f.coordinator.make_move(&conv(), &p, "e4").unwrap_err();
        assert_eq!(err.code(), ErrorCode::NoActiveSession);
    }

    #[test]
    fn placeholder_win_pays_nobody() {
        let f = fixture();
        let p = AccountId::from("p");
        f.coordinator.start(&conv(), Variant::Chess, &p).unwrap();
        for m in ["f3", "e5", "g4", "Qh4#"] {
            f.coordinator.make_move(&conv(), &p, m).unwrap();
        }
        assert!(f.coordinator.session(&conv()).is_err());
        assert!(f.ledger.account(&p).is_err());
    }

    #[test]
    fn failed_payout_keeps_the_position_before_the_winning_move() {
        let f = fixture();
        let p = AccountId::from("p");
        f.ledger.register(&p, "p").unwrap();
        f.coordinator.start(&conv(), Variant::Chess, &p).unwrap();
        for m in ["e4", "e5", "Bc4", "Nc6", "Qh5", "Nf6"] {
            f.coordinator.make_move(&conv(), &p, m).unwrap();
        }

        f.store.fail_saves(true);
        let err = f.coordinator.make_move(&conv(), &p, "Qxf7#").unwrap_err();
        assert_eq!(err.code(), ErrorCode::Internal);
        let view = f.coordinator.session(&conv()).unwrap();
        assert_eq!(view.moves.len(), 6);
        assert_eq!(f.ledger.balance(&p).unwrap(), 100);

        f.store.fail_saves(false);
        let outcome = f.coordinator.make_move(&conv(), &p, "Qxf7#").unwrap();
        assert!(matches!(outcome, MoveOutcome::Finished { .. }));
    }

    #[test]
    fn abort_reports_and_removes() {
        let f = fixture();
        let p = AccountId::from("p");
        f.coordinator.start(&conv(), Variant::Checkers, &p).unwrap();
        f.coordinator.make_move(&conv(), &p, "52-43").unwrap();
        f.clock.advance(Duration::seconds(61));

        let summary = f.coordinator.abort(&conv()).unwrap();
        assert_eq!(summary.variant, Variant::Checkers);
        assert_eq!(summary.moves, ["52-43"]);
        assert_eq!(summary.duration, "00:01:01");

        let err = f.coordinator.abort(&conv()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NoActiveSession);
    }
}
