use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::AccountId;
use crate::games::{GameEngine, GameStatus, Side, TurnBasedGame, Variant};

/// Occupant of one side of the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "seat", content = "account_id", rename_all = "snake_case")]
pub enum Seat {
    Human(AccountId),
    /// Non-human opponent. It never moves by itself; whoever is in the
    /// conversation may move for it.
    Placeholder,
}

impl Seat {
    pub fn account(&self) -> Option<&AccountId> {
        match self {
            Seat::Human(id) => Some(id),
            Seat::Placeholder => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameSession {
    pub variant: Variant,
    pub seats: [Seat; 2],
    pub engine: GameEngine,
    pub created_at: OffsetDateTime,
}

impl GameSession {
    pub fn new(variant: Variant, first: AccountId, second: Seat, now: OffsetDateTime) -> Self {
        Self {
            variant,
            seats: [Seat::Human(first), second],
            engine: GameEngine::new(variant),
            created_at: now,
        }
    }

    pub fn seat(&self, side: Side) -> &Seat {
        &self.seats[side.index()]
    }

    pub fn on_turn(&self) -> &Seat {
        self.seat(self.engine.turn())
    }

    /// Whether `actor` may submit the next move.
    pub fn may_act(&self, actor: &AccountId) -> bool {
        match self.on_turn() {
            Seat::Placeholder => true,
            Seat::Human(id) => id == actor,
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            variant: self.variant,
            seats: self.seats.clone(),
            turn: self.engine.turn(),
            on_turn: self.on_turn().clone(),
            status: self.engine.status(),
            moves: self.engine.moves().to_vec(),
            board: self.engine.render(),
            created_at: self.created_at,
        }
    }
}

/// Read-only snapshot of a session for the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub variant: Variant,
    pub seats: [Seat; 2],
    pub turn: Side,
    pub on_turn: Seat,
    pub status: GameStatus,
    pub moves: Vec<String>,
    pub board: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn placeholder_turns_are_open_to_anyone() {
        let human = AccountId::from("h");
        let mut session = GameSession::new(
            Variant::Checkers,
            human.clone(),
            Seat::Placeholder,
            datetime!(2026-01-01 00:00 UTC),
        );
        let stranger = AccountId::from("s");
        assert!(session.may_act(&human));
        assert!(!session.may_act(&stranger));

        assert!(session.engine.apply_move("52 43"));
        assert_eq!(session.on_turn(), &Seat::Placeholder);
        assert!(session.may_act(&stranger));
        assert!(session.may_act(&human));
    }
}
