//! Turn-based game engines.
//!
//! Sessions hold a [`GameEngine`] chosen once at creation and talk to it
//! only through [`TurnBasedGame`].

mod checkers;
mod chess;

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

pub use checkers::{CheckersGame, PieceKind};
pub use chess::ChessGame;

use crate::domain::rules::{CHECKERS_VICTORY_REWARD, CHESS_VICTORY_REWARD};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Full rules, delegated to a rules oracle.
    Chess,
    /// Minimal placeholder: relocation only, no captures or promotion.
    Checkers,
}

impl Variant {
    pub fn reward_range(self) -> RangeInclusive<i64> {
        match self {
            Variant::Chess => CHESS_VICTORY_REWARD,
            Variant::Checkers => CHECKERS_VICTORY_REWARD,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Variant::Chess => "chess",
            Variant::Checkers => "checkers",
        }
    }
}

/// Seat index. `First` moves first (white in chess).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    First,
    Second,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::First => 0,
            Side::Second => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    Check,
    Checkmate { winner: Side },
    Stalemate,
    InsufficientMaterial,
    /// Every piece of the loser is gone.
    Eliminated { winner: Side },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "side", rename_all = "snake_case")]
pub enum GameResult {
    Won(Side),
    Draw,
}

pub trait TurnBasedGame {
    /// Apply a move given in the variant's notation. Returns `false` and
    /// leaves the game untouched when the move is unparsable or illegal.
    fn apply_move(&mut self, args: &str) -> bool;

    fn status(&self) -> GameStatus;

    fn turn(&self) -> Side;

    /// Accepted moves in normalised notation, oldest first.
    fn moves(&self) -> &[String];

    fn render(&self) -> String;

    fn winner(&self) -> Option<GameResult> {
        match self.status() {
            GameStatus::Checkmate { winner } | GameStatus::Eliminated { winner } => {
                Some(GameResult::Won(winner))
            }
            GameStatus::Stalemate | GameStatus::InsufficientMaterial => Some(GameResult::Draw),
            GameStatus::InProgress | GameStatus::Check => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum GameEngine {
    Chess(ChessGame),
    Checkers(CheckersGame),
}

impl GameEngine {
    pub fn new(variant: Variant) -> Self {
        match variant {
            Variant::Chess => GameEngine::Chess(ChessGame::new()),
            Variant::Checkers => GameEngine::Checkers(CheckersGame::new()),
        }
    }

    pub fn variant(&self) -> Variant {
        match self {
            GameEngine::Chess(_) => Variant::Chess,
            GameEngine::Checkers(_) => Variant::Checkers,
        }
    }

    fn inner(&self) -> &dyn TurnBasedGame {
        match self {
            GameEngine::Chess(g) => g,
            GameEngine::Checkers(g) => g,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn TurnBasedGame {
        match self {
            GameEngine::Chess(g) => g,
            GameEngine::Checkers(g) => g,
        }
    }
}

impl TurnBasedGame for GameEngine {
    fn apply_move(&mut self, args: &str) -> bool {
        self.inner_mut().apply_move(args)
    }

    fn status(&self) -> GameStatus {
        self.inner().status()
    }

    fn turn(&self) -> Side {
        self.inner().turn()
    }

    fn moves(&self) -> &[String] {
        self.inner().moves()
    }

    fn render(&self) -> String {
        self.inner().render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engines_start_with_first_to_move() {
        for variant in [Variant::Chess, Variant::Checkers] {
            let engine = GameEngine::new(variant);
            assert_eq!(engine.variant(), variant);
            assert_eq!(engine.turn(), Side::First);
            assert_eq!(engine.status(), GameStatus::InProgress);
            assert!(engine.winner().is_none());
            assert!(engine.moves().is_empty());
        }
    }

    #[test]
    fn reward_ranges_follow_variant() {
        assert_eq!(Variant::Chess.reward_range(), 20..=50);
        assert_eq!(Variant::Checkers.reward_range(), 15..=40);
    }
}
