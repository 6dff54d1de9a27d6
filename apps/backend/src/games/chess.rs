use shakmaty::san::SanPlus;
use shakmaty::{Chess, Color, File, Position, Rank, Square};

use super::{GameStatus, Side, TurnBasedGame};

/// Standard chess; legality, notation and outcomes come from `shakmaty`.
#[derive(Debug, Clone, Default)]
pub struct ChessGame {
    position: Chess,
    moves: Vec<String>,
}

fn side_of(color: Color) -> Side {
    match color {
        Color::White => Side::First,
        Color::Black => Side::Second,
    }
}

impl ChessGame {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TurnBasedGame for ChessGame {
    fn apply_move(&mut self, args: &str) -> bool {
        let Ok(san_plus) = args.trim().parse::<SanPlus>() else {
            return false;
        };
        // to_move only resolves moves legal in the current position.
        let Ok(m) = san_plus.san.to_move(&self.position) else {
            return false;
        };
        if !self.position.is_legal(&m) {
            return false;
        }
        let notation = SanPlus::from_move_and_play_unchecked(&mut self.position, &m);
        self.moves.push(notation.to_string());
        true
    }

    fn status(&self) -> GameStatus {
        let pos = &self.position;
        if pos.is_checkmate() {
            GameStatus::Checkmate {
                winner: side_of(pos.turn().other()),
            }
        } else if pos.is_stalemate() {
            GameStatus::Stalemate
        } else if pos.is_insufficient_material() {
            GameStatus::InsufficientMaterial
        } else if pos.is_check() {
            GameStatus::Check
        } else {
            GameStatus::InProgress
        }
    }

    fn turn(&self) -> Side {
        side_of(self.position.turn())
    }

    fn moves(&self) -> &[String] {
        &self.moves
    }

    /// Rank 8 on top, white pieces upper-case.
    fn render(&self) -> String {
        let board = self.position.board();
        let mut out = String::with_capacity(200);
        for r in (0..8u32).rev() {
            out.push_str(&format!("{} ", r + 1));
            for f in 0..8u32 {
                let sq = Square::from_coords(File::new(f), Rank::new(r));
                let glyph = board.piece_at(sq).map_or('.', |p| p.char());
                out.push(glyph);
                out.push(' ');
            }
            out.push('\n');
        }
        out.push_str("  a b c d e f g h\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::GameResult;

    fn play(moves: &[&str]) -> ChessGame {
        let mut game = ChessGame::new();
        for m in moves {
            assert!(game.apply_move(m), "{m} should be legal");
        }
        game
    }

    #[test]
    fn illegal_or_garbled_moves_change_nothing() {
        let mut game = ChessGame::new();
        let before = game.render();
        for bad in ["e5", "xyz", "", "Ke2", "O-O"] {
            assert!(!game.apply_move(bad), "{bad:?} accepted");
        }
        assert_eq!(game.render(), before);
        assert_eq!(game.turn(), Side::First);
        assert!(game.moves().is_empty());
    }

    #[test]
    fn accepted_moves_flip_turn_and_are_recorded() {
        let game = play(&["e4", "e5", "Nf3"]);
        assert_eq!(game.turn(), Side::Second);
        assert_eq!(game.moves(), ["e4", "e5", "Nf3"]);
        assert!(game.render().starts_with("8 r n b q k b n r"));
    }

    #[test]
    fn scholars_mate_is_won_by_white() {
        let game = play(&["e4", "e5", "Bc4", "Nc6", "Qh5", "Nf6", "Qxf7#"]);
        assert_eq!(game.status(), GameStatus::Checkmate { winner: Side::First });
        assert_eq!(game.moves().last().map(String::as_str), Some("Qxf7#"));
    }

    #[test]
    fn check_is_reported() {
        let game = play(&["e4", "f5", "Qh5+"]);
        assert_eq!(game.status(), GameStatus::Check);
    }

    #[test]
    fn fastest_stalemate_is_a_draw() {
        let game = play(&[
            "e3", "a5", "Qh5", "Ra6", "Qxa5", "h5", "h4", "Rah6", "Qxc7", "f6", "Qxd7+", "Kf7",
            "Qxb7", "Qd3", "Qxb8", "Qh7", "Qxc8", "Kg6", "Qe6",
        ]);
        assert_eq!(game.status(), GameStatus::Stalemate);
        assert_eq!(game.winner(), Some(GameResult::Draw));
    }
}
