//! Simplified checkers: any own piece may be relocated to any cell.
//!
//! Captures, forced jumps and promotion are not modelled. A piece moved
//! onto an occupied cell replaces whatever stood there, which is the only
//! way pieces leave the board.

use super::{GameStatus, Side, TurnBasedGame};

const SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceKind {
    Man,
    King,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Piece {
    owner: Side,
    kind: PieceKind,
}

type Cell = (usize, usize);

#[derive(Debug, Clone)]
pub struct CheckersGame {
    board: [[Option<Piece>; SIZE]; SIZE],
    turn: Side,
    moves: Vec<String>,
}

impl Default for CheckersGame {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckersGame {
    /// Three rows of men per side on the dark squares; `Second` on rows
    /// 0-2, `First` on rows 5-7.
    pub fn new() -> Self {
        let mut board = [[None; SIZE]; SIZE];
        for (row, cells) in board.iter_mut().enumerate() {
            for (col, cell) in cells.iter_mut().enumerate() {
                if (row + col) % 2 == 0 {
                    continue;
                }
                let owner = match row {
                    0..=2 => Side::Second,
                    5..=7 => Side::First,
                    _ => continue,
                };
                *cell = Some(Piece {
                    owner,
                    kind: PieceKind::Man,
                });
            }
        }
        Self {
            board,
            turn: Side::First,
            moves: Vec::new(),
        }
    }

    /// Cells holding `side`'s pieces, row-major.
    pub fn pieces(&self, side: Side) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        for (row, line) in self.board.iter().enumerate() {
            for (col, cell) in line.iter().enumerate() {
                if cell.is_some_and(|p| p.owner == side) {
                    cells.push((row, col));
                }
            }
        }
        cells
    }

    pub fn piece_count(&self, side: Side) -> usize {
        self.board
            .iter()
            .flatten()
            .filter(|c| c.is_some_and(|p| p.owner == side))
            .count()
    }

    pub fn kind_at(&self, row: usize, col: usize) -> Option<(Side, PieceKind)> {
        self.board
            .get(row)
            .and_then(|line| line.get(col))
            .copied()
            .flatten()
            .map(|p| (p.owner, p.kind))
    }
}

/// `"52 43"` or `"52-43"`: row digit then column digit for each cell.
fn parse_move(args: &str) -> Option<(Cell, Cell)> {
    let mut parts = args
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|s| !s.is_empty());
    let from = parse_cell(parts.next()?)?;
    let to = parse_cell(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some((from, to))
}

fn parse_cell(token: &str) -> Option<Cell> {
    let mut digits = token.chars().map(|c| c.to_digit(10));
    let (Some(Some(row)), Some(Some(col)), None) = (digits.next(), digits.next(), digits.next())
    else {
        return None;
    };
    let (row, col) = (row as usize, col as usize);
    (row < SIZE && col < SIZE).then_some((row, col))
}

impl TurnBasedGame for CheckersGame {
    fn apply_move(&mut self, args: &str) -> bool {
        let Some((from, to)) = parse_move(args) else {
            return false;
        };
        // Relocating onto itself would clear the piece.
        if from == to {
            return false;
        }
        let Some(piece) = self.board[from.0][from.1] else {
            return false;
        };
        if piece.owner != self.turn {
            return false;
        }

        self.board[to.0][to.1] = Some(piece);
        self.board[from.0][from.1] = None;
        self.moves
            .push(format!("{}{}-{}{}", from.0, from.1, to.0, to.1));
        self.turn = self.turn.other();
        true
    }

    fn status(&self) -> GameStatus {
        if self.piece_count(Side::First) == 0 {
            GameStatus::Eliminated {
                winner: Side::Second,
            }
        } else if self.piece_count(Side::Second) == 0 {
            GameStatus::Eliminated {
                winner: Side::First,
            }
        } else {
            GameStatus::InProgress
        }
    }

    fn turn(&self) -> Side {
        self.turn
    }

    fn moves(&self) -> &[String] {
        &self.moves
    }

    fn render(&self) -> String {
        let mut out = String::from("  0 1 2 3 4 5 6 7\n");
        for (row, line) in self.board.iter().enumerate() {
            out.push_str(&format!("{row} "));
            for cell in line {
                let glyph = match cell {
                    None => '.',
                    Some(Piece {
                        owner: Side::First,
                        kind: PieceKind::Man,
                    }) => '○',
                    Some(Piece {
                        owner: Side::First,
                        kind: PieceKind::King,
                    }) => 'Ⓞ',
                    Some(Piece {
                        owner: Side::Second,
                        kind: PieceKind::Man,
                    }) => '●',
                    Some(Piece {
                        owner: Side::Second,
                        kind: PieceKind::King,
                    }) => '◉',
                };
                out.push(glyph);
                out.push(' ');
            }
            out.push('\n');
        }
        out
    }
}
