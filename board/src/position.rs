use std::fmt;
use std::str::FromStr;

use arrayvec::ArrayVec;

use crate::{final_score, flip_mask, legal_moves, BoardError, Square, Squares};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Color {
    #[default]
    Black = 0,
    White = 1,
}

impl Color {
    #[inline(always)]
    pub const fn opposite(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn symbol(self) -> char {
        match self {
            Color::Black => 'X',
            Color::White => 'O',
        }
    }
}

/// One played move, enough to undo it without recomputation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ply {
    pub side: Color,
    pub square: Square,
    pub flips: u64,
}

/// Mover/opponent bitboards plus the history needed for make/unmake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    mover: u64,
    opponent: u64,
    side: Color,
    history: ArrayVec<Ply, 64>,
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl Position {
    pub fn new(mover: u64, opponent: u64, side: Color) -> Result<Self, BoardError> {
        if mover & opponent != 0 {
            return Err(BoardError::Overlap(mover & opponent));
        }

        Ok(Self {
            mover,
            opponent,
            side,
            history: ArrayVec::new(),
        })
    }

    /// Standard opening: d5/e4 black, d4/e5 white, black to move.
    pub fn start() -> Self {
        Self {
            mover: (1 << 28) | (1 << 35),
            opponent: (1 << 27) | (1 << 36),
            side: Color::Black,
            history: ArrayVec::new(),
        }
    }

    #[inline(always)]
    pub fn mover(&self) -> u64 {
        self.mover
    }

    #[inline(always)]
    pub fn opponent(&self) -> u64 {
        self.opponent
    }

    #[inline(always)]
    pub fn side(&self) -> Color {
        self.side
    }

    #[inline(always)]
    pub fn empties(&self) -> u64 {
        !(self.mover | self.opponent)
    }

    #[inline(always)]
    pub fn empty_count(&self) -> u32 {
        64 - (self.mover | self.opponent).count_ones()
    }

    /// Moves played since this position was set up. Passes are not counted.
    #[inline(always)]
    pub fn ply(&self) -> usize {
        self.history.len()
    }

    pub fn history(&self) -> &[Ply] {
        &self.history
    }

    /// Stones of the given color.
    pub fn stones(&self, color: Color) -> u64 {
        if color == self.side {
            self.mover
        } else {
            self.opponent
        }
    }

    #[inline(always)]
    pub fn legal_moves(&self) -> u64 {
        legal_moves(self.mover, self.opponent)
    }

    #[inline(always)]
    pub fn flips(&self, square: Square) -> u64 {
        flip_mask(self.mover, self.opponent, square)
    }

    pub fn legal(&self, square: Square) -> bool {
        self.legal_moves() & square.bit() != 0
    }

    /// Plays a move whose flips were already computed.
    #[inline(always)]
    pub fn play(&mut self, square: Square, flips: u64) {
        debug_assert_eq!(flips, self.flips(square));
        debug_assert!(flips != 0);

        let mover = self.opponent ^ flips;
        let opponent = self.mover ^ flips ^ square.bit();

        self.history.push(Ply {
            side: self.side,
            square,
            flips,
        });
        self.mover = mover;
        self.opponent = opponent;
        self.side = self.side.opposite();

        debug_assert_eq!(self.mover & self.opponent, 0);
    }

    /// Reverts the last played move.
    #[inline(always)]
    pub fn undo(&mut self) -> Option<Ply> {
        let ply = self.history.pop()?;

        let mover = self.opponent ^ ply.flips ^ ply.square.bit();
        let opponent = self.mover ^ ply.flips;

        self.mover = mover;
        self.opponent = opponent;
        self.side = ply.side;

        Some(ply)
    }

    /// Hands the turn over without touching the stones or the history.
    #[inline(always)]
    pub fn pass(&mut self) {
        std::mem::swap(&mut self.mover, &mut self.opponent);
        self.side = self.side.opposite();
    }

    /// Validates and plays an externally supplied move, returning the captured stones.
    pub fn apply(&mut self, square: Square) -> Result<u64, BoardError> {
        if !self.legal(square) {
            return Err(BoardError::IllegalMove(square));
        }

        let flips = self.flips(square);
        self.play(square, flips);
        Ok(flips)
    }

    pub fn can_pass(&self) -> bool {
        self.legal_moves() == 0 && legal_moves(self.opponent, self.mover) != 0
    }

    pub fn is_game_over(&self) -> bool {
        self.legal_moves() == 0 && legal_moves(self.opponent, self.mover) == 0
    }

    /// Final disc differential from the mover's side.
    pub fn final_score(&self) -> i32 {
        final_score(self.mover, self.opponent)
    }

    /// 64 square symbols (a1..h8) followed by the side to move.
    pub fn to_board_string(&self) -> String {
        let black = self.stones(Color::Black);
        let white = self.stones(Color::White);

        let mut out = String::with_capacity(66);
        for square in Square::all() {
            out.push(if black & square.bit() != 0 {
                'X'
            } else if white & square.bit() != 0 {
                'O'
            } else {
                '-'
            });
        }
        out.push(' ');
        out.push(self.side.symbol());
        out
    }

    pub fn moves(&self) -> Squares {
        Squares(self.legal_moves())
    }
}

impl FromStr for Position {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbols: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
        if symbols.len() != 65 {
            return Err(BoardError::InvalidBoard(format!(
                "expected 64 squares and a side, got {} symbols",
                symbols.len()
            )));
        }

        let mut black = 0u64;
        let mut white = 0u64;
        for (index, symbol) in symbols[..64].iter().enumerate() {
            match symbol {
                'X' | 'x' | '*' | 'B' | 'b' => black |= 1 << index,
                'O' | 'o' | 'W' | 'w' => white |= 1 << index,
                '-' | '.' => {}
                other => {
                    return Err(BoardError::InvalidBoard(format!(
                        "unexpected symbol `{}`",
                        other
                    )))
                }
            }
        }

        match symbols[64] {
            'X' | 'x' | '*' | 'B' | 'b' => Position::new(black, white, Color::Black),
            'O' | 'o' | 'W' | 'w' => Position::new(white, black, Color::White),
            other => Err(BoardError::InvalidBoard(format!(
                "unexpected side `{}`",
                other
            ))),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let black = self.stones(Color::Black);
        let white = self.stones(Color::White);
        let moves = self.legal_moves();

        writeln!(f, "  a b c d e f g h")?;
        for rank in 0..8u8 {
            write!(f, "{}", rank + 1)?;
            for file in 0..8u8 {
                let bit = Square::from_coords(file, rank).bit();
                let symbol = if black & bit != 0 {
                    'X'
                } else if white & bit != 0 {
                    'O'
                } else if moves & bit != 0 {
                    '.'
                } else {
                    '-'
                };
                write!(f, " {}", symbol)?;
            }
            writeln!(f)?;
        }
        write!(
            f,
            "{} to move, {} empties",
            self.side.symbol(),
            self.empty_count()
        )
    }
}
