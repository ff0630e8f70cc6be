/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::{Index, IndexMut, Not},
    str::FromStr,
};

use crate::FenError;

/// Represents the side of a player or piece on a chess board.
///
/// Black is `0` and White is `1`, matching the layout of the Polyglot hash table.
/// Empty squares have no side; they are represented as `None` wherever a [`Side`] is optional.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Side {
    Black,
    White,
}

impl Side {
    /// Number of side variants.
    pub const COUNT: usize = 2;

    /// Both sides, starting with Black.
    #[inline(always)]
    pub const fn all() -> [Self; Self::COUNT] {
        [Self::Black, Self::White]
    }

    /// Returns `true` if this [`Side`] is White.
    #[inline(always)]
    pub const fn is_white(&self) -> bool {
        matches!(self, Self::White)
    }

    /// Returns `true` if this [`Side`] is Black.
    #[inline(always)]
    pub const fn is_black(&self) -> bool {
        matches!(self, Self::Black)
    }

    /// Returns this [`Side`]'s opposite.
    ///
    /// # Example
    /// ```
    /// # use plyboard::Side;
    /// assert_eq!(Side::White.opponent(), Side::Black);
    /// assert_eq!(Side::Black.opponent(), Side::White);
    /// ```
    #[inline(always)]
    pub const fn opponent(&self) -> Self {
        match self {
            Self::Black => Self::White,
            Self::White => Self::Black,
        }
    }

    /// Index of this side, for indexing per-side arrays.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// The FEN character of this side: `w` or `b`.
    #[inline(always)]
    pub const fn char(&self) -> char {
        match self {
            Self::Black => 'b',
            Self::White => 'w',
        }
    }

    /// The side owning a piece written with `c`: uppercase is White.
    #[inline(always)]
    pub const fn from_case(c: char) -> Self {
        if c.is_ascii_uppercase() {
            Self::White
        } else {
            Self::Black
        }
    }

    /// Human-readable name of this side.
    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Black => "Black",
            Self::White => "White",
        }
    }
}

impl Not for Side {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self::Output {
        self.opponent()
    }
}

impl FromStr for Side {
    type Err = FenError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "w" | "W" => Ok(Self::White),
            "b" | "B" => Ok(Self::Black),
            _ => Err(FenError::Malformed(format!(
                "side to move must be `w` or `b`, got {s:?}"
            ))),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

impl fmt::Debug for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl<T> Index<Side> for [T; Side::COUNT] {
    type Output = T;
    #[inline(always)]
    fn index(&self, index: Side) -> &Self::Output {
        &self[index.index()]
    }
}

impl<T> IndexMut<Side> for [T; Side::COUNT] {
    #[inline(always)]
    fn index_mut(&mut self, index: Side) -> &mut Self::Output {
        &mut self[index.index()]
    }
}

/// Represents the kind (or "role") of a piece.
///
/// Discriminants run from King (`1`) to Pawn (`6`), which the Polyglot hash layout depends on.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[repr(u8)]
pub enum PieceKind {
    King = 1,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl PieceKind {
    /// Number of piece kinds.
    pub const COUNT: usize = 6;

    /// All kinds, from King to Pawn.
    #[inline(always)]
    pub const fn all() -> [Self; Self::COUNT] {
        [
            Self::King,
            Self::Queen,
            Self::Rook,
            Self::Bishop,
            Self::Knight,
            Self::Pawn,
        ]
    }

    /// The kinds a pawn may promote to, strongest first.
    #[inline(always)]
    pub const fn promotions() -> [Self; 4] {
        [Self::Queen, Self::Rook, Self::Bishop, Self::Knight]
    }

    /// Numeric value of this kind, `1` (King) through `6` (Pawn).
    #[inline(always)]
    pub const fn bits(&self) -> u8 {
        *self as u8
    }

    /// Zero-based index of this kind, for indexing per-kind arrays.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        *self as usize - 1
    }

    /// Parses a piece letter, ignoring case.
    ///
    /// # Example
    /// ```
    /// # use plyboard::PieceKind;
    /// assert_eq!(PieceKind::from_char('n'), Some(PieceKind::Knight));
    /// assert_eq!(PieceKind::from_char('Q'), Some(PieceKind::Queen));
    /// assert_eq!(PieceKind::from_char('x'), None);
    /// ```
    #[inline(always)]
    pub const fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'K' => Some(Self::King),
            'Q' => Some(Self::Queen),
            'R' => Some(Self::Rook),
            'B' => Some(Self::Bishop),
            'N' => Some(Self::Knight),
            'P' => Some(Self::Pawn),
            _ => None,
        }
    }

    /// Uppercase letter of this kind, as written in SAN.
    #[inline(always)]
    pub const fn char(&self) -> char {
        match self {
            Self::King => 'K',
            Self::Queen => 'Q',
            Self::Rook => 'R',
            Self::Bishop => 'B',
            Self::Knight => 'N',
            Self::Pawn => 'P',
        }
    }

    /// Returns `true` if a pawn may promote to this kind.
    #[inline(always)]
    pub const fn is_promotion(&self) -> bool {
        matches!(self, Self::Queen | Self::Rook | Self::Bishop | Self::Knight)
    }

    /// Human-readable name of this kind.
    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::King => "king",
            Self::Queen => "queen",
            Self::Rook => "rook",
            Self::Bishop => "bishop",
            Self::Knight => "knight",
            Self::Pawn => "pawn",
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

/// A piece on the board: a [`PieceKind`] owned by a [`Side`].
///
/// Empty squares are `None` rather than a sentinel piece.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Piece {
    pub kind: PieceKind,
    pub side: Side,
}

impl Piece {
    pub const WHITE_KING: Self = Self::new(Side::White, PieceKind::King);
    pub const WHITE_QUEEN: Self = Self::new(Side::White, PieceKind::Queen);
    pub const WHITE_ROOK: Self = Self::new(Side::White, PieceKind::Rook);
    pub const WHITE_BISHOP: Self = Self::new(Side::White, PieceKind::Bishop);
    pub const WHITE_KNIGHT: Self = Self::new(Side::White, PieceKind::Knight);
    pub const WHITE_PAWN: Self = Self::new(Side::White, PieceKind::Pawn);
    pub const BLACK_KING: Self = Self::new(Side::Black, PieceKind::King);
    pub const BLACK_QUEEN: Self = Self::new(Side::Black, PieceKind::Queen);
    pub const BLACK_ROOK: Self = Self::new(Side::Black, PieceKind::Rook);
    pub const BLACK_BISHOP: Self = Self::new(Side::Black, PieceKind::Bishop);
    pub const BLACK_KNIGHT: Self = Self::new(Side::Black, PieceKind::Knight);
    pub const BLACK_PAWN: Self = Self::new(Side::Black, PieceKind::Pawn);

    /// Creates a new [`Piece`] of the provided side and kind.
    #[inline(always)]
    pub const fn new(side: Side, kind: PieceKind) -> Self {
        Self { kind, side }
    }

    /// Parses a FEN piece letter: uppercase is White, lowercase is Black.
    ///
    /// # Example
    /// ```
    /// # use plyboard::*;
    /// assert_eq!(Piece::from_char('k'), Some(Piece::BLACK_KING));
    /// assert_eq!(Piece::from_char('N'), Some(Piece::WHITE_KNIGHT));
    /// assert_eq!(Piece::from_char('7'), None);
    /// ```
    #[inline(always)]
    pub const fn from_char(c: char) -> Option<Self> {
        match PieceKind::from_char(c) {
            Some(kind) => Some(Self::new(Side::from_case(c), kind)),
            None => None,
        }
    }

    /// FEN letter of this piece.
    #[inline(always)]
    pub const fn char(&self) -> char {
        let c = self.kind.char();
        match self.side {
            Side::White => c,
            Side::Black => c.to_ascii_lowercase(),
        }
    }

    #[inline(always)]
    pub const fn is_king(&self) -> bool {
        matches!(self.kind, PieceKind::King)
    }

    #[inline(always)]
    pub const fn is_pawn(&self) -> bool {
        matches!(self.kind, PieceKind::Pawn)
    }

    #[inline(always)]
    pub const fn is_rook(&self) -> bool {
        matches!(self.kind, PieceKind::Rook)
    }

    /// Returns `true` if this piece is `kind` owned by `side`.
    #[inline(always)]
    pub fn is(&self, side: Side, kind: PieceKind) -> bool {
        self.side == side && self.kind == kind
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.side.name(), self.kind.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_char_round_trip() {
        for c in "KQRBNPkqrbnp".chars() {
            let piece = Piece::from_char(c).unwrap();
            assert_eq!(piece.char(), c);
        }
    }

    #[test]
    fn test_kind_bits() {
        assert_eq!(PieceKind::King.bits(), 1);
        assert_eq!(PieceKind::Pawn.bits(), 6);
        assert_eq!(PieceKind::Pawn.index(), 5);
        assert!(!PieceKind::King.is_promotion());
        assert!(!PieceKind::Pawn.is_promotion());
    }

    #[test]
    fn test_side_parsing() {
        assert_eq!("w".parse::<Side>().unwrap(), Side::White);
        assert_eq!("b".parse::<Side>().unwrap(), Side::Black);
        assert!("white".parse::<Side>().is_err());
        assert_eq!(!Side::White, Side::Black);
    }
}
