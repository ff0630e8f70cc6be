/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use crate::{NotationError, Piece, PieceKind, Square};

/// A lightweight move descriptor: where a piece leaves, where it lands, and what it promotes to.
///
/// A [`Move`] carries no knowledge of the board it is played on. Castling is written as the
/// king's two-square hop (`e1g1`), never as king-takes-rook.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move {
    pub from: Square,
    pub dest: Square,
    pub promotion: Option<PieceKind>,
}

impl Move {
    /// Creates a new [`Move`] without a promotion.
    #[inline(always)]
    pub const fn new(from: Square, dest: Square) -> Self {
        Self {
            from,
            dest,
            promotion: None,
        }
    }

    /// Creates a new [`Move`] that promotes to `promotion`.
    #[inline(always)]
    pub const fn with_promotion(from: Square, dest: Square, promotion: PieceKind) -> Self {
        Self {
            from,
            dest,
            promotion: Some(promotion),
        }
    }

    /// Parses a move in coordinate notation.
    ///
    /// Four characters name the origin and destination squares. An optional fifth names the
    /// promotion piece, in either case, and may be preceded by a literal `=`.
    ///
    /// # Example
    /// ```
    /// # use plyboard::*;
    /// let e2e4 = Move::from_coordinate("e2e4").unwrap();
    /// assert_eq!(e2e4, Move::new(Square::E2, Square::E4));
    ///
    /// let promote = Move::from_coordinate("e7e8q").unwrap();
    /// assert_eq!(promote.promotion, Some(PieceKind::Queen));
    /// assert_eq!(Move::from_coordinate("e7e8=N").unwrap().promotion, Some(PieceKind::Knight));
    ///
    /// assert!(Move::from_coordinate("e7e8k").is_err());
    /// assert!(Move::from_coordinate("Nf3").is_err());
    /// ```
    pub fn from_coordinate(s: &str) -> Result<Self, NotationError> {
        let malformed = || NotationError::Malformed(s.to_string());

        let from = s.get(0..2).ok_or_else(malformed)?;
        let dest = s.get(2..4).ok_or_else(malformed)?;
        let from = Square::from_coordinate(from).map_err(|_| malformed())?;
        let dest = Square::from_coordinate(dest).map_err(|_| malformed())?;

        let rest = &s[4..];
        let promotion = if rest.is_empty() {
            None
        } else {
            let mut letters = rest.strip_prefix('=').unwrap_or(rest).chars();
            match (letters.next().and_then(PieceKind::from_char), letters.next()) {
                (Some(kind), None) if kind.is_promotion() => Some(kind),
                _ => return Err(malformed()),
            }
        };

        Ok(Self {
            from,
            dest,
            promotion,
        })
    }

    /// Writes this move in coordinate notation, with an uppercase promotion letter.
    ///
    /// # Example
    /// ```
    /// # use plyboard::*;
    /// let mv = Move::with_promotion(Square::B7, Square::A8, PieceKind::Rook);
    /// assert_eq!(mv.to_coordinate(), "b7a8R");
    /// ```
    pub fn to_coordinate(&self) -> String {
        match self.promotion {
            Some(kind) => format!("{}{}{}", self.from, self.dest, kind.char()),
            None => format!("{}{}", self.from, self.dest),
        }
    }

    /// Writes this move the way UCI expects: coordinates with a lowercase promotion letter.
    pub fn to_uci(&self) -> String {
        self.to_coordinate().to_ascii_lowercase()
    }
}

impl FromStr for Move {
    type Err = NotationError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_coordinate(s)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_coordinate())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?} -> {:?})", self, self.from, self.dest)
    }
}

/// A move as produced by the generator: the [`Move`] plus the piece making it.
///
/// `score` is free for callers that want to order or annotate generated moves; the rules engine
/// itself always leaves it at `0`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MoveFull {
    pub piece: Piece,
    pub from: Square,
    pub dest: Square,
    pub promotion: Option<PieceKind>,
    pub score: i32,
}

impl MoveFull {
    #[inline(always)]
    pub const fn new(
        piece: Piece,
        from: Square,
        dest: Square,
        promotion: Option<PieceKind>,
    ) -> Self {
        Self {
            piece,
            from,
            dest,
            promotion,
            score: 0,
        }
    }

    /// Drops the moving piece, keeping just the [`Move`].
    #[inline(always)]
    pub const fn as_move(&self) -> Move {
        Move {
            from: self.from,
            dest: self.dest,
            promotion: self.promotion,
        }
    }

    /// Returns `true` if this is the king's two-square castling hop.
    #[inline(always)]
    pub const fn is_castling(&self) -> bool {
        self.piece.is_king() && self.from.index().abs_diff(self.dest.index()) == 2
    }

    /// Returns `true` if this move has the same squares and promotion as `mv`.
    #[inline(always)]
    pub fn matches(&self, mv: &Move) -> bool {
        self.from == mv.from && self.dest == mv.dest && self.promotion == mv.promotion
    }
}

impl From<MoveFull> for Move {
    fn from(value: MoveFull) -> Self {
        value.as_move()
    }
}

impl fmt::Display for MoveFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_move().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_round_trip() {
        for s in ["e2e4", "g1f3", "a7a8Q", "h2h1N", "e1g1"] {
            assert_eq!(Move::from_coordinate(s).unwrap().to_coordinate(), s);
        }
    }

    #[test]
    fn test_coordinate_lowercase_promotion() {
        let mv = Move::from_coordinate("a7a8q").unwrap();
        assert_eq!(mv.to_coordinate(), "a7a8Q");
        assert_eq!(mv.to_uci(), "a7a8q");
    }

    #[test]
    fn test_coordinate_rejects_garbage() {
        for s in ["", "e2", "e2e", "e2e9", "e2e4qq", "e7e8=", "e7e8p", "O-O"] {
            assert!(Move::from_coordinate(s).is_err(), "{s:?} should not parse");
        }
    }

    #[test]
    fn test_castling_detection() {
        let castle = MoveFull::new(Piece::WHITE_KING, Square::E1, Square::G1, None);
        assert!(castle.is_castling());

        let step = MoveFull::new(Piece::WHITE_KING, Square::E1, Square::F1, None);
        assert!(!step.is_castling());

        let rook = MoveFull::new(Piece::WHITE_ROOK, Square::F1, Square::H1, None);
        assert!(!rook.is_castling());
    }
}
