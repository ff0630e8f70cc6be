/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{CastleWing, CastlingRights, MoveFull, Piece, Side, Square, ZobristKey};

/// Engine analysis attached to a move after the fact, usually read back from a PGN comment.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct EngineScore {
    /// Centipawns, or the distance to mate when `mating` is set.
    pub score: i32,
    pub mating: bool,
    pub depth: u32,

    /// Search time, in whatever unit the producer used (normally milliseconds).
    pub elapsed: u64,
    pub nodes: u64,

    pub win: u32,
    pub draw: u32,
    pub loss: u32,
}

impl EngineScore {
    /// Returns `true` if this annotation carries a search result.
    #[inline(always)]
    pub const fn has_search(&self) -> bool {
        self.depth > 0
    }

    /// Returns `true` if this annotation carries win/draw/loss statistics.
    #[inline(always)]
    pub const fn has_wdl(&self) -> bool {
        self.win + self.draw + self.loss > 0
    }

    /// Returns `true` if there is nothing to write.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        !self.has_search() && !self.has_wdl()
    }
}

impl fmt::Display for EngineScore {
    /// Writes `score/depth time [nodes] [W/D/L]`.
    ///
    /// Scores are in pawns with two decimals, or `M<n>` for a mate.
    ///
    /// # Example
    /// ```
    /// # use plyboard::*;
    /// let es = EngineScore { score: 35, depth: 20, elapsed: 1500, nodes: 123456, ..Default::default() };
    /// assert_eq!(es.to_string(), "0.35/20 1500 123456");
    ///
    /// let mate = EngineScore { score: 3, mating: true, depth: 12, elapsed: 40, win: 10, draw: 0, loss: 0, ..Default::default() };
    /// assert_eq!(mate.to_string(), "M3/12 40 10/0/0");
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_search() {
            if self.mating && self.score < 0 {
                write!(f, "-M{}", -self.score)?;
            } else if self.mating {
                write!(f, "M{}", self.score)?;
            } else {
                write!(f, "{:.2}", self.score as f64 / 100.0)?;
            }
            write!(f, "/{} {}", self.depth, self.elapsed)?;
            if self.nodes > 0 {
                write!(f, " {}", self.nodes)?;
            }
        }

        if self.has_wdl() {
            if self.has_search() {
                write!(f, " ")?;
            }
            write!(f, "{}/{}/{}", self.win, self.draw, self.loss)?;
        }
        Ok(())
    }
}

/// The undo record of one ply.
///
/// Everything the board needs to put itself back exactly as it was before the move, plus the
/// move's notation and any annotations attached to it afterwards.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct History {
    pub mv: MoveFull,

    /// The piece taken by this move, if any. For en passant this is the passed pawn.
    pub captured: Option<Piece>,

    /// En passant target before the move.
    pub ep_square: Option<Square>,

    /// Castling rights of both sides before the move.
    pub castling_rights: [CastlingRights; Side::COUNT],

    /// Set when this move castled.
    pub castled: Option<CastleWing>,

    /// Half-move clock before the move.
    pub quiet_count: usize,

    /// Hash key before the move.
    pub key: ZobristKey,

    pub san: String,
    pub comment: String,
    pub analysis: EngineScore,
}

impl History {
    /// Creates a record of the board state in which `mv` is about to be made.
    pub(crate) fn new(
        mv: MoveFull,
        ep_square: Option<Square>,
        castling_rights: [CastlingRights; Side::COUNT],
        quiet_count: usize,
        key: ZobristKey,
    ) -> Self {
        Self {
            mv,
            captured: None,
            ep_square,
            castling_rights,
            castled: None,
            quiet_count,
            key,
            san: String::new(),
            comment: String::new(),
            analysis: EngineScore::default(),
        }
    }

    /// Returns `true` if this move was a pawn taking en passant.
    #[inline(always)]
    pub fn is_en_passant(&self) -> bool {
        self.mv.piece.is_pawn() && Some(self.mv.dest) == self.ep_square
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_string() {
        let es = EngineScore {
            score: -150,
            depth: 18,
            elapsed: 2300,
            ..Default::default()
        };
        assert_eq!(es.to_string(), "-1.50/18 2300");

        let wdl_only = EngineScore {
            win: 300,
            draw: 600,
            loss: 100,
            ..Default::default()
        };
        assert_eq!(wdl_only.to_string(), "300/600/100");

        assert!(EngineScore::default().is_empty());
        assert_eq!(EngineScore::default().to_string(), "");
    }
}
