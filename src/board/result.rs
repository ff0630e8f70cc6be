/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::Side;

/// Outcome of a game, always from White's point of view.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum ResultType {
    /// The game is still going, or its outcome is unknown.
    #[default]
    None,
    Win,
    Draw,
    Loss,
}

impl ResultType {
    /// The result in which `side` has won.
    #[inline(always)]
    pub const fn won_by(side: Side) -> Self {
        match side {
            Side::White => Self::Win,
            Side::Black => Self::Loss,
        }
    }

    /// Parses a PGN result token.
    ///
    /// `0.5-0.5` is accepted as a draw alongside the standard `1/2-1/2`.
    /// Anything unrecognized, including `*`, is [`ResultType::None`].
    ///
    /// # Example
    /// ```
    /// # use plyboard::ResultType;
    /// assert_eq!(ResultType::from_pgn("1-0"), ResultType::Win);
    /// assert_eq!(ResultType::from_pgn("0.5-0.5"), ResultType::Draw);
    /// assert_eq!(ResultType::from_pgn("*"), ResultType::None);
    /// ```
    pub fn from_pgn(s: &str) -> Self {
        match s.trim() {
            "1-0" => Self::Win,
            "0-1" => Self::Loss,
            "1/2-1/2" | "0.5-0.5" => Self::Draw,
            _ => Self::None,
        }
    }

    /// The PGN token of this result.
    #[inline(always)]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "*",
            Self::Win => "1-0",
            Self::Draw => "1/2-1/2",
            Self::Loss => "0-1",
        }
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a game ended.
///
/// [`ChessBoard::rule`](crate::ChessBoard::rule) only ever reports the rule-based reasons;
/// the rest are set by whoever runs the game (clock, adjudicator, user).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum ReasonType {
    #[default]
    None,
    Mate,
    Stalemate,
    Repetition,
    Resign,
    FiftyMoves,
    InsufficientMaterial,
    IllegalMove,
    Timeout,
    AdjudicationLength,
    AdjudicationTablebase,
    AdjudicationScore,
    AdjudicationHuman,
    PerpetualChase,
    BothPerpetualChases,
    ExtraComment,
    Crash,
    Abort,
}

impl ReasonType {
    /// Human-readable description of this reason.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "*",
            Self::Mate => "mate",
            Self::Stalemate => "stalemate",
            Self::Repetition => "repetition",
            Self::Resign => "resign",
            Self::FiftyMoves => "fifty moves",
            Self::InsufficientMaterial => "insufficient material",
            Self::IllegalMove => "illegal move",
            Self::Timeout => "timeout",
            Self::AdjudicationLength => "adjudication by lengths",
            Self::AdjudicationTablebase => "adjudication by egtb",
            Self::AdjudicationScore => "adjudication by engines' scores",
            Self::AdjudicationHuman => "adjudication by human",
            Self::PerpetualChase => "perpetual chase",
            Self::BothPerpetualChases => "both perpetual chases",
            Self::ExtraComment => "extra comment",
            Self::Crash => "crash",
            Self::Abort => "abort",
        }
    }
}

impl fmt::Display for ReasonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A game result together with its reason and an optional free-text comment.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct GameResult {
    pub result: ResultType,
    pub reason: ReasonType,
    pub comment: String,
}

impl GameResult {
    #[inline(always)]
    pub fn new(result: ResultType, reason: ReasonType) -> Self {
        Self {
            result,
            reason,
            comment: String::new(),
        }
    }

    /// Returns `true` if the game has not ended.
    #[inline(always)]
    pub fn is_none(&self) -> bool {
        self.result == ResultType::None
    }

    /// The bare PGN token, such as `1-0`.
    #[inline(always)]
    pub fn to_short_string(&self) -> &'static str {
        self.result.as_str()
    }
}

impl fmt::Display for GameResult {
    /// Writes the PGN token, followed by the reason in parentheses when there is one.
    ///
    /// # Example
    /// ```
    /// # use plyboard::*;
    /// let mate = GameResult::new(ResultType::Loss, ReasonType::Mate);
    /// assert_eq!(mate.to_string(), "0-1 (mate)");
    /// assert_eq!(GameResult::default().to_string(), "*");
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.result)?;
        if self.reason != ReasonType::None {
            write!(f, " ({})", self.reason)?;
        }
        Ok(())
    }
}
