/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use thiserror::Error;

/// Failure to set up a board from a FEN string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    /// The text is not a FEN string.
    #[error("malformed FEN: {0}")]
    Malformed(String),

    /// The text parsed, but describes a position that cannot occur.
    #[error("invalid position: {0}")]
    Invalid(String),
}

/// Failure to turn a move token into a move on the current board.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    /// Not a coordinate or SAN move at all.
    #[error("malformed move {0:?}")]
    Malformed(String),

    /// Well-formed, but no move of the side to move matches it.
    #[error("no move matches {0:?}")]
    NoMatchingMove(String),

    /// Matched a move, but the move is not legal here.
    #[error("illegal move {0:?}")]
    IllegalMove(String),
}

/// Failure to read a PGN game.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PgnError {
    /// The `FEN` header does not describe a usable position.
    #[error("bad FEN header: {0}")]
    Fen(#[from] FenError),

    /// A movetext token could not be played.
    #[error("ply {ply}: cannot play {token:?}: {source}")]
    Move {
        ply: usize,
        token: String,
        source: NotationError,
    },

    /// A movetext token is too short or too long to be a move.
    #[error("bad movetext token {0:?}")]
    Token(String),
}

/// Failure to load a Polyglot opening book.
#[derive(Error, Debug)]
pub enum BookError {
    #[error("cannot read book: {0}")]
    Io(#[from] std::io::Error),

    /// Books are a flat array of 16-byte records.
    #[error("book size {0} is not a multiple of 16 bytes")]
    Size(usize),
}
