/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Undo records and the engine annotations attached to them.
mod history;

/// Pseudo-legal and legal move generation, and attack detection.
mod movegen;

/// Move descriptors and coordinate notation.
mod moves;

/// Node counting over the move generator.
mod perft;

/// Sides, piece kinds, and pieces.
mod piece;

/// The mailbox board: FEN, make, and take back.
mod position;

/// Game results and the reasons behind them.
mod result;

/// Termination detection and checked move entry.
mod rules;

/// Squares of the mailbox, indexed from a8.
mod square;

/// Polyglot-compatible Zobrist hashing.
mod zobrist;

pub use history::*;
pub use moves::*;
pub use perft::*;
pub use piece::*;
pub use position::*;
pub use result::*;
pub use square::*;
pub use zobrist::*;
