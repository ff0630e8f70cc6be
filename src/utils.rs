/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// FEN string for the starting position of chess.
pub const FEN_STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A popular FEN string for debugging move generation.
pub const FEN_KIWIPETE: &str =
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

/// Half-move clock value (in plies) at which the fifty-move rule draws the game.
pub const FIFTY_MOVE_PLIES: usize = 100;

/// Number of non-king pieces a side may have on the board.
pub const MAX_PIECES_PER_SIDE: usize = 15;

/// Number of moves per line written by [`crate::write_pgn`].
pub const PGN_MOVES_PER_LINE: usize = 8;
