/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::ChessBoard;

/// Perform a perft at the specified depth, collecting only data about the number of possible positions (nodes).
///
/// This performs bulk counting, meaning that, at depth 1, it returns the number of available moves,
/// rather than making them, recursing again, and returning 1 for each terminal case.
/// If you do *not* want to use bulk counting, use [`perft_generic`].
///
/// The board is walked with make and take back, so it is unchanged when this returns.
///
/// # Example
/// ```
/// # use plyboard::*;
/// let mut board = ChessBoard::new();
/// assert_eq!(perft(&mut board, 2), 400);
/// ```
#[inline(always)]
pub fn perft(board: &mut ChessBoard, depth: usize) -> u64 {
    perft_generic::<true, false>(board, depth)
}

/// Perform a splitperft at the specified depth, printing the number of nodes reachable after each
/// move available at the root node.
#[inline(always)]
pub fn splitperft(board: &mut ChessBoard, depth: usize) -> u64 {
    perft_generic::<true, true>(board, depth)
}

/// Generic version of `perft` that allows you to specify whether to perform bulk counting and splitperft.
///
/// If `BULK` is set to `true`, this will perform bulk counting.
/// If `SPLIT` is set to `true`, this will perform a splitperft.
pub fn perft_generic<const BULK: bool, const SPLIT: bool>(
    board: &mut ChessBoard,
    depth: usize,
) -> u64 {
    if BULK && !SPLIT && depth == 1 {
        return board.legal_moves().len() as u64;
    } else if depth == 0 {
        return 1;
    }

    board.legal_moves().into_iter().fold(0, |nodes, mv| {
        board.make(mv);
        let new_nodes = perft_generic::<BULK, false>(board, depth - 1);
        board.take_back();

        if SPLIT {
            println!("{mv}\t{new_nodes}");
        }

        nodes + new_nodes
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FEN_KIWIPETE;

    #[test]
    fn test_perft_leaves_board_untouched() {
        let mut board = ChessBoard::from_fen(FEN_KIWIPETE).unwrap();
        let original = board.clone();
        assert_eq!(perft(&mut board, 2), 2039);
        assert_eq!(board, original);
    }

    #[test]
    fn test_bulk_counting_matches_full_walk() {
        let mut board = ChessBoard::new();
        assert_eq!(
            perft_generic::<false, false>(&mut board, 3),
            perft_generic::<true, false>(&mut board, 3)
        );
    }
}
