/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{CastleWing, ChessBoard, MoveFull, Piece, PieceKind, Side, Square};

use super::position::{back_row, king_home};

/// File and rank deltas of a knight's jumps.
const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const ORTHOGONALS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

impl ChessBoard {
    /// Generates all pseudo-legal moves for `side`.
    ///
    /// Moves may leave `side`'s own king in check; see [`ChessBoard::gen_legal_only`].
    /// Pawn moves onto the last rank come as four moves, one per promotion piece.
    ///
    /// # Example
    /// ```
    /// # use plyboard::*;
    /// let board = ChessBoard::new();
    /// assert_eq!(board.gen(Side::White).len(), 20);
    /// assert_eq!(board.gen(Side::Black).len(), 20);
    /// ```
    pub fn gen(&self, side: Side) -> Vec<MoveFull> {
        let mut moves = Vec::with_capacity(64);

        for from in Square::iter() {
            let Some(piece) = self.piece_at(from) else {
                continue;
            };
            if piece.side != side {
                continue;
            }

            match piece.kind {
                PieceKind::King => {
                    self.gen_steps(piece, from, &ORTHOGONALS, &mut moves);
                    self.gen_steps(piece, from, &DIAGONALS, &mut moves);
                    self.gen_castling(piece, from, &mut moves);
                }
                PieceKind::Queen => {
                    self.gen_rays(piece, from, &ORTHOGONALS, &mut moves);
                    self.gen_rays(piece, from, &DIAGONALS, &mut moves);
                }
                PieceKind::Rook => self.gen_rays(piece, from, &ORTHOGONALS, &mut moves),
                PieceKind::Bishop => self.gen_rays(piece, from, &DIAGONALS, &mut moves),
                PieceKind::Knight => self.gen_steps(piece, from, &KNIGHT_JUMPS, &mut moves),
                PieceKind::Pawn => self.gen_pawn(piece, from, &mut moves),
            }
        }

        moves
    }

    /// Generates all legal moves for `side`.
    ///
    /// Each pseudo-legal move is made, tested for leaving the king in check, and taken back,
    /// so the board is unchanged when this returns.
    pub fn gen_legal_only(&mut self, side: Side) -> Vec<MoveFull> {
        let mut moves = self.gen(side);
        moves.retain(|&mv| self.is_legal_pseudo(mv));
        moves
    }

    /// Legal moves of the side to move.
    #[inline(always)]
    pub fn legal_moves(&mut self) -> Vec<MoveFull> {
        self.gen_legal_only(self.side_to_move())
    }

    /// Returns `true` if the pseudo-legal `mv` does not leave its own king in check.
    pub(crate) fn is_legal_pseudo(&mut self, mv: MoveFull) -> bool {
        let hist = self.make_raw(mv);
        let legal = !self.is_in_check(mv.piece.side);
        self.take_back_raw(&hist);
        legal
    }

    /// Returns `true` if any piece of `attacker` attacks `square`.
    ///
    /// # Example
    /// ```
    /// # use plyboard::*;
    /// let board = ChessBoard::new();
    /// assert!(board.be_attacked(Square::F3, Side::White));
    /// assert!(!board.be_attacked(Square::E4, Side::White));
    /// assert!(board.be_attacked(Square::F6, Side::Black));
    /// ```
    pub fn be_attacked(&self, square: Square, attacker: Side) -> bool {
        let is = |sq: Option<Square>, kind: PieceKind| {
            sq.and_then(|sq| self.piece_at(sq)) == Some(Piece::new(attacker, kind))
        };

        if KNIGHT_JUMPS
            .iter()
            .any(|&(df, dr)| is(square.offset(df, dr), PieceKind::Knight))
        {
            return true;
        }

        // A pawn attacks diagonally forward, so look one rank behind it
        let pawn_rank = if attacker.is_white() { -1 } else { 1 };
        if is(square.offset(-1, pawn_rank), PieceKind::Pawn)
            || is(square.offset(1, pawn_rank), PieceKind::Pawn)
        {
            return true;
        }

        for (rays, slider) in [
            (&ORTHOGONALS, PieceKind::Rook),
            (&DIAGONALS, PieceKind::Bishop),
        ] {
            for &(df, dr) in rays {
                let mut next = square.offset(df, dr);
                let mut adjacent = true;
                while let Some(sq) = next {
                    if let Some(piece) = self.piece_at(sq) {
                        if piece.side == attacker
                            && (piece.kind == slider
                                || piece.kind == PieceKind::Queen
                                || (adjacent && piece.is_king()))
                        {
                            return true;
                        }
                        break;
                    }
                    adjacent = false;
                    next = sq.offset(df, dr);
                }
            }
        }

        false
    }

    /// Returns `true` if `side`'s king is attacked.
    ///
    /// # Panics
    /// If `side` has no king. Every position reachable through FEN validation or legal moves has one,
    /// so a missing king means the board was corrupted.
    pub fn is_in_check(&self, side: Side) -> bool {
        let Some(king) = self.king_square(side) else {
            panic!("{} has no king on the board: {}", side.name(), self.fen());
        };
        self.be_attacked(king, side.opponent())
    }

    /// Moves that stop at the first square in each direction.
    fn gen_steps(&self, piece: Piece, from: Square, deltas: &[(i8, i8)], moves: &mut Vec<MoveFull>) {
        for &(df, dr) in deltas {
            if let Some(dest) = from.offset(df, dr) {
                if !matches!(self.piece_at(dest), Some(target) if target.side == piece.side) {
                    moves.push(MoveFull::new(piece, from, dest, None));
                }
            }
        }
    }

    /// Sliding moves, stopping at (and capturing) the first occupied square in each direction.
    fn gen_rays(&self, piece: Piece, from: Square, deltas: &[(i8, i8)], moves: &mut Vec<MoveFull>) {
        for &(df, dr) in deltas {
            let mut next = from.offset(df, dr);
            while let Some(dest) = next {
                match self.piece_at(dest) {
                    None => moves.push(MoveFull::new(piece, from, dest, None)),
                    Some(target) => {
                        if target.side != piece.side {
                            moves.push(MoveFull::new(piece, from, dest, None));
                        }
                        break;
                    }
                }
                next = dest.offset(df, dr);
            }
        }
    }

    /// Castling: the king must be home with the right intact, the squares between king and rook
    /// empty, and neither the king's square nor the squares it crosses or lands on attacked.
    fn gen_castling(&self, king: Piece, from: Square, moves: &mut Vec<MoveFull>) {
        let side = king.side;
        if from != king_home(side) {
            return;
        }

        let row = back_row(side);
        let enemy = side.opponent();
        for wing in CastleWing::all() {
            if !self.castling_rights()[side].has(wing) {
                continue;
            }
            if self.piece_at(Square::new(wing.rook_file(), row)) != Some(Piece::new(side, PieceKind::Rook)) {
                continue;
            }

            let (low, high) = if wing.rook_file() < from.file() {
                (wing.rook_file() + 1, from.file() - 1)
            } else {
                (from.file() + 1, wing.rook_file() - 1)
            };
            if (low..=high).any(|file| self.piece_at(Square::new(file, row)).is_some()) {
                continue;
            }

            let dest = Square::new(wing.king_file(), row);
            let (low, high) = (from.file().min(dest.file()), from.file().max(dest.file()));
            if (low..=high).any(|file| self.be_attacked(Square::new(file, row), enemy)) {
                continue;
            }

            moves.push(MoveFull::new(king, from, dest, None));
        }
    }

    fn gen_pawn(&self, pawn: Piece, from: Square, moves: &mut Vec<MoveFull>) {
        let (forward, start_row) = match pawn.side {
            Side::White => (1, 6),
            Side::Black => (-1, 1),
        };

        let mut push = |dest: Square| {
            if dest.row() == 0 || dest.row() == 7 {
                for promotion in PieceKind::promotions() {
                    moves.push(MoveFull::new(pawn, from, dest, Some(promotion)));
                }
            } else {
                moves.push(MoveFull::new(pawn, from, dest, None));
            }
        };

        if let Some(dest) = from.offset(0, forward) {
            if self.piece_at(dest).is_none() {
                push(dest);

                if from.row() == start_row {
                    if let Some(dest) = dest.offset(0, forward) {
                        if self.piece_at(dest).is_none() {
                            push(dest);
                        }
                    }
                }
            }
        }

        for df in [-1, 1] {
            let Some(dest) = from.offset(df, forward) else {
                continue;
            };
            let capture = match self.piece_at(dest) {
                Some(target) => target.side != pawn.side,
                None => self.ep_square() == Some(dest),
            };
            if capture {
                push(dest);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FEN_KIWIPETE;

    fn count_legal(fen: &str) -> usize {
        let mut board = ChessBoard::from_fen(fen).unwrap();
        board.legal_moves().len()
    }

    #[test]
    fn test_kiwipete_move_count() {
        assert_eq!(count_legal(FEN_KIWIPETE), 48);
    }

    #[test]
    fn test_promotions_generate_four_moves() {
        let board = ChessBoard::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let promotions = board
            .gen(Side::White)
            .into_iter()
            .filter(|mv| mv.from == Square::A7)
            .collect::<Vec<_>>();
        assert_eq!(promotions.len(), 4);
        assert!(promotions.iter().all(|mv| mv.dest == Square::A8));
    }

    #[test]
    fn test_no_castling_through_check() {
        // Black rook on f8 covers f1
        let board = ChessBoard::from_fen("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let castles = board
            .gen(Side::White)
            .into_iter()
            .filter(|mv| mv.is_castling())
            .map(|mv| mv.dest)
            .collect::<Vec<_>>();
        assert_eq!(castles, vec![Square::C1]);
    }

    #[test]
    fn test_long_castle_allowed_with_b_file_attacked() {
        // Only the squares the king crosses matter, not b1
        let board = ChessBoard::from_fen("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1").unwrap();
        assert!(board
            .gen(Side::White)
            .iter()
            .any(|mv| mv.is_castling() && mv.dest == Square::C1));
    }

    #[test]
    fn test_attacks_do_not_wrap_around_edges() {
        // Knight on h4 must not "attack" a-file squares
        let board = ChessBoard::from_fen("4k3/8/8/8/7N/8/8/4K3 w - - 0 1").unwrap();
        assert!(!board.be_attacked(Square::A3, Side::White));
        assert!(!board.be_attacked(Square::A5, Side::White));
        assert!(board.be_attacked(Square::G6, Side::White));

        // Pawn on a2 attacks only b3
        let board = ChessBoard::from_fen("4k3/8/8/8/8/8/P7/4K3 w - - 0 1").unwrap();
        assert!(board.be_attacked(Square::B3, Side::White));
        assert!(!board.be_attacked(Square::H4, Side::White));
    }

    #[test]
    fn test_pinned_piece_has_no_legal_moves() {
        // The e2 knight is pinned by the e8 rook
        let mut board = ChessBoard::from_fen("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
        let original = board.clone();
        let legal = board.gen_legal_only(Side::White);
        assert!(legal.iter().all(|mv| mv.from != Square::E2));
        assert_eq!(board, original);

        for mv in board.gen(Side::White) {
            let hist = board.make_raw(mv);
            let in_check = board.is_in_check(Side::White);
            board.take_back_raw(&hist);
            assert_eq!(legal.contains(&mv), !in_check, "{mv}");
        }
    }

    #[test]
    #[should_panic]
    fn test_missing_king_panics() {
        let mut board = ChessBoard::empty();
        board.set_piece(Square::E8, Piece::BLACK_KING);
        board.is_in_check(Side::White);
    }
}
