/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{
    ChessBoard, GameResult, Move, MoveFull, PieceKind, ReasonType, ResultType, Side, Square,
    FIFTY_MOVE_PLIES,
};

use super::position::king_home;

/// Repetition can only occur once this many reversible plies have been played.
const MIN_REPETITION_PLIES: usize = 8;

impl ChessBoard {
    /// Detects whether the game has ended, stores the outcome in [`ChessBoard::result`] and returns it.
    ///
    /// In order: checkmate or stalemate when the side to move has no legal move, a draw by
    /// insufficient material, the fifty-move rule, and threefold repetition.
    ///
    /// # Example
    /// ```
    /// # use plyboard::*;
    /// let mut board = ChessBoard::new();
    /// for san in ["f3", "e5", "g4", "Qh4"] {
    ///     let mv = board.move_from_san(san).unwrap();
    ///     assert!(board.check_make_move(mv));
    /// }
    /// assert_eq!(board.rule(), GameResult::new(ResultType::Loss, ReasonType::Mate));
    /// ```
    pub fn rule(&mut self) -> GameResult {
        let side = self.side_to_move();

        let result = if self.gen_legal_only(side).is_empty() {
            if self.is_in_check(side) {
                GameResult::new(ResultType::won_by(side.opponent()), ReasonType::Mate)
            } else {
                GameResult::new(ResultType::Draw, ReasonType::Stalemate)
            }
        } else if self.is_insufficient_material() {
            GameResult::new(ResultType::Draw, ReasonType::InsufficientMaterial)
        } else if self.quiet_count() >= FIFTY_MOVE_PLIES {
            GameResult::new(ResultType::Draw, ReasonType::FiftyMoves)
        } else if self.is_threefold_repetition() {
            GameResult::new(ResultType::Draw, ReasonType::Repetition)
        } else {
            GameResult::default()
        };

        self.result = result.clone();
        result
    }

    /// Returns `true` if neither side has enough material left to deliver mate.
    ///
    /// Only kings, bishops and knights may remain, and no single side may own bishops on both
    /// square colors, a knight together with a bishop, or two knights.
    ///
    /// # Example
    /// ```
    /// # use plyboard::*;
    /// let kbk: ChessBoard = "8/4k3/8/8/3K4/8/5B2/8 w - - 0 1".parse().unwrap();
    /// assert!(kbk.is_insufficient_material());
    ///
    /// let kbnk: ChessBoard = "8/4k3/8/8/3K4/8/5BN1/8 w - - 0 1".parse().unwrap();
    /// assert!(!kbnk.is_insufficient_material());
    /// ```
    pub fn is_insufficient_material(&self) -> bool {
        // [side][light bishops, dark bishops, knights]
        let mut minors = [[0usize; 3]; Side::COUNT];

        for square in Square::iter() {
            let Some(piece) = self.piece_at(square) else {
                continue;
            };
            match piece.kind {
                PieceKind::King => {}
                PieceKind::Bishop if square.is_light() => minors[piece.side][0] += 1,
                PieceKind::Bishop => minors[piece.side][1] += 1,
                PieceKind::Knight => minors[piece.side][2] += 1,
                _ => return false,
            }
        }

        minors.iter().all(|&[light, dark, knights]| {
            let bishops = light + dark;
            !(light > 0 && dark > 0) && !(knights > 0 && bishops > 0) && knights < 2
        })
    }

    /// Returns `true` if the current position occurred twice before, with the same side to move,
    /// since the last irreversible move.
    pub fn is_threefold_repetition(&self) -> bool {
        let quiet = self.quiet_count();
        if quiet < MIN_REPETITION_PLIES {
            return false;
        }

        let history = self.history();
        let oldest = history.len().saturating_sub(quiet);
        let key = self.key();

        history
            .iter()
            .enumerate()
            .rev()
            .skip(1)
            .step_by(2)
            .take_while(|(i, _)| *i >= oldest)
            .filter(|(_, hist)| hist.key == key)
            .count()
            >= 2
    }

    /// Applies the move `from`-`dest` if, and only if, it is legal, and records its SAN.
    ///
    /// A king "capturing" its own rook on the back rank is read as castling toward that rook.
    /// Returns `false` and leaves the board untouched for anything else that is not a legal move.
    ///
    /// # Example
    /// ```
    /// # use plyboard::*;
    /// let mut board = ChessBoard::new();
    /// assert!(!board.check_make(Square::E2, Square::E5, None));
    /// assert!(board.check_make(Square::G1, Square::F3, None));
    /// assert_eq!(board.history()[0].san, "Nf3");
    /// ```
    pub fn check_make(&mut self, from: Square, dest: Square, promotion: Option<PieceKind>) -> bool {
        let side = self.side_to_move();
        let Some(piece) = self.piece_at(from) else {
            return false;
        };
        if piece.side != side || from == dest {
            return false;
        }
        if promotion.is_some_and(|kind| !kind.is_promotion()) {
            return false;
        }

        let mut dest = dest;
        if let Some(target) = self.piece_at(dest) {
            if target.side == side {
                let castling_gesture = piece.is_king()
                    && target.is_rook()
                    && from == king_home(side)
                    && dest.row() == from.row();
                if !castling_gesture {
                    return false;
                }
                dest = if dest > from {
                    Square::from_index_unchecked(from.index() + 2)
                } else {
                    Square::from_index_unchecked(from.index() - 2)
                };
            }
        }

        let wanted = Move {
            from,
            dest,
            promotion,
        };
        let pseudo = self.gen(side);
        let Some(&mv) = pseudo.iter().find(|mv| mv.matches(&wanted)) else {
            return false;
        };

        self.make(mv);
        if self.is_in_check(side) {
            // A rejected move keeps the stored result
            let result = std::mem::take(&mut self.result);
            self.take_back();
            self.result = result;
            return false;
        }

        self.create_san_for_last_move(&pseudo);
        true
    }

    /// [`ChessBoard::check_make`] for a [`Move`].
    #[inline(always)]
    pub fn check_make_move(&mut self, mv: Move) -> bool {
        self.check_make(mv.from, mv.dest, mv.promotion)
    }

    /// Writes the SAN of the move just made into its history record.
    ///
    /// `pseudo` holds the mover's pseudo-legal moves from before the move, which decide how
    /// much of the origin square must be spelled out.
    fn create_san_for_last_move(&mut self, pseudo: &[MoveFull]) {
        let Some(hist) = self.history().last() else {
            return;
        };

        let mut san = match hist.castled {
            Some(wing) => String::from(wing.san()),
            None => san_body(hist.mv, hist.captured.is_some(), pseudo),
        };

        let side = self.side_to_move();
        if self.is_in_check(side) {
            san.push(if self.gen_legal_only(side).is_empty() { '#' } else { '+' });
        }

        if let Some(hist) = self.history_mut().last_mut() {
            hist.san = san;
        }
    }
}

/// SAN of a non-castling move, without the check suffix.
fn san_body(mv: MoveFull, capture: bool, pseudo: &[MoveFull]) -> String {
    let mut san = String::with_capacity(8);
    let from = mv.from;

    if mv.piece.is_pawn() {
        if capture {
            san.push(from.file_char());
        }
    } else {
        san.push(mv.piece.kind.char());

        if !mv.piece.is_king() {
            let rivals = pseudo
                .iter()
                .filter(|other| other.piece == mv.piece && other.dest == mv.dest && other.from != from)
                .collect::<Vec<_>>();

            if !rivals.is_empty() {
                let same_file = rivals.iter().any(|other| other.from.file() == from.file());
                let same_row = rivals.iter().any(|other| other.from.row() == from.row());

                if same_file && same_row {
                    san.push_str(&from.to_string());
                } else if same_file {
                    san.push(from.rank_char());
                } else {
                    san.push(from.file_char());
                }
            }
        }
    }

    if capture {
        san.push('x');
    }
    san.push_str(&mv.dest.to_string());

    if let Some(promotion) = mv.promotion {
        san.push('=');
        san.push(promotion.char());
    }

    san
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FEN_KIWIPETE;

    fn play_coordinates(board: &mut ChessBoard, moves: &str) {
        for mv in moves.split_whitespace() {
            let mv = Move::from_coordinate(mv).unwrap();
            assert!(board.check_make_move(mv), "{mv} rejected in {}", board.fen());
        }
    }

    #[test]
    fn test_mate_and_stalemate() {
        let mut mated = ChessBoard::from_fen(
            "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
        )
        .unwrap();
        assert_eq!(
            mated.rule(),
            GameResult::new(ResultType::Loss, ReasonType::Mate)
        );
        assert_eq!(mated.result.reason, ReasonType::Mate);

        let mut stalemate = ChessBoard::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(
            stalemate.rule(),
            GameResult::new(ResultType::Draw, ReasonType::Stalemate)
        );

        let mut white_wins = ChessBoard::from_fen("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(white_wins.rule().result, ResultType::Win);
    }

    #[test]
    fn test_insufficient_material() {
        for (fen, expected) in [
            ("8/4k3/8/8/3K4/8/8/8 w - - 0 1", true),
            ("8/4k3/2n5/8/3K4/8/8/8 w - - 0 1", true),
            ("8/2b1k3/8/8/3K4/8/5B2/8 w - - 0 1", true),
            ("8/4k3/8/8/3K4/8/4BB2/8 w - - 0 1", false),
            ("8/4k3/8/8/3K4/8/4NN2/8 w - - 0 1", false),
            ("8/4k3/8/8/3K4/8/4P3/8 w - - 0 1", false),
            ("8/4k3/8/8/3K4/8/3R4/8 w - - 0 1", false),
        ] {
            let mut board = ChessBoard::from_fen(fen).unwrap();
            assert_eq!(board.is_insufficient_material(), expected, "{fen}");
            if expected {
                assert_eq!(board.rule().reason, ReasonType::InsufficientMaterial);
            }
        }
    }

    #[test]
    fn test_fifty_moves() {
        let mut board = ChessBoard::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 98 80").unwrap();
        play_coordinates(&mut board, "a1a2");
        assert!(board.rule().is_none());
        play_coordinates(&mut board, "e8d8");
        assert_eq!(
            board.rule(),
            GameResult::new(ResultType::Draw, ReasonType::FiftyMoves)
        );
    }

    #[test]
    fn test_threefold_repetition() {
        let mut board = ChessBoard::new();
        let shuffle = "g1f3 g8f6 f3g1 f6g8";

        play_coordinates(&mut board, shuffle);
        assert!(board.rule().is_none());

        // Third occurrence of the starting position
        play_coordinates(&mut board, shuffle);
        assert_eq!(
            board.rule(),
            GameResult::new(ResultType::Draw, ReasonType::Repetition)
        );

        // Taking back clears the result and the repetition
        board.take_back();
        assert!(board.result.is_none());
        assert!(!board.is_threefold_repetition());
    }

    #[test]
    fn test_repetition_window_starts_at_last_irreversible_move() {
        let mut board = ChessBoard::new();
        let shuffle = "g1f3 g8f6 f3g1 f6g8";

        // The starting position is seen twice, then pawn moves close the window
        play_coordinates(&mut board, shuffle);
        play_coordinates(&mut board, "e2e4 e7e5");
        assert_eq!(board.quiet_count(), 0);

        play_coordinates(&mut board, shuffle);
        assert!(!board.is_threefold_repetition());
        assert!(board.rule().is_none());

        play_coordinates(&mut board, shuffle);
        assert!(board.is_threefold_repetition());
        assert_eq!(board.rule().reason, ReasonType::Repetition);
    }

    #[test]
    fn test_repetition_with_clock_older_than_history() {
        // The clock says 60 quiet plies, but only the moves below are on record
        let mut board = ChessBoard::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 60 80").unwrap();
        assert!(!board.is_threefold_repetition());

        let shuffle = "a1a2 e8d8 a2a1 d8e8";
        play_coordinates(&mut board, shuffle);
        assert_eq!(board.quiet_count(), 64);
        assert!(!board.is_threefold_repetition());

        play_coordinates(&mut board, shuffle);
        assert_eq!(
            board.rule(),
            GameResult::new(ResultType::Draw, ReasonType::Repetition)
        );
    }

    #[test]
    fn test_rejected_move_keeps_result() {
        let mut board = ChessBoard::from_fen(
            "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
        )
        .unwrap();
        assert_eq!(board.rule().reason, ReasonType::Mate);
        let before = board.clone();

        // e3 does not block the queen on h4
        assert!(!board.check_make(Square::E2, Square::E3, None));
        assert_eq!(board.result.reason, ReasonType::Mate);
        assert_eq!(board, before);
    }

    #[test]
    fn test_check_make_rejections() {
        let mut board = ChessBoard::new();
        // Empty square, wrong side, own capture, bad promotion piece
        assert!(!board.check_make(Square::E4, Square::E5, None));
        assert!(!board.check_make(Square::E7, Square::E5, None));
        assert!(!board.check_make(Square::A1, Square::A2, None));
        assert!(!board.check_make(Square::E2, Square::E4, Some(PieceKind::King)));
        assert!(board.history().is_empty());

        // Moving into check is rejected and undone
        let mut board = ChessBoard::from_fen("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
        let before = board.clone();
        assert!(!board.check_make(Square::E2, Square::C3, None));
        assert_eq!(board, before);
    }

    #[test]
    fn test_king_onto_rook_castles() {
        let mut board = ChessBoard::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        assert!(board.check_make(Square::E1, Square::H1, None));
        assert_eq!(board.history()[0].mv.dest, Square::G1);
        assert_eq!(board.history()[0].san, "O-O");

        assert!(board.check_make(Square::E8, Square::A8, None));
        assert_eq!(board.history()[1].mv.dest, Square::C8);
        assert_eq!(board.history()[1].san, "O-O-O");
    }

    #[test]
    fn test_san_disambiguation() {
        // Knights on b1 and f3 may both reach d2; rooks on a1 and a5 may both reach a3
        let mut board =
            ChessBoard::from_fen("4k3/8/8/R7/8/8/8/RN2K3 w - - 0 1").unwrap();
        board.set_piece(Square::F3, crate::Piece::WHITE_KNIGHT);

        assert!(board.check_make(Square::B1, Square::D2, None));
        assert_eq!(board.history()[0].san, "Nbd2");
        board.take_back();

        assert!(board.check_make(Square::A5, Square::A3, None));
        assert_eq!(board.history()[0].san, "R5a3");
    }

    #[test]
    fn test_san_full_square_disambiguation() {
        // Queens on a1, a3 and c1 all reach b2
        let mut board = ChessBoard::from_fen("4k3/8/8/8/8/Q7/8/Q1Q1K3 w - - 0 1").unwrap();
        assert!(board.check_make(Square::A1, Square::B2, None));
        assert_eq!(board.history()[0].san, "Qa1b2");
    }

    #[test]
    fn test_san_suffixes() {
        let mut board = ChessBoard::from_fen(FEN_KIWIPETE).unwrap();
        play_coordinates(&mut board, "e5f7");
        assert_eq!(board.history()[0].san, "Nxf7");

        let mut board = ChessBoard::from_fen("4k3/1P6/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        play_coordinates(&mut board, "b7b8q");
        assert_eq!(board.history()[0].san, "b8=Q+");

        let mut board = ChessBoard::from_fen("6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        play_coordinates(&mut board, "a1a8");
        assert_eq!(board.history()[0].san, "Ra8#");
    }
}
