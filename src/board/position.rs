/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use crate::{
    FenError, GameResult, History, MoveFull, Piece, PieceKind, Side, Square, ZobristKey,
    FEN_STARTPOS, MAX_PIECES_PER_SIDE,
};

/// The two directions a king may castle in.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum CastleWing {
    /// Queen-side, `O-O-O`.
    Long,
    /// King-side, `O-O`.
    Short,
}

impl CastleWing {
    #[inline(always)]
    pub const fn all() -> [Self; 2] {
        [Self::Long, Self::Short]
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        match self {
            Self::Long => 0,
            Self::Short => 1,
        }
    }

    /// Bit of this wing inside [`CastlingRights`].
    #[inline(always)]
    pub const fn bit(&self) -> u8 {
        1 << self.index()
    }

    /// The file the rook starts on.
    #[inline(always)]
    pub const fn rook_file(&self) -> u8 {
        match self {
            Self::Long => 0,
            Self::Short => 7,
        }
    }

    /// The file the king lands on.
    #[inline(always)]
    pub const fn king_file(&self) -> u8 {
        match self {
            Self::Long => 2,
            Self::Short => 6,
        }
    }

    /// SAN of castling on this wing.
    #[inline(always)]
    pub const fn san(&self) -> &'static str {
        match self {
            Self::Long => "O-O-O",
            Self::Short => "O-O",
        }
    }
}

/// Castling rights of one side, as a pair of bits: long (`1`) and short (`2`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: Self = Self(0);
    pub const BOTH: Self = Self(0b11);

    #[inline(always)]
    pub const fn has(&self, wing: CastleWing) -> bool {
        self.0 & wing.bit() != 0
    }

    #[inline(always)]
    pub fn set(&mut self, wing: CastleWing) {
        self.0 |= wing.bit();
    }

    #[inline(always)]
    pub fn clear(&mut self, wing: CastleWing) {
        self.0 &= !wing.bit();
    }

    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Home square of `side`'s king.
#[inline(always)]
pub(crate) const fn king_home(side: Side) -> Square {
    match side {
        Side::White => Square::E1,
        Side::Black => Square::E8,
    }
}

/// Row of `side`'s back rank.
#[inline(always)]
pub(crate) const fn back_row(side: Side) -> u8 {
    match side {
        Side::White => 7,
        Side::Black => 0,
    }
}

/// A chess position on an 8x8 mailbox, together with the moves that led to it.
///
/// The board owns its undo stack: [`ChessBoard::make`] pushes a [`History`] record and
/// [`ChessBoard::take_back`] pops one, restoring every field exactly. The Zobrist key is
/// maintained incrementally and always equals [`ChessBoard::init_hash_key`].
#[derive(Clone, PartialEq, Eq)]
pub struct ChessBoard {
    pieces: [Option<Piece>; Square::COUNT],
    side: Side,
    castling_rights: [CastlingRights; Side::COUNT],
    ep_square: Option<Square>,

    /// Plies since the last capture, pawn move or castling.
    quiet_count: usize,
    fullmove: usize,
    key: ZobristKey,

    /// FEN the game started from, or `None` for the standard starting position.
    start_fen: Option<String>,
    history: Vec<History>,

    pub result: GameResult,
}

impl ChessBoard {
    /// Creates a board with the standard starting position.
    ///
    /// # Example
    /// ```
    /// # use plyboard::*;
    /// let board = ChessBoard::new();
    /// assert_eq!(board.fen(), FEN_STARTPOS);
    /// assert_eq!(board.key().inner(), 0x463b96181691fc9c);
    /// ```
    pub fn new() -> Self {
        let mut board = Self::empty();
        for (i, c) in "rnbqkbnrpppppppp".chars().enumerate() {
            board.pieces[i] = Piece::from_char(c);
            board.pieces[63 - i] = Piece::from_char(c.to_ascii_uppercase());
        }
        // The loop above mirrors the back rank, so swap the white king and queen back
        board.pieces.swap(59, 60);
        board.castling_rights = [CastlingRights::BOTH; Side::COUNT];
        board.key = board.init_hash_key();
        board
    }

    /// Creates a board with no pieces, White to move, and no castling rights.
    ///
    /// Useful as a canvas for [`ChessBoard::set_piece`]; it is not a valid position until both kings are placed.
    pub fn empty() -> Self {
        Self {
            pieces: [None; Square::COUNT],
            side: Side::White,
            castling_rights: [CastlingRights::NONE; Side::COUNT],
            ep_square: None,
            quiet_count: 0,
            fullmove: 1,
            key: ZobristKey::default(),
            start_fen: None,
            history: Vec::new(),
            result: GameResult::default(),
        }
    }

    /// Creates a new [`ChessBoard`] from the provided FEN string.
    ///
    /// Only the piece placement field is required. A missing side to move means White, missing
    /// castling and en passant fields mean none, and missing counters default to `0` and `1`.
    /// Castling rights whose king or rook is not on its home square are dropped.
    ///
    /// Text that is not FEN fails with [`FenError::Malformed`]; a FEN describing an impossible
    /// position fails with [`FenError::Invalid`].
    ///
    /// # Example
    /// ```
    /// # use plyboard::*;
    /// let board = ChessBoard::from_fen("4k3/8/8/8/8/8/8/4K3").unwrap();
    /// assert_eq!(board.fen(), "4k3/8/8/8/8/8/8/4K3 w - - 0 1");
    ///
    /// assert!(matches!(ChessBoard::from_fen("4k3/8/8/8/8/8/8/4K2X"), Err(FenError::Malformed(_))));
    /// assert!(matches!(ChessBoard::from_fen("4k3/8/8/8/8/8/8/8"), Err(FenError::Invalid(_))));
    /// ```
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let mut board = Self::empty();
        let mut fields = fen.split_ascii_whitespace();

        let placements = fields
            .next()
            .ok_or(FenError::Malformed(String::from("FEN string must have piece placements")))?;
        board.pieces = parse_placements(placements)?;

        if let Some(side) = fields.next() {
            board.side = side.parse()?;
        }

        let castling = fields.next().unwrap_or("-");
        if castling != "-" {
            for c in castling.chars() {
                let (side, wing) = match c {
                    'K' => (Side::White, CastleWing::Short),
                    'Q' => (Side::White, CastleWing::Long),
                    'k' => (Side::Black, CastleWing::Short),
                    'q' => (Side::Black, CastleWing::Long),
                    _ => {
                        return Err(FenError::Malformed(format!(
                            "invalid castling rights {castling:?}"
                        )))
                    }
                };
                if board.has_castling_pieces(side, wing) {
                    board.castling_rights[side].set(wing);
                }
            }
        }

        board.ep_square = match fields.next().unwrap_or("-") {
            "-" => None,
            square => Some(Square::from_coordinate(square).map_err(|_| {
                FenError::Malformed(format!("invalid en passant square {square:?}"))
            })?),
        };

        if let Some(halfmove) = fields.next() {
            board.quiet_count = halfmove.parse().map_err(|_| {
                FenError::Malformed(format!("invalid halfmove counter {halfmove:?}"))
            })?;
        }

        if let Some(fullmove) = fields.next() {
            let fullmove: usize = fullmove.parse().map_err(|_| {
                FenError::Malformed(format!("invalid fullmove counter {fullmove:?}"))
            })?;
            board.fullmove = fullmove.max(1);
        }

        board.validate()?;
        board.key = board.init_hash_key();

        let normalized = board.fen();
        board.start_fen = (normalized != FEN_STARTPOS).then_some(normalized);

        Ok(board)
    }

    /// Replaces this board with the position described by `fen`, clearing the game history.
    ///
    /// If `fen` cannot be used, the board is left untouched and the error is returned.
    pub fn set_fen(&mut self, fen: &str) -> Result<(), FenError> {
        *self = Self::from_fen(fen)?;
        Ok(())
    }

    /// Generates the FEN of the current position.
    #[inline(always)]
    pub fn fen(&self) -> String {
        self.fen_with_counters(self.quiet_count, self.fullmove)
    }

    /// Generates the FEN of the current position with caller-supplied move counters.
    ///
    /// # Example
    /// ```
    /// # use plyboard::*;
    /// let board = ChessBoard::new();
    /// assert_eq!(
    ///     board.fen_with_counters(3, 12),
    ///     "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 3 12"
    /// );
    /// ```
    pub fn fen_with_counters(&self, halfmove: usize, fullmove: usize) -> String {
        let ep = self
            .ep_square
            .map(|square| square.to_string())
            .unwrap_or(String::from("-"));

        format!(
            "{} {} {} {ep} {halfmove} {fullmove}",
            self.placements(),
            self.side,
            self.castling_rights_string(),
        )
    }

    /// The piece placement field of the FEN.
    pub fn placements(&self) -> String {
        let mut placements = String::with_capacity(72);
        for row in 0..8 {
            let mut empty = 0;
            for file in 0..8 {
                match self.pieces[Square::new(file, row)] {
                    Some(piece) => {
                        if empty > 0 {
                            placements.push_str(&empty.to_string());
                            empty = 0;
                        }
                        placements.push(piece.char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                placements.push_str(&empty.to_string());
            }
            if row < 7 {
                placements.push('/');
            }
        }
        placements
    }

    /// Castling rights in FEN form, such as `KQkq`, or `-` if neither side may castle.
    pub fn castling_rights_string(&self) -> String {
        let mut rights = String::with_capacity(4);
        for (side, wing, c) in [
            (Side::White, CastleWing::Short, 'K'),
            (Side::White, CastleWing::Long, 'Q'),
            (Side::Black, CastleWing::Short, 'k'),
            (Side::Black, CastleWing::Long, 'q'),
        ] {
            if self.castling_rights[side].has(wing) {
                rights.push(c);
            }
        }

        if rights.is_empty() {
            rights.push('-');
        }
        rights
    }

    #[inline(always)]
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.pieces[square]
    }

    #[inline(always)]
    pub fn pieces(&self) -> &[Option<Piece>; Square::COUNT] {
        &self.pieces
    }

    #[inline(always)]
    pub const fn side_to_move(&self) -> Side {
        self.side
    }

    #[inline(always)]
    pub const fn castling_rights(&self) -> &[CastlingRights; Side::COUNT] {
        &self.castling_rights
    }

    #[inline(always)]
    pub const fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    /// Plies since the last capture, pawn move or castling.
    #[inline(always)]
    pub const fn quiet_count(&self) -> usize {
        self.quiet_count
    }

    #[inline(always)]
    pub const fn fullmove(&self) -> usize {
        self.fullmove
    }

    /// Fetch the Zobrist hash key of this position.
    #[inline(always)]
    pub const fn key(&self) -> ZobristKey {
        self.key
    }

    /// The FEN this game started from, or `None` if it started from the standard position.
    #[inline(always)]
    pub fn start_fen(&self) -> Option<&str> {
        self.start_fen.as_deref()
    }

    /// Every move made so far, oldest first.
    #[inline(always)]
    pub fn history(&self) -> &[History] {
        &self.history
    }

    /// Mutable access to the move records, for attaching comments and analysis.
    #[inline(always)]
    pub fn history_mut(&mut self) -> &mut [History] {
        &mut self.history
    }

    /// Square of `side`'s king, if it has one.
    pub fn king_square(&self, side: Side) -> Option<Square> {
        Square::iter().find(|&square| self.pieces[square] == Some(Piece::new(side, PieceKind::King)))
    }

    /// Place `piece` on `square`, replacing whatever was there.
    ///
    /// Editing a position starts a new game from it: the history is cleared, the result reset
    /// and the key recomputed. Call [`ChessBoard::validate`] once the position is complete.
    pub fn set_piece(&mut self, square: Square, piece: Piece) {
        self.pieces[square] = Some(piece);
        self.edited();
    }

    /// Remove whatever piece is on `square`. See [`ChessBoard::set_piece`].
    pub fn clear_square(&mut self, square: Square) {
        self.pieces[square] = None;
        self.edited();
    }

    /// Set the side to move. See [`ChessBoard::set_piece`].
    pub fn set_side_to_move(&mut self, side: Side) {
        self.side = side;
        self.edited();
    }

    /// Grant or revoke a castling right. Rights without a king and rook on their home squares are ignored.
    pub fn set_castling_right(&mut self, side: Side, wing: CastleWing, allowed: bool) {
        if allowed && self.has_castling_pieces(side, wing) {
            self.castling_rights[side].set(wing);
        } else {
            self.castling_rights[side].clear(wing);
        }
        self.edited();
    }

    /// Recomputes the hash key from scratch.
    #[inline(always)]
    pub fn refresh_key(&mut self) {
        self.key = self.init_hash_key();
    }

    fn edited(&mut self) {
        for side in Side::all() {
            for wing in CastleWing::all() {
                if !self.has_castling_pieces(side, wing) {
                    self.castling_rights[side].clear(wing);
                }
            }
        }
        if self.ep_square.is_some_and(|ep| !self.is_valid_ep_square(ep)) {
            self.ep_square = None;
        }

        self.history.clear();
        self.result = GameResult::default();
        self.refresh_key();
        self.start_fen = Some(self.fen());
    }

    /// Returns `true` if `side` has its king and the rook of `wing` on their home squares.
    fn has_castling_pieces(&self, side: Side, wing: CastleWing) -> bool {
        let row = back_row(side);
        self.pieces[king_home(side)] == Some(Piece::new(side, PieceKind::King))
            && self.pieces[Square::new(wing.rook_file(), row)]
                == Some(Piece::new(side, PieceKind::Rook))
    }

    /// Returns `true` if `ep` is on rank 3 or 6, empty, and in front of the pawn that just passed it.
    fn is_valid_ep_square(&self, ep: Square) -> bool {
        if self.pieces[ep].is_some() {
            return false;
        }
        match ep.row() {
            2 => self.pieces[ep.index() + 8] == Some(Piece::BLACK_PAWN),
            5 => self.pieces[ep.index() - 8] == Some(Piece::WHITE_PAWN),
            _ => false,
        }
    }

    /// Checks that this position could occur in a game.
    ///
    /// Each side needs exactly one king, a plausible number of pieces of each kind (promotions
    /// accounted for), and no pawns on the first or last rank. An en passant target must sit
    /// behind a pawn that just made a double step, and the kings may not touch.
    ///
    /// # Example
    /// ```
    /// # use plyboard::*;
    /// assert!(ChessBoard::new().validate().is_ok());
    ///
    /// let mut board = ChessBoard::new();
    /// board.set_piece(Square::E4, Piece::WHITE_KING);
    /// assert!(board.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), FenError> {
        let invalid = |reason: String| Err(FenError::Invalid(reason));

        let mut counts = [[0usize; PieceKind::COUNT]; Side::COUNT];
        for (i, piece) in self.pieces.iter().enumerate() {
            let Some(piece) = piece else {
                continue;
            };
            counts[piece.side][piece.kind.index()] += 1;

            let row = i / 8;
            if piece.is_pawn() && (row == 0 || row == 7) {
                return invalid(format!("pawn on {}", Square::from_index_unchecked(i)));
            }
        }

        for side in Side::all() {
            let count = |kind: PieceKind| counts[side][kind.index()];
            let name = side.name();

            if count(PieceKind::King) != 1 {
                return invalid(format!("{name} has {} kings", count(PieceKind::King)));
            }

            let pawns = count(PieceKind::Pawn);
            if pawns > 8 {
                return invalid(format!("{name} has {pawns} pawns"));
            }

            let others: usize = counts[side].iter().sum::<usize>() - 1;
            if others > MAX_PIECES_PER_SIDE {
                return invalid(format!("{name} has {others} pieces besides the king"));
            }

            // Every piece beyond the starting set must have been a pawn
            let promoted = count(PieceKind::Queen).saturating_sub(1)
                + count(PieceKind::Rook).saturating_sub(2)
                + count(PieceKind::Bishop).saturating_sub(2)
                + count(PieceKind::Knight).saturating_sub(2);
            if promoted + pawns > 8 {
                return invalid(format!("{name} has too many promoted pieces"));
            }
        }

        if let Some(ep) = self.ep_square {
            if !self.is_valid_ep_square(ep) {
                return invalid(format!("en passant square {ep} is impossible"));
            }
        }

        if let (Some(white), Some(black)) = (
            self.king_square(Side::White),
            self.king_square(Side::Black),
        ) {
            if white.file().abs_diff(black.file()) <= 1 && white.row().abs_diff(black.row()) <= 1 {
                return invalid(String::from("kings are adjacent"));
            }
        }

        // Both kings are known to exist from here on
        if self.is_in_check(self.side.opponent()) {
            let name = self.side.opponent().name();
            return invalid(format!("{name} is in check but not to move"));
        }

        Ok(())
    }

    /// Computes the Zobrist key of this position from scratch.
    pub fn init_hash_key(&self) -> ZobristKey {
        let mut key = ZobristKey::default();

        for square in Square::iter() {
            if let Some(piece) = self.pieces[square] {
                key.hash_piece(square, piece);
            }
        }

        for side in Side::all() {
            for wing in CastleWing::all() {
                if self.castling_rights[side].has(wing) {
                    key.hash_castling(side, wing);
                }
            }
        }

        if let Some(file) = self.ep_hash_file() {
            key.hash_ep_file(file);
        }

        key.hash_side_to_move(self.side);
        key
    }

    /// Returns `true` if the incrementally maintained key matches a recomputed one.
    #[inline(always)]
    pub fn is_hash_valid(&self) -> bool {
        self.key == self.init_hash_key()
    }

    /// File of the en passant target, if a pawn is actually in place to take en passant.
    ///
    /// A target square alone does not change a Polyglot key.
    fn ep_hash_file(&self) -> Option<u8> {
        let ep = self.ep_square?;
        let (capturer, left, right) = match ep.row() {
            2 => (Piece::WHITE_PAWN, ep.index() + 7, ep.index() + 9),
            5 => (Piece::BLACK_PAWN, ep.index() - 9, ep.index() - 7),
            _ => return None,
        };

        let file = ep.file();
        let can_capture = (file > 0 && self.pieces[left] == Some(capturer))
            || (file < 7 && self.pieces[right] == Some(capturer));
        can_capture.then_some(file)
    }

    #[inline(always)]
    fn hash_ep(&mut self) {
        if let Some(file) = self.ep_hash_file() {
            self.key.hash_ep_file(file);
        }
    }

    /// Moves a piece without touching the key.
    #[inline(always)]
    fn relocate(&mut self, from: Square, dest: Square) {
        self.pieces[dest] = self.pieces[from].take();
    }

    /// Clears the castling right tied to a rook standing on `square`, if it is on its home corner.
    fn clear_rook_rights(&mut self, square: Square, side: Side) {
        if square.row() != back_row(side) {
            return;
        }
        for wing in CastleWing::all() {
            if square.file() == wing.rook_file() {
                self.castling_rights[side].clear(wing);
            }
        }
    }

    /// Squares of the castling rook before and after castling with `king_move`.
    #[inline(always)]
    pub(crate) fn castling_rook_squares(from: Square, dest: Square) -> (Square, Square) {
        let mid = Square::from_index_unchecked((from.index() + dest.index()) / 2);
        let rook = if dest > from {
            from.index() + 3
        } else {
            from.index() - 4
        };
        (Square::from_index_unchecked(rook), mid)
    }

    /// Applies `mv` to the pieces, castling rights, en passant target, half-move clock and key.
    ///
    /// The side to move is left alone and nothing is pushed onto the history; the returned
    /// record undoes the move through [`ChessBoard::take_back_raw`].
    pub(crate) fn make_raw(&mut self, mv: MoveFull) -> History {
        let mut hist = History::new(
            mv,
            self.ep_square,
            self.castling_rights,
            self.quiet_count,
            self.key,
        );
        let side = mv.piece.side;
        let (from, dest) = (mv.from, mv.dest);

        self.hash_ep();

        hist.captured = self.pieces[dest];
        if let Some(captured) = hist.captured {
            self.key.hash_piece(dest, captured);
        }
        self.key.hash_piece(from, mv.piece);
        self.relocate(from, dest);
        self.key.hash_piece(dest, mv.piece);

        self.quiet_count += 1;
        self.ep_square = None;

        if let Some(captured) = hist.captured {
            self.quiet_count = 0;
            if captured.is_rook() {
                self.clear_rook_rights(dest, captured.side);
            }
        }

        match mv.piece.kind {
            PieceKind::King => {
                self.castling_rights[side] = CastlingRights::NONE;

                if mv.is_castling() {
                    let (rook_from, rook_dest) = Self::castling_rook_squares(from, dest);
                    if let Some(rook) = self.pieces[rook_from] {
                        self.key.hash_piece(rook_from, rook);
                        self.relocate(rook_from, rook_dest);
                        self.key.hash_piece(rook_dest, rook);
                    }

                    hist.castled = Some(if dest.file() == CastleWing::Long.king_file() {
                        CastleWing::Long
                    } else {
                        CastleWing::Short
                    });
                    self.quiet_count = 0;
                }
            }

            PieceKind::Rook => self.clear_rook_rights(from, side),

            PieceKind::Pawn => {
                self.quiet_count = 0;

                if from.index().abs_diff(dest.index()) == 16 {
                    self.ep_square = Some(Square::from_index_unchecked(
                        (from.index() + dest.index()) / 2,
                    ));
                } else if Some(dest) == hist.ep_square {
                    let passed = en_passant_victim(dest, side);
                    hist.captured = self.pieces[passed].take();
                    if let Some(captured) = hist.captured {
                        self.key.hash_piece(passed, captured);
                    }
                } else if let Some(promotion) = mv.promotion {
                    let promoted = Piece::new(side, promotion);
                    self.key.hash_piece(dest, mv.piece);
                    self.pieces[dest] = Some(promoted);
                    self.key.hash_piece(dest, promoted);
                }
            }

            _ => {}
        }

        for side in Side::all() {
            for wing in CastleWing::all() {
                if hist.castling_rights[side].has(wing) != self.castling_rights[side].has(wing) {
                    self.key.hash_castling(side, wing);
                }
            }
        }

        self.hash_ep();

        hist
    }

    /// Reverses [`ChessBoard::make_raw`], restoring every field from `hist`.
    pub(crate) fn take_back_raw(&mut self, hist: &History) {
        let mv = hist.mv;

        // Putting the original piece back also undoes a promotion
        self.pieces[mv.from] = Some(mv.piece);

        if hist.is_en_passant() {
            self.pieces[mv.dest] = None;
            self.pieces[en_passant_victim(mv.dest, mv.piece.side)] = hist.captured;
        } else {
            self.pieces[mv.dest] = hist.captured;
        }

        if hist.castled.is_some() {
            let (rook_from, rook_dest) = Self::castling_rook_squares(mv.from, mv.dest);
            self.relocate(rook_dest, rook_from);
        }

        self.castling_rights = hist.castling_rights;
        self.ep_square = hist.ep_square;
        self.quiet_count = hist.quiet_count;
        self.key = hist.key;
    }

    /// Makes `mv`, pushes its undo record, and passes the turn.
    ///
    /// No legality checks are performed; use [`ChessBoard::check_make`] for untrusted input.
    ///
    /// # Panics
    /// If debug assertions are enabled and the incremental key diverges from a recomputed one.
    pub fn make(&mut self, mv: MoveFull) {
        let hist = self.make_raw(mv);
        self.history.push(hist);

        if self.side.is_black() {
            self.fullmove += 1;
        }
        self.side = self.side.opponent();
        self.key.flip_side();

        debug_assert!(
            self.is_hash_valid(),
            "Zobrist key diverged after {mv} in {}",
            self.fen()
        );
    }

    /// Undoes the last move, returning its record, or `None` if no move has been made.
    ///
    /// # Example
    /// ```
    /// # use plyboard::*;
    /// let mut board = ChessBoard::new();
    /// assert!(board.check_make(Square::E2, Square::E4, None));
    /// let hist = board.take_back().unwrap();
    /// assert_eq!(hist.san, "e4");
    /// assert_eq!(board, ChessBoard::new());
    /// ```
    pub fn take_back(&mut self) -> Option<History> {
        let hist = self.history.pop()?;
        self.side = self.side.opponent();
        self.take_back_raw(&hist);
        if self.side.is_black() {
            self.fullmove -= 1;
        }
        self.result = GameResult::default();
        Some(hist)
    }

    /// Builds the UCI `position` command that reaches this position.
    ///
    /// # Example
    /// ```
    /// # use plyboard::*;
    /// let mut board = ChessBoard::new();
    /// assert_eq!(board.uci_position(), "position startpos");
    ///
    /// board.check_make(Square::E2, Square::E4, None);
    /// assert_eq!(board.uci_position(), "position startpos moves e2e4");
    /// ```
    pub fn uci_position(&self) -> String {
        let mut cmd = match &self.start_fen {
            Some(fen) => format!("position fen {fen}"),
            None => String::from("position startpos"),
        };

        if !self.history.is_empty() {
            cmd.push_str(" moves");
            for hist in &self.history {
                cmd.push(' ');
                cmd.push_str(&hist.mv.as_move().to_uci());
            }
        }
        cmd
    }
}

/// Square of the pawn taken when a `side` pawn captures en passant on `dest`.
#[inline(always)]
fn en_passant_victim(dest: Square, side: Side) -> Square {
    match side {
        Side::White => Square::from_index_unchecked(dest.index() + 8),
        Side::Black => Square::from_index_unchecked(dest.index() - 8),
    }
}

/// Parses the piece placement field of a FEN string.
fn parse_placements(placements: &str) -> Result<[Option<Piece>; Square::COUNT], FenError> {
    let mut pieces = [None; Square::COUNT];
    let malformed = |reason: String| FenError::Malformed(reason);

    let ranks = placements.split('/').collect::<Vec<_>>();
    if ranks.len() != 8 {
        return Err(malformed(format!(
            "piece placements must have 8 ranks, got {}",
            ranks.len()
        )));
    }

    for (row, rank) in ranks.into_iter().enumerate() {
        let mut file = 0;
        for c in rank.chars() {
            if let Some(empty) = c.to_digit(10).filter(|n| (1..=8).contains(n)) {
                file += empty as usize;
            } else if let Some(piece) = Piece::from_char(c) {
                if file < 8 {
                    pieces[row * 8 + file] = Some(piece);
                }
                file += 1;
            } else {
                return Err(malformed(format!("invalid character {c:?} in {rank:?}")));
            }

            if file > 8 {
                return Err(malformed(format!("rank {rank:?} is wider than 8 squares")));
            }
        }

        if file != 8 {
            return Err(malformed(format!("rank {rank:?} is narrower than 8 squares")));
        }
    }

    Ok(pieces)
}

impl FromStr for ChessBoard {
    type Err = FenError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl Default for ChessBoard {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChessBoard {
    /// Display this board's FEN string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fen())
    }
}

impl fmt::Debug for ChessBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..8 {
            write!(f, "{}|", 8 - row)?;
            for file in 0..8 {
                let piece = self.pieces[Square::new(file, row)];
                write!(f, " {}", piece.map(|p| p.char()).unwrap_or('.'))?;
            }

            match row {
                1 => write!(f, "           FEN: {}", self.fen())?,
                2 => write!(f, "          Side: {}", self.side.name())?,
                3 => write!(f, "      Castling: {}", self.castling_rights_string())?,
                4 => {
                    let ep = self
                        .ep_square
                        .map(|square| square.to_string())
                        .unwrap_or(String::from("-"));
                    write!(f, "            EP: {ep}")?
                }
                5 => write!(f, "     Half-move: {}", self.quiet_count)?,
                6 => write!(f, "     Full-move: {}", self.fullmove)?,
                7 => write!(f, "           Key: {}", self.key)?,
                _ => {}
            }
            writeln!(f)?;
        }
        write!(f, " +")?;
        for _ in 0..8 {
            write!(f, "--")?;
        }
        write!(f, "\n   ")?;
        for file in 'a'..='h' {
            write!(f, "{file} ")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Move, FEN_KIWIPETE};

    /// Polyglot reference keys, from the format's documentation.
    const POLYGLOT_KEYS: [(&str, u64); 5] = [
        ("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", 0x463b96181691fc9c),
        ("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1", 0x823c9b50fd114196),
        ("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2", 0x0756b94461c50fb0),
        ("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR b KQkq - 0 2", 0x662fafb965db29d4),
        ("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3", 0x22a48b5a8e47ff78),
    ];

    fn play(board: &mut ChessBoard, moves: &[&str]) {
        for mv in moves {
            let mv = Move::from_coordinate(mv).unwrap();
            assert!(board.check_make(mv.from, mv.dest, mv.promotion), "{mv} rejected");
        }
    }

    #[test]
    fn test_polyglot_keys_from_fen() {
        for (fen, key) in POLYGLOT_KEYS {
            let board = ChessBoard::from_fen(fen).unwrap();
            assert_eq!(board.key().inner(), key, "{fen}");
        }
    }

    #[test]
    fn test_polyglot_keys_incremental() {
        let mut board = ChessBoard::new();
        let moves = ["e2e4", "d7d5", "e4e5", "f7f5"];
        for (mv, (fen, key)) in moves.iter().zip(POLYGLOT_KEYS.iter().skip(1)) {
            play(&mut board, &[mv]);
            assert_eq!(board.key().inner(), *key, "after {mv}");
            assert_eq!(board.fen(), *fen);
        }
    }

    #[test]
    fn test_fen_round_trip() {
        for fen in [
            FEN_STARTPOS,
            FEN_KIWIPETE,
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
        ] {
            assert_eq!(ChessBoard::from_fen(fen).unwrap().fen(), fen);
        }
    }

    #[test]
    fn test_fen_rejects_garbage() {
        for fen in [
            "",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP",
            "rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNRR w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBN w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQxq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq e9 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - x 1",
        ] {
            assert!(
                matches!(ChessBoard::from_fen(fen), Err(FenError::Malformed(_))),
                "{fen:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_fen_rejects_impossible_positions() {
        for fen in [
            // Two white kings
            "4k3/8/8/8/8/8/8/3KK3 w - - 0 1",
            // Pawn on the back rank
            "4k2P/8/8/8/8/8/8/4K3 w - - 0 1",
            // Touching kings
            "8/8/8/3kK3/8/8/8/8 w - - 0 1",
            // Nine pawns
            "4k3/8/8/8/P7/8/PPPPPPPP/4K3 w - - 0 1",
            // En passant target without the pawn that passed it
            "4k3/8/8/8/8/8/8/4K3 b - e3 0 1",
            // Black is in check with White to move
            "4k3/8/8/8/8/8/8/4R1K1 w - - 0 1",
        ] {
            assert!(
                matches!(ChessBoard::from_fen(fen), Err(FenError::Invalid(_))),
                "{fen:?} should be invalid"
            );
        }
    }

    #[test]
    fn test_set_fen_failure_leaves_board_untouched() {
        let mut board = ChessBoard::from_fen(FEN_KIWIPETE).unwrap();
        assert!(board.set_fen("not a fen").is_err());
        assert_eq!(board.fen(), FEN_KIWIPETE);
    }

    #[test]
    fn test_fen_defaults() {
        let board = ChessBoard::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR").unwrap();
        assert_eq!(board.side_to_move(), Side::White);
        assert_eq!(board.castling_rights_string(), "-");
        assert_eq!(board.fullmove(), 1);
        assert_eq!(board.quiet_count(), 0);
    }

    #[test]
    fn test_castling_rights_need_pieces_at_home() {
        let board = ChessBoard::from_fen("r3k3/8/8/8/8/8/8/4K2R w KQkq - 0 1").unwrap();
        assert_eq!(board.castling_rights_string(), "Kq");
    }

    #[test]
    fn test_start_fen_tracking() {
        assert_eq!(ChessBoard::new().start_fen(), None);
        assert_eq!(ChessBoard::from_fen(FEN_STARTPOS).unwrap().start_fen(), None);
        assert_eq!(
            ChessBoard::from_fen(FEN_KIWIPETE).unwrap().start_fen(),
            Some(FEN_KIWIPETE)
        );
    }

    #[test]
    fn test_make_take_back_restores_everything() {
        let mut board = ChessBoard::from_fen(FEN_KIWIPETE).unwrap();
        let original = board.clone();

        for mv in board.gen(Side::White) {
            board.make(mv);
            assert!(board.is_hash_valid(), "{mv}");
            board.take_back();
            assert_eq!(board, original, "{mv} was not undone");
        }
    }

    #[test]
    fn test_castling_moves_rook_and_clears_rights() {
        let mut board = ChessBoard::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 5 1").unwrap();

        play(&mut board, &["e1g1"]);
        assert_eq!(board.piece_at(Square::F1), Some(Piece::WHITE_ROOK));
        assert_eq!(board.piece_at(Square::H1), None);
        assert_eq!(board.castling_rights_string(), "kq");
        assert_eq!(board.quiet_count(), 0);
        assert_eq!(board.history()[0].castled, Some(CastleWing::Short));

        play(&mut board, &["e8c8"]);
        assert_eq!(board.piece_at(Square::D8), Some(Piece::BLACK_ROOK));
        assert_eq!(board.piece_at(Square::A8), None);
        assert_eq!(board.castling_rights_string(), "-");

        board.take_back();
        board.take_back();
        assert_eq!(board.fen(), "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 5 1");
    }

    #[test]
    fn test_castling_rights_update_on_rook_move_and_capture() {
        let mut board = ChessBoard::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();

        // Rook leaves its corner
        play(&mut board, &["a1a2"]);
        assert_eq!(board.castling_rights_string(), "Kkq");

        // Rook captured on its corner
        play(&mut board, &["h8h1"]);
        assert_eq!(board.castling_rights_string(), "q");
        assert!(board.is_hash_valid());
    }

    #[test]
    fn test_en_passant_capture_and_undo() {
        let fen = "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3";
        let mut board = ChessBoard::from_fen(fen).unwrap();

        play(&mut board, &["e5f6"]);
        assert_eq!(board.piece_at(Square::F5), None);
        assert_eq!(board.piece_at(Square::F6), Some(Piece::WHITE_PAWN));
        assert_eq!(board.history()[0].captured, Some(Piece::BLACK_PAWN));
        assert_eq!(board.history()[0].san, "exf6");

        board.take_back();
        assert_eq!(board.fen(), fen);
    }

    #[test]
    fn test_promotion_and_undo() {
        let fen = "8/1P2k3/8/8/8/8/8/4K3 w - - 0 1";
        let mut board = ChessBoard::from_fen(fen).unwrap();

        play(&mut board, &["b7b8n"]);
        assert_eq!(board.piece_at(Square::B8), Some(Piece::WHITE_KNIGHT));

        board.take_back();
        assert_eq!(board.piece_at(Square::B7), Some(Piece::WHITE_PAWN));
        assert_eq!(board.fen(), fen);
    }

    #[test]
    fn test_counters() {
        let mut board = ChessBoard::new();
        play(&mut board, &["g1f3", "g8f6", "f3g1"]);
        assert_eq!(board.quiet_count(), 3);
        assert_eq!(board.fullmove(), 2);
        assert!(board.fen().ends_with(" b KQkq - 3 2"));

        play(&mut board, &["e7e5"]);
        assert_eq!(board.quiet_count(), 0);
        assert_eq!(board.fullmove(), 3);
    }

    #[test]
    fn test_edit_mode() {
        let mut board = ChessBoard::empty();
        board.set_piece(Square::E1, Piece::WHITE_KING);
        board.set_piece(Square::E8, Piece::BLACK_KING);
        board.set_piece(Square::H1, Piece::WHITE_ROOK);
        board.set_castling_right(Side::White, CastleWing::Short, true);
        board.set_castling_right(Side::White, CastleWing::Long, true);

        assert!(board.validate().is_ok());
        assert_eq!(board.castling_rights_string(), "K");
        assert!(board.is_hash_valid());
        assert_eq!(board.start_fen(), Some("4k3/8/8/8/8/8/8/4K2R w K - 0 1"));

        board.clear_square(Square::H1);
        assert_eq!(board.castling_rights_string(), "-");
    }

    #[test]
    fn test_debug_diagram() {
        let diagram = format!("{:?}", ChessBoard::new());
        assert!(diagram.starts_with("8| r n b q k b n r"));
        assert!(diagram.contains("FEN: rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"));
        assert!(diagram.contains("Key: 463b96181691fc9c"));
    }
}
