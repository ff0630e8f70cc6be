/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fs, path::Path};

use log::{info, trace, warn};
use rand::Rng;

use crate::{BookError, ChessBoard, Move, PieceKind, Square};

/// Size of one book record, in bytes.
pub const BOOK_ENTRY_SIZE: usize = 16;

/// One record of a Polyglot book: a move that may be played in the position hashing to `key`.
///
/// All fields are stored big-endian on disk.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct BookEntry {
    pub key: u64,

    /// Packed as `promotion << 12 | from_rank << 9 | from_file << 6 | to_rank << 3 | to_file`,
    /// with ranks counted from rank 1.
    pub raw_move: u16,
    pub weight: u16,
    pub learn: u32,
}

impl BookEntry {
    /// Reads a record from its on-disk form.
    pub fn from_bytes(bytes: &[u8; BOOK_ENTRY_SIZE]) -> Self {
        let [k0, k1, k2, k3, k4, k5, k6, k7, m0, m1, w0, w1, l0, l1, l2, l3] = *bytes;
        Self {
            key: u64::from_be_bytes([k0, k1, k2, k3, k4, k5, k6, k7]),
            raw_move: u16::from_be_bytes([m0, m1]),
            weight: u16::from_be_bytes([w0, w1]),
            learn: u32::from_be_bytes([l0, l1, l2, l3]),
        }
    }

    /// Writes this record in its on-disk form.
    pub fn to_bytes(&self) -> [u8; BOOK_ENTRY_SIZE] {
        let mut bytes = [0; BOOK_ENTRY_SIZE];
        bytes[..8].copy_from_slice(&self.key.to_be_bytes());
        bytes[8..10].copy_from_slice(&self.raw_move.to_be_bytes());
        bytes[10..12].copy_from_slice(&self.weight.to_be_bytes());
        bytes[12..].copy_from_slice(&self.learn.to_be_bytes());
        bytes
    }

    /// Unpacks this record's move for `board`.
    ///
    /// Polyglot writes castling as the king taking its own rook; that is turned back into
    /// the king's two-square step.
    ///
    /// # Example
    /// ```
    /// # use plyboard::*;
    /// let entry = BookEntry { raw_move: 796, ..Default::default() };
    /// assert_eq!(entry.decode_move(&ChessBoard::new()), Move::new(Square::E2, Square::E4));
    /// ```
    pub fn decode_move(&self, board: &ChessBoard) -> Move {
        let field = |shift: u16| ((self.raw_move >> shift) & 0x7) as u8;
        let (dest_file, dest_rank) = (field(0), field(3));
        let (from_file, from_rank) = (field(6), field(9));

        let from = Square::new(from_file, 7 - from_rank);
        let mut dest = Square::new(dest_file, 7 - dest_rank);

        let castles = dest_rank == from_rank
            && (from == Square::E1 || from == Square::E8)
            && (dest_file == 0 || dest_file == 7)
            && board.piece_at(from).is_some_and(|piece| piece.is_king());
        if castles {
            dest = Square::new(if dest_file == 0 { 2 } else { 6 }, dest.row());
        }

        let promotion = match field(12) {
            1 => Some(PieceKind::Knight),
            2 => Some(PieceKind::Bishop),
            3 => Some(PieceKind::Rook),
            4 => Some(PieceKind::Queen),
            _ => None,
        };

        Move {
            from,
            dest,
            promotion,
        }
    }
}

/// An opening book in Polyglot format, held in memory.
///
/// An empty book is a disabled one: every probe misses.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PolyglotBook {
    entries: Vec<BookEntry>,

    /// Percentage of a position's entries, from the front, that a probe picks from.
    /// At `0` the first entry is always picked.
    top_percent: usize,

    /// Positions further into the game than this many plies are not looked up.
    max_ply: usize,
}

impl PolyglotBook {
    /// Reads a whole book file into memory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BookError> {
        let path = path.as_ref();
        let book = Self::from_bytes(&fs::read(path)?)?;
        info!("Loaded {} book entries from {}", book.len(), path.display());
        Ok(book)
    }

    /// Like [`PolyglotBook::load`], but falls back to a disabled book if the file cannot be used.
    pub fn load_or_disabled(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::load(path).unwrap_or_else(|err| {
            warn!("Opening book {} disabled: {err}", path.display());
            Self::default()
        })
    }

    /// Reads a book from its raw bytes.
    ///
    /// Records are expected to be sorted by key already; they are sorted here if they are not.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BookError> {
        if bytes.len() % BOOK_ENTRY_SIZE != 0 {
            return Err(BookError::Size(bytes.len()));
        }

        let entries = bytes
            .chunks_exact(BOOK_ENTRY_SIZE)
            .map(|chunk| {
                let mut record = [0; BOOK_ENTRY_SIZE];
                record.copy_from_slice(chunk);
                BookEntry::from_bytes(&record)
            })
            .collect();

        Ok(Self::from_entries(entries))
    }

    /// Builds a book from records already in memory.
    pub fn from_entries(mut entries: Vec<BookEntry>) -> Self {
        if !entries.windows(2).all(|pair| pair[0].key <= pair[1].key) {
            warn!("Book entries are not sorted by key; sorting {}", entries.len());
            entries.sort_by_key(|entry| entry.key);
        }

        Self {
            entries,
            ..Default::default()
        }
    }

    /// Sets the percentage of a position's entries that probes pick from. Capped at 100.
    pub fn with_top_percent(mut self, top_percent: usize) -> Self {
        self.top_percent = top_percent.min(100);
        self
    }

    /// Sets how many plies into the game the book is consulted.
    pub fn with_max_ply(mut self, max_ply: usize) -> Self {
        self.max_ply = max_ply;
        self
    }

    #[inline(always)]
    pub const fn top_percent(&self) -> usize {
        self.top_percent
    }

    #[inline(always)]
    pub const fn max_ply(&self) -> usize {
        self.max_ply
    }

    /// Number of records in the book.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline(always)]
    pub fn entries(&self) -> &[BookEntry] {
        &self.entries
    }

    /// Index of the first record for `key`, if there is one.
    pub fn binary_search(&self, key: u64) -> Option<usize> {
        let mut index = self
            .entries
            .binary_search_by_key(&key, |entry| entry.key)
            .ok()?;

        // Any of several equal keys may have been hit
        while index > 0 && self.entries[index - 1].key == key {
            index -= 1;
        }
        Some(index)
    }

    /// All records for `key`, in book order.
    pub fn search(&self, key: u64) -> &[BookEntry] {
        let Some(start) = self.binary_search(key) else {
            return &[];
        };
        let count = self.entries[start..]
            .iter()
            .take_while(|entry| entry.key == key)
            .count();
        &self.entries[start..start + count]
    }

    /// Picks a book move for `board`, or `None` if the book has nothing playable.
    ///
    /// The move is drawn uniformly from the first [`PolyglotBook::top_percent`] of the position's
    /// records, and is only returned if it is legal on `board`.
    ///
    /// # Example
    /// ```
    /// # use plyboard::*;
    /// # use rand::{rngs::StdRng, SeedableRng};
    /// let e4 = BookEntry { key: ChessBoard::new().key().inner(), raw_move: 796, weight: 1, learn: 0 };
    /// let book = PolyglotBook::from_entries(vec![e4]);
    ///
    /// let mut rng = StdRng::seed_from_u64(1);
    /// assert_eq!(book.probe(&ChessBoard::new(), &mut rng), Some(Move::new(Square::E2, Square::E4)));
    /// ```
    pub fn probe<R: Rng + ?Sized>(&self, board: &ChessBoard, rng: &mut R) -> Option<Move> {
        if self.is_empty() || game_ply(board) > self.max_ply {
            return None;
        }

        let candidates = self.search(board.key().inner());
        if candidates.is_empty() {
            return None;
        }

        for entry in candidates {
            trace!(
                "Book candidate {} weight {} learn {}",
                entry.decode_move(board),
                entry.weight,
                entry.learn
            );
        }

        let window = candidates.len() * self.top_percent / 100;
        let index = if window == 0 {
            0
        } else {
            rng.random_range(0..window)
        };

        let mv = candidates[index].decode_move(board);
        let mut scratch = board.clone();
        scratch.check_make_move(mv).then_some(mv)
    }
}

impl Default for PolyglotBook {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            top_percent: 100,
            max_ply: 20,
        }
    }
}

/// Plies played since the start of the game, going by the move counters.
fn game_ply(board: &ChessBoard) -> usize {
    (board.fullmove() - 1) * 2 + usize::from(board.side_to_move().is_black())
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    const STARTPOS_KEY: u64 = 0x463b96181691fc9c;
    const AFTER_E4_KEY: u64 = 0x823c9b50fd114196;

    const E2E4: u16 = 796;
    const D2D4: u16 = 731;
    const E7E5: u16 = 3364;
    const E2E5: u16 = 804;

    fn entry(key: u64, raw_move: u16, weight: u16) -> BookEntry {
        BookEntry {
            key,
            raw_move,
            weight,
            learn: 0,
        }
    }

    fn book_bytes(entries: &[BookEntry]) -> Vec<u8> {
        entries.iter().flat_map(BookEntry::to_bytes).collect()
    }

    #[test]
    fn test_decode_move() {
        let board = ChessBoard::new();
        assert_eq!(
            entry(0, E2E4, 1).decode_move(&board),
            Move::new(Square::E2, Square::E4)
        );
        assert_eq!(
            entry(0, D2D4, 1).decode_move(&board),
            Move::new(Square::D2, Square::D4)
        );
    }

    #[test]
    fn test_decode_castling_and_promotion() {
        let board = ChessBoard::from_fen("r3k2r/P7/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();

        // e1h1, e1a1, e8h8
        assert_eq!(
            entry(0, 263, 1).decode_move(&board),
            Move::new(Square::E1, Square::G1)
        );
        assert_eq!(
            entry(0, 256, 1).decode_move(&board),
            Move::new(Square::E1, Square::C1)
        );
        assert_eq!(
            entry(0, 3903, 1).decode_move(&board),
            Move::new(Square::E8, Square::G8)
        );

        // a7a8=Q
        assert_eq!(
            entry(0, 19512, 1).decode_move(&board),
            Move::with_promotion(Square::A7, Square::A8, PieceKind::Queen)
        );

        // A rook on e1 sliding to h1 is just a rook move
        let rook = ChessBoard::from_fen("3k4/8/8/8/8/8/8/K3R3 w - - 0 1").unwrap();
        assert_eq!(
            entry(0, 263, 1).decode_move(&rook),
            Move::new(Square::E1, Square::H1)
        );
    }

    #[test]
    fn test_records_are_big_endian() {
        let bytes = entry(0x0102030405060708, 0x090a, 0x0b0c).to_bytes();
        assert_eq!(bytes[..12], [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
        assert_eq!(BookEntry::from_bytes(&bytes).raw_move, 0x090a);
    }

    #[test]
    fn test_size_must_be_whole_records() {
        assert!(matches!(
            PolyglotBook::from_bytes(&[0; 17]),
            Err(BookError::Size(17))
        ));
        assert!(PolyglotBook::from_bytes(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_search_finds_every_record_for_a_key() {
        let entries = [1, 5, 5, 5, 9].map(|key| entry(key, E2E4, 1));
        let book = PolyglotBook::from_bytes(&book_bytes(&entries)).unwrap();

        assert_eq!(book.binary_search(5), Some(1));
        assert_eq!(book.search(5).len(), 3);
        assert_eq!(book.search(9).len(), 1);
        assert!(book.search(7).is_empty());
        assert_eq!(book.binary_search(0), None);
    }

    #[test]
    fn test_unsorted_records_are_sorted() {
        let book = PolyglotBook::from_entries(vec![entry(9, E2E4, 1), entry(1, D2D4, 1)]);
        assert_eq!(book.entries()[0].key, 1);
        assert_eq!(book.search(9).len(), 1);
    }

    #[test]
    fn test_probe_picks_a_book_move() {
        let book = PolyglotBook::from_entries(vec![
            entry(STARTPOS_KEY, E2E4, 10),
            entry(STARTPOS_KEY, D2D4, 5),
            entry(AFTER_E4_KEY, E7E5, 10),
        ]);
        let options = [
            Move::new(Square::E2, Square::E4),
            Move::new(Square::D2, Square::D4),
        ];

        let mut rng = StdRng::seed_from_u64(0xb00c);
        let mut board = ChessBoard::new();
        for _ in 0..20 {
            let mv = book.probe(&board, &mut rng).unwrap();
            assert!(options.contains(&mv), "{mv}");
        }

        assert!(board.check_make(Square::E2, Square::E4, None));
        assert_eq!(
            book.probe(&board, &mut rng),
            Some(Move::new(Square::E7, Square::E5))
        );

        // Nothing for the position after 1. e4 e5
        assert!(board.check_make(Square::E7, Square::E5, None));
        assert_eq!(book.probe(&board, &mut rng), None);
    }

    #[test]
    fn test_probe_top_entry_only() {
        let book = PolyglotBook::from_entries(vec![
            entry(STARTPOS_KEY, D2D4, 10),
            entry(STARTPOS_KEY, E2E4, 5),
        ])
        .with_top_percent(0);

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..5 {
            assert_eq!(
                book.probe(&ChessBoard::new(), &mut rng),
                Some(Move::new(Square::D2, Square::D4))
            );
        }
    }

    #[test]
    fn test_top_percent_counts_entries_not_weight() {
        const G1F3: u16 = 405;
        const C2C4: u16 = 666;

        // The heavy entries sit in the second half, which a 50% window never reaches
        let book = PolyglotBook::from_entries(vec![
            entry(STARTPOS_KEY, D2D4, 1),
            entry(STARTPOS_KEY, E2E4, 1),
            entry(STARTPOS_KEY, G1F3, 1000),
            entry(STARTPOS_KEY, C2C4, 1000),
        ])
        .with_top_percent(50);
        let options = [
            Move::new(Square::D2, Square::D4),
            Move::new(Square::E2, Square::E4),
        ];

        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..30 {
            let mv = book.probe(&ChessBoard::new(), &mut rng).unwrap();
            assert!(options.contains(&mv), "{mv}");
        }
    }

    #[test]
    fn test_probe_rejects_illegal_and_late_moves() {
        let mut rng = StdRng::seed_from_u64(3);

        let illegal = PolyglotBook::from_entries(vec![entry(STARTPOS_KEY, E2E5, 1)]);
        assert_eq!(illegal.probe(&ChessBoard::new(), &mut rng), None);

        let book = PolyglotBook::from_entries(vec![entry(AFTER_E4_KEY, E7E5, 1)]).with_max_ply(0);
        let mut board = ChessBoard::new();
        assert!(board.check_make(Square::E2, Square::E4, None));
        assert_eq!(book.probe(&board, &mut rng), None);
        assert_eq!(
            book.with_max_ply(1).probe(&board, &mut rng),
            Some(Move::new(Square::E7, Square::E5))
        );
    }

    #[test]
    fn test_load_from_disk() {
        let path = std::env::temp_dir().join(format!("plyboard-{}.bin", std::process::id()));
        fs::write(&path, book_bytes(&[entry(STARTPOS_KEY, E2E4, 1)])).unwrap();

        let book = PolyglotBook::load(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(book.len(), 1);
        assert_eq!(book.top_percent(), 100);
        assert_eq!(book.max_ply(), 20);

        assert!(matches!(PolyglotBook::load(&path), Err(BookError::Io(_))));
        assert!(PolyglotBook::load_or_disabled(&path).is_empty());
    }
}
