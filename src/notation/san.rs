/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use log::debug;

use crate::{CastleWing, ChessBoard, Move, MoveFull, NotationError, PieceKind, Square};

/// What a SAN token says about the origin square.
#[derive(Clone, Copy, Debug, Default)]
struct Origin {
    file: Option<u8>,
    row: Option<u8>,
}

impl Origin {
    fn admits(&self, square: Square) -> bool {
        self.file.map_or(true, |file| square.file() == file)
            && self.row.map_or(true, |row| square.row() == row)
    }
}

impl ChessBoard {
    /// Finds the move of the side to move that `san` describes.
    ///
    /// Check, mate, capture and annotation marks are ignored, so `exd5`, `ed5` and `e:d5!?`
    /// are all read the same way. Castling may be written with letter O or digit zero.
    /// Promotions may be written `e8=Q` or `e8Q`.
    ///
    /// When the token leaves more than one legal move open, the first generated one is returned.
    ///
    /// # Example
    /// ```
    /// # use plyboard::*;
    /// let mut board = ChessBoard::new();
    /// assert_eq!(board.move_from_san("Nf3").unwrap(), Move::new(Square::G1, Square::F3));
    /// assert_eq!(board.move_from_san("e4+").unwrap(), Move::new(Square::E2, Square::E4));
    /// assert!(matches!(board.move_from_san("Ke2"), Err(NotationError::NoMatchingMove(_))));
    /// ```
    pub fn move_from_san(&mut self, san: &str) -> Result<Move, NotationError> {
        let token = san.trim();
        let malformed = || NotationError::Malformed(token.to_string());

        let bare = token.trim_end_matches(['+', '#', '!', '?']);
        if let Some(wing) = castling_wing(bare) {
            return self.castling_move(wing, token);
        }

        let cleaned = bare
            .chars()
            .filter(|c| !matches!(c, '+' | 'x' | '*' | '#' | '-' | '!' | '?' | ':'))
            .collect::<String>();
        if !cleaned.is_ascii() {
            return Err(malformed());
        }

        let (body, promotion) = split_promotion(&cleaned).ok_or_else(malformed)?;
        if body.len() < 2 {
            return Err(malformed());
        }

        let (prefix, dest) = body.split_at(body.len() - 2);
        let dest = Square::from_coordinate(dest).map_err(|_| malformed())?;

        let (kind, prefix) = match prefix.chars().next() {
            Some(c) if c.is_ascii_uppercase() => {
                (PieceKind::from_char(c).ok_or_else(malformed)?, &prefix[1..])
            }
            _ => (PieceKind::Pawn, prefix),
        };
        let origin = parse_origin(prefix).ok_or_else(malformed)?;

        let side = self.side_to_move();
        let candidates = self
            .gen(side)
            .into_iter()
            .filter(|mv| {
                mv.piece.kind == kind
                    && mv.dest == dest
                    && mv.promotion == promotion
                    && origin.admits(mv.from)
            })
            .collect::<Vec<_>>();

        self.pick_legal(candidates, token)
    }

    /// Finds the move described by `token`, trying SAN first and coordinate notation second.
    ///
    /// # Example
    /// ```
    /// # use plyboard::*;
    /// let mut board = ChessBoard::new();
    /// assert_eq!(board.move_from_string("Nc3").unwrap(), Move::new(Square::B1, Square::C3));
    /// assert_eq!(board.move_from_string("b1c3").unwrap(), Move::new(Square::B1, Square::C3));
    /// ```
    pub fn move_from_string(&mut self, token: &str) -> Result<Move, NotationError> {
        self.move_from_san(token).or_else(|san_err| match Move::from_coordinate(token.trim()) {
            Ok(mv) => Ok(mv),
            Err(_) => Err(san_err),
        })
    }

    /// Reads `token` as SAN or coordinate notation and plays it.
    ///
    /// The board is left untouched on failure.
    ///
    /// # Example
    /// ```
    /// # use plyboard::*;
    /// let mut board = ChessBoard::new();
    /// board.play("e4").unwrap();
    /// board.play("c7c5").unwrap();
    /// assert!(board.play("Ke3").is_err());
    /// assert_eq!(board.history().len(), 2);
    /// ```
    pub fn play(&mut self, token: &str) -> Result<Move, NotationError> {
        let mv = self.move_from_string(token)?;
        if self.check_make_move(mv) {
            Ok(mv)
        } else {
            Err(NotationError::IllegalMove(token.trim().to_string()))
        }
    }

    fn castling_move(&mut self, wing: CastleWing, token: &str) -> Result<Move, NotationError> {
        let side = self.side_to_move();
        let candidates = self
            .gen(side)
            .into_iter()
            .filter(|mv| mv.is_castling() && mv.dest.file() == wing.king_file())
            .collect::<Vec<_>>();

        self.pick_legal(candidates, token)
    }

    fn pick_legal(&mut self, candidates: Vec<MoveFull>, token: &str) -> Result<Move, NotationError> {
        if candidates.is_empty() {
            return Err(NotationError::NoMatchingMove(token.to_string()));
        }

        let legal = candidates
            .into_iter()
            .filter(|&mv| self.is_legal_pseudo(mv))
            .collect::<Vec<_>>();

        match legal.as_slice() {
            [] => Err(NotationError::IllegalMove(token.to_string())),
            [mv] => Ok(mv.as_move()),
            [mv, ..] => {
                debug!(
                    "{token:?} matches {} legal moves in {}; taking {mv}",
                    legal.len(),
                    self.fen()
                );
                Ok(mv.as_move())
            }
        }
    }
}

fn castling_wing(token: &str) -> Option<CastleWing> {
    match token {
        "O-O" | "0-0" => Some(CastleWing::Short),
        "O-O-O" | "0-0-0" => Some(CastleWing::Long),
        _ => None,
    }
}

/// Splits off a trailing promotion, written `=Q` or as a bare letter after the destination rank.
///
/// Returns `None` if the promotion piece is not one a pawn may become.
fn split_promotion(s: &str) -> Option<(&str, Option<PieceKind>)> {
    let promotion_kind = |c: char| PieceKind::from_char(c).filter(PieceKind::is_promotion);

    if let Some((body, piece)) = s.split_once('=') {
        let mut chars = piece.chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Some((body, Some(promotion_kind(c)?))),
            _ => None,
        };
    }

    let bytes = s.as_bytes();
    match bytes {
        [.., rank, letter] if rank.is_ascii_digit() && letter.is_ascii_alphabetic() => {
            Some((&s[..s.len() - 1], Some(promotion_kind(*letter as char)?)))
        }
        _ => Some((s, None)),
    }
}

/// Parses the disambiguation between the piece letter and the destination.
fn parse_origin(prefix: &str) -> Option<Origin> {
    let mut chars = prefix.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (None, ..) => Some(Origin::default()),
        (Some(c), None, _) => match c {
            'a'..='h' => Some(Origin {
                file: Some(c as u8 - b'a'),
                row: None,
            }),
            '1'..='8' => Some(Origin {
                file: None,
                row: Some(b'8' - c as u8),
            }),
            _ => None,
        },
        (Some(_), Some(_), None) => {
            let square = Square::from_coordinate(prefix).ok()?;
            Some(Origin {
                file: Some(square.file()),
                row: Some(square.row()),
            })
        }
        _ => None,
    }
}
