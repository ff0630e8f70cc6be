/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::{Index, IndexMut},
    str::FromStr,
};

use crate::NotationError;

/// Represents a single square on the mailbox board.
///
/// Squares are numbered rank-major from the top-left corner as White sees it:
/// `a8` is `0`, `h8` is `7`, `a1` is `56` and `h1` is `63`.
/// The "row" of a square is therefore `0` on rank 8 and `7` on rank 1.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Square(u8);

impl Square {
    pub const A8: Self = Self(0);
    pub const B8: Self = Self(1);
    pub const C8: Self = Self(2);
    pub const D8: Self = Self(3);
    pub const E8: Self = Self(4);
    pub const F8: Self = Self(5);
    pub const G8: Self = Self(6);
    pub const H8: Self = Self(7);
    pub const A7: Self = Self(8);
    pub const B7: Self = Self(9);
    pub const C7: Self = Self(10);
    pub const D7: Self = Self(11);
    pub const E7: Self = Self(12);
    pub const F7: Self = Self(13);
    pub const G7: Self = Self(14);
    pub const H7: Self = Self(15);
    pub const A6: Self = Self(16);
    pub const B6: Self = Self(17);
    pub const C6: Self = Self(18);
    pub const D6: Self = Self(19);
    pub const E6: Self = Self(20);
    pub const F6: Self = Self(21);
    pub const G6: Self = Self(22);
    pub const H6: Self = Self(23);
    pub const A5: Self = Self(24);
    pub const B5: Self = Self(25);
    pub const C5: Self = Self(26);
    pub const D5: Self = Self(27);
    pub const E5: Self = Self(28);
    pub const F5: Self = Self(29);
    pub const G5: Self = Self(30);
    pub const H5: Self = Self(31);
    pub const A4: Self = Self(32);
    pub const B4: Self = Self(33);
    pub const C4: Self = Self(34);
    pub const D4: Self = Self(35);
    pub const E4: Self = Self(36);
    pub const F4: Self = Self(37);
    pub const G4: Self = Self(38);
    pub const H4: Self = Self(39);
    pub const A3: Self = Self(40);
    pub const B3: Self = Self(41);
    pub const C3: Self = Self(42);
    pub const D3: Self = Self(43);
    pub const E3: Self = Self(44);
    pub const F3: Self = Self(45);
    pub const G3: Self = Self(46);
    pub const H3: Self = Self(47);
    pub const A2: Self = Self(48);
    pub const B2: Self = Self(49);
    pub const C2: Self = Self(50);
    pub const D2: Self = Self(51);
    pub const E2: Self = Self(52);
    pub const F2: Self = Self(53);
    pub const G2: Self = Self(54);
    pub const H2: Self = Self(55);
    pub const A1: Self = Self(56);
    pub const B1: Self = Self(57);
    pub const C1: Self = Self(58);
    pub const D1: Self = Self(59);
    pub const E1: Self = Self(60);
    pub const F1: Self = Self(61);
    pub const G1: Self = Self(62);
    pub const H1: Self = Self(63);

    /// Number of squares on the board.
    pub const COUNT: usize = 64;

    /// Iterate over all squares, starting at `a8`.
    #[inline(always)]
    pub fn iter() -> impl ExactSizeIterator<Item = Self> + DoubleEndedIterator<Item = Self> {
        (0..Self::COUNT as u8).map(Self)
    }

    /// Creates a new [`Square`] from a file (`0` is the a-file) and a row (`0` is rank 8).
    ///
    /// # Panics
    /// If `file` or `row` is greater than `7` and debug assertions are enabled.
    ///
    /// # Example
    /// ```
    /// # use plyboard::Square;
    /// assert_eq!(Square::new(4, 7), Square::E1);
    /// assert_eq!(Square::new(0, 0), Square::A8);
    /// ```
    #[inline(always)]
    pub const fn new(file: u8, row: u8) -> Self {
        debug_assert!(file < 8 && row < 8, "Square coordinates out of range");
        Self(row * 8 + file)
    }

    /// Creates a [`Square`] from an index in `[0, 63]`, or `None` if out of range.
    ///
    /// # Example
    /// ```
    /// # use plyboard::Square;
    /// assert_eq!(Square::from_index(63), Some(Square::H1));
    /// assert_eq!(Square::from_index(64), None);
    /// ```
    #[inline(always)]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// Creates a [`Square`] from an index without checking its range.
    ///
    /// # Panics
    /// If `index` is `64` or more and debug assertions are enabled.
    #[inline(always)]
    pub const fn from_index_unchecked(index: usize) -> Self {
        debug_assert!(index < Self::COUNT, "Square index out of range");
        Self(index as u8)
    }

    /// The index of this square, for indexing the board array.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// The inner value of this square.
    #[inline(always)]
    pub const fn inner(&self) -> u8 {
        self.0
    }

    /// The file of this square, `0` (a) through `7` (h).
    #[inline(always)]
    pub const fn file(&self) -> u8 {
        self.0 % 8
    }

    /// The row of this square, `0` (rank 8) through `7` (rank 1).
    #[inline(always)]
    pub const fn row(&self) -> u8 {
        self.0 / 8
    }

    /// The chess rank of this square, `1` through `8`.
    #[inline(always)]
    pub const fn rank(&self) -> u8 {
        8 - self.row()
    }

    /// Letter of this square's file.
    #[inline(always)]
    pub const fn file_char(&self) -> char {
        (b'a' + self.file()) as char
    }

    /// Digit of this square's rank.
    #[inline(always)]
    pub const fn rank_char(&self) -> char {
        (b'0' + self.rank()) as char
    }

    /// Returns `true` if this is a light square.
    ///
    /// # Example
    /// ```
    /// # use plyboard::Square;
    /// assert!(Square::H1.is_light());
    /// assert!(!Square::A1.is_light());
    /// ```
    #[inline(always)]
    pub const fn is_light(&self) -> bool {
        (self.file() + self.row()) % 2 == 0
    }

    /// Attempt to offset this [`Square`] by a number of files and ranks.
    ///
    /// A positive `rank_delta` moves toward rank 8. Returns `None` if the result would leave the board,
    /// which is what keeps rays and knight jumps from wrapping around an edge.
    ///
    /// # Example
    /// ```
    /// # use plyboard::Square;
    /// assert_eq!(Square::C4.offset(1, 1), Some(Square::D5));
    /// assert_eq!(Square::C4.offset(-1, -1), Some(Square::B3));
    /// assert_eq!(Square::A1.offset(-1, -1), None);
    /// assert_eq!(Square::H4.offset(1, 0), None);
    /// ```
    #[inline(always)]
    pub const fn offset(&self, file_delta: i8, rank_delta: i8) -> Option<Self> {
        let file = self.file() as i8 + file_delta;
        let row = self.row() as i8 - rank_delta;
        if file < 0 || file > 7 || row < 0 || row > 7 {
            return None;
        }
        Some(Self::new(file as u8, row as u8))
    }

    /// Parses a coordinate such as `e4`.
    ///
    /// The index of a square is `(8 - rank) * 8 + file`.
    ///
    /// # Example
    /// ```
    /// # use plyboard::Square;
    /// assert_eq!(Square::from_coordinate("c4").unwrap(), Square::C4);
    /// assert_eq!(Square::from_coordinate("a8").unwrap().index(), 0);
    /// assert!(Square::from_coordinate("z0").is_err());
    /// ```
    pub fn from_coordinate(s: &str) -> Result<Self, NotationError> {
        match s.as_bytes() {
            &[file @ b'a'..=b'h', rank @ b'1'..=b'8'] => {
                Ok(Self::new(file - b'a', 8 - (rank - b'0')))
            }
            _ => Err(NotationError::Malformed(s.to_string())),
        }
    }

    /// Converts this [`Square`] to coordinate notation, such as `e4`.
    #[inline(always)]
    pub fn to_coordinate(self) -> String {
        format!("{}{}", self.file_char(), self.rank_char())
    }
}

impl FromStr for Square {
    type Err = NotationError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_coordinate(s)
    }
}

impl<T> Index<Square> for [T; Square::COUNT] {
    type Output = T;
    #[inline(always)]
    fn index(&self, index: Square) -> &Self::Output {
        &self[index.index()]
    }
}

impl<T> IndexMut<Square> for [T; Square::COUNT] {
    #[inline(always)]
    fn index_mut(&mut self, index: Square) -> &mut Self::Output {
        &mut self[index.index()]
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

impl fmt::Debug for Square {
    /// Displays the coordinate and the internal index.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self, self.0)
    }
}
