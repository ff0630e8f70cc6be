/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// The rules engine: pieces, squares, moves, hashing, and the mailbox board itself.
mod board;

/// Polyglot opening book reader.
mod book;

/// Command-line interface for the `plyboard` binary.
mod cli;

/// Error types returned by the library.
mod error;

/// Text formats: SAN, PGN movetext, and PGN games.
mod notation;

/// Misc utility functions, constants, and types.
mod utils;

pub use board::*;
pub use book::*;
pub use cli::*;
pub use error::*;
pub use notation::*;
pub use utils::*;
