/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// PGN movetext, engine annotations in comments, and whole PGN games.
mod pgn;

/// Reading moves written in Standard Algebraic Notation.
mod san;

pub use pgn::*;
