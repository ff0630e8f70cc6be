/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fs, path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::{rngs::StdRng, SeedableRng};

use crate::{perft, splitperft, ChessBoard, PgnGame, PolyglotBook, FEN_STARTPOS};

/// Command-line arguments of the `plyboard` binary.
#[derive(Debug, Clone, Parser)]
#[command(version, about, rename_all = "lower")]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// A single task for the binary to perform.
#[derive(Debug, Clone, Subcommand)]
#[command(rename_all = "lower")]
pub enum CliCommand {
    /// Performs a perft on the position at the supplied depth, printing total node count.
    Perft {
        depth: usize,

        /// Position to start from.
        #[arg(short, long, default_value = FEN_STARTPOS)]
        fen: String,
    },

    /// Performs a split perft on the position at the supplied depth.
    #[command(alias = "sperft")]
    Splitperft {
        depth: usize,

        /// Position to start from.
        #[arg(short, long, default_value = FEN_STARTPOS)]
        fen: String,
    },

    /// Shows all legal moves in the position, in SAN and coordinate notation.
    Moves {
        /// Position to list moves for.
        #[arg(short, long, default_value = FEN_STARTPOS)]
        fen: String,

        /// If set, moves will be sorted by their SAN.
        ///
        /// By default, moves are listed in generation order.
        #[arg(short, long, default_value = "false")]
        sort: bool,
    },

    /// Reads a PGN file, reports where the game ended, and writes it back out.
    Pgn { path: PathBuf },

    /// Probes a Polyglot opening book for a position.
    Book {
        path: PathBuf,

        /// Position to look up.
        #[arg(short, long, default_value = FEN_STARTPOS)]
        fen: String,

        /// Seed for the move choice. Without one, every probe may pick differently.
        #[arg(long)]
        seed: Option<u64>,

        /// Only pick among this percentage of the position's entries, counted in book order.
        #[arg(short, long, default_value = "100")]
        top_percent: usize,
    },
}

impl CliCommand {
    /// Executes this command, printing its output to stdout.
    pub fn run(&self) -> Result<()> {
        match self {
            Self::Perft { depth, fen } => {
                let mut board = parse_fen(fen)?;
                print_perft(*depth, || perft(&mut board, *depth));
            }

            Self::Splitperft { depth, fen } => {
                let mut board = parse_fen(fen)?;
                print_perft(*depth, || splitperft(&mut board, *depth));
            }

            Self::Moves { fen, sort } => {
                let mut board = parse_fen(fen)?;

                let mut moves = Vec::new();
                for mv in board.legal_moves() {
                    let mut after = board.clone();
                    if after.check_make_move(mv.as_move()) {
                        let san = after
                            .history()
                            .last()
                            .map(|hist| hist.san.clone())
                            .unwrap_or_default();
                        moves.push((san, mv.as_move().to_coordinate()));
                    }
                }
                if *sort {
                    moves.sort();
                }

                for (san, coordinate) in &moves {
                    println!("{san:<8}{coordinate}");
                }
                println!("\n{} legal moves", moves.len());
            }

            Self::Pgn { path } => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let game = PgnGame::parse(&text)
                    .with_context(|| format!("Failed to parse {}", path.display()))?;

                println!("FEN: {}", game.board.fen());
                println!("Result: {}", game.board.result);
                println!("Moves: {}\n", game.board.history().len());
                print!("{game}");
            }

            Self::Book {
                path,
                fen,
                seed,
                top_percent,
            } => {
                let board = parse_fen(fen)?;
                let book = PolyglotBook::load(path)
                    .with_context(|| format!("Failed to load book {}", path.display()))?
                    .with_top_percent(*top_percent);

                let entries = book.search(board.key().inner());
                println!("{} entries for {}", entries.len(), board.key());
                for entry in entries {
                    println!("{:<8}{}", entry.decode_move(&board).to_coordinate(), entry.weight);
                }

                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(*seed),
                    None => StdRng::from_rng(&mut rand::rng()),
                };
                match book.probe(&board, &mut rng) {
                    Some(mv) => println!("\nbookmove {mv}"),
                    None => println!("\nbookmove (none)"),
                }
            }
        }

        Ok(())
    }
}

fn parse_fen(fen: &str) -> Result<ChessBoard> {
    ChessBoard::from_fen(fen).with_context(|| format!("Invalid FEN {fen:?}"))
}

/// Runs `count`, then prints its node count and speed.
fn print_perft(depth: usize, count: impl FnOnce() -> u64) {
    let now = Instant::now();
    let nodes = count();
    let elapsed = now.elapsed();

    let nps = nodes as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
    println!(
        "\nPerft({depth}): {nodes} nodes in {elapsed:.2?} ({:.2} Mnps)",
        nps / 1_000_000.0
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["plyboard", "perft", "3"]).unwrap();
        assert!(matches!(
            cli.command,
            CliCommand::Perft { depth: 3, ref fen } if fen == FEN_STARTPOS
        ));

        let cli = Cli::try_parse_from(["plyboard", "sperft", "2", "--fen", "8/8/8/8/8/8/8/K1k5 w - - 0 1"])
            .unwrap();
        assert!(matches!(cli.command, CliCommand::Splitperft { depth: 2, .. }));

        let cli =
            Cli::try_parse_from(["plyboard", "book", "book.bin", "--seed", "7", "-t", "50"]).unwrap();
        assert!(matches!(
            cli.command,
            CliCommand::Book { seed: Some(7), top_percent: 50, .. }
        ));
    }

    #[test]
    fn test_bad_fen_is_reported() {
        let cmd = CliCommand::Moves {
            fen: String::from("not a fen"),
            sort: false,
        };
        let err = cmd.run().unwrap_err();
        assert!(err.to_string().contains("Invalid FEN"));
    }

    #[test]
    fn test_missing_book_is_reported() {
        let cmd = CliCommand::Book {
            path: PathBuf::from("/nonexistent/plyboard/book.bin"),
            fen: String::from(FEN_STARTPOS),
            seed: Some(1),
            top_percent: 100,
        };
        assert!(cmd.run().is_err());
    }
}
