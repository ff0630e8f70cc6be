/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::BTreeMap;

use plyboard::{
    write_pgn, ChessBoard, GameResult, PgnError, PgnGame, ReasonType, ResultType,
};

/// Morphy vs. Duke Karl / Count Isouard, Paris 1858.
const OPERA_GAME: &str = "1. e4 e5 2. Nf3 d6 3. d4 Bg4 4. dxe5 Bxf3 5. Qxf3 dxe5 6. Bc4 Nf6 \
    7. Qb3 Qe7 8. Nc3 c6 9. Bg5 b5 10. Nxb5 cxb5 11. Bxb5+ Nbd7 12. O-O-O Rd8 \
    13. Rxd7 Rxd7 14. Rd1 Qe6 15. Bxd7+ Nxd7 16. Qb8+ Nxb8 17. Rd8#";

fn opera_game() -> ChessBoard {
    let mut board = ChessBoard::new();
    board.from_move_list(OPERA_GAME).unwrap();
    board
}

#[test]
fn test_movetext_round_trip() {
    let mut board = opera_game();
    assert_eq!(board.history().len(), 33);
    assert_eq!(board.to_move_list_string(0), OPERA_GAME);
    assert_eq!(
        board.rule(),
        GameResult::new(ResultType::Win, ReasonType::Mate)
    );
}

#[test]
fn test_san_round_trip_over_a_game() {
    let game = opera_game();
    let mut replay = ChessBoard::new();

    for hist in game.history() {
        let mv = replay.move_from_san(&hist.san).unwrap();
        assert_eq!(mv, hist.mv.as_move(), "{}", hist.san);
        assert!(replay.check_make_move(mv));
        assert_eq!(replay.history().last().unwrap().san, hist.san);
    }
    assert_eq!(replay.key(), game.key());
}

#[test]
fn test_fen_round_trip_over_a_game() {
    let mut board = ChessBoard::new();
    let game = opera_game();

    for hist in game.history() {
        assert!(board.check_make_move(hist.mv.as_move()));

        let copy = ChessBoard::from_fen(&board.fen()).unwrap();
        assert_eq!(copy.fen(), board.fen());
        assert_eq!(copy.key(), board.key(), "{}", board.fen());
        assert_eq!(copy.pieces(), board.pieces());
    }
}

#[test]
fn test_take_back_whole_game() {
    let mut board = opera_game();
    while board.take_back().is_some() {}
    assert_eq!(board, ChessBoard::new());
}

#[test]
fn test_en_passant_and_promotion_movetext() {
    let movetext = "1. e4 d5 2. e5 f5 3. exf6 e6 4. fxg7 Ke7 5. gxh8=Q";
    let mut board = ChessBoard::new();
    board.from_move_list(movetext).unwrap();

    assert_eq!(board.to_move_list_string(0), movetext);
    assert_eq!(
        board.fen(),
        "rnbq1bnQ/ppp1k2p/4p3/3p4/8/8/PPPP1PPP/RNBQKBNR b KQ - 0 5"
    );
}

#[test]
fn test_polyglot_keys_along_games() {
    let key_after = |movetext: &str| {
        let mut board = ChessBoard::new();
        board.from_move_list(movetext).unwrap();
        board.key().inner()
    };

    assert_eq!(key_after("1. e4 d5 2. e5 f5"), 0x22a48b5a8e47ff78);
    assert_eq!(key_after("1. e4 d5 2. e5 f5 3. Ke2"), 0x652a607ca3f242c1);
    assert_eq!(key_after("1. e4 d5 2. e5 f5 3. Ke2 Kf7"), 0x00fdd303c946bdd9);
    assert_eq!(key_after("1. a4 b5 2. h4 b4 3. c4"), 0x3c8123ea7b067637);
    assert_eq!(key_after("1. a4 b5 2. h4 b4 3. c4 bxc3 4. Ra3"), 0x5c3f9b829b279560);
}

#[test]
fn test_pgn_round_trip() {
    let text = format!(
        "[Event \"Paris\"]\n[Site \"Paris FRA\"]\n[Date \"1858.??.??\"]\n[Round \"?\"]\n\
         [White \"Paul Morphy\"]\n[Black \"Duke Karl / Count Isouard\"]\n[Result \"1-0\"]\n\
         [ECO \"C41\"]\n\n{OPERA_GAME} 1-0\n"
    );

    let game = PgnGame::parse(&text).unwrap();
    assert_eq!(game.header("eco"), Some("C41"));
    assert_eq!(game.board.result.reason, ReasonType::Mate);

    let written = game.to_pgn();
    assert!(written.starts_with("[Event \"Paris\"]\n[Site \"Paris FRA\"]\n"));
    assert!(written.contains("[Result \"1-0\"]\n[ECO \"C41\"]\n\n1. e4 e5 2. Nf3 d6 3. d4 Bg4 4. dxe5 Bxf3\n"));
    assert!(written.ends_with("17. Rd8# 1-0\n"));

    let reread = PgnGame::parse(&written).unwrap();
    assert_eq!(reread.board.fen(), game.board.fen());
    assert_eq!(reread.board.history(), game.board.history());
    assert_eq!(reread.headers, game.headers);
}

#[test]
fn test_pgn_round_trip_keeps_annotations() {
    let mut board = ChessBoard::new();
    board
        .from_move_list("1. d4 {0.25/22 3100 5400000; main line} Nf6 {-0.18/21 2950} 2. c4 {book}")
        .unwrap();

    let pgn = write_pgn(&board, &BTreeMap::new());
    let game = PgnGame::parse(&pgn).unwrap();

    assert_eq!(game.board.history(), board.history());
    assert_eq!(game.board.history()[0].comment, "main line");
    assert_eq!(game.board.history()[1].analysis.score, -18);
    assert_eq!(game.board.history()[2].comment, "book");
    assert_eq!(game.header("White"), Some("?"));
}

#[test]
fn test_pgn_from_position() {
    let fen = "8/8/8/4k3/8/8/4PK2/8 w - - 0 40";
    let text = format!("[FEN \"{fen}\"]\n[SetUp \"1\"]\n\n40. e4 Kd4 41. Kf3 *\n");
    let game = PgnGame::parse(&text).unwrap();

    assert_eq!(game.board.start_fen(), Some(fen));
    assert_eq!(game.board.to_move_list_string(0), "40. e4 Kd4 41. Kf3");
    assert_eq!(
        game.board.uci_position(),
        format!("position fen {fen} moves e2e4 e5d4 f2f3")
    );

    let reread = PgnGame::parse(&game.to_pgn()).unwrap();
    assert_eq!(reread.board, game.board);
}

#[test]
fn test_pgn_errors_name_the_ply() {
    let err = PgnGame::parse("1. e4 e5 2. Nf3 Nc6 3. Bb5 Nf6 4. O-O-O").unwrap_err();
    assert!(matches!(err, PgnError::Move { ply: 7, .. }), "{err}");
}
