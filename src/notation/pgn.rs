/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{collections::BTreeMap, fmt, str::FromStr};

use log::warn;

use crate::{
    ChessBoard, EngineScore, GameResult, History, PgnError, ReasonType, ResultType,
    PGN_MOVES_PER_LINE,
};

/// Tags every exported game carries, in order, with the value used when a tag is missing.
const SEVEN_TAG_ROSTER: [(&str, &str); 7] = [
    ("Event", "?"),
    ("Site", "?"),
    ("Date", "????.??.??"),
    ("Round", "?"),
    ("White", "?"),
    ("Black", "?"),
    ("Result", "*"),
];

/// Result tokens that may end the movetext. `1-0` and `1/2-1/2` never reach the move scanner.
const RESULT_TOKENS: [&str; 1] = ["0-1"];

/// What the movetext scanner is in the middle of.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Scan {
    None,
    Move,
    EvalSymbol,
    Comment,
    Variation,
    Counter,
}

/// Movetext split into move tokens, with each comment keyed by the number of moves before it.
#[derive(Debug, Default)]
struct Movetext {
    moves: Vec<String>,
    comments: BTreeMap<usize, String>,
}

impl Movetext {
    fn push_move(&mut self, token: &mut String) -> Result<(), PgnError> {
        let token = std::mem::take(token);
        if RESULT_TOKENS.contains(&token.as_str()) {
            return Ok(());
        }
        if !(2..=8).contains(&token.chars().count()) {
            return Err(PgnError::Token(token));
        }
        self.moves.push(token);
        Ok(())
    }

    fn push_comment(&mut self, comment: &str) {
        let comment = comment.trim();
        if comment.is_empty() {
            return;
        }
        self.comments
            .entry(self.moves.len())
            .and_modify(|existing| {
                existing.push(' ');
                existing.push_str(comment);
            })
            .or_insert_with(|| comment.to_string());
    }

    /// Scans movetext one character at a time.
    ///
    /// Move numbers, evaluation glyphs and `$` codes are dropped, and variations are skipped
    /// whole, however deeply nested.
    fn scan(text: &str) -> Result<Self, PgnError> {
        let chars = text.chars().collect::<Vec<_>>();
        let mut movetext = Self::default();

        let mut state = Scan::None;
        let mut level = 0usize;
        let mut token = String::new();
        let mut comment = String::new();
        let mut prev = '\0';

        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            i += 1;

            match state {
                Scan::None => {
                    // Castling written with zeros looks like a move number until the dash
                    let zero_castling = c == '0' && chars.get(i) == Some(&'-');
                    if c.is_alphabetic() || zero_castling {
                        token.push(c);
                        state = Scan::Move;
                    } else if c == '!' || c == '?' {
                        state = Scan::EvalSymbol;
                    } else if c == '{' {
                        comment.clear();
                        state = Scan::Comment;
                    } else if c == '(' {
                        level = 1;
                        state = Scan::Variation;
                    } else if c.is_ascii_digit() {
                        state = Scan::Counter;
                    }
                }

                Scan::Move => {
                    let castling_dash = c == '-' && matches!(prev, 'O' | '0');
                    if c.is_alphanumeric() || matches!(c, '=' | '+' | '#') || castling_dash {
                        token.push(c);
                    } else {
                        movetext.push_move(&mut token)?;
                        i -= 1;
                        state = Scan::None;
                    }
                }

                Scan::EvalSymbol => {
                    if c != '!' && c != '?' {
                        i -= 1;
                        state = Scan::None;
                    }
                }

                Scan::Comment => {
                    if c == '}' {
                        movetext.push_comment(&comment);
                        comment.clear();
                        state = Scan::None;
                    } else {
                        comment.push(c);
                    }
                }

                Scan::Variation => {
                    if c == '(' {
                        level += 1;
                    } else if c == ')' {
                        level -= 1;
                        if level == 0 {
                            state = Scan::None;
                        }
                    }
                }

                Scan::Counter => {
                    if !c.is_alphanumeric() {
                        if c != '.' && c != ')' {
                            i -= 1;
                        }
                        state = Scan::None;
                    }
                }
            }

            prev = c;
        }

        match state {
            Scan::Move => movetext.push_move(&mut token)?,
            Scan::Comment => movetext.push_comment(&comment),
            _ => {}
        }

        Ok(movetext)
    }
}

impl ChessBoard {
    /// Plays the moves of a PGN movetext from the current position.
    ///
    /// Moves may be written in SAN or coordinate notation. A comment following a move is attached to
    /// that move's history record, with any engine analysis it starts with split off by [`parse_comment`].
    ///
    /// On error, the moves before the failing token stay on the board.
    ///
    /// # Example
    /// ```
    /// # use plyboard::*;
    /// let mut board = ChessBoard::new();
    /// board.from_move_list("1. e4 {0.30/16 820} e5 2. Nf3 (2. f4 exf4) Nc6! *").unwrap();
    /// assert_eq!(board.history().len(), 4);
    /// assert_eq!(board.history()[0].analysis.depth, 16);
    /// ```
    pub fn from_move_list(&mut self, text: &str) -> Result<(), PgnError> {
        let movetext = Movetext::scan(text)?;

        for (i, token) in movetext.moves.iter().enumerate() {
            if let Err(source) = self.play(token) {
                warn!(
                    "Stopped reading movetext at {token:?} in {}: {source}",
                    self.fen()
                );
                return Err(PgnError::Move {
                    ply: i + 1,
                    token: token.clone(),
                    source,
                });
            }

            if let Some(comment) = movetext.comments.get(&(i + 1)) {
                let (analysis, comment) = parse_comment(comment);
                if let Some(hist) = self.history_mut().last_mut() {
                    hist.analysis = analysis;
                    hist.comment = comment;
                }
            }
        }

        Ok(())
    }

    /// Writes the game's moves as PGN movetext, starting a new line every `items_per_line` moves.
    ///
    /// A game that starts with Black to move opens with `N...`. Analysis and comments are written
    /// back in braces in the form [`parse_comment`] reads.
    ///
    /// `items_per_line` of `0` writes everything on one line.
    ///
    /// # Example
    /// ```
    /// # use plyboard::*;
    /// let mut board = ChessBoard::new();
    /// board.from_move_list("1. d4 d5 2. c4 {queen's gambit} e6").unwrap();
    /// assert_eq!(board.to_move_list_string(0), "1. d4 d5 2. c4 {queen's gambit} e6");
    /// ```
    pub fn to_move_list_string(&self, items_per_line: usize) -> String {
        let history = self.history();
        let black_moves = history
            .iter()
            .filter(|hist| hist.mv.piece.side.is_black())
            .count();
        let mut fullmove = self.fullmove().saturating_sub(black_moves).max(1);

        let mut text = String::new();
        for (i, hist) in history.iter().enumerate() {
            if i > 0 {
                let line_full = items_per_line > 0 && i % items_per_line == 0;
                text.push(if line_full { '\n' } else { ' ' });
            }

            let side = hist.mv.piece.side;
            if side.is_white() {
                text.push_str(&format!("{fullmove}. "));
            } else if i == 0 {
                text.push_str(&format!("{fullmove}... "));
            }
            text.push_str(&hist.san);

            if let Some(comment) = comment_text(hist) {
                text.push_str(&format!(" {{{comment}}}"));
            }

            if side.is_black() {
                fullmove += 1;
            }
        }
        text
    }
}

/// The text to put between braces after a move, if it has anything attached.
fn comment_text(hist: &History) -> Option<String> {
    match (hist.analysis.is_empty(), hist.comment.is_empty()) {
        (true, true) => None,
        (false, true) => Some(hist.analysis.to_string()),
        (true, false) => Some(hist.comment.clone()),
        (false, false) => Some(format!("{}; {}", hist.analysis, hist.comment)),
    }
}

/// Splits a move comment into engine analysis and free text.
///
/// The analysis is `score/depth time [nodes]` and/or a `win/draw/loss` triplet, optionally followed
/// by `;` and free text. Scores are in pawns (`+0.35`, `-1.20`) or mate distances (`M5`, `-M3`).
/// A comment that does not start with analysis is returned whole as free text.
///
/// # Example
/// ```
/// # use plyboard::*;
/// let (analysis, comment) = parse_comment("+0.35/20 1500 123456 300/600/100; only move");
/// assert_eq!(analysis.score, 35);
/// assert_eq!((analysis.depth, analysis.elapsed, analysis.nodes), (20, 1500, 123456));
/// assert_eq!((analysis.win, analysis.draw, analysis.loss), (300, 600, 100));
/// assert_eq!(comment, "only move");
///
/// let (analysis, comment) = parse_comment("a fine move");
/// assert!(analysis.is_empty());
/// assert_eq!(comment, "a fine move");
/// ```
pub fn parse_comment(text: &str) -> (EngineScore, String) {
    let text = text.trim();
    let (head, tail) = match text.split_once(';') {
        Some((head, tail)) => (head, tail.trim()),
        None => (text, ""),
    };

    match parse_analysis(head) {
        Some(analysis) => (analysis, tail.to_string()),
        None => (EngineScore::default(), text.to_string()),
    }
}

/// Reads text made only of analysis tokens.
fn parse_analysis(text: &str) -> Option<EngineScore> {
    let mut tokens = text.split_whitespace().collect::<Vec<_>>();
    let mut analysis = EngineScore::default();

    if let Some((i, [win, draw, loss])) = tokens
        .iter()
        .enumerate()
        .find_map(|(i, token)| parse_wdl(token).map(|wdl| (i, wdl)))
    {
        (analysis.win, analysis.draw, analysis.loss) = (win, draw, loss);
        tokens.remove(i);
    }

    match tokens.as_slice() {
        [] => {}
        [score_depth, elapsed, rest @ ..] if rest.len() <= 1 => {
            let (score, mating, depth) = parse_score_depth(score_depth)?;
            analysis.score = score;
            analysis.mating = mating;
            analysis.depth = depth;
            analysis.elapsed = elapsed.parse().ok()?;
            if let [nodes] = rest {
                analysis.nodes = nodes.parse().ok()?;
            }
        }
        _ => return None,
    }

    (!analysis.is_empty()).then_some(analysis)
}

/// Parses `score/depth`, returning the score, whether it is a mate distance, and the depth.
fn parse_score_depth(token: &str) -> Option<(i32, bool, u32)> {
    let (score, depth) = token.split_once('/')?;
    let depth = depth.parse().ok()?;

    let (negative, magnitude) = match score.strip_prefix('-') {
        Some(magnitude) => (true, magnitude),
        None => (false, score.strip_prefix('+').unwrap_or(score)),
    };
    let sign = if negative { -1 } else { 1 };

    if let Some(moves) = magnitude.strip_prefix('M') {
        let moves: i32 = moves.parse().ok()?;
        return Some((sign * moves, true, depth));
    }

    if !magnitude.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let pawns: f64 = magnitude.parse().ok()?;
    if !pawns.is_finite() {
        return None;
    }
    Some((sign * (pawns * 100.0).round() as i32, false, depth))
}

/// Parses `win/draw/loss`.
fn parse_wdl(token: &str) -> Option<[u32; 3]> {
    let mut parts = token.split('/');
    let wdl = [
        parts.next()?.parse().ok()?,
        parts.next()?.parse().ok()?,
        parts.next()?.parse().ok()?,
    ];
    parts.next().is_none().then_some(wdl)
}

/// A game read from PGN: its tags and the board with every move played.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PgnGame {
    /// Tag pairs as written. Look them up with [`PgnGame::header`] to ignore case.
    pub headers: BTreeMap<String, String>,
    pub board: ChessBoard,
}

impl PgnGame {
    /// Parses a single PGN game.
    ///
    /// The `FEN` tag, when present and non-empty, sets the starting position. The result is the one
    /// the rules find at the end of the game, unless the `Result` tag declares a different one.
    ///
    /// # Example
    /// ```
    /// # use plyboard::*;
    /// let game = PgnGame::parse("[White \"Anna\"]\n\n1. f3 e5 2. g4 Qh4# 0-1\n").unwrap();
    /// assert_eq!(game.header("white"), Some("Anna"));
    /// assert_eq!(game.board.result, GameResult::new(ResultType::Loss, ReasonType::Mate));
    /// ```
    pub fn parse(text: &str) -> Result<Self, PgnError> {
        let mut headers = BTreeMap::new();
        let mut movetext = String::new();

        for line in text.lines() {
            let line = line.trim();
            if line.starts_with('[') {
                if let Some((key, value)) = parse_header_line(line) {
                    headers.retain(|existing: &String, _| !existing.eq_ignore_ascii_case(&key));
                    headers.insert(key, value);
                }
            } else {
                movetext.push(' ');
                movetext.push_str(line);
            }
        }

        let mut board = match find_tag(&headers, "fen").map(str::trim) {
            Some(fen) if !fen.is_empty() => ChessBoard::from_fen(fen)?,
            _ => ChessBoard::new(),
        };
        board.from_move_list(&movetext)?;

        let declared = find_tag(&headers, "result").map_or(ResultType::None, ResultType::from_pgn);
        let detected = board.rule();
        if declared != ResultType::None && declared != detected.result {
            board.result = GameResult::new(declared, ReasonType::None);
        }

        Ok(Self { headers, board })
    }

    /// Looks up a tag by name, ignoring case.
    #[inline(always)]
    pub fn header(&self, key: &str) -> Option<&str> {
        find_tag(&self.headers, key)
    }

    /// Writes this game back out as PGN.
    #[inline(always)]
    pub fn to_pgn(&self) -> String {
        write_pgn(&self.board, &self.headers)
    }
}

impl FromStr for PgnGame {
    type Err = PgnError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PgnGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_pgn())
    }
}

fn find_tag<'a>(headers: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(key))
        .map(|(_, value)| value.as_str())
}

/// Reads a `[Key "Value"]` line. Lines with an empty key or value are skipped.
fn parse_header_line(line: &str) -> Option<(String, String)> {
    let inner = line.strip_prefix('[')?.trim_end().strip_suffix(']')?;
    let (key, quoted) = inner.split_once('"')?;
    let (value, _) = quoted.rsplit_once('"')?;

    let key = key.trim();
    let value = value.replace("\\\"", "\"").replace("\\\\", "\\");
    (!key.is_empty() && !value.is_empty()).then(|| (key.to_string(), value))
}

fn escape_tag_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Exports `board`'s game as PGN.
///
/// The Seven Tag Roster comes first, taking values from `headers` (matched ignoring case) or the
/// PGN placeholders. `Result` always reflects [`ChessBoard::result`]. Games that did not start from
/// the standard position get `FEN` and `SetUp` tags. Any other tags follow, then the movetext.
///
/// # Example
/// ```
/// # use plyboard::*;
/// # use std::collections::BTreeMap;
/// let mut board = ChessBoard::new();
/// board.from_move_list("1. e4 e5").unwrap();
///
/// let headers = BTreeMap::from([(String::from("Event"), String::from("Club night"))]);
/// let pgn = write_pgn(&board, &headers);
/// assert!(pgn.starts_with("[Event \"Club night\"]\n[Site \"?\"]\n"));
/// assert!(pgn.ends_with("\n\n1. e4 e5 *\n"));
/// ```
pub fn write_pgn(board: &ChessBoard, headers: &BTreeMap<String, String>) -> String {
    let mut pgn = String::new();
    for (tag, default) in SEVEN_TAG_ROSTER {
        let value = match tag {
            "Result" => board.result.to_short_string(),
            _ => find_tag(headers, tag).unwrap_or(default),
        };
        pgn.push_str(&format!("[{tag} \"{}\"]\n", escape_tag_value(value)));
    }

    if let Some(fen) = board.start_fen() {
        pgn.push_str(&format!("[FEN \"{fen}\"]\n[SetUp \"1\"]\n"));
    }

    let is_extra = |name: &str| {
        !SEVEN_TAG_ROSTER
            .iter()
            .map(|(tag, _)| *tag)
            .chain(["FEN", "SetUp"])
            .any(|tag| tag.eq_ignore_ascii_case(name))
    };
    for (name, value) in headers.iter().filter(|(name, _)| is_extra(name)) {
        pgn.push_str(&format!("[{name} \"{}\"]\n", escape_tag_value(value)));
    }

    pgn.push('\n');
    pgn.push_str(&board.to_move_list_string(PGN_MOVES_PER_LINE));

    let moves = board.history().len();
    if moves > 0 {
        pgn.push(if moves % PGN_MOVES_PER_LINE == 0 { '\n' } else { ' ' });
    }
    pgn.push_str(board.result.to_short_string());
    pgn.push('\n');

    pgn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NotationError;

    #[test]
    fn test_scan_skips_counters_glyphs_and_variations() {
        let movetext = Movetext::scan(
            "1. e4 {best by test} e5 2. Nf3 (2. f4 exf4 (2... d5)) Nc6!? 3. Bb5 $1 a6 1-0",
        )
        .unwrap();

        assert_eq!(movetext.moves, ["e4", "e5", "Nf3", "Nc6", "Bb5", "a6"]);
        assert_eq!(movetext.comments.len(), 1);
        assert_eq!(movetext.comments[&1], "best by test");
    }

    #[test]
    fn test_scan_merges_comments_on_the_same_move() {
        let movetext = Movetext::scan("{opening} 1. e4 {first} {second} e5").unwrap();
        assert_eq!(movetext.comments[&0], "opening");
        assert_eq!(movetext.comments[&1], "first second");
    }

    #[test]
    fn test_scan_castling_and_results() {
        let movetext = Movetext::scan("4. O-O O-O-O 5. 0-0 0-0-0 0-1").unwrap();
        assert_eq!(movetext.moves, ["O-O", "O-O-O", "0-0", "0-0-0"]);

        let movetext = Movetext::scan("1. d4 d5 1/2-1/2").unwrap();
        assert_eq!(movetext.moves, ["d4", "d5"]);
    }

    #[test]
    fn test_scan_rejects_bad_tokens() {
        assert!(matches!(
            Movetext::scan("1. e4 Nabcdefghij"),
            Err(PgnError::Token(token)) if token == "Nabcdefghij"
        ));
        assert!(matches!(
            Movetext::scan("1. e e5"),
            Err(PgnError::Token(token)) if token == "e"
        ));
    }

    #[test]
    fn test_parse_comment_forms() {
        let (analysis, comment) = parse_comment("M5/30 2000");
        assert!(analysis.mating);
        assert_eq!((analysis.score, analysis.depth, analysis.elapsed), (5, 30, 2000));
        assert!(comment.is_empty());

        let (analysis, _) = parse_comment("-M3/12 40 9000");
        assert_eq!((analysis.score, analysis.nodes), (-3, 9000));

        let (analysis, comment) = parse_comment("-1.25/18 900");
        assert_eq!(analysis.score, -125);
        assert!(!analysis.mating);
        assert!(comment.is_empty());

        let (analysis, comment) = parse_comment("10/80/10");
        assert!(!analysis.has_search());
        assert_eq!((analysis.win, analysis.draw, analysis.loss), (10, 80, 10));
        assert!(comment.is_empty());

        let (analysis, comment) = parse_comment("White resigns; too early");
        assert!(analysis.is_empty());
        assert_eq!(comment, "White resigns; too early");

        let (analysis, comment) = parse_comment("3 ideas here");
        assert!(analysis.is_empty());
        assert_eq!(comment, "3 ideas here");
    }

    #[test]
    fn test_comments_attach_to_moves() {
        let mut board = ChessBoard::new();
        board
            .from_move_list(
                "1. e4 {+0.35/20 1500 123456; book} e5 {-0.20/18 900} \
                 2. Nf3 {300/600/100} Nc6 {M5/30 2000} *",
            )
            .unwrap();

        let history = board.history();
        assert_eq!(history[0].analysis.score, 35);
        assert_eq!(history[0].analysis.nodes, 123456);
        assert_eq!(history[0].comment, "book");
        assert_eq!(history[1].analysis.score, -20);
        assert_eq!(history[2].analysis.win, 300);
        assert!(history[3].analysis.mating);

        assert_eq!(
            board.to_move_list_string(0),
            "1. e4 {0.35/20 1500 123456; book} e5 {-0.20/18 900} \
             2. Nf3 {300/600/100} Nc6 {M5/30 2000}"
        );
    }

    #[test]
    fn test_move_list_layout() {
        let mut board = ChessBoard::new();
        board.from_move_list("e4 e5 Nf3 Nc6 Bb5").unwrap();
        assert_eq!(
            board.to_move_list_string(2),
            "1. e4 e5\n2. Nf3 Nc6\n3. Bb5"
        );

        let mut board = ChessBoard::from_fen(
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1",
        )
        .unwrap();
        board.from_move_list("c5 Nf3 d6").unwrap();
        assert_eq!(board.to_move_list_string(0), "1... c5 2. Nf3 d6");
    }

    #[test]
    fn test_from_move_list_reports_failing_ply() {
        let mut board = ChessBoard::new();
        let err = board.from_move_list("1. e4 e5 2. Ke3").unwrap_err();
        assert!(matches!(
            err,
            PgnError::Move { ply: 3, ref token, source: NotationError::NoMatchingMove(_) } if token == "Ke3"
        ));
        assert_eq!(board.history().len(), 2);
    }

    #[test]
    fn test_parse_game_with_tags() {
        let text = "[Event \"Casual\"]\n\
                    [Site \"Here\"]\n\
                    [White \"Alice\"]\n\
                    [Black \"Bob\"]\n\
                    [Result \"0-1\"]\n\
                    \n\
                    1. f3 e5 2. g4 Qh4# 0-1\n";
        let game: PgnGame = text.parse().unwrap();

        assert_eq!(game.header("EVENT"), Some("Casual"));
        assert_eq!(game.header("Annotator"), None);
        assert_eq!(
            game.board.result,
            GameResult::new(ResultType::Loss, ReasonType::Mate)
        );

        assert_eq!(
            game.to_pgn(),
            "[Event \"Casual\"]\n\
             [Site \"Here\"]\n\
             [Date \"????.??.??\"]\n\
             [Round \"?\"]\n\
             [White \"Alice\"]\n\
             [Black \"Bob\"]\n\
             [Result \"0-1\"]\n\
             \n\
             1. f3 e5 2. g4 Qh4# 0-1\n"
        );
    }

    #[test]
    fn test_parse_game_from_fen_tag() {
        let text = "[FEN \"4k3/8/8/8/8/8/4P3/4K3 w - - 0 1\"]\n\
                    [SetUp \"1\"]\n\
                    [ECO \"A00\"]\n\
                    1. e4 Kd7 *";
        let game = PgnGame::parse(text).unwrap();
        assert_eq!(game.board.start_fen(), Some("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1"));
        assert!(game.board.result.is_none());

        let pgn = game.to_pgn();
        assert!(pgn.contains(
            "[Result \"*\"]\n[FEN \"4k3/8/8/8/8/8/4P3/4K3 w - - 0 1\"]\n[SetUp \"1\"]\n[ECO \"A00\"]\n\n"
        ));
        assert!(pgn.ends_with("1. e4 Kd7 *\n"));
    }

    #[test]
    fn test_declared_result_overrides() {
        let game = PgnGame::parse("[Result \"1-0\"]\n1. e4 e5").unwrap();
        assert_eq!(game.board.result, GameResult::new(ResultType::Win, ReasonType::None));
    }

    #[test]
    fn test_parse_game_errors() {
        assert!(matches!(
            PgnGame::parse("[FEN \"8/8/8/8/8/8/8/8 w - - 0 1\"]\n1. e4"),
            Err(PgnError::Fen(_))
        ));
        assert!(matches!(
            PgnGame::parse("1. e4 e5 2. Qxf7"),
            Err(PgnError::Move { ply: 3, .. })
        ));
    }

    #[test]
    fn test_tag_escapes() {
        let (key, value) = parse_header_line(r#"[Event "The \"Big\" One"]"#).unwrap();
        assert_eq!(key, "Event");
        assert_eq!(value, "The \"Big\" One");
        assert_eq!(escape_tag_value(&value), r#"The \"Big\" One"#);

        assert_eq!(parse_header_line("[Event \"\"]"), None);
        assert_eq!(parse_header_line("[Event"), None);
    }
}
