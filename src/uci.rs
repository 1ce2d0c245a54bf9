use std::{
    io::Write,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
};

use thiserror::Error;

use crate::{
    board::Board,
    errors::{FenParseError, MoveParseError},
    evaluation::{is_mate_score, MATE_SCORE},
    history::ThreadData,
    pv::PVariation,
    searchinfo::SearchInfo,
    timemgmt::{SearchLimit, TimeManager},
    transpositiontable::{Bound, TTView, DEFAULT_HASH_MB, MAX_HASH_MB, MEGABYTE, MIN_HASH_MB, TT},
};

pub const NAME: &str = concat!("umbra ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
enum UciError {
    #[error("invalid format: {0}")]
    InvalidFormat(String),
    #[error("command ended unexpectedly: {0}")]
    UnexpectedTermination(String),
    #[error("{0}")]
    Fen(#[from] FenParseError),
    #[error("{0}")]
    Move(#[from] MoveParseError),
    #[error("unknown option: {0}")]
    UnknownOption(String),
    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

// position startpos [moves ...]
// position fen <fen> [moves ...]
fn parse_position(text: &str, pos: &mut Board) -> Result<(), UciError> {
    let mut parts = text.split_ascii_whitespace();
    let command = parts
        .next()
        .ok_or_else(|| UciError::UnexpectedTermination("empty position command".into()))?;
    if command != "position" {
        return Err(UciError::InvalidFormat("expected \"position\"".into()));
    }
    let determiner = parts
        .next()
        .ok_or_else(|| UciError::UnexpectedTermination("nothing after \"position\"".into()))?;
    // build the new position off to the side; the caller's board is only
    // replaced once the whole command has been applied.
    let mut new_pos = match determiner {
        "startpos" => {
            match parts.next() {
                Some("moves") | None => {}
                Some(other) => {
                    return Err(UciError::InvalidFormat(format!(
                        "expected \"moves\" after \"startpos\", got \"{other}\""
                    )))
                }
            }
            Board::starting_position()
        }
        "fen" => {
            let mut fen = String::new();
            for part in parts.by_ref() {
                if part == "moves" {
                    break;
                }
                fen.push_str(part);
                fen.push(' ');
            }
            Board::from_fen(fen.trim_end())?
        }
        other => {
            return Err(UciError::InvalidFormat(format!(
                "unknown term after \"position\": {other}"
            )))
        }
    };
    for move_str in parts {
        let m = new_pos.parse_uci(move_str)?;
        if !new_pos.make_move(m) {
            return Err(MoveParseError::IllegalMove(move_str.to_string()).into());
        }
    }
    new_pos.set_height(0);
    *pos = new_pos;
    Ok(())
}

fn parse_number<T: std::str::FromStr>(
    parts: &mut std::str::SplitAsciiWhitespace,
    token: &str,
) -> Result<T, UciError> {
    parts
        .next()
        .ok_or_else(|| UciError::InvalidFormat(format!("nothing after \"{token}\"")))?
        .parse()
        .map_err(|_| UciError::InvalidFormat(format!("value for {token} is not a number")))
}

// go [depth D | nodes N | movetime T | infinite | wtime .. btime .. winc .. binc .. movestogo ..]
fn parse_go(text: &str, pos: &Board) -> Result<SearchLimit, UciError> {
    let mut depth: Option<i32> = None;
    let mut nodes: Option<u64> = None;
    let mut movetime: Option<u64> = None;
    let mut clock: Option<u64> = None;
    let mut inc: Option<u64> = None;
    let mut moves_to_go: Option<u64> = None;

    let mut parts = text.split_ascii_whitespace();
    let command = parts
        .next()
        .ok_or_else(|| UciError::UnexpectedTermination("empty go command".into()))?;
    if command != "go" {
        return Err(UciError::InvalidFormat("expected \"go\"".into()));
    }

    let white = pos.turn() == crate::piece::Colour::WHITE;
    while let Some(part) = parts.next() {
        match part {
            "depth" => depth = Some(parse_number(&mut parts, "depth")?),
            "nodes" => nodes = Some(parse_number(&mut parts, "nodes")?),
            "movetime" => movetime = Some(parse_number(&mut parts, "movetime")?),
            "movestogo" => moves_to_go = Some(parse_number(&mut parts, "movestogo")?),
            "wtime" if white => clock = Some(parse_number(&mut parts, "wtime")?),
            "btime" if !white => clock = Some(parse_number(&mut parts, "btime")?),
            "winc" if white => inc = Some(parse_number(&mut parts, "winc")?),
            "binc" if !white => inc = Some(parse_number(&mut parts, "binc")?),
            "wtime" | "btime" | "winc" | "binc" => {
                // the opponent's clock; consume the value and move on.
                let _: u64 = parse_number(&mut parts, part)?;
            }
            "infinite" => {}
            other => println!("info string ignoring term in go: {other}"),
        }
    }

    let limit = if let Some(movetime) = movetime {
        SearchLimit::MoveTime(movetime)
    } else if let Some(our_clock) = clock {
        SearchLimit::Dynamic {
            our_clock,
            our_inc: inc.unwrap_or(0),
            moves_to_go,
        }
    } else if let Some(nodes) = nodes {
        SearchLimit::Nodes(nodes)
    } else if let Some(depth) = depth {
        SearchLimit::Depth(depth)
    } else {
        SearchLimit::Infinite
    };
    Ok(limit)
}

// setoption name <name> [value <value>]
fn parse_setoption(text: &str, tt: &mut TT, t: &mut ThreadData) -> Result<(), UciError> {
    let mut parts = text.split_ascii_whitespace();
    parts.next(); // "setoption"
    match parts.next() {
        Some("name") => {}
        _ => {
            return Err(UciError::InvalidFormat(
                "expected \"name\" after \"setoption\"".into(),
            ))
        }
    }
    let opt_name = parts
        .next()
        .ok_or_else(|| UciError::UnexpectedTermination("no option name given".into()))?;
    match opt_name {
        "Hash" => {
            match parts.next() {
                Some("value") => {}
                _ => {
                    return Err(UciError::InvalidFormat(
                        "expected \"value\" after the option name".into(),
                    ))
                }
            }
            let mb: usize = parse_number(&mut parts, "Hash")?;
            let mb = mb.clamp(MIN_HASH_MB, MAX_HASH_MB);
            tt.resize(mb * MEGABYTE);
            Ok(())
        }
        "Clear" => {
            // "Clear Hash" arrives as two name tokens.
            if parts.next() == Some("Hash") {
                tt.clear();
                t.clear();
                Ok(())
            } else {
                Err(UciError::UnknownOption(opt_name.to_string()))
            }
        }
        _ => Err(UciError::UnknownOption(opt_name.to_string())),
    }
}

static KEEP_RUNNING: AtomicBool = AtomicBool::new(true);

fn stdin_reader() -> mpsc::Receiver<String> {
    let (sender, receiver) = mpsc::channel();
    std::thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || stdin_reader_worker(&sender))
        .expect("couldn't start the stdin reader thread");
    receiver
}

fn stdin_reader_worker(sender: &mpsc::Sender<String>) {
    let mut linebuf = String::with_capacity(128);
    while std::io::stdin().read_line(&mut linebuf).is_ok() {
        let cmd = linebuf.trim();
        if cmd.is_empty() {
            linebuf.clear();
            continue;
        }
        if sender.send(cmd.to_owned()).is_err() {
            break;
        }
        if !KEEP_RUNNING.load(Ordering::SeqCst) {
            break;
        }
        linebuf.clear();
    }
}

pub fn format_score(score: i32) -> String {
    if is_mate_score(score) {
        let plies_to_mate = MATE_SCORE - score.abs();
        let moves_to_mate = (plies_to_mate + 1) / 2;
        if score > 0 {
            format!("mate {moves_to_mate}")
        } else {
            format!("mate -{moves_to_mate}")
        }
    } else {
        format!("cp {score}")
    }
}

/// One `info` line per completed (or aborted) aspiration window.
pub fn readout_info(
    info: &SearchInfo,
    tt: TTView,
    depth: i32,
    score: i32,
    pv: &PVariation,
    bound: Bound,
) {
    #![allow(clippy::cast_possible_truncation)]
    let elapsed = info.time_manager.elapsed().as_millis() as u64;
    let nps = info.nodes * 1000 / elapsed.max(1);
    let bound_suffix = match bound {
        Bound::Upper => " upperbound",
        Bound::Lower => " lowerbound",
        _ => "",
    };
    println!(
        "info depth {depth} seldepth {} score {}{bound_suffix} nodes {} nps {nps} hashfull {} time {elapsed} pv {pv}",
        info.seldepth,
        format_score(score),
        info.nodes,
        tt.hashfull(),
    );
}

fn print_preamble() {
    println!("id name {NAME}");
    println!("id author the umbra developers");
    println!(
        "option name Hash type spin default {DEFAULT_HASH_MB} min {MIN_HASH_MB} max {MAX_HASH_MB}"
    );
    println!("option name Clear Hash type button");
    println!("uciok");
}

pub fn main_loop() {
    print_preamble();

    let mut pos = Board::starting_position();
    let mut info = SearchInfo::default();
    let mut t = ThreadData::new();
    let mut tt = TT::with_size_mb(DEFAULT_HASH_MB);

    let stdin = stdin_reader();
    info.set_stdin(&stdin);

    loop {
        std::io::stdout().flush().expect("couldn't flush stdout");
        let Ok(line) = stdin.recv() else { break };
        let input = line.trim();

        let res = match input {
            "uci" => {
                print_preamble();
                Ok(())
            }
            "isready" => {
                println!("readyok");
                Ok(())
            }
            "quit" => {
                info.quit = true;
                break;
            }
            // a stop with no search running is a no-op.
            "stop" => Ok(()),
            "ucinewgame" => {
                let res = parse_position("position startpos", &mut pos);
                t.clear();
                tt.clear();
                res
            }
            input if input.starts_with("setoption") => parse_setoption(input, &mut tt, &mut t),
            input if input.starts_with("position") => parse_position(input, &mut pos),
            input if input.starts_with("go") => match parse_go(input, &pos) {
                Ok(limit) => {
                    info.time_manager = TimeManager::new(limit);
                    tt.increase_age();
                    let (_, best_move) = pos.search_position(&mut info, &mut t, tt.view());
                    println!("bestmove {best_move}");
                    Ok(())
                }
                Err(e) => Err(e),
            },
            _ => Err(UciError::UnknownCommand(input.to_string())),
        };

        if let Err(e) = res {
            println!("info string error: {e}");
        }

        if info.quit {
            break;
        }
    }
    KEEP_RUNNING.store(false, Ordering::SeqCst);
}

mod tests {
    #[test]
    fn position_command_roundtrip() {
        use super::parse_position;
        use crate::board::Board;
        let mut pos = Board::starting_position();
        parse_position("position startpos moves e2e4 e7e5 g1f3", &mut pos).unwrap();
        assert_eq!(
            pos.fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
        );

        let mut pos = Board::starting_position();
        parse_position(
            "position fen r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            &mut pos,
        )
        .unwrap();
        assert_eq!(
            pos.fen(),
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1"
        );
    }

    #[test]
    fn position_command_rejects_garbage() {
        use super::parse_position;
        use crate::board::Board;
        let mut pos = Board::starting_position();
        assert!(parse_position("position startpos moves e2e5", &mut pos).is_err());
        assert!(parse_position("position fen not/a/fen", &mut pos).is_err());
        assert!(parse_position("position telepathy", &mut pos).is_err());
    }

    #[test]
    fn rejected_position_command_leaves_the_board_alone() {
        use super::parse_position;
        use crate::{board::Board, movegen::MoveList};
        let mut pos = Board::starting_position();
        let before = pos.fen();
        let key = pos.hashkey();

        // bad castling field, bad board field, illegal trailing move: none
        // of these may touch the current position.
        for cmd in [
            "position fen rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQxq - 0 1",
            "position fen 8/8/8/8 w - - 0 1",
            "position startpos moves e2e4 e7e5 e4e5",
        ] {
            assert!(parse_position(cmd, &mut pos).is_err());
            assert_eq!(pos.fen(), before);
            assert_eq!(pos.hashkey(), key);
            let mut list = MoveList::new();
            pos.generate_moves(&mut list);
            assert_eq!(list.len(), 20);
        }
    }

    #[test]
    fn go_command_picks_the_right_limit() {
        use super::parse_go;
        use crate::{board::Board, timemgmt::SearchLimit};
        let pos = Board::starting_position();
        assert_eq!(parse_go("go depth 8", &pos).unwrap(), SearchLimit::Depth(8));
        assert_eq!(
            parse_go("go nodes 50000", &pos).unwrap(),
            SearchLimit::Nodes(50_000)
        );
        assert_eq!(
            parse_go("go movetime 1500", &pos).unwrap(),
            SearchLimit::MoveTime(1500)
        );
        assert_eq!(parse_go("go infinite", &pos).unwrap(), SearchLimit::Infinite);
        assert_eq!(parse_go("go", &pos).unwrap(), SearchLimit::Infinite);
        // white to move reads the white clock.
        assert_eq!(
            parse_go("go wtime 60000 btime 30000 winc 1000 binc 500 movestogo 20", &pos).unwrap(),
            SearchLimit::Dynamic {
                our_clock: 60_000,
                our_inc: 1_000,
                moves_to_go: Some(20),
            }
        );
    }

    #[test]
    fn score_formatting() {
        use super::format_score;
        use crate::evaluation::{mate_in, mated_in};
        assert_eq!(format_score(25), "cp 25");
        assert_eq!(format_score(mate_in(3)), "mate 2");
        assert_eq!(format_score(mate_in(4)), "mate 2");
        assert_eq!(format_score(mated_in(3)), "mate -2");
    }
}
