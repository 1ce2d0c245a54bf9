#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

//! Umbra, a UCI chess engine.

mod attack;
mod bench;
mod board;
mod chessmove;
mod cli;
mod errors;
mod evaluation;
mod history;
mod lookups;
mod makemove;
mod movegen;
mod movepicker;
mod perft;
mod piece;
mod psqt;
mod pv;
mod rng;
mod search;
mod searchinfo;
mod squares;
mod timemgmt;
mod transpositiontable;
mod uci;

fn main() -> anyhow::Result<()> {
    #[cfg(debug_assertions)]
    std::env::set_var("RUST_BACKTRACE", "1");

    if std::env::args_os().len() == 1 {
        // fast path to UCI:
        uci::main_loop();
        return Ok(());
    }

    let cli = <cli::Cli as clap::Parser>::parse();

    match cli.subcommand {
        Some(cli::Subcommands::Perft) => perft::gamut(),
        Some(cli::Subcommands::Divide { fen, depth }) => {
            let mut pos = board::Board::from_fen(&fen)?;
            perft::divide(&mut pos, depth);
        }
        Some(cli::Subcommands::Bench) => bench::benchmark(),
        None => uci::main_loop(),
    }
    Ok(())
}
