use std::time::Instant;

use crate::{
    board::Board,
    history::ThreadData,
    searchinfo::SearchInfo,
    timemgmt::SearchLimit,
    transpositiontable::TT,
};

pub const BENCH_DEPTH: i32 = 10;

/// A spread of openings, middlegames and endgames. Fixed forever, so node
/// counts are comparable across revisions.
const BENCH_POSITIONS: &[&str] = &[
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
    "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
    "4rrk1/1p3qbp/p2n1p2/2NP2p1/1P1B4/3Q1R2/P5PP/5RK1 b - - 7 30",
    "r1bq1rk1/pp2bppp/2n1pn2/3p4/3P4/2N1PN2/PPQ1BPPP/R1B2RK1 w - - 4 9",
    "2rq1rk1/pb2bppp/1p2pn2/2p5/2BP4/1PN1PN2/PB3PPP/2RQ1RK1 w - - 0 12",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "6k1/5ppp/8/8/8/8/5PPP/3R2K1 w - - 0 1",
    "8/8/1p6/p1p5/P1P5/1P6/4k3/6K1 w - - 0 1",
    "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2",
    "8/3k4/8/8/3PK3/8/8/8 b - - 0 1",
];

/// Searches every bench position to a fixed depth and reports the total
/// node count and speed. The node count doubles as a smoke test: any
/// functional change to the search moves it.
pub fn benchmark() {
    #![allow(clippy::cast_possible_truncation)]
    let mut t = ThreadData::new();
    let tt = TT::with_size_mb(16);
    let start = Instant::now();
    let mut nodes = 0;

    for fen in BENCH_POSITIONS {
        let mut pos = Board::from_fen(fen).expect("malformed fen in the bench suite");
        let mut info = SearchInfo::new(SearchLimit::Depth(BENCH_DEPTH));
        info.print_to_stdout = false;
        tt.increase_age();
        let (score, best_move) = pos.search_position(&mut info, &mut t, tt.view());
        println!("{fen}: {best_move} ({score} cp, {} nodes)", info.nodes);
        nodes += info.nodes;
    }

    let millis = start.elapsed().as_millis().max(1) as u64;
    println!("{nodes} nodes {} nps", nodes * 1000 / millis);
}

mod tests {
    #[test]
    fn bench_positions_all_parse() {
        use super::BENCH_POSITIONS;
        use crate::board::Board;
        for fen in BENCH_POSITIONS {
            let pos = Board::from_fen(fen).unwrap();
            assert_eq!(&pos.fen(), fen);
        }
    }
}
