use crate::{board::Board, movegen::MoveList};

/// Counts the leaf nodes of the legal move tree to `depth`. The standard
/// cross-check for the move generator and make/unmake.
pub fn perft(pos: &mut Board, depth: usize) -> u64 {
    #[cfg(debug_assertions)]
    pos.check_validity();

    if depth == 0 {
        return 1;
    }

    let mut ml = MoveList::new();
    pos.generate_moves(&mut ml);

    let mut count = 0;
    for m in ml.moves() {
        if !pos.make_move(m) {
            continue;
        }
        count += perft(pos, depth - 1);
        pos.unmake_move();
    }

    count
}

/// Perft with a per-root-move breakdown, for bisecting a disagreement with
/// a reference engine.
pub fn divide(pos: &mut Board, depth: usize) -> u64 {
    let mut ml = MoveList::new();
    pos.generate_moves(&mut ml);

    let mut total = 0;
    for m in ml.moves() {
        if !pos.make_move(m) {
            continue;
        }
        let count = perft(pos, depth.saturating_sub(1));
        pos.unmake_move();
        println!("{m}: {count}");
        total += count;
    }
    println!("total: {total}");
    total
}

/// fen, then (depth, node count) pairs.
const PERFT_SUITE: &[(&str, &[(usize, u64)])] = &[
    (
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        &[
            (1, 20),
            (2, 400),
            (3, 8_902),
            (4, 197_281),
            (5, 4_865_609),
            (6, 119_060_324),
        ],
    ),
    (
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        &[(1, 48), (2, 2_039), (3, 97_862), (4, 4_085_603)],
    ),
    (
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        &[(1, 14), (2, 191), (3, 2_812), (4, 43_238), (5, 674_624)],
    ),
    (
        "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        &[(1, 6), (2, 264), (3, 9_467), (4, 422_333)],
    ),
    (
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        &[(1, 44), (2, 1_486), (3, 62_379), (4, 2_103_487)],
    ),
    (
        "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
        &[(1, 46), (2, 2_079), (3, 89_890), (4, 3_894_594)],
    ),
];

/// Runs the whole suite, skipping entries too big for a debug build.
pub fn gamut() {
    #[cfg(debug_assertions)]
    const NODES_LIMIT: u64 = 60_000;
    #[cfg(not(debug_assertions))]
    const NODES_LIMIT: u64 = 150_000_000;

    let mut pos = Board::new();
    for &(fen, expectations) in PERFT_SUITE {
        pos.set_from_fen(fen).expect("malformed fen in the perft suite");
        for &(depth, nodes) in expectations {
            if nodes > NODES_LIMIT {
                println!("skipping depth {depth} for {fen}");
                break;
            }
            let counted = perft(&mut pos, depth);
            assert!(
                counted == nodes,
                "FAIL: fen {fen}, depth {depth}: expected {nodes}, got {counted}"
            );
            println!("PASS: fen {fen}, depth {depth}: {nodes}");
        }
    }
    println!("all perft positions passed");
}

mod tests {
    #[test]
    fn perft_start_position() {
        use super::perft;
        use crate::board::Board;
        let mut pos = Board::starting_position();
        assert_eq!(perft(&mut pos, 1), 20);
        assert_eq!(perft(&mut pos, 2), 400);
        assert_eq!(perft(&mut pos, 3), 8_902);
    }

    #[test]
    fn perft_hard_position() {
        use super::perft;
        use crate::board::Board;
        let mut pos =
            Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
                .unwrap();
        assert_eq!(perft(&mut pos, 1), 48);
        assert_eq!(perft(&mut pos, 2), 2_039);
    }

    #[test]
    fn perft_promotion_heavy_position() {
        use super::perft;
        use crate::board::Board;
        let mut pos =
            Board::from_fen("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1")
                .unwrap();
        assert_eq!(perft(&mut pos, 1), 6);
        assert_eq!(perft(&mut pos, 2), 264);
        assert_eq!(perft(&mut pos, 3), 9_467);
    }

    #[test]
    fn perft_endgame_with_en_passant() {
        use super::perft;
        use crate::board::Board;
        let mut pos = Board::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1").unwrap();
        assert_eq!(perft(&mut pos, 1), 14);
        assert_eq!(perft(&mut pos, 2), 191);
        assert_eq!(perft(&mut pos, 3), 2_812);
    }

    #[test]
    fn divide_agrees_with_perft() {
        use super::{divide, perft};
        use crate::board::Board;
        let mut pos = Board::starting_position();
        let total = divide(&mut pos, 3);
        assert_eq!(total, perft(&mut pos, 3));
    }

    #[test]
    #[ignore = "several minutes in a debug build"]
    fn perft_start_position_deep() {
        use super::perft;
        use crate::board::Board;
        let mut pos = Board::starting_position();
        assert_eq!(perft(&mut pos, 4), 197_281);
        assert_eq!(perft(&mut pos, 5), 4_865_609);
    }
}
