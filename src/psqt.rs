use crate::{cfor, piece::Piece, squares::Square};

#[rustfmt::skip]
const PAWN_TABLE: [i32; 64] = [
     0,   0,   0,   0,   0,   0,   0,   0,
    10,  10,   0, -10, -10,   0,  10,  10,
     5,   0,   0,   5,   5,   0,   0,   5,
     0,   0,  10,  20,  20,  10,   0,   0,
     5,   5,   5,  10,  10,   5,   5,   5,
    10,  10,  10,  20,  20,  10,  10,  10,
    20,  20,  20,  30,  30,  20,  20,  20,
     0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const KNIGHT_TABLE: [i32; 64] = [
     0, -10,   0,   0,   0,   0, -10,   0,
     0,   0,   0,   5,   5,   0,   0,   0,
     0,   0,  10,  10,  10,  10,   0,   0,
     0,   0,  10,  20,  20,  10,   5,   0,
     5,  10,  15,  20,  20,  15,  10,   5,
     5,  10,  10,  20,  20,  10,  10,   5,
     0,   0,   5,  10,  10,   5,   0,   0,
     0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const BISHOP_TABLE: [i32; 64] = [
     0,   0, -10,   0,   0, -10,   0,   0,
     0,   0,   0,  10,  10,   0,   0,   0,
     0,   0,  10,  15,  15,  10,   0,   0,
     0,  10,  15,  20,  20,  15,  10,   0,
     0,  10,  15,  20,  20,  15,  10,   0,
     0,   0,  10,  15,  15,  10,   0,   0,
     0,   0,   0,  10,  10,   0,   0,   0,
     0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const ROOK_TABLE: [i32; 64] = [
     0,   0,   5,  10,  10,   5,   0,   0,
     0,   0,   5,  10,  10,   5,   0,   0,
     0,   0,   5,  10,  10,   5,   0,   0,
     0,   0,   5,  10,  10,   5,   0,   0,
     0,   0,   5,  10,  10,   5,   0,   0,
     0,   0,   5,  10,  10,   5,   0,   0,
    25,  25,  25,  25,  25,  25,  25,  25,
     0,   0,   5,  10,  10,   5,   0,   0,
];

#[rustfmt::skip]
const QUEEN_TABLE: [i32; 64] = [
    -5,   0,   0,   0,   0,   0,   0,  -5,
     0,   0,   5,   5,   5,   5,   0,   0,
     0,   5,   5,   5,   5,   5,   5,   0,
     0,   5,   5,  10,  10,   5,   5,   0,
     0,   5,   5,  10,  10,   5,   5,   0,
     0,   5,   5,   5,   5,   5,   5,   0,
     0,   0,   5,   5,   5,   5,   0,   0,
    -5,   0,   0,   0,   0,   0,   0,  -5,
];

#[rustfmt::skip]
const KING_TABLE: [i32; 64] = [
     0,   5,   5, -10, -10,   0,  10,   5,
   -10, -10, -10, -10, -10, -10, -10, -10,
   -30, -30, -30, -30, -30, -30, -30, -30,
   -50, -50, -50, -50, -50, -50, -50, -50,
   -50, -50, -50, -50, -50, -50, -50, -50,
   -50, -50, -50, -50, -50, -50, -50, -50,
   -50, -50, -50, -50, -50, -50, -50, -50,
   -50, -50, -50, -50, -50, -50, -50, -50,
];

/// Tables indexed by `[piece][sq64]`, black entries mirrored by rank so both
/// colours read their own table from their own perspective.
static PSQT: [[i32; 64]; Piece::N_PIECES] = init_psqt();

const fn init_psqt() -> [[i32; 64]; Piece::N_PIECES] {
    let base = [
        PAWN_TABLE,
        KNIGHT_TABLE,
        BISHOP_TABLE,
        ROOK_TABLE,
        QUEEN_TABLE,
        KING_TABLE,
    ];
    let mut out = [[0; 64]; Piece::N_PIECES];
    cfor!(let mut pt = 0; pt < 6; pt += 1; {
        cfor!(let mut sq = 0; sq < 64; sq += 1; {
            out[pt + 1][sq] = base[pt][sq];
            out[pt + 7][sq] = base[pt][sq ^ 56];
        });
    });
    out
}

pub fn psqt_value(piece: Piece, sq: Square) -> i32 {
    PSQT[piece.index()][sq.index64()]
}

mod tests {
    #[test]
    fn tables_are_mirrored() {
        use super::psqt_value;
        use crate::{piece::Piece, squares::Square};
        for sq64 in 0..64u8 {
            let sq = Square::from_64(sq64);
            let mirrored = Square::from_64(sq64 ^ 56);
            assert_eq!(psqt_value(Piece::WP, sq), psqt_value(Piece::BP, mirrored));
            assert_eq!(psqt_value(Piece::WK, sq), psqt_value(Piece::BK, mirrored));
        }
    }

    #[test]
    fn central_knights_beat_rim_knights() {
        use super::psqt_value;
        use crate::{piece::Piece, squares::Square};
        let central = psqt_value(Piece::WN, Square::from_file_rank(4, 3));
        let rim = psqt_value(Piece::WN, Square::from_file_rank(0, 3));
        assert!(central > rim);
    }
}
