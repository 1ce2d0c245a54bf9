#![allow(clippy::cast_possible_truncation)]

use crate::{
    piece::Piece,
    rng::XorShiftState,
    squares::{Square, BOARD_N_CELLS, BOARD_N_SQUARES},
};

/// Implements a C-style for loop, for use in const fn.
#[macro_export]
macro_rules! cfor {
    ($init: stmt; $cond: expr; $step: expr; $body: block) => {
        {
            $init
            #[allow(while_true)]
            while $cond {
                $body;

                $step;
            }
        }
    }
}

const fn init_hash_keys() -> ([[u64; 64]; 13], [u64; 64], [u64; 16], u64) {
    let mut state = XorShiftState::new();
    // row 0 is the empty "piece" and is never hashed, but generating it keeps
    // the indexing direct.
    let mut piece_keys = [[0; 64]; 13];
    cfor!(let mut index = 0; index < 13; index += 1; {
        cfor!(let mut sq = 0; sq < 64; sq += 1; {
            let key;
            (key, state) = state.next_self();
            piece_keys[index][sq] = key;
        });
    });
    let mut ep_keys = [0; 64];
    cfor!(let mut sq = 0; sq < 64; sq += 1; {
        let key;
        (key, state) = state.next_self();
        ep_keys[sq] = key;
    });
    let mut castle_keys = [0; 16];
    cfor!(let mut index = 0; index < 16; index += 1; {
        let key;
        (key, state) = state.next_self();
        castle_keys[index] = key;
    });
    let key;
    (key, _) = state.next_self();
    let side_key = key;
    (piece_keys, ep_keys, castle_keys, side_key)
}

pub static PIECE_KEYS: [[u64; 64]; 13] = init_hash_keys().0;
pub static EP_KEYS: [u64; 64] = init_hash_keys().1;
pub static CASTLE_KEYS: [u64; 16] = init_hash_keys().2;
pub const SIDE_KEY: u64 = init_hash_keys().3;

/// Castling permission revocation masks, indexed by 120-cell. Any move that
/// touches a cell ANDs the rights with its mask, so rook and king departures
/// (or rook captures) silently revoke the relevant rights.
pub static CASTLE_PERM_MASKS: [u8; BOARD_N_CELLS] = init_castle_perm_masks();

const fn init_castle_perm_masks() -> [u8; BOARD_N_CELLS] {
    let mut masks = [0b1111; BOARD_N_CELLS];
    masks[Square::A1.index()] = 0b1101;
    masks[Square::E1.index()] = 0b1100;
    masks[Square::H1.index()] = 0b1110;
    masks[Square::A8.index()] = 0b0111;
    masks[Square::E8.index()] = 0b0011;
    masks[Square::H8.index()] = 0b1011;
    masks
}

const FILE_A_BB: u64 = 0x0101_0101_0101_0101;

const fn file_bb(file: u8) -> u64 {
    FILE_A_BB << file
}

/// `ISOLATED_BB_MASKS[sq]` covers the files adjacent to the pawn's file;
/// no friendly pawn there means the pawn is isolated.
pub static ISOLATED_BB_MASKS: [u64; BOARD_N_SQUARES] = init_pawn_masks().0;

/// `PASSED_BB_MASKS[colour][sq]` covers the pawn's file and both adjacent
/// files, on every rank in front of the pawn from its colour's perspective.
pub static PASSED_BB_MASKS: [[u64; BOARD_N_SQUARES]; 2] = {
    let masks = init_pawn_masks();
    [masks.1, masks.2]
};

const fn init_pawn_masks() -> (
    [u64; BOARD_N_SQUARES],
    [u64; BOARD_N_SQUARES],
    [u64; BOARD_N_SQUARES],
) {
    let mut isolated = [0; BOARD_N_SQUARES];
    let mut white_passed = [0; BOARD_N_SQUARES];
    let mut black_passed = [0; BOARD_N_SQUARES];
    cfor!(let mut sq = 0; sq < BOARD_N_SQUARES; sq += 1; {
        let file = (sq % 8) as i32;
        let rank = (sq / 8) as i32;
        cfor!(let mut f = file - 1; f <= file + 1; f += 1; {
            if f >= 0 && f < 8 {
                if f != file {
                    isolated[sq] |= file_bb(f as u8);
                }
                cfor!(let mut r = rank + 1; r < 8; r += 1; {
                    white_passed[sq] |= 1 << (r * 8 + f);
                });
                cfor!(let mut r = rank - 1; r >= 0; r -= 1; {
                    black_passed[sq] |= 1 << (r * 8 + f);
                });
            }
        });
    });
    (isolated, white_passed, black_passed)
}

pub fn piece_key(piece: Piece, sq: Square) -> u64 {
    PIECE_KEYS[piece.index()][sq.index64()]
}

mod tests {
    #[test]
    fn all_piece_keys_different() {
        use crate::lookups::PIECE_KEYS;
        let mut hashkeys = PIECE_KEYS.iter().flat_map(|&k| k).collect::<Vec<u64>>();
        hashkeys.sort_unstable();
        let len_before = hashkeys.len();
        hashkeys.dedup();
        let len_after = hashkeys.len();
        assert_eq!(len_before, len_after);
    }

    #[test]
    fn all_castle_keys_different() {
        use crate::lookups::CASTLE_KEYS;
        let mut hashkeys = CASTLE_KEYS.to_vec();
        hashkeys.sort_unstable();
        let len_before = hashkeys.len();
        hashkeys.dedup();
        let len_after = hashkeys.len();
        assert_eq!(len_before, len_after);
    }

    #[test]
    fn castle_masks_revoke_expected_rights() {
        use super::CASTLE_PERM_MASKS;
        use crate::squares::Square;
        assert_eq!(CASTLE_PERM_MASKS[Square::E1.index()], 0b1100);
        assert_eq!(CASTLE_PERM_MASKS[Square::E8.index()], 0b0011);
        assert_eq!(CASTLE_PERM_MASKS[Square::A1.index()], 0b1101);
        assert_eq!(CASTLE_PERM_MASKS[Square::H8.index()], 0b1011);
        assert_eq!(CASTLE_PERM_MASKS[Square::from_64(35).index()], 0b1111);
    }

    #[test]
    fn passed_masks_cover_front_span() {
        use super::PASSED_BB_MASKS;
        use crate::squares::Square;
        // white pawn on e4: e5..e8, d5..d8, f5..f8.
        let mask = PASSED_BB_MASKS[0][Square::from_file_rank(4, 3).index64()];
        assert_eq!(mask.count_ones(), 12);
        assert!(mask & (1 << Square::from_file_rank(4, 4).index64()) != 0);
        assert!(mask & (1 << Square::from_file_rank(4, 2).index64()) == 0);
        assert!(mask & (1 << Square::from_file_rank(6, 5).index64()) == 0);
    }
}
