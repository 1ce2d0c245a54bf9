use crate::{
    board::Board,
    lookups::{ISOLATED_BB_MASKS, PASSED_BB_MASKS},
    piece::{Colour, Piece},
};

/// Indexed by `Piece`, in centipawns.
pub const PIECE_VALUES: [i32; Piece::N_PIECES] = [
    0, 100, 325, 325, 550, 1000, 50000, 100, 325, 325, 550, 1000, 50000,
];

pub const PAWN_VALUE: i32 = PIECE_VALUES[1];

/// A bound on any score the evaluation can produce; mates are scored
/// relative to it.
pub const INFINITY: i32 = 32_001;
pub const MATE_SCORE: i32 = 32_000;
pub const MAX_DEPTH: usize = 128;
pub const DRAW_SCORE: i32 = 0;

/// Being mated in `ply` halfmoves, from the perspective of the victim.
pub const fn mated_in(ply: usize) -> i32 {
    -MATE_SCORE + ply as i32
}

/// Giving mate in `ply` halfmoves.
pub const fn mate_in(ply: usize) -> i32 {
    MATE_SCORE - ply as i32
}

pub const fn is_mate_score(score: i32) -> bool {
    score.unsigned_abs() as i32 >= MATE_SCORE - MAX_DEPTH as i32
}

const BISHOP_PAIR_BONUS: i32 = 30;
const ISOLATED_PAWN_MALUS: i32 = 10;
/// Passed pawn bonus by rank from the pawn's own perspective.
const PASSED_PAWN_BONUS: [i32; 8] = [0, 5, 10, 20, 35, 60, 100, 0];

impl Board {
    /// A static evaluation of the position from the point of view of the
    /// side to move. Material and piece placement carry most of the weight;
    /// the pawn bitboards answer the structural questions.
    pub fn evaluate(&self) -> i32 {
        if self.is_material_draw() {
            return DRAW_SCORE;
        }

        let mut score = self.material[0] - self.material[1] + self.pst[0] - self.pst[1];

        if self.piece_counts[Piece::WB.index()] >= 2 {
            score += BISHOP_PAIR_BONUS;
        }
        if self.piece_counts[Piece::BB.index()] >= 2 {
            score -= BISHOP_PAIR_BONUS;
        }

        score += self.pawn_structure_term(Colour::WHITE);
        score -= self.pawn_structure_term(Colour::BLACK);

        if self.side == Colour::WHITE {
            score
        } else {
            -score
        }
    }

    fn pawn_structure_term(&self, side: Colour) -> i32 {
        let us = self.pawns[side.index()];
        let them = self.pawns[side.flip().index()];
        let mut term = 0;
        let pawn = Piece::new(side, crate::piece::PieceType::PAWN);
        for entry in 0..self.piece_counts[pawn.index()] {
            let sq = self.piece_lists[pawn.index()][entry as usize];
            let sq64 = sq.index64();
            if us & ISOLATED_BB_MASKS[sq64] == 0 {
                term -= ISOLATED_PAWN_MALUS;
            }
            if them & PASSED_BB_MASKS[side.index()][sq64] == 0 {
                let relative_rank = if side == Colour::WHITE {
                    sq.rank()
                } else {
                    7 - sq.rank()
                };
                term += PASSED_PAWN_BONUS[relative_rank as usize];
            }
        }
        term
    }

    /// Neither side can possibly deliver mate: bare kings, or king and one
    /// minor piece against at most a minor.
    pub fn is_material_draw(&self) -> bool {
        self.pawns[2] == 0
            && self.major_piece_counts[0] == 1
            && self.major_piece_counts[1] == 1
            && self.minor_piece_counts[0] <= 1
            && self.minor_piece_counts[1] <= 1
    }

}

mod tests {
    #[test]
    fn startpos_is_balanced() {
        use crate::board::Board;
        let board = Board::starting_position();
        assert_eq!(board.evaluate(), 0);
    }

    #[test]
    fn evaluation_is_symmetric() {
        use crate::board::Board;
        // the same position with colours reversed must score the same for
        // the respective side to move.
        let white = Board::from_fen("4k3/8/8/8/8/8/PPP5/4K3 w - - 0 1").unwrap();
        let black = Board::from_fen("4k3/ppp5/8/8/8/8/8/4K3 b - - 0 1").unwrap();
        assert_eq!(white.evaluate(), black.evaluate());
        assert!(white.evaluate() > 0);
    }

    #[test]
    fn passed_pawns_are_rewarded() {
        use crate::board::Board;
        let passed = Board::from_fen("4k3/8/8/3P4/8/8/8/4K3 w - - 0 1").unwrap();
        let blocked = Board::from_fen("4k3/3p4/8/3P4/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(passed.evaluate() > blocked.evaluate());
    }

    #[test]
    fn bare_kings_are_drawn() {
        use crate::board::Board;
        let board = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(board.is_material_draw());
        assert_eq!(board.evaluate(), 0);
        let board = Board::from_fen("4k3/8/8/8/8/8/8/4KB2 w - - 0 1").unwrap();
        assert!(board.is_material_draw());
        let board = Board::from_fen("4k3/8/8/8/8/8/8/3QK3 w - - 0 1").unwrap();
        assert!(!board.is_material_draw());
    }

    #[test]
    fn mate_score_helpers() {
        use super::{is_mate_score, mate_in, mated_in, MATE_SCORE};
        assert_eq!(mate_in(3), MATE_SCORE - 3);
        assert_eq!(mated_in(3), -MATE_SCORE + 3);
        assert!(is_mate_score(mate_in(40)));
        assert!(is_mate_score(mated_in(40)));
        assert!(!is_mate_score(250));
    }
}
