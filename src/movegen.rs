use arrayvec::ArrayVec;

use crate::{
    board::{castling, Board},
    chessmove::Move,
    piece::{Colour, Piece, PieceType},
    squares::{Square, RANK_2, RANK_7},
};

/// Maximum number of pseudo-legal moves a chess position can have.
pub const MAX_POSITION_MOVES: usize = 218;

#[derive(Clone, Copy)]
pub struct MoveListEntry {
    pub mov: Move,
    pub score: i32,
}

pub struct MoveList {
    inner: ArrayVec<MoveListEntry, MAX_POSITION_MOVES>,
}

impl MoveList {
    pub fn new() -> Self {
        Self {
            inner: ArrayVec::new(),
        }
    }

    pub fn push(&mut self, mov: Move) {
        self.inner.push(MoveListEntry { mov, score: 0 });
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MoveListEntry> {
        self.inner.iter()
    }

    pub fn entries_mut(&mut self) -> &mut [MoveListEntry] {
        &mut self.inner
    }

    pub fn moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.inner.iter().map(|entry| entry.mov)
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

const fn pawn_forward(side: Colour) -> i8 {
    if matches!(side, Colour::WHITE) {
        10
    } else {
        -10
    }
}

const fn pawn_promo_from_rank(side: Colour) -> u8 {
    if matches!(side, Colour::WHITE) {
        RANK_7
    } else {
        RANK_2
    }
}

const fn pawn_start_rank(side: Colour) -> u8 {
    if matches!(side, Colour::WHITE) {
        RANK_2
    } else {
        RANK_7
    }
}

impl Board {
    /// Generates all pseudo-legal moves. Moves that leave the king in check
    /// are weeded out when `make_move` refuses them.
    pub fn generate_moves(&self, move_list: &mut MoveList) {
        #[cfg(debug_assertions)]
        self.check_validity();

        self.generate_pawn_moves::<false>(move_list);
        self.generate_jumper_moves::<false>(PieceType::KNIGHT, move_list);
        self.generate_jumper_moves::<false>(PieceType::KING, move_list);
        self.generate_slider_moves::<false>(move_list);
        self.generate_castling_moves(move_list);
    }

    /// Generates captures, promotions and en passant only, for quiescence.
    pub fn generate_captures(&self, move_list: &mut MoveList) {
        #[cfg(debug_assertions)]
        self.check_validity();

        self.generate_pawn_moves::<true>(move_list);
        self.generate_jumper_moves::<true>(PieceType::KNIGHT, move_list);
        self.generate_jumper_moves::<true>(PieceType::KING, move_list);
        self.generate_slider_moves::<true>(move_list);
    }

    fn add_pawn_move(
        &self,
        from: Square,
        to: Square,
        capture: Piece,
        move_list: &mut MoveList,
    ) {
        let side = self.side;
        if from.rank() == pawn_promo_from_rank(side) {
            for promo in [
                PieceType::QUEEN,
                PieceType::KNIGHT,
                PieceType::ROOK,
                PieceType::BISHOP,
            ] {
                move_list.push(Move::new(from, to, capture, Piece::new(side, promo), 0));
            }
        } else {
            move_list.push(Move::new(from, to, capture, Piece::EMPTY, 0));
        }
    }

    fn generate_pawn_moves<const CAPTURES_ONLY: bool>(&self, move_list: &mut MoveList) {
        let side = self.side;
        let pawn = Piece::new(side, PieceType::PAWN);
        let forward = pawn_forward(side);

        for entry in 0..self.piece_counts[pawn.index()] {
            let sq = self.piece_lists[pawn.index()][entry as usize];
            debug_assert!(sq.on_board());

            // forward pushes; in captures-only mode just the promotions.
            let dest = sq.offset(forward);
            if self.pieces[dest.index()].is_empty()
                && (!CAPTURES_ONLY || sq.rank() == pawn_promo_from_rank(side))
            {
                self.add_pawn_move(sq, dest, Piece::EMPTY, move_list);
                if !CAPTURES_ONLY && sq.rank() == pawn_start_rank(side) {
                    let double = dest.offset(forward);
                    if self.pieces[double.index()].is_empty() {
                        move_list.push(Move::new(
                            sq,
                            double,
                            Piece::EMPTY,
                            Piece::EMPTY,
                            Move::PAWN_START_FLAG,
                        ));
                    }
                }
            }

            for dir in [forward - 1, forward + 1] {
                let dest = sq.offset(dir);
                let target = self.pieces[dest.index()];
                if target.is_piece() && target.colour() != side {
                    self.add_pawn_move(sq, dest, target, move_list);
                }
                if Some(dest) == self.ep_sq {
                    move_list.push(Move::new(
                        sq,
                        dest,
                        Piece::EMPTY,
                        Piece::EMPTY,
                        Move::EP_FLAG,
                    ));
                }
            }
        }
    }

    fn generate_jumper_moves<const CAPTURES_ONLY: bool>(
        &self,
        piece_type: PieceType,
        move_list: &mut MoveList,
    ) {
        let side = self.side;
        let piece = Piece::new(side, piece_type);

        for entry in 0..self.piece_counts[piece.index()] {
            let sq = self.piece_lists[piece.index()][entry as usize];
            debug_assert!(sq.on_board());

            for &dir in piece_type.directions() {
                let dest = sq.offset(dir);
                let target = self.pieces[dest.index()];
                if target.is_off_board() {
                    continue;
                }
                if target.is_piece() {
                    if target.colour() != side {
                        move_list.push(Move::new(sq, dest, target, Piece::EMPTY, 0));
                    }
                } else if !CAPTURES_ONLY {
                    move_list.push(Move::new(sq, dest, Piece::EMPTY, Piece::EMPTY, 0));
                }
            }
        }
    }

    fn generate_slider_moves<const CAPTURES_ONLY: bool>(&self, move_list: &mut MoveList) {
        let side = self.side;
        for piece_type in [PieceType::BISHOP, PieceType::ROOK, PieceType::QUEEN] {
            let piece = Piece::new(side, piece_type);

            for entry in 0..self.piece_counts[piece.index()] {
                let sq = self.piece_lists[piece.index()][entry as usize];
                debug_assert!(sq.on_board());

                for &dir in piece_type.directions() {
                    let mut dest = sq.offset(dir);
                    let mut target = self.pieces[dest.index()];
                    while !target.is_off_board() {
                        if target.is_piece() {
                            if target.colour() != side {
                                move_list.push(Move::new(sq, dest, target, Piece::EMPTY, 0));
                            }
                            break;
                        }
                        if !CAPTURES_ONLY {
                            move_list.push(Move::new(sq, dest, Piece::EMPTY, Piece::EMPTY, 0));
                        }
                        dest = dest.offset(dir);
                        target = self.pieces[dest.index()];
                    }
                }
            }
        }
    }

    /// Castling needs the transit square to be safe and the path empty; the
    /// arrival square is vetted like any other move by `make_move`.
    fn generate_castling_moves(&self, move_list: &mut MoveList) {
        let empty = |sq: Square| self.pieces[sq.index()].is_empty();
        if self.side == Colour::WHITE {
            if self.castle_perm & castling::WK != 0
                && empty(Square::F1)
                && empty(Square::G1)
                && !self.sq_attacked(Square::E1, Colour::BLACK)
                && !self.sq_attacked(Square::F1, Colour::BLACK)
            {
                move_list.push(Move::new(
                    Square::E1,
                    Square::G1,
                    Piece::EMPTY,
                    Piece::EMPTY,
                    Move::CASTLE_FLAG,
                ));
            }
            if self.castle_perm & castling::WQ != 0
                && empty(Square::D1)
                && empty(Square::C1)
                && empty(Square::B1)
                && !self.sq_attacked(Square::E1, Colour::BLACK)
                && !self.sq_attacked(Square::D1, Colour::BLACK)
            {
                move_list.push(Move::new(
                    Square::E1,
                    Square::C1,
                    Piece::EMPTY,
                    Piece::EMPTY,
                    Move::CASTLE_FLAG,
                ));
            }
        } else {
            if self.castle_perm & castling::BK != 0
                && empty(Square::F8)
                && empty(Square::G8)
                && !self.sq_attacked(Square::E8, Colour::WHITE)
                && !self.sq_attacked(Square::F8, Colour::WHITE)
            {
                move_list.push(Move::new(
                    Square::E8,
                    Square::G8,
                    Piece::EMPTY,
                    Piece::EMPTY,
                    Move::CASTLE_FLAG,
                ));
            }
            if self.castle_perm & castling::BQ != 0
                && empty(Square::D8)
                && empty(Square::C8)
                && empty(Square::B8)
                && !self.sq_attacked(Square::E8, Colour::WHITE)
                && !self.sq_attacked(Square::D8, Colour::WHITE)
            {
                move_list.push(Move::new(
                    Square::E8,
                    Square::C8,
                    Piece::EMPTY,
                    Piece::EMPTY,
                    Move::CASTLE_FLAG,
                ));
            }
        }
    }

    /// The number of legal moves in the position, via trial make/unmake.
    pub fn count_legal_moves(&mut self) -> usize {
        let mut list = MoveList::new();
        self.generate_moves(&mut list);
        let mut count = 0;
        for entry in &list.inner {
            if self.make_move(entry.mov) {
                count += 1;
                self.unmake_move();
            }
        }
        count
    }
}

mod tests {
    #[test]
    fn startpos_has_twenty_moves() {
        use super::MoveList;
        use crate::board::Board;
        let board = Board::starting_position();
        let mut list = MoveList::new();
        board.generate_moves(&mut list);
        assert_eq!(list.len(), 20);
    }

    #[test]
    fn captures_only_is_a_subset() {
        use super::MoveList;
        use crate::board::Board;
        let board =
            Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
                .unwrap();
        let mut all = MoveList::new();
        let mut caps = MoveList::new();
        board.generate_moves(&mut all);
        board.generate_captures(&mut caps);
        assert!(caps.len() < all.len());
        for m in caps.moves() {
            assert!(m.is_capture() || m.is_promo());
            assert!(all.moves().any(|other| other == m));
        }
    }

    #[test]
    fn promotions_generate_all_four_pieces() {
        use super::MoveList;
        use crate::board::Board;
        let board = Board::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let mut list = MoveList::new();
        board.generate_moves(&mut list);
        let promos = list.moves().filter(|m| m.is_promo()).count();
        assert_eq!(promos, 4);
    }

    #[test]
    fn castling_blocked_through_check() {
        use super::MoveList;
        use crate::board::Board;
        // the black rook on f8 covers f1, so white may not castle kingside.
        let board = Board::from_fen("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let mut list = MoveList::new();
        board.generate_moves(&mut list);
        let castles: Vec<String> = list
            .moves()
            .filter(|m| m.is_castle())
            .map(|m| m.to_string())
            .collect();
        assert_eq!(castles, vec!["e1c1".to_string()]);
    }
}
