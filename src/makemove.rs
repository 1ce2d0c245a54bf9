use crate::{
    board::{Board, Undo},
    chessmove::Move,
    evaluation::PIECE_VALUES,
    lookups::{piece_key, CASTLE_KEYS, CASTLE_PERM_MASKS, EP_KEYS, SIDE_KEY},
    piece::{Colour, Piece, PieceType},
    psqt::psqt_value,
    squares::Square,
};

pub fn hash_piece(key: &mut u64, piece: Piece, sq: Square) {
    *key ^= piece_key(piece, sq);
}

pub fn hash_side(key: &mut u64) {
    *key ^= SIDE_KEY;
}

pub fn hash_ep(key: &mut u64, ep_sq: Square) {
    *key ^= EP_KEYS[ep_sq.index64()];
}

pub fn hash_castling(key: &mut u64, castle_perm: u8) {
    *key ^= CASTLE_KEYS[castle_perm as usize];
}

impl Board {
    fn clear_piece(&mut self, sq: Square) {
        debug_assert!(sq.on_board());
        let piece = self.pieces[sq.index()];
        debug_assert!(piece.is_piece());
        let colour = piece.colour();

        hash_piece(&mut self.key, piece, sq);

        self.pieces[sq.index()] = Piece::EMPTY;
        self.material[colour.index()] -= PIECE_VALUES[piece.index()];
        self.pst[colour.index()] -= psqt_value(piece, sq);

        if piece.is_big() {
            self.big_piece_counts[colour.index()] -= 1;
            if piece.is_major() {
                self.major_piece_counts[colour.index()] -= 1;
            } else {
                self.minor_piece_counts[colour.index()] -= 1;
            }
        } else {
            self.pawns[colour.index()] &= !(1 << sq.index64());
            self.pawns[2] &= !(1 << sq.index64());
        }

        // swap-remove from the piece list.
        let count = &mut self.piece_counts[piece.index()];
        let list = &mut self.piece_lists[piece.index()];
        let slot = list[..*count as usize]
            .iter()
            .position(|&entry| entry == sq)
            .expect("piece list out of sync with mailbox");
        *count -= 1;
        list[slot] = list[*count as usize];
    }

    fn add_piece(&mut self, sq: Square, piece: Piece) {
        debug_assert!(sq.on_board());
        debug_assert!(piece.is_piece());
        let colour = piece.colour();

        hash_piece(&mut self.key, piece, sq);

        self.pieces[sq.index()] = piece;
        self.material[colour.index()] += PIECE_VALUES[piece.index()];
        self.pst[colour.index()] += psqt_value(piece, sq);

        if piece.is_big() {
            self.big_piece_counts[colour.index()] += 1;
            if piece.is_major() {
                self.major_piece_counts[colour.index()] += 1;
            } else {
                self.minor_piece_counts[colour.index()] += 1;
            }
        } else {
            self.pawns[colour.index()] |= 1 << sq.index64();
            self.pawns[2] |= 1 << sq.index64();
        }

        self.piece_lists[piece.index()][self.piece_counts[piece.index()] as usize] = sq;
        self.piece_counts[piece.index()] += 1;
    }

    fn move_piece(&mut self, from: Square, to: Square) {
        debug_assert!(from.on_board() && to.on_board());
        let piece = self.pieces[from.index()];
        debug_assert!(piece.is_piece());
        let colour = piece.colour();

        hash_piece(&mut self.key, piece, from);
        hash_piece(&mut self.key, piece, to);

        self.pieces[from.index()] = Piece::EMPTY;
        self.pieces[to.index()] = piece;
        self.pst[colour.index()] += psqt_value(piece, to) - psqt_value(piece, from);

        if !piece.is_big() {
            self.pawns[colour.index()] &= !(1 << from.index64());
            self.pawns[2] &= !(1 << from.index64());
            self.pawns[colour.index()] |= 1 << to.index64();
            self.pawns[2] |= 1 << to.index64();
        }

        let count = self.piece_counts[piece.index()] as usize;
        let slot = self.piece_lists[piece.index()][..count]
            .iter()
            .position(|&entry| entry == from)
            .expect("piece list out of sync with mailbox");
        self.piece_lists[piece.index()][slot] = to;
    }

    /// Applies a pseudo-legal move. Returns `false` and leaves the position
    /// untouched if the move would leave our own king attacked.
    pub fn make_move(&mut self, m: Move) -> bool {
        #[cfg(debug_assertions)]
        self.check_validity();

        let from = m.from();
        let to = m.to();
        let side = self.side;
        let piece = self.pieces[from.index()];

        debug_assert!(from.on_board() && to.on_board());
        debug_assert!(piece.is_piece());

        let saved_key = self.key;

        if m.is_ep() {
            // the captured pawn sits behind the arrival square.
            let behind = if side == Colour::WHITE { -10 } else { 10 };
            self.clear_piece(to.offset(behind));
        } else if m.is_castle() {
            match to {
                Square::C1 => self.move_piece(Square::A1, Square::D1),
                Square::C8 => self.move_piece(Square::A8, Square::D8),
                Square::G1 => self.move_piece(Square::H1, Square::F1),
                Square::G8 => self.move_piece(Square::H8, Square::F8),
                _ => unreachable!("invalid castle move"),
            }
        }

        if let Some(ep_sq) = self.ep_sq {
            hash_ep(&mut self.key, ep_sq);
        }
        // hash out the castling rights, to reinsert them once updated.
        hash_castling(&mut self.key, self.castle_perm);

        self.history.push(Undo {
            m,
            castle_perm: self.castle_perm,
            ep_square: self.ep_sq,
            fifty_move_counter: self.fifty_move_counter,
            position_key: saved_key,
        });

        self.castle_perm &= CASTLE_PERM_MASKS[from.index()];
        self.castle_perm &= CASTLE_PERM_MASKS[to.index()];
        self.ep_sq = None;

        hash_castling(&mut self.key, self.castle_perm);

        self.fifty_move_counter += 1;

        let captured = m.capture();
        if captured.is_piece() {
            self.clear_piece(to);
            self.fifty_move_counter = 0;
        }

        self.ply += 1;
        self.height += 1;

        if piece.piece_type() == PieceType::PAWN {
            self.fifty_move_counter = 0;
            if m.is_pawn_start() {
                let forward = if side == Colour::WHITE { 10 } else { -10 };
                let ep_sq = from.offset(forward);
                self.ep_sq = Some(ep_sq);
                hash_ep(&mut self.key, ep_sq);
            }
        }

        self.move_piece(from, to);

        let promoted = m.promotion();
        if promoted.is_piece() {
            debug_assert!(promoted.piece_type().legal_promo());
            self.clear_piece(to);
            self.add_piece(to, promoted);
        }

        if piece.piece_type() == PieceType::KING {
            self.king_sq[side.index()] = to;
        }

        self.side = side.flip();
        hash_side(&mut self.key);

        #[cfg(debug_assertions)]
        self.check_validity();

        if self.sq_attacked(self.king_sq[side.index()], self.side) {
            self.unmake_move();
            return false;
        }

        true
    }

    pub fn unmake_move(&mut self) {
        #[cfg(debug_assertions)]
        self.check_validity();

        self.ply -= 1;
        self.height -= 1;

        let Undo {
            m,
            castle_perm,
            ep_square,
            fifty_move_counter,
            position_key: _,
        } = self.history.pop().expect("no move to unmake");

        let from = m.from();
        let to = m.to();

        if let Some(ep_sq) = self.ep_sq {
            hash_ep(&mut self.key, ep_sq);
        }
        hash_castling(&mut self.key, self.castle_perm);

        self.castle_perm = castle_perm;
        self.ep_sq = ep_square;
        self.fifty_move_counter = fifty_move_counter;

        if let Some(ep_sq) = self.ep_sq {
            hash_ep(&mut self.key, ep_sq);
        }
        hash_castling(&mut self.key, self.castle_perm);

        self.side = self.side.flip();
        hash_side(&mut self.key);

        if m.is_ep() {
            let (behind, pawn) = if self.side == Colour::WHITE {
                (-10, Piece::BP)
            } else {
                (10, Piece::WP)
            };
            self.add_piece(to.offset(behind), pawn);
        } else if m.is_castle() {
            match to {
                Square::C1 => self.move_piece(Square::D1, Square::A1),
                Square::C8 => self.move_piece(Square::D8, Square::A8),
                Square::G1 => self.move_piece(Square::F1, Square::H1),
                Square::G8 => self.move_piece(Square::F8, Square::H8),
                _ => unreachable!("invalid castle move"),
            }
        }

        self.move_piece(to, from);

        if self.pieces[from.index()].piece_type() == PieceType::KING {
            self.king_sq[self.side.index()] = from;
        }

        let captured = m.capture();
        if captured.is_piece() {
            self.add_piece(to, captured);
        }

        if m.promotion().is_piece() {
            self.clear_piece(from);
            self.add_piece(from, Piece::new(m.promotion().colour(), PieceType::PAWN));
        }

        #[cfg(debug_assertions)]
        self.check_validity();
    }

    /// Passes the turn without moving, for null-move pruning. Must not be
    /// called while in check.
    pub fn make_nullmove(&mut self) {
        #[cfg(debug_assertions)]
        self.check_validity();
        debug_assert!(!self.in_check());

        self.history.push(Undo {
            m: Move::NULL,
            castle_perm: self.castle_perm,
            ep_square: self.ep_sq,
            fifty_move_counter: self.fifty_move_counter,
            position_key: self.key,
        });

        if let Some(ep_sq) = self.ep_sq {
            hash_ep(&mut self.key, ep_sq);
        }
        self.ep_sq = None;

        self.ply += 1;
        self.height += 1;
        self.side = self.side.flip();
        hash_side(&mut self.key);

        #[cfg(debug_assertions)]
        self.check_validity();
    }

    pub fn unmake_nullmove(&mut self) {
        #[cfg(debug_assertions)]
        self.check_validity();

        self.ply -= 1;
        self.height -= 1;

        let undo = self.history.pop().expect("no null move to unmake");
        debug_assert!(undo.m.is_null());

        self.ep_sq = undo.ep_square;
        if let Some(ep_sq) = self.ep_sq {
            hash_ep(&mut self.key, ep_sq);
        }
        self.fifty_move_counter = undo.fifty_move_counter;
        self.castle_perm = undo.castle_perm;

        self.side = self.side.flip();
        hash_side(&mut self.key);

        #[cfg(debug_assertions)]
        self.check_validity();
    }

    /// Runs `f` with the move applied, then reverses it. The closure scope
    /// makes an unpaired make impossible; returns `None` if the move was
    /// illegal (in which case the position is untouched and `f` never ran).
    pub fn with_move<T>(&mut self, m: Move, f: impl FnOnce(&mut Self) -> T) -> Option<T> {
        if !self.make_move(m) {
            return None;
        }
        let out = f(self);
        self.unmake_move();
        Some(out)
    }
}

mod tests {
    #[cfg(test)]
    const TRICKY_FEN: &str =
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

    #[test]
    fn make_unmake_restores_everything() {
        use crate::{board::Board, movegen::MoveList};
        let mut board = Board::from_fen(TRICKY_FEN).unwrap();
        let key_before = board.hashkey();
        let fen_before = board.fen();

        let mut list = MoveList::new();
        board.generate_moves(&mut list);
        for m in list.moves().collect::<Vec<_>>() {
            if board.make_move(m) {
                assert_ne!(board.hashkey(), key_before, "move {m} did not change the key");
                board.unmake_move();
            }
            assert_eq!(board.hashkey(), key_before, "move {m} broke the key");
            assert_eq!(board.fen(), fen_before, "move {m} broke the position");
        }
    }

    #[test]
    fn illegal_moves_leave_the_position_untouched() {
        use crate::{board::Board, movegen::MoveList};
        // the rook on e8 checks the king; staying on the e-file is illegal.
        let mut board = Board::from_fen("4r3/8/8/8/8/8/8/k3K3 w - - 0 1").unwrap();
        let fen_before = board.fen();
        let mut list = MoveList::new();
        board.generate_moves(&mut list);
        let mut any_illegal = false;
        for m in list.moves().collect::<Vec<_>>() {
            if !board.make_move(m) {
                any_illegal = true;
                assert_eq!(board.fen(), fen_before);
            } else {
                board.unmake_move();
            }
        }
        assert!(any_illegal);
    }

    #[test]
    fn incremental_key_matches_regenerated_key() {
        use crate::{board::Board, movegen::MoveList};
        let mut board = Board::from_fen(TRICKY_FEN).unwrap();
        let mut list = MoveList::new();
        board.generate_moves(&mut list);
        for m in list.moves().collect::<Vec<_>>() {
            if board.make_move(m) {
                assert_eq!(board.hashkey(), board.generate_pos_key());
                board.unmake_move();
            }
        }
    }

    #[test]
    fn null_move_roundtrip() {
        use crate::board::Board;
        let mut board = Board::from_fen(TRICKY_FEN).unwrap();
        let key_before = board.hashkey();
        board.make_nullmove();
        assert_ne!(board.hashkey(), key_before);
        assert_eq!(board.hashkey(), board.generate_pos_key());
        board.unmake_nullmove();
        assert_eq!(board.hashkey(), key_before);
    }

    #[test]
    fn with_move_always_reverses() {
        use crate::board::Board;
        let mut board = Board::starting_position();
        let key_before = board.hashkey();
        let m = board.parse_uci("g1f3").unwrap();
        let gives_check = board.with_move(m, |b| b.in_check());
        assert_eq!(gives_check, Some(false));
        assert_eq!(board.hashkey(), key_before);
    }

    #[test]
    fn en_passant_capture_roundtrip() {
        use crate::board::Board;
        let mut board =
            Board::from_fen("4k3/8/8/8/4pP2/8/8/4K3 b - f3 0 1").unwrap();
        let fen_before = board.fen();
        let m = board.parse_uci("e4f3").unwrap();
        assert!(m.is_ep());
        assert!(board.make_move(m));
        board.unmake_move();
        assert_eq!(board.fen(), fen_before);
    }
}
