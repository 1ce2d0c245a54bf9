use crate::{
    board::Board,
    piece::{Colour, Piece, PieceType},
    squares::Square,
};

impl Board {
    /// Determines if `sq` is attacked by `side`. Works outward from the
    /// target square, so sliders cost one ray walk per direction rather
    /// than a scan of the attacker's piece list.
    pub fn sq_attacked(&self, sq: Square, side: Colour) -> bool {
        debug_assert!(sq.on_board());

        // pawns attack diagonally forward, so from the target's view the
        // attacker sits diagonally backward.
        let (pawn, pawn_dirs) = if side == Colour::WHITE {
            (Piece::WP, [-11, -9])
        } else {
            (Piece::BP, [11, 9])
        };
        for dir in pawn_dirs {
            if self.pieces[sq.offset(dir).index()] == pawn {
                return true;
            }
        }

        for &dir in PieceType::KNIGHT.directions() {
            let piece = self.pieces[sq.offset(dir).index()];
            if piece.is_piece()
                && piece.piece_type() == PieceType::KNIGHT
                && piece.colour() == side
            {
                return true;
            }
        }

        for &dir in PieceType::ROOK.directions() {
            let mut t_sq = sq.offset(dir);
            let mut piece = self.pieces[t_sq.index()];
            while !piece.is_off_board() {
                if !piece.is_empty() {
                    if matches!(piece.piece_type(), PieceType::ROOK | PieceType::QUEEN)
                        && piece.colour() == side
                    {
                        return true;
                    }
                    break;
                }
                t_sq = t_sq.offset(dir);
                piece = self.pieces[t_sq.index()];
            }
        }

        for &dir in PieceType::BISHOP.directions() {
            let mut t_sq = sq.offset(dir);
            let mut piece = self.pieces[t_sq.index()];
            while !piece.is_off_board() {
                if !piece.is_empty() {
                    if matches!(piece.piece_type(), PieceType::BISHOP | PieceType::QUEEN)
                        && piece.colour() == side
                    {
                        return true;
                    }
                    break;
                }
                t_sq = t_sq.offset(dir);
                piece = self.pieces[t_sq.index()];
            }
        }

        for &dir in PieceType::KING.directions() {
            let piece = self.pieces[sq.offset(dir).index()];
            if piece.is_piece() && piece.piece_type() == PieceType::KING && piece.colour() == side {
                return true;
            }
        }

        false
    }
}

mod tests {
    #[test]
    fn attacks_in_the_initial_position() {
        use crate::{board::Board, piece::Colour, squares::Square};
        let board = Board::starting_position();
        // e3 is covered by the d2/f2 pawns, e4 by nothing yet.
        assert!(board.sq_attacked(Square::from_file_rank(4, 2), Colour::WHITE));
        assert!(!board.sq_attacked(Square::from_file_rank(4, 3), Colour::WHITE));
        assert!(!board.sq_attacked(Square::E1, Colour::BLACK));
        // knights cover a3/c3/f3/h3.
        assert!(board.sq_attacked(Square::from_file_rank(0, 2), Colour::WHITE));
        assert!(board.sq_attacked(Square::from_file_rank(5, 2), Colour::WHITE));
    }

    #[test]
    fn slider_attacks_stop_at_blockers() {
        use crate::{board::Board, piece::Colour, squares::Square};
        let board = Board::from_fen("4k3/8/8/8/r2P4/8/8/4K3 w - - 0 1").unwrap();
        // the rook on a4 sees b4, c4, d4 but not e4 behind the pawn.
        assert!(board.sq_attacked(Square::from_file_rank(3, 3), Colour::BLACK));
        assert!(!board.sq_attacked(Square::from_file_rank(4, 3), Colour::BLACK));
        assert!(board.sq_attacked(Square::from_file_rank(0, 7), Colour::BLACK));
    }

    #[test]
    fn pawn_attacks_are_directional() {
        use crate::{board::Board, piece::Colour, squares::Square};
        let board = Board::from_fen("4k3/8/8/3p4/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(board.sq_attacked(Square::from_file_rank(2, 3), Colour::BLACK));
        assert!(board.sq_attacked(Square::from_file_rank(4, 3), Colour::BLACK));
        assert!(!board.sq_attacked(Square::from_file_rank(2, 5), Colour::BLACK));
    }
}
