#![allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]

use std::fmt::{self, Debug, Display, Formatter, Write as _};

use crate::{
    chessmove::Move,
    errors::{FenParseError, MoveParseError},
    evaluation::PIECE_VALUES,
    makemove::{hash_castling, hash_ep, hash_piece, hash_side},
    movegen::MoveList,
    piece::{Colour, Piece, PieceType},
    psqt::psqt_value,
    squares::{Square, BOARD_N_CELLS, RANK_3, RANK_6},
};

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Longest possible game we're willing to store undo information for.
pub const MAX_GAME_MOVES: usize = 1024;

/// Maximum number of pieces of one kind that can exist at once
/// (eight promotions on top of the two starting rooks).
const MAX_PIECES_OF_KIND: usize = 10;

pub mod castling {
    pub const WK: u8 = 0b0001;
    pub const WQ: u8 = 0b0010;
    pub const BK: u8 = 0b0100;
    pub const BQ: u8 = 0b1000;
}

/// Everything needed to reverse a move, pushed on `make_move` and popped on
/// `unmake_move`. `position_key` is the hash before the move was made, which
/// doubles as the repetition history.
#[derive(Clone, Copy)]
pub struct Undo {
    pub m: Move,
    pub castle_perm: u8,
    pub ep_square: Option<Square>,
    pub fifty_move_counter: u8,
    pub position_key: u64,
}

/// The chessboard and all its redundant acceleration structures. The mailbox
/// is the source of truth; the piece lists, pawn bitboards, counters and
/// material/PST accumulators are maintained incrementally and cross-checked
/// by `check_validity` in debug builds.
pub struct Board {
    pub(crate) pieces: [Piece; BOARD_N_CELLS],
    pub(crate) piece_lists: [[Square; MAX_PIECES_OF_KIND]; Piece::N_PIECES],
    pub(crate) piece_counts: [u8; Piece::N_PIECES],
    /// White pawns, black pawns, both. Only pawns get bitboards; the pawn
    /// evaluation wants set-wise file queries the piece lists can't answer.
    pub(crate) pawns: [u64; 3],
    pub(crate) king_sq: [Square; 2],
    pub(crate) side: Colour,
    pub(crate) ep_sq: Option<Square>,
    pub(crate) fifty_move_counter: u8,
    /// Distance from the search root.
    pub(crate) height: usize,
    /// Game ply, in halfmoves.
    pub(crate) ply: usize,
    pub(crate) key: u64,
    pub(crate) big_piece_counts: [u8; 2],
    pub(crate) major_piece_counts: [u8; 2],
    pub(crate) minor_piece_counts: [u8; 2],
    pub(crate) material: [i32; 2],
    pub(crate) pst: [i32; 2],
    pub(crate) castle_perm: u8,
    pub(crate) history: Vec<Undo>,
}

impl Board {
    pub fn new() -> Self {
        let mut out = Self {
            pieces: [Piece::OFF_BOARD; BOARD_N_CELLS],
            piece_lists: [[Square::A1; MAX_PIECES_OF_KIND]; Piece::N_PIECES],
            piece_counts: [0; Piece::N_PIECES],
            pawns: [0; 3],
            king_sq: [Square::A1; 2],
            side: Colour::WHITE,
            ep_sq: None,
            fifty_move_counter: 0,
            height: 0,
            ply: 0,
            key: 0,
            big_piece_counts: [0; 2],
            major_piece_counts: [0; 2],
            minor_piece_counts: [0; 2],
            material: [0; 2],
            pst: [0; 2],
            castle_perm: 0,
            history: Vec::with_capacity(MAX_GAME_MOVES),
        };
        out.reset();
        out
    }

    pub fn reset(&mut self) {
        self.pieces.fill(Piece::OFF_BOARD);
        for sq in Square::all() {
            self.pieces[sq.index()] = Piece::EMPTY;
        }
        self.piece_lists = [[Square::A1; MAX_PIECES_OF_KIND]; Piece::N_PIECES];
        self.piece_counts.fill(0);
        self.pawns.fill(0);
        self.king_sq.fill(Square::A1);
        self.side = Colour::WHITE;
        self.ep_sq = None;
        self.fifty_move_counter = 0;
        self.height = 0;
        self.ply = 0;
        self.key = 0;
        self.big_piece_counts.fill(0);
        self.major_piece_counts.fill(0);
        self.minor_piece_counts.fill(0);
        self.material.fill(0);
        self.pst.fill(0);
        self.castle_perm = 0;
        self.history.clear();
    }

    pub fn starting_position() -> Self {
        Self::from_fen(STARTING_FEN).expect("starting FEN is valid")
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenParseError> {
        let mut out = Self::new();
        out.fill_from_fen(fen)?;
        Ok(out)
    }

    /// Replaces this position with the one described by `fen`. On a parse
    /// error the board is left exactly as it was.
    pub fn set_from_fen(&mut self, fen: &str) -> Result<(), FenParseError> {
        *self = Self::from_fen(fen)?;
        Ok(())
    }

    fn fill_from_fen(&mut self, fen: &str) -> Result<(), FenParseError> {
        self.reset();

        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(FenParseError::WrongFieldCount(parts.len()));
        }

        self.set_board_part(parts[0])?;
        self.set_side(parts[1])?;
        self.set_castling(parts[2])?;
        self.set_ep(parts[3])?;
        if let Some(halfmove) = parts.get(4) {
            self.fifty_move_counter = halfmove
                .parse()
                .map_err(|_| FenParseError::InvalidHalfmoveClock((*halfmove).to_string()))?;
        }
        if let Some(fullmove) = parts.get(5) {
            let fullmove: usize = fullmove
                .parse()
                .map_err(|_| FenParseError::InvalidFullmoveNumber((*fullmove).to_string()))?;
            self.ply = fullmove.saturating_sub(1) * 2 + usize::from(self.side == Colour::BLACK);
        }

        self.set_up_incremental_state()?;
        self.key = self.generate_pos_key();
        Ok(())
    }

    fn set_board_part(&mut self, board_part: &str) -> Result<(), FenParseError> {
        let mut rank = 7u8;
        let mut file = 0u8;
        for c in board_part.chars() {
            match c {
                '/' => {
                    if file != 8 {
                        return Err(FenParseError::BadRankLength(rank + 1));
                    }
                    if rank == 0 {
                        return Err(FenParseError::BadRankCount);
                    }
                    rank -= 1;
                    file = 0;
                }
                '1'..='8' => {
                    file += c as u8 - b'0';
                    if file > 8 {
                        return Err(FenParseError::BadRankLength(rank + 1));
                    }
                }
                c => {
                    let piece =
                        Piece::from_char(c as u8).ok_or(FenParseError::InvalidBoardChar(c))?;
                    if file >= 8 {
                        return Err(FenParseError::BadRankLength(rank + 1));
                    }
                    self.pieces[Square::from_file_rank(file, rank).index()] = piece;
                    file += 1;
                }
            }
        }
        if rank != 0 || file != 8 {
            return Err(FenParseError::BadRankCount);
        }
        Ok(())
    }

    fn set_side(&mut self, side_part: &str) -> Result<(), FenParseError> {
        self.side = match side_part {
            "w" => Colour::WHITE,
            "b" => Colour::BLACK,
            other => return Err(FenParseError::InvalidSideToMove(other.to_string())),
        };
        Ok(())
    }

    fn set_castling(&mut self, castling_part: &str) -> Result<(), FenParseError> {
        if castling_part == "-" {
            self.castle_perm = 0;
            return Ok(());
        }
        for c in castling_part.chars() {
            self.castle_perm |= match c {
                'K' => castling::WK,
                'Q' => castling::WQ,
                'k' => castling::BK,
                'q' => castling::BQ,
                _ => return Err(FenParseError::InvalidCastlingRights(castling_part.to_string())),
            };
        }
        Ok(())
    }

    fn set_ep(&mut self, ep_part: &str) -> Result<(), FenParseError> {
        if ep_part == "-" {
            self.ep_sq = None;
            return Ok(());
        }
        let bytes = ep_part.as_bytes();
        let valid = bytes.len() == 2
            && (b'a'..=b'h').contains(&bytes[0])
            && (bytes[1] == b'3' || bytes[1] == b'6');
        if !valid {
            return Err(FenParseError::InvalidEnPassant(ep_part.to_string()));
        }
        self.ep_sq = Some(Square::from_file_rank(bytes[0] - b'a', bytes[1] - b'1'));
        Ok(())
    }

    /// Rebuilds the piece lists, counters, bitboards and accumulators from
    /// the mailbox after a FEN load.
    fn set_up_incremental_state(&mut self) -> Result<(), FenParseError> {
        for sq in Square::all() {
            let piece = self.pieces[sq.index()];
            if !piece.is_piece() {
                continue;
            }
            let colour = piece.colour();

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

            self.material[colour.index()] += PIECE_VALUES[piece.index()];
            self.pst[colour.index()] += psqt_value(piece, sq);

            self.piece_lists[piece.index()][self.piece_counts[piece.index()] as usize] = sq;
            self.piece_counts[piece.index()] += 1;

            if piece.piece_type() == PieceType::KING {
                self.king_sq[colour.index()] = sq;
            }
        }
        for king in [Piece::WK, Piece::BK] {
            let count = self.piece_counts[king.index()] as usize;
            if count != 1 {
                return Err(FenParseError::WrongKingCount(count));
            }
        }
        Ok(())
    }

    pub fn generate_pos_key(&self) -> u64 {
        let mut key = 0;
        for sq in Square::all() {
            let piece = self.pieces[sq.index()];
            if piece.is_piece() {
                hash_piece(&mut key, piece, sq);
            }
        }
        if self.side == Colour::WHITE {
            hash_side(&mut key);
        }
        if let Some(ep_sq) = self.ep_sq {
            hash_ep(&mut key, ep_sq);
        }
        hash_castling(&mut key, self.castle_perm);
        key
    }

    pub fn fen(&self) -> String {
        let mut fen = String::with_capacity(128);
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                let piece = self.pieces[Square::from_file_rank(file, rank).index()];
                if piece.is_empty() {
                    empty += 1;
                } else {
                    if empty > 0 {
                        write!(fen, "{empty}").unwrap();
                        empty = 0;
                    }
                    fen.push(piece.char());
                }
            }
            if empty > 0 {
                write!(fen, "{empty}").unwrap();
            }
            if rank > 0 {
                fen.push('/');
            }
        }
        fen.push(' ');
        fen.push(if self.side == Colour::WHITE { 'w' } else { 'b' });
        fen.push(' ');
        if self.castle_perm == 0 {
            fen.push('-');
        } else {
            for (bit, c) in [
                (castling::WK, 'K'),
                (castling::WQ, 'Q'),
                (castling::BK, 'k'),
                (castling::BQ, 'q'),
            ] {
                if self.castle_perm & bit != 0 {
                    fen.push(c);
                }
            }
        }
        match self.ep_sq {
            Some(sq) => write!(fen, " {sq}").unwrap(),
            None => fen.push_str(" -"),
        }
        write!(fen, " {} {}", self.fifty_move_counter, self.ply / 2 + 1).unwrap();
        fen
    }

    pub const fn turn(&self) -> Colour {
        self.side
    }

    pub const fn hashkey(&self) -> u64 {
        self.key
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    pub fn piece_at(&self, sq: Square) -> Piece {
        self.pieces[sq.index()]
    }

    pub fn in_check(&self) -> bool {
        self.sq_attacked(self.king_sq[self.side.index()], self.side.flip())
    }

    /// True when the side to move still has a non-pawn piece, making
    /// zugzwang unlikely enough for null-move pruning.
    pub fn has_big_piece(&self) -> bool {
        self.big_piece_counts[self.side.index()] > 1
    }

    pub fn set_height(&mut self, height: usize) {
        self.height = height;
    }

    /// Has the current position occurred before in the current line?
    /// A single prior occurrence is scored as a draw inside the search;
    /// only moves since the last irreversible move can possibly repeat.
    pub fn is_repetition(&self) -> bool {
        let lookback = self.fifty_move_counter as usize;
        self.history
            .iter()
            .rev()
            .take(lookback)
            .any(|undo| undo.position_key == self.key)
    }

    /// True threefold against the whole game history, for root adjudication.
    pub fn is_threefold_repetition(&self) -> bool {
        let occurrences = self
            .history
            .iter()
            .filter(|undo| undo.position_key == self.key)
            .count();
        occurrences >= 2
    }

    pub fn is_fifty_move_draw(&self) -> bool {
        self.fifty_move_counter >= 100
    }

    pub fn is_draw(&self) -> bool {
        (self.is_fifty_move_draw() || self.is_repetition()) && self.height != 0
    }

    /// Parses a move in coordinate notation against the current position.
    /// The move must be one the position can actually produce, so this also
    /// resolves the capture/promotion/flag bits.
    pub fn parse_uci(&self, text: &str) -> Result<Move, MoveParseError> {
        if !(4..=5).contains(&text.len()) {
            return Err(MoveParseError::InvalidLength(text.len()));
        }
        let bytes = text.as_bytes();
        let from = square_from_bytes(bytes[0], bytes[1])
            .ok_or_else(|| MoveParseError::InvalidFromSquare(text[0..2].to_string()))?;
        let to = square_from_bytes(bytes[2], bytes[3])
            .ok_or_else(|| MoveParseError::InvalidToSquare(text[2..4].to_string()))?;
        let promo = match bytes.get(4) {
            None => None,
            Some(b'q') => Some(PieceType::QUEEN),
            Some(b'n') => Some(PieceType::KNIGHT),
            Some(b'r') => Some(PieceType::ROOK),
            Some(b'b') => Some(PieceType::BISHOP),
            Some(&c) => return Err(MoveParseError::InvalidPromotionPiece(c as char)),
        };

        let wanted_promo = promo.unwrap_or(PieceType::NONE);
        let mut list = MoveList::new();
        self.generate_moves(&mut list);
        for &entry in list.iter() {
            let m = entry.mov;
            if m.from() == from
                && m.to() == to
                && m.promotion().piece_type() == wanted_promo
            {
                return Ok(m);
            }
        }
        Err(MoveParseError::IllegalMove(text.to_string()))
    }

    #[cfg(debug_assertions)]
    #[allow(clippy::cognitive_complexity)]
    pub fn check_validity(&self) {
        let mut piece_counts = [0u8; Piece::N_PIECES];
        let mut big_pce = [0u8; 2];
        let mut maj_pce = [0u8; 2];
        let mut min_pce = [0u8; 2];
        let mut material = [0i32; 2];
        let mut pst = [0i32; 2];

        // piece lists point at the right mailbox cells
        for piece in Piece::all() {
            for entry in 0..self.piece_counts[piece.index()] {
                let sq = self.piece_lists[piece.index()][entry as usize];
                assert_eq!(self.pieces[sq.index()], piece);
            }
        }

        // recount everything from the mailbox
        for sq in Square::all() {
            let piece = self.pieces[sq.index()];
            assert!(!piece.is_off_board());
            if !piece.is_piece() {
                continue;
            }
            piece_counts[piece.index()] += 1;
            let colour = piece.colour();
            if piece.is_big() {
                big_pce[colour.index()] += 1;
                if piece.is_major() {
                    maj_pce[colour.index()] += 1;
                } else {
                    min_pce[colour.index()] += 1;
                }
            }
            material[colour.index()] += PIECE_VALUES[piece.index()];
            pst[colour.index()] += psqt_value(piece, sq);
        }

        assert_eq!(piece_counts, self.piece_counts);
        assert_eq!(big_pce, self.big_piece_counts);
        assert_eq!(maj_pce, self.major_piece_counts);
        assert_eq!(min_pce, self.minor_piece_counts);
        assert_eq!(material, self.material);
        assert_eq!(pst, self.pst);

        // pawn bitboards agree with the mailbox
        assert_eq!(
            self.pawns[0].count_ones(),
            u32::from(self.piece_counts[Piece::WP.index()])
        );
        assert_eq!(
            self.pawns[1].count_ones(),
            u32::from(self.piece_counts[Piece::BP.index()])
        );
        assert_eq!(self.pawns[2], self.pawns[0] | self.pawns[1]);
        for sq in Square::all() {
            if self.pawns[0] & (1 << sq.index64()) != 0 {
                assert_eq!(self.pieces[sq.index()], Piece::WP);
            }
            if self.pawns[1] & (1 << sq.index64()) != 0 {
                assert_eq!(self.pieces[sq.index()], Piece::BP);
            }
        }

        if let Some(ep_sq) = self.ep_sq {
            assert!(
                (ep_sq.rank() == RANK_6 && self.side == Colour::WHITE)
                    || (ep_sq.rank() == RANK_3 && self.side == Colour::BLACK)
            );
        }

        assert_eq!(self.pieces[self.king_sq[0].index()], Piece::WK);
        assert_eq!(self.pieces[self.king_sq[1].index()], Piece::BK);

        assert_eq!(self.generate_pos_key(), self.key);
    }
}

fn square_from_bytes(file: u8, rank: u8) -> Option<Square> {
    if (b'a'..=b'h').contains(&file) && (b'1'..=b'8').contains(&rank) {
        Some(Square::from_file_rank(file - b'a', rank - b'1'))
    } else {
        None
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::starting_position()
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                let piece = self.pieces[Square::from_file_rank(file, rank).index()];
                write!(f, "{} ", piece.char())?;
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")?;
        writeln!(
            f,
            "side: {}",
            if self.side == Colour::WHITE { 'w' } else { 'b' }
        )?;
        Ok(())
    }
}

impl Debug for Board {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{self}")?;
        writeln!(f, "fen: {}", self.fen())?;
        writeln!(f, "hash: {:x}", self.key)?;
        Ok(())
    }
}

mod tests {
    #[test]
    fn starting_position_is_valid() {
        use super::Board;
        let board = Board::starting_position();
        #[cfg(debug_assertions)]
        board.check_validity();
        assert_eq!(board.fen(), super::STARTING_FEN);
    }

    #[test]
    fn fen_roundtrip() {
        use super::Board;
        for fen in [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "4rrk1/1p3qbp/p2n1p2/2NP2p1/1P1B4/3Q1R2/P5PP/5RK1 b - - 7 30",
        ] {
            let board = Board::from_fen(fen).unwrap();
            assert_eq!(board.fen(), fen);
            #[cfg(debug_assertions)]
            board.check_validity();
        }
    }

    #[test]
    fn fen_errors_are_reported() {
        use super::Board;
        use crate::errors::FenParseError;
        assert!(matches!(
            Board::from_fen("rubbish"),
            Err(FenParseError::WrongFieldCount(1))
        ));
        assert!(matches!(
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1"),
            Err(FenParseError::InvalidSideToMove(_))
        ));
        assert!(matches!(
            Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQxq - 0 1"),
            Err(FenParseError::InvalidCastlingRights(_))
        ));
        assert!(matches!(
            Board::from_fen("9/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenParseError::BadRankLength(8))
        ));
        assert!(matches!(
            Board::from_fen("8/8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenParseError::WrongKingCount(0))
        ));
    }

    #[test]
    fn uci_move_parsing() {
        use super::Board;
        use crate::piece::Piece;
        let board = Board::starting_position();
        let m = board.parse_uci("e2e4").unwrap();
        assert!(m.is_pawn_start());
        assert!(board.parse_uci("e2e5").is_err());
        assert!(board.parse_uci("e2e4q").is_err());

        let board =
            Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
                .unwrap();
        let castle = board.parse_uci("e1g1").unwrap();
        assert!(castle.is_castle());
        let capture = board.parse_uci("e2a6").unwrap();
        assert_eq!(capture.capture(), Piece::BB);
    }
}
