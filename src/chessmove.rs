use std::fmt::{self, Debug, Display, Formatter};

use crate::{piece::Piece, squares::Square};

/// A move packed into 32 bits:
/// ```text
/// 0000 0000 0000 0000 0000 0000 0111 1111  from (120-cell coordinate)
/// 0000 0000 0000 0000 0011 1111 1000 0000  to   (120-cell coordinate)
/// 0000 0000 0000 0011 1100 0000 0000 0000  captured piece
/// 0000 0000 0011 1100 0000 0000 0000 0000  promoted piece
/// 0000 0000 0100 0000 0000 0000 0000 0000  en-passant flag
/// 0000 0000 1000 0000 0000 0000 0000 0000  double-pawn-push flag
/// 0000 0001 0000 0000 0000 0000 0000 0000  castling flag
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Move {
    data: u32,
}

impl Move {
    const TO_SHIFT: u32 = 7;
    const CAPTURE_SHIFT: u32 = 14;
    const PROMO_SHIFT: u32 = 18;
    const SQ_MASK: u32 = 0b111_1111;
    const PIECE_MASK: u32 = 0b1111;

    pub const EP_FLAG: u32 = 1 << 22;
    pub const PAWN_START_FLAG: u32 = 1 << 23;
    pub const CASTLE_FLAG: u32 = 1 << 24;

    pub const NULL: Self = Self { data: 0 };

    pub fn new(from: Square, to: Square, capture: Piece, promotion: Piece, flags: u32) -> Self {
        debug_assert!(flags & !(Self::EP_FLAG | Self::PAWN_START_FLAG | Self::CASTLE_FLAG) == 0);
        Self {
            data: from.inner() as u32
                | (to.inner() as u32) << Self::TO_SHIFT
                | (capture.index() as u32) << Self::CAPTURE_SHIFT
                | (promotion.index() as u32) << Self::PROMO_SHIFT
                | flags,
        }
    }

    pub const fn from(self) -> Square {
        Square::from_120((self.data & Self::SQ_MASK) as u8)
    }

    pub const fn to(self) -> Square {
        Square::from_120((self.data >> Self::TO_SHIFT & Self::SQ_MASK) as u8)
    }

    pub const fn capture(self) -> Piece {
        Piece::from_index((self.data >> Self::CAPTURE_SHIFT & Self::PIECE_MASK) as u8)
    }

    pub const fn promotion(self) -> Piece {
        Piece::from_index((self.data >> Self::PROMO_SHIFT & Self::PIECE_MASK) as u8)
    }

    pub const fn is_ep(self) -> bool {
        self.data & Self::EP_FLAG != 0
    }

    pub const fn is_pawn_start(self) -> bool {
        self.data & Self::PAWN_START_FLAG != 0
    }

    pub const fn is_castle(self) -> bool {
        self.data & Self::CASTLE_FLAG != 0
    }

    pub const fn is_capture(self) -> bool {
        self.data & (Self::PIECE_MASK << Self::CAPTURE_SHIFT) != 0 || self.is_ep()
    }

    pub const fn is_promo(self) -> bool {
        self.data & (Self::PIECE_MASK << Self::PROMO_SHIFT) != 0
    }

    /// A move that neither captures nor promotes; quiets are the ones the
    /// history and killer tables track.
    pub const fn is_quiet(self) -> bool {
        !self.is_capture() && !self.is_promo()
    }

    pub const fn is_null(self) -> bool {
        self.data == 0
    }

    /// Raw bit access, for compact storage in the transposition table.
    pub const fn bits(self) -> u32 {
        self.data
    }

    pub const fn from_bits(data: u32) -> Self {
        Self { data }
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        if self.is_null() {
            return write!(f, "0000");
        }
        write!(f, "{}{}", self.from(), self.to())?;
        if let Some(c) = self.promotion().piece_type().promo_char() {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl Debug for Move {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "move from {} to {} (capture {:?}, promo {:?})",
            self.from(),
            self.to(),
            self.capture(),
            self.promotion()
        )
    }
}

mod tests {
    #[test]
    fn field_extraction() {
        use super::Move;
        use crate::{piece::Piece, squares::Square};
        let m = Move::new(Square::E1, Square::from_file_rank(4, 3), Piece::BQ, Piece::EMPTY, 0);
        assert_eq!(m.from(), Square::E1);
        assert_eq!(m.to(), Square::from_file_rank(4, 3));
        assert_eq!(m.capture(), Piece::BQ);
        assert!(m.is_capture());
        assert!(!m.is_promo());
        assert!(!m.is_castle());

        let promo = Move::new(
            Square::from_file_rank(0, 6),
            Square::A8,
            Piece::EMPTY,
            Piece::WQ,
            0,
        );
        assert_eq!(promo.promotion(), Piece::WQ);
        assert!(promo.is_promo());
        assert!(!promo.is_capture());
        assert_eq!(promo.to_string(), "a7a8q");
    }

    #[test]
    fn flags() {
        use super::Move;
        use crate::{piece::Piece, squares::Square};
        let ep = Move::new(
            Square::from_file_rank(4, 4),
            Square::from_file_rank(3, 5),
            Piece::EMPTY,
            Piece::EMPTY,
            Move::EP_FLAG,
        );
        assert!(ep.is_ep());
        assert!(ep.is_capture());
        let castle = Move::new(Square::E1, Square::G1, Piece::EMPTY, Piece::EMPTY, Move::CASTLE_FLAG);
        assert!(castle.is_castle());
        assert!(castle.is_quiet());
        assert_eq!(castle.to_string(), "e1g1");
        assert!(Move::NULL.is_null());
    }
}
