use std::fmt::{self, Debug, Display, Formatter};

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Colour {
    v: u8,
}

impl Colour {
    pub const WHITE: Self = Self { v: 0 };
    pub const BLACK: Self = Self { v: 1 };

    pub const fn flip(self) -> Self {
        Self { v: self.v ^ 1 }
    }

    pub const fn index(self) -> usize {
        self.v as usize
    }
}

impl Display for Colour {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            Self::WHITE => write!(f, "White"),
            _ => write!(f, "Black"),
        }
    }
}

impl Debug for Colour {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            Self::WHITE => write!(f, "Colour::WHITE"),
            _ => write!(f, "Colour::BLACK"),
        }
    }
}

#[allow(clippy::module_name_repetitions)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PieceType {
    v: u8,
}

const KNIGHT_DIRS: [i8; 8] = [-8, -19, -21, -12, 8, 19, 21, 12];
const BISHOP_DIRS: [i8; 4] = [-9, -11, 11, 9];
const ROOK_DIRS: [i8; 4] = [-1, -10, 1, 10];
const ROYAL_DIRS: [i8; 8] = [-1, -10, 1, 10, -9, -11, 11, 9];

impl PieceType {
    pub const PAWN: Self = Self { v: 0 };
    pub const KNIGHT: Self = Self { v: 1 };
    pub const BISHOP: Self = Self { v: 2 };
    pub const ROOK: Self = Self { v: 3 };
    pub const QUEEN: Self = Self { v: 4 };
    pub const KING: Self = Self { v: 5 };
    pub const NONE: Self = Self { v: 6 };

    pub const fn new(v: u8) -> Self {
        debug_assert!(v < 7);
        Self { v }
    }

    pub const fn index(self) -> usize {
        self.v as usize
    }

    /// The mailbox offsets this piece type moves along. Pawns are handled
    /// separately by the move generator as their moves depend on colour.
    pub const fn directions(self) -> &'static [i8] {
        match self {
            Self::KNIGHT => &KNIGHT_DIRS,
            Self::BISHOP => &BISHOP_DIRS,
            Self::ROOK => &ROOK_DIRS,
            Self::QUEEN | Self::KING => &ROYAL_DIRS,
            _ => &[],
        }
    }

    pub const fn legal_promo(self) -> bool {
        matches!(self, Self::QUEEN | Self::KNIGHT | Self::BISHOP | Self::ROOK)
    }

    pub const fn promo_char(self) -> Option<char> {
        match self {
            Self::QUEEN => Some('q'),
            Self::KNIGHT => Some('n'),
            Self::BISHOP => Some('b'),
            Self::ROOK => Some('r'),
            _ => None,
        }
    }
}

impl Display for PieceType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let name = match *self {
            Self::PAWN => "Pawn",
            Self::KNIGHT => "Knight",
            Self::BISHOP => "Bishop",
            Self::ROOK => "Rook",
            Self::QUEEN => "Queen",
            Self::KING => "King",
            _ => "NoPieceType",
        };
        write!(f, "{name}")
    }
}

impl Debug for PieceType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "PieceType({self})")
    }
}

/// A coloured piece, or the empty-cell / border sentinels that live in the
/// mailbox array. Only `WP..=BK` index the per-piece tables.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Piece {
    v: u8,
}

impl Piece {
    pub const EMPTY: Self = Self { v: 0 };

    pub const WP: Self = Self { v: 1 };
    pub const WN: Self = Self { v: 2 };
    pub const WB: Self = Self { v: 3 };
    pub const WR: Self = Self { v: 4 };
    pub const WQ: Self = Self { v: 5 };
    pub const WK: Self = Self { v: 6 };

    pub const BP: Self = Self { v: 7 };
    pub const BN: Self = Self { v: 8 };
    pub const BB: Self = Self { v: 9 };
    pub const BR: Self = Self { v: 10 };
    pub const BQ: Self = Self { v: 11 };
    pub const BK: Self = Self { v: 12 };

    /// Border sentinel for the 120-cell mailbox.
    pub const OFF_BOARD: Self = Self { v: 13 };

    pub const N_PIECES: usize = 13;

    pub const fn new(colour: Colour, piece_type: PieceType) -> Self {
        debug_assert!(piece_type.v < 6);
        Self {
            v: 1 + colour.v * 6 + piece_type.v,
        }
    }

    pub const fn index(self) -> usize {
        debug_assert!(self.v <= 12);
        self.v as usize
    }

    pub const fn is_empty(self) -> bool {
        self.v == Self::EMPTY.v
    }

    pub const fn is_piece(self) -> bool {
        self.v >= 1 && self.v <= 12
    }

    pub const fn is_off_board(self) -> bool {
        self.v == Self::OFF_BOARD.v
    }

    pub const fn colour(self) -> Colour {
        debug_assert!(self.is_piece());
        Colour {
            v: (self.v - 1) / 6,
        }
    }

    pub const fn piece_type(self) -> PieceType {
        if self.is_piece() {
            PieceType {
                v: (self.v - 1) % 6,
            }
        } else {
            PieceType::NONE
        }
    }

    /// True for everything but pawns; "big" pieces disable some pruning
    /// heuristics (a side with only pawns is prone to zugzwang).
    pub const fn is_big(self) -> bool {
        debug_assert!(self.is_piece());
        !matches!(self.piece_type(), PieceType::PAWN)
    }

    pub const fn is_major(self) -> bool {
        debug_assert!(self.is_piece());
        matches!(
            self.piece_type(),
            PieceType::ROOK | PieceType::QUEEN | PieceType::KING
        )
    }

    pub const fn char(self) -> char {
        match self {
            Self::WP => 'P',
            Self::WN => 'N',
            Self::WB => 'B',
            Self::WR => 'R',
            Self::WQ => 'Q',
            Self::WK => 'K',
            Self::BP => 'p',
            Self::BN => 'n',
            Self::BB => 'b',
            Self::BR => 'r',
            Self::BQ => 'q',
            Self::BK => 'k',
            Self::EMPTY => '.',
            _ => '?',
        }
    }

    pub const fn from_char(c: u8) -> Option<Self> {
        match c {
            b'P' => Some(Self::WP),
            b'N' => Some(Self::WN),
            b'B' => Some(Self::WB),
            b'R' => Some(Self::WR),
            b'Q' => Some(Self::WQ),
            b'K' => Some(Self::WK),
            b'p' => Some(Self::BP),
            b'n' => Some(Self::BN),
            b'b' => Some(Self::BB),
            b'r' => Some(Self::BR),
            b'q' => Some(Self::BQ),
            b'k' => Some(Self::BK),
            _ => None,
        }
    }

    pub const fn from_index(v: u8) -> Self {
        debug_assert!(v <= 13);
        Self { v }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (1..=12).map(|v| Self { v })
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

impl Debug for Piece {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Piece({}, '{}')", self.v, self.char())
    }
}

mod tests {
    #[test]
    fn piece_construction_roundtrip() {
        use super::{Colour, Piece, PieceType};
        for colour in [Colour::WHITE, Colour::BLACK] {
            for pt in 0..6 {
                let piece_type = PieceType::new(pt);
                let piece = Piece::new(colour, piece_type);
                assert_eq!(piece.colour(), colour);
                assert_eq!(piece.piece_type(), piece_type);
            }
        }
    }

    #[test]
    fn char_roundtrip() {
        use super::Piece;
        for piece in Piece::all() {
            assert_eq!(Piece::from_char(piece.char() as u8), Some(piece));
        }
    }

    #[test]
    fn direction_sets() {
        use super::PieceType;
        assert_eq!(PieceType::KNIGHT.directions().len(), 8);
        assert_eq!(PieceType::BISHOP.directions().len(), 4);
        assert_eq!(PieceType::ROOK.directions().len(), 4);
        assert_eq!(PieceType::QUEEN.directions().len(), 8);
        assert_eq!(PieceType::KING.directions().len(), 8);
        assert!(PieceType::PAWN.directions().is_empty());
    }
}
