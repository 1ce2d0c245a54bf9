use std::fmt::{self, Debug, Display, Formatter};

/// A square on the padded 120-cell board. Cells 21..=98 with a file digit of
/// 1..=8 are the real board; everything else is border used for off-board
/// detection during ray walks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square {
    v: u8,
}

pub const BOARD_N_CELLS: usize = 120;
pub const BOARD_N_SQUARES: usize = 64;

impl Square {
    pub const A1: Self = Self { v: 21 };
    pub const B1: Self = Self { v: 22 };
    pub const C1: Self = Self { v: 23 };
    pub const D1: Self = Self { v: 24 };
    pub const E1: Self = Self { v: 25 };
    pub const F1: Self = Self { v: 26 };
    pub const G1: Self = Self { v: 27 };
    pub const H1: Self = Self { v: 28 };
    pub const A8: Self = Self { v: 91 };
    pub const B8: Self = Self { v: 92 };
    pub const C8: Self = Self { v: 93 };
    pub const D8: Self = Self { v: 94 };
    pub const E8: Self = Self { v: 95 };
    pub const F8: Self = Self { v: 96 };
    pub const G8: Self = Self { v: 97 };
    pub const H8: Self = Self { v: 98 };

    pub const fn from_120(v: u8) -> Self {
        debug_assert!(v < BOARD_N_CELLS as u8);
        Self { v }
    }

    pub const fn from_64(sq64: u8) -> Self {
        debug_assert!(sq64 < BOARD_N_SQUARES as u8);
        Self {
            v: 21 + (sq64 % 8) + (sq64 / 8) * 10,
        }
    }

    pub const fn from_file_rank(file: u8, rank: u8) -> Self {
        debug_assert!(file < 8 && rank < 8);
        Self {
            v: 21 + file + rank * 10,
        }
    }

    pub const fn index(self) -> usize {
        self.v as usize
    }

    pub const fn inner(self) -> u8 {
        self.v
    }

    /// The 0..64 index of this square, for bitboards and per-square tables.
    /// Only meaningful for on-board squares.
    pub const fn index64(self) -> usize {
        debug_assert!(self.on_board());
        ((self.v / 10 - 2) * 8 + (self.v % 10 - 1)) as usize
    }

    pub const fn file(self) -> u8 {
        debug_assert!(self.on_board());
        self.v % 10 - 1
    }

    pub const fn rank(self) -> u8 {
        debug_assert!(self.on_board());
        self.v / 10 - 2
    }

    pub const fn on_board(self) -> bool {
        let file_digit = self.v % 10;
        self.v >= 21 && self.v <= 98 && file_digit >= 1 && file_digit <= 8
    }

    /// Offset along a mailbox direction. The result may be a border cell;
    /// callers check the mailbox contents or `on_board` before trusting it.
    pub const fn offset(self, d: i8) -> Self {
        Self {
            v: (self.v as i16 + d as i16) as u8,
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (0..BOARD_N_SQUARES as u8).map(Self::from_64)
    }
}

pub const RANK_2: u8 = 1;
pub const RANK_3: u8 = 2;
pub const RANK_6: u8 = 5;
pub const RANK_7: u8 = 6;

impl Display for Square {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        if self.on_board() {
            write!(
                f,
                "{}{}",
                (b'a' + self.file()) as char,
                (b'1' + self.rank()) as char
            )
        } else {
            write!(f, "off({})", self.v)
        }
    }
}

impl Debug for Square {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Square({}, {self})", self.v)
    }
}

mod tests {
    #[test]
    fn square_mapping_roundtrip() {
        use super::Square;
        for sq64 in 0..64u8 {
            let sq = Square::from_64(sq64);
            assert!(sq.on_board());
            assert_eq!(sq.index64(), sq64 as usize);
            assert_eq!(Square::from_file_rank(sq.file(), sq.rank()), sq);
        }
    }

    #[test]
    fn named_squares() {
        use super::Square;
        assert_eq!(Square::A1.to_string(), "a1");
        assert_eq!(Square::H1.to_string(), "h1");
        assert_eq!(Square::E8.to_string(), "e8");
        assert_eq!(Square::A1.index64(), 0);
        assert_eq!(Square::H8.index64(), 63);
    }

    #[test]
    fn border_cells_are_off_board() {
        use super::Square;
        for v in [0u8, 19, 20, 29, 30, 99, 100, 119] {
            assert!(!Square::from_120(v).on_board(), "cell {v}");
        }
    }
}
