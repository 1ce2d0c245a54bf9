use crate::{
    chessmove::Move,
    evaluation::MAX_DEPTH,
    piece::Piece,
    squares::{Square, BOARD_N_SQUARES},
};

const AGEING_DIVISOR: i16 = 2;

pub const MAX_HISTORY: i16 = i16::MAX / 2;

const fn history_bonus(depth: i32) -> i32 {
    if depth > 13 {
        32
    } else {
        16 * depth * depth + 128 * if depth > 1 { depth - 1 } else { 0 }
    }
}

/// Gravity update: deltas shrink as the entry approaches saturation, so the
/// table self-normalises instead of pegging at the rails.
pub fn update_history(val: &mut i16, depth: i32, is_good: bool) {
    #![allow(clippy::cast_possible_truncation)]
    let delta = if is_good {
        history_bonus(depth)
    } else {
        -history_bonus(depth)
    };
    *val += delta as i16 - (i32::from(*val) * delta.abs() / i32::from(MAX_HISTORY)) as i16;
}

/// Butterfly history indexed by moving piece and destination square.
#[derive(Clone)]
pub struct HistoryTable {
    table: [[i16; BOARD_N_SQUARES]; Piece::N_PIECES],
}

impl HistoryTable {
    pub const fn new() -> Self {
        Self {
            table: [[0; BOARD_N_SQUARES]; Piece::N_PIECES],
        }
    }

    pub fn clear(&mut self) {
        self.table.iter_mut().flatten().for_each(|x| *x = 0);
    }

    pub fn age_entries(&mut self) {
        self.table
            .iter_mut()
            .flatten()
            .for_each(|x| *x /= AGEING_DIVISOR);
    }

    pub const fn get(&self, piece: Piece, sq: Square) -> i16 {
        self.table[piece.index()][sq.index64()]
    }

    pub fn get_mut(&mut self, piece: Piece, sq: Square) -> &mut i16 {
        &mut self.table[piece.index()][sq.index64()]
    }
}

/// One remembered move per (piece, to-square) pair; used for counter-moves.
#[derive(Clone)]
pub struct MoveTable {
    table: Vec<Move>,
}

impl MoveTable {
    pub const fn new() -> Self {
        Self { table: Vec::new() }
    }

    pub fn clear(&mut self) {
        if self.table.is_empty() {
            self.table
                .resize(BOARD_N_SQUARES * Piece::N_PIECES, Move::NULL);
        } else {
            self.table.fill(Move::NULL);
        }
    }

    pub fn add(&mut self, piece: Piece, sq: Square, m: Move) {
        self.table[piece.index() * BOARD_N_SQUARES + sq.index64()] = m;
    }

    pub fn get(&self, piece: Piece, sq: Square) -> Move {
        self.table[piece.index() * BOARD_N_SQUARES + sq.index64()]
    }
}

/// Per-height scratch state for the search.
#[derive(Clone, Copy)]
pub struct StackEntry {
    pub eval: i32,
    /// Move excluded at this height by a singular verification search.
    pub excluded: Move,
    /// The move currently being searched, and the piece that makes it;
    /// the child height reads these for counter-move lookups.
    pub searching: Move,
    pub searching_piece: Piece,
    pub double_extensions: i32,
}

impl Default for StackEntry {
    fn default() -> Self {
        Self {
            eval: 0,
            excluded: Move::NULL,
            searching: Move::NULL,
            searching_piece: Piece::EMPTY,
            double_extensions: 0,
        }
    }
}

const STACK_SIZE: usize = MAX_DEPTH + 8;

/// All the per-search mutable state that isn't the board: the ordering
/// heuristics and the height-indexed stack.
pub struct ThreadData {
    pub main_history: HistoryTable,
    pub killer_move_table: [[Move; 2]; STACK_SIZE],
    pub counter_move_table: MoveTable,
    pub stack: [StackEntry; STACK_SIZE],
}

impl ThreadData {
    pub fn new() -> Self {
        let mut out = Self {
            main_history: HistoryTable::new(),
            killer_move_table: [[Move::NULL; 2]; STACK_SIZE],
            counter_move_table: MoveTable::new(),
            stack: [StackEntry::default(); STACK_SIZE],
        };
        out.counter_move_table.clear();
        out
    }

    /// Full reset, for `ucinewgame`.
    pub fn clear(&mut self) {
        self.main_history.clear();
        self.killer_move_table = [[Move::NULL; 2]; STACK_SIZE];
        self.counter_move_table.clear();
        self.stack = [StackEntry::default(); STACK_SIZE];
    }

    /// Soft reset between searches of the same game: halve the history so
    /// old preferences decay but aren't forgotten.
    pub fn prepare_for_search(&mut self) {
        self.main_history.age_entries();
        self.killer_move_table = [[Move::NULL; 2]; STACK_SIZE];
        self.stack = [StackEntry::default(); STACK_SIZE];
    }

    pub fn insert_killer(&mut self, height: usize, m: Move) {
        debug_assert!(height < STACK_SIZE);
        let slot = &mut self.killer_move_table[height];
        if slot[0] != m {
            slot[1] = slot[0];
            slot[0] = m;
        }
    }

    pub fn killers(&self, height: usize) -> [Move; 2] {
        debug_assert!(height < STACK_SIZE);
        self.killer_move_table[height]
    }

    /// The counter-move is keyed by the opponent move one height up.
    pub fn insert_countermove(&mut self, height: usize, m: Move) {
        if height == 0 {
            return;
        }
        let prev = self.stack[height - 1];
        if prev.searching.is_null() {
            return;
        }
        self.counter_move_table
            .add(prev.searching_piece, prev.searching.to(), m);
    }

    pub fn countermove(&self, height: usize) -> Move {
        if height == 0 {
            return Move::NULL;
        }
        let prev = self.stack[height - 1];
        if prev.searching.is_null() {
            return Move::NULL;
        }
        self.counter_move_table
            .get(prev.searching_piece, prev.searching.to())
    }
}

impl Default for ThreadData {
    fn default() -> Self {
        Self::new()
    }
}

mod tests {
    #[test]
    fn history_saturates_gracefully() {
        use super::{update_history, MAX_HISTORY};
        let mut val = 0i16;
        for _ in 0..10_000 {
            update_history(&mut val, 10, true);
            assert!(val <= MAX_HISTORY);
        }
        assert!(val > MAX_HISTORY / 2);
        // a bad result pulls it back down.
        let before = val;
        update_history(&mut val, 10, false);
        assert!(val < before);
    }

    #[test]
    fn killers_do_not_duplicate() {
        use super::ThreadData;
        use crate::board::Board;
        let board = Board::starting_position();
        let m1 = board.parse_uci("e2e4").unwrap();
        let m2 = board.parse_uci("d2d4").unwrap();
        let mut td = ThreadData::new();
        td.insert_killer(3, m1);
        td.insert_killer(3, m1);
        assert_eq!(td.killers(3), [m1, crate::chessmove::Move::NULL]);
        td.insert_killer(3, m2);
        assert_eq!(td.killers(3), [m2, m1]);
    }

    #[test]
    fn countermove_follows_the_previous_move() {
        use super::ThreadData;
        use crate::board::Board;
        let board = Board::starting_position();
        let e4 = board.parse_uci("e2e4").unwrap();
        let nf3 = board.parse_uci("g1f3").unwrap();
        let mut td = ThreadData::new();
        td.stack[0].searching = e4;
        td.stack[0].searching_piece = crate::piece::Piece::WP;
        td.insert_countermove(1, nf3);
        assert_eq!(td.countermove(1), nf3);
        assert_eq!(td.countermove(0), crate::chessmove::Move::NULL);
    }
}
