use crate::{
    board::Board,
    chessmove::Move,
    history::ThreadData,
    movegen::{MoveList, MoveListEntry},
    piece::PieceType,
};

// Ordering bands. Everything noisy sits above the killers, killers above
// the counter-move, and plain quiets fight it out on history alone.
pub const TT_MOVE_SCORE: i32 = 20_000_000;
pub const CAPTURE_BASE_SCORE: i32 = 10_000_000;
pub const FIRST_KILLER_SCORE: i32 = 9_000_000;
pub const SECOND_KILLER_SCORE: i32 = 8_000_000;
pub const COUNTER_MOVE_SCORE: i32 = 6_000_000;

const VICTIM_SCORE: [i32; 7] = [100, 200, 300, 400, 500, 600, 0];

/// Most-valuable-victim / least-valuable-attacker. Coarse, but it only has
/// to order moves, not judge them.
fn mvv_lva(victim: PieceType, attacker: PieceType) -> i32 {
    VICTIM_SCORE[victim.index()] + 6 - VICTIM_SCORE[attacker.index()] / 100
}

/// Yields the moves of a position from most to least promising. All moves
/// are generated up front and scored into bands; selection is a partial
/// selection sort, so nodes that cut off early never pay for a full sort.
pub struct MovePicker {
    movelist: MoveList,
    index: usize,
}

impl MovePicker {
    pub fn new(board: &Board, t: &ThreadData, tt_move: Move, captures_only: bool) -> Self {
        let mut movelist = MoveList::new();
        if captures_only {
            board.generate_captures(&mut movelist);
        } else {
            board.generate_moves(&mut movelist);
        }

        let killers = t.killers(board.height());
        let counter = t.countermove(board.height());

        for entry in movelist.entries_mut() {
            let m = entry.mov;
            entry.score = if m == tt_move {
                TT_MOVE_SCORE
            } else if m.is_capture() || m.is_promo() {
                let victim = if m.is_ep() {
                    PieceType::PAWN
                } else if m.capture().is_piece() {
                    m.capture().piece_type()
                } else {
                    PieceType::NONE
                };
                let attacker = board.piece_at(m.from()).piece_type();
                let promo_bonus = match m.promotion().piece_type() {
                    PieceType::QUEEN => 1_000,
                    PieceType::NONE => 0,
                    _ => -2_000,
                };
                CAPTURE_BASE_SCORE + mvv_lva(victim, attacker) + promo_bonus
            } else if m == killers[0] {
                FIRST_KILLER_SCORE
            } else if m == killers[1] {
                SECOND_KILLER_SCORE
            } else if m == counter {
                COUNTER_MOVE_SCORE
            } else {
                i32::from(t.main_history.get(board.piece_at(m.from()), m.to()))
            };
        }

        Self { movelist, index: 0 }
    }

    /// One iteration of partial selection sort: swap the best remaining
    /// entry to the front and yield it.
    pub fn next(&mut self) -> Option<MoveListEntry> {
        if self.index == self.movelist.len() {
            return None;
        }

        let entries = self.movelist.entries_mut();
        let mut best_num = self.index;
        for index in self.index + 1..entries.len() {
            if entries[index].score > entries[best_num].score {
                best_num = index;
            }
        }
        entries.swap(self.index, best_num);
        let m = entries[self.index];
        self.index += 1;
        Some(m)
    }
}

mod tests {
    #[test]
    fn tt_move_comes_first() {
        use super::MovePicker;
        use crate::{board::Board, chessmove::Move, history::ThreadData};
        let board =
            Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
                .unwrap();
        let t = ThreadData::new();
        let tt_move = board.parse_uci("a2a3").unwrap();
        let mut picker = MovePicker::new(&board, &t, tt_move, false);
        assert_eq!(picker.next().unwrap().mov, tt_move);

        // without a TT move, some capture leads.
        let mut picker = MovePicker::new(&board, &t, Move::NULL, false);
        let first = picker.next().unwrap().mov;
        assert!(first.is_capture());
    }

    #[test]
    fn captures_order_by_victim_value() {
        use super::MovePicker;
        use crate::{board::Board, chessmove::Move, history::ThreadData, piece::PieceType};
        // the white knight on e5 can take the queen on d7 or the pawn on f7.
        let board = Board::from_fen("4k3/3q1p2/8/4N3/8/8/8/4K3 w - - 0 1").unwrap();
        let t = ThreadData::new();
        let mut picker = MovePicker::new(&board, &t, Move::NULL, true);
        let first = picker.next().unwrap().mov;
        assert_eq!(first.capture().piece_type(), PieceType::QUEEN);
    }

    #[test]
    fn killers_rank_above_other_quiets() {
        use super::{MovePicker, FIRST_KILLER_SCORE};
        use crate::{board::Board, chessmove::Move, history::ThreadData};
        let board = Board::starting_position();
        let mut t = ThreadData::new();
        let killer = board.parse_uci("b1c3").unwrap();
        t.insert_killer(0, killer);
        let mut picker = MovePicker::new(&board, &t, Move::NULL, false);
        let first = picker.next().unwrap();
        assert_eq!(first.mov, killer);
        assert_eq!(first.score, FIRST_KILLER_SCORE);
    }

    #[test]
    fn picker_yields_every_move_exactly_once() {
        use super::MovePicker;
        use crate::{board::Board, chessmove::Move, history::ThreadData, movegen::MoveList};
        let board =
            Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
                .unwrap();
        let t = ThreadData::new();
        let mut reference = MoveList::new();
        board.generate_moves(&mut reference);

        let mut picker = MovePicker::new(&board, &t, Move::NULL, false);
        let mut yielded = Vec::new();
        while let Some(entry) = picker.next() {
            yielded.push(entry.mov);
        }
        assert_eq!(yielded.len(), reference.len());
        for m in reference.moves() {
            assert!(yielded.contains(&m));
        }
    }
}
