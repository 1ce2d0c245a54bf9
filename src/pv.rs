use std::fmt::{self, Display, Formatter};

use arrayvec::ArrayVec;

use crate::{chessmove::Move, evaluation::MAX_DEPTH};

/// A principal variation: the engine's preferred line from some node.
#[derive(Clone, Default)]
pub struct PVariation {
    line: ArrayVec<Move, MAX_DEPTH>,
}

impl PVariation {
    pub fn moves(&self) -> &[Move] {
        &self.line
    }

    pub fn best_move(&self) -> Option<Move> {
        self.line.first().copied()
    }

    pub fn clear(&mut self) {
        self.line.clear();
    }

    /// Sets this line to `m` followed by the continuation found below it.
    pub fn load_from(&mut self, m: Move, rest: &Self) {
        self.line.clear();
        self.line.push(m);
        for &continuation in rest.moves().iter().take(self.line.remaining_capacity()) {
            self.line.push(continuation);
        }
    }
}

impl Display for PVariation {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let mut first = true;
        for m in &self.line {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{m}")?;
            first = false;
        }
        Ok(())
    }
}

mod tests {
    #[test]
    fn load_from_prepends() {
        use super::PVariation;
        use crate::board::Board;
        let board = Board::starting_position();
        let e4 = board.parse_uci("e2e4").unwrap();
        let d4 = board.parse_uci("d2d4").unwrap();

        let mut tail = PVariation::default();
        tail.load_from(d4, &PVariation::default());
        let mut pv = PVariation::default();
        pv.load_from(e4, &tail);

        assert_eq!(pv.moves(), [e4, d4]);
        assert_eq!(pv.best_move(), Some(e4));
        assert_eq!(pv.to_string(), "e2e4 d2d4");
    }
}
