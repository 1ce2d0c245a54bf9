use std::time::{Duration, Instant};

use crate::evaluation::MAX_DEPTH;

/// Milliseconds held back from every window to cover move transmission.
const MOVE_OVERHEAD: u64 = 10;

/// What the `go` command asked of us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchLimit {
    Infinite,
    Depth(i32),
    Nodes(u64),
    MoveTime(u64),
    /// A live clock: think for a slice of the remaining time.
    Dynamic {
        our_clock: u64,
        our_inc: u64,
        moves_to_go: Option<u64>,
    },
}

impl SearchLimit {
    pub const fn depth_limit(self) -> i32 {
        match self {
            Self::Depth(d) => d,
            _ => MAX_DEPTH as i32,
        }
    }
}

/// Clock bookkeeping for one search. The optimum window is the point past
/// which starting another iteration isn't worth it; the maximum window is
/// the hard abort inside the tree.
pub struct TimeManager {
    start_time: Instant,
    limit: SearchLimit,
    opt_time: Duration,
    max_time: Duration,
}

impl TimeManager {
    pub fn new(limit: SearchLimit) -> Self {
        let (opt_time, max_time) = Self::compute_time_windows(limit);
        Self {
            start_time: Instant::now(),
            limit,
            opt_time,
            max_time,
        }
    }

    fn compute_time_windows(limit: SearchLimit) -> (Duration, Duration) {
        match limit {
            SearchLimit::MoveTime(millis) => {
                let window = Duration::from_millis(millis.saturating_sub(MOVE_OVERHEAD));
                (window, window)
            }
            SearchLimit::Dynamic {
                our_clock,
                our_inc,
                moves_to_go,
            } => {
                let clock = our_clock.saturating_sub(MOVE_OVERHEAD);
                // with no horizon given, budget for a longish game.
                let base = clock / moves_to_go.unwrap_or(25).max(1) + our_inc * 3 / 4;
                let opt = base * 6 / 10;
                let max = (base * 2).min(clock / 2);
                (
                    Duration::from_millis(opt),
                    Duration::from_millis(max.max(1)),
                )
            }
            _ => (Duration::MAX, Duration::MAX),
        }
    }

    pub const fn limit(&self) -> SearchLimit {
        self.limit
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn is_past_opt_time(&self) -> bool {
        self.elapsed() >= self.opt_time
    }

    pub fn is_past_max_time(&self) -> bool {
        self.elapsed() >= self.max_time
    }

    /// Should the in-tree node poll stop the search?
    pub fn check_up(&self, nodes: u64) -> bool {
        match self.limit {
            SearchLimit::Infinite | SearchLimit::Depth(_) => false,
            SearchLimit::Nodes(max_nodes) => nodes >= max_nodes,
            SearchLimit::MoveTime(_) | SearchLimit::Dynamic { .. } => self.is_past_max_time(),
        }
    }

    /// Should we begin another iterative-deepening iteration?
    pub fn can_start_iteration(&self, depth: i32) -> bool {
        if depth > self.limit.depth_limit() {
            return false;
        }
        match self.limit {
            SearchLimit::MoveTime(_) | SearchLimit::Dynamic { .. } => !self.is_past_opt_time(),
            _ => true,
        }
    }
}

impl Default for TimeManager {
    fn default() -> Self {
        Self::new(SearchLimit::Infinite)
    }
}

mod tests {
    #[test]
    fn depth_limit_caps_iteration() {
        use super::{SearchLimit, TimeManager};
        let tm = TimeManager::new(SearchLimit::Depth(4));
        assert!(tm.can_start_iteration(4));
        assert!(!tm.can_start_iteration(5));
    }

    #[test]
    fn node_limit_stops_the_poll() {
        use super::{SearchLimit, TimeManager};
        let tm = TimeManager::new(SearchLimit::Nodes(5_000));
        assert!(!tm.check_up(4_999));
        assert!(tm.check_up(5_000));
    }

    #[test]
    fn infinite_never_stops() {
        use super::{SearchLimit, TimeManager};
        let tm = TimeManager::new(SearchLimit::Infinite);
        assert!(!tm.check_up(u64::MAX));
        assert!(tm.can_start_iteration(100));
    }

    #[test]
    fn dynamic_windows_are_ordered() {
        use super::{SearchLimit, TimeManager};
        let tm = TimeManager::new(SearchLimit::Dynamic {
            our_clock: 60_000,
            our_inc: 1_000,
            moves_to_go: None,
        });
        assert!(tm.opt_time <= tm.max_time);
        assert!(!tm.is_past_opt_time());
    }
}
