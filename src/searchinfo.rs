use std::sync::mpsc;

use crate::timemgmt::{SearchLimit, TimeManager};

/// Per-search bookkeeping: the clock, the node counter, and the channels
/// that let `stop`/`quit` reach us mid-search.
pub struct SearchInfo<'a> {
    pub time_manager: TimeManager,
    pub nodes: u64,
    pub seldepth: usize,
    /// Signal to stop the current search.
    pub stopped: bool,
    /// Signal to tear the whole engine down.
    pub quit: bool,
    /// A handle to a receiver for stdin, so a blocking read of the next
    /// command doubles as the stop listener.
    pub stdin_rx: Option<&'a mpsc::Receiver<String>>,
    pub print_to_stdout: bool,
}

impl Default for SearchInfo<'_> {
    fn default() -> Self {
        Self {
            time_manager: TimeManager::default(),
            nodes: 0,
            seldepth: 0,
            stopped: false,
            quit: false,
            stdin_rx: None,
            print_to_stdout: true,
        }
    }
}

impl<'a> SearchInfo<'a> {
    pub fn new(limit: SearchLimit) -> Self {
        Self {
            time_manager: TimeManager::new(limit),
            ..Self::default()
        }
    }

    pub fn set_stdin(&mut self, stdin_rx: &'a mpsc::Receiver<String>) {
        self.stdin_rx = Some(stdin_rx);
    }

    pub fn clear_for_search(&mut self) {
        self.nodes = 0;
        self.seldepth = 0;
        self.stopped = false;
    }

    /// Polled every 1024 nodes from inside the tree.
    pub fn check_up(&mut self) {
        if self.time_manager.check_up(self.nodes) {
            self.stopped = true;
        }
        if let Some(Ok(cmd)) = self.stdin_rx.map(mpsc::Receiver::try_recv) {
            let cmd = cmd.trim();
            if cmd == "stop" {
                self.stopped = true;
            } else if cmd == "quit" {
                self.stopped = true;
                self.quit = true;
            }
        }
    }

    pub const fn interrupted(&self) -> bool {
        self.stopped
    }
}

mod tests {
    #[test]
    fn node_limit_interrupts() {
        use super::SearchInfo;
        use crate::timemgmt::SearchLimit;
        let mut info = SearchInfo::new(SearchLimit::Nodes(100));
        info.nodes = 50;
        info.check_up();
        assert!(!info.interrupted());
        info.nodes = 100;
        info.check_up();
        assert!(info.interrupted());
    }

    #[test]
    fn stop_command_interrupts() {
        use super::SearchInfo;
        use std::sync::mpsc;
        let (tx, rx) = mpsc::channel();
        let mut info = SearchInfo::default();
        info.set_stdin(&rx);
        tx.send("stop\n".to_string()).unwrap();
        info.check_up();
        assert!(info.interrupted());
        assert!(!info.quit);
    }
}
