use std::{
    mem::size_of,
    sync::atomic::{AtomicU64, AtomicU8, Ordering},
};

use crate::{
    chessmove::Move,
    evaluation::{MATE_SCORE, MAX_DEPTH},
};

/// Scores at or beyond this magnitude are mate scores and get ply-normalised
/// on their way in and out of the table.
const MINIMUM_MATE_SCORE: i32 = MATE_SCORE - MAX_DEPTH as i32;

pub const MEGABYTE: usize = 1024 * 1024;
pub const DEFAULT_HASH_MB: usize = 16;
pub const MIN_HASH_MB: usize = 1;
pub const MAX_HASH_MB: usize = 32 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Bound {
    None = 0,
    Upper = 1,
    Lower = 2,
    Exact = 3,
}

const MAX_AGE: i32 = 1 << 6; // must be a power of 2
const AGE_MASK: i32 = MAX_AGE - 1;

/// Age and bound packed into one byte: six bits of age, two of bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct PackedInfo {
    data: u8,
}

impl PackedInfo {
    const fn new(age: u8, flag: Bound) -> Self {
        Self {
            data: (age << 2) | flag as u8,
        }
    }

    const fn age(self) -> u8 {
        self.data >> 2
    }

    const fn flag(self) -> Bound {
        match self.data & 0b11 {
            0 => Bound::None,
            1 => Bound::Upper,
            2 => Bound::Lower,
            _ => Bound::Exact,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
struct TTEntry {
    m: u32,           // 4 bytes, Move bits; 0 for "no move"
    key: u16,         // 2 bytes, low bits of the zobrist key
    score: i16,       // 2 bytes
    evaluation: i16,  // 2 bytes
    depth: u8,        // 1 byte
    info: PackedInfo, // 1 byte
}

const CLUSTER_SIZE: usize = 3;

/// Backing memory for one cluster: three entries plus padding, stored as
/// whole atomic words so concurrent access can tear an entry apart but
/// never a word, and the key tag check rejects torn garbage.
#[derive(Debug, Default)]
#[repr(C, align(16))]
struct TTClusterMemory {
    memory: [AtomicU64; 6],
}

#[repr(C, align(16))]
struct TTCluster {
    entries: [TTEntry; CLUSTER_SIZE],
    padding: [u8; 12],
}

impl TTClusterMemory {
    fn load(&self) -> TTCluster {
        let mut words = [0u64; 6];
        for (word, memory) in words.iter_mut().zip(&self.memory) {
            *word = memory.load(Ordering::Relaxed);
        }
        // Safety: TTCluster is POD and any bitpattern of it is valid.
        unsafe { std::mem::transmute::<[u64; 6], TTCluster>(words) }
    }

    fn store(&self, cluster: TTCluster) {
        // Safety: [u64; 6] is POD.
        let words = unsafe { std::mem::transmute::<TTCluster, [u64; 6]>(cluster) };
        for (word, memory) in words.iter().zip(&self.memory) {
            memory.store(*word, Ordering::Relaxed);
        }
    }

    fn clear(&self) {
        for memory in &self.memory {
            memory.store(0, Ordering::Relaxed);
        }
    }
}

const _CLUSTER_SIZE_CHECK: () = assert!(
    size_of::<TTClusterMemory>() == 48 && size_of::<TTCluster>() == 48,
    "TT cluster layout drifted away from 48 bytes"
);

#[derive(Debug)]
pub struct TT {
    table: Vec<TTClusterMemory>,
    age: AtomicU8,
}

#[derive(Clone, Copy)]
pub struct TTView<'a> {
    table: &'a [TTClusterMemory],
    age: u8,
}

#[derive(Debug, Clone, Copy)]
pub struct TTHit {
    pub mov: Move,
    pub depth: i32,
    pub bound: Bound,
    pub value: i32,
    pub eval: i32,
}

impl TT {
    pub const fn new() -> Self {
        Self {
            table: Vec::new(),
            age: AtomicU8::new(0),
        }
    }

    pub fn with_size_mb(mb: usize) -> Self {
        let mut out = Self::new();
        out.resize(mb * MEGABYTE);
        out
    }

    /// Resizes to the largest power-of-two cluster count that fits in
    /// `bytes`. If the allocation fails the request is halved until it
    /// succeeds, so an over-ambitious Hash option degrades instead of
    /// aborting.
    pub fn resize(&mut self, bytes: usize) {
        let mut new_len = (bytes / size_of::<TTClusterMemory>())
            .next_power_of_two()
            .max(2);
        if new_len * size_of::<TTClusterMemory>() > bytes {
            new_len /= 2;
        }
        // dealloc the old table before allocating the new one:
        self.table = Vec::new();
        loop {
            // SAFETY: zeroed memory is a legal bitpattern for AtomicU64.
            unsafe {
                let layout = std::alloc::Layout::array::<TTClusterMemory>(new_len).unwrap();
                let ptr = std::alloc::alloc_zeroed(layout);
                if ptr.is_null() {
                    if new_len > 1 {
                        new_len /= 2;
                        continue;
                    }
                    std::alloc::handle_alloc_error(layout);
                }
                self.table = Vec::from_raw_parts(ptr.cast(), new_len, new_len);
            }
            break;
        }
        self.age.store(0, Ordering::Relaxed);
    }

    pub fn clear(&self) {
        for cluster in &self.table {
            cluster.clear();
        }
    }

    pub const fn pack_key(key: u64) -> u16 {
        #![allow(clippy::cast_possible_truncation)]
        key as u16
    }

    pub fn view(&self) -> TTView<'_> {
        TTView {
            table: &self.table,
            age: self.age.load(Ordering::Relaxed),
        }
    }

    /// Bumps the generation counter; called once per `go`.
    pub fn increase_age(&self) {
        #![allow(clippy::cast_possible_truncation)]
        let new_age = (self.age.load(Ordering::Relaxed) + 1) & AGE_MASK as u8;
        self.age.store(new_age, Ordering::Relaxed);
    }

    pub fn size_bytes(&self) -> usize {
        self.table.len() * size_of::<TTClusterMemory>()
    }
}

impl TTView<'_> {
    fn wrap_key(&self, key: u64) -> usize {
        #![allow(clippy::cast_possible_truncation)]
        // table length is always a power of two.
        (key & (self.table.len() as u64 - 1)) as usize
    }

    pub fn store(
        &self,
        key: u64,
        ply: usize,
        mut best_move: Move,
        score: i32,
        eval: i32,
        flag: Bound,
        depth: i32,
    ) {
        let cluster_index = self.wrap_key(key);
        let key = TT::pack_key(key);
        let tt_age = i32::from(self.age);
        let mut cluster = self.table[cluster_index].load();
        let mut tte = cluster.entries[0];
        let mut idx = 0;

        // pick the slot: matching or empty if possible, otherwise the one
        // with the lowest depth after an age discount.
        if !(tte.key == 0 || tte.key == key) {
            for i in 1..CLUSTER_SIZE {
                let entry = cluster.entries[i];

                if entry.key == 0 || entry.key == key {
                    tte = entry;
                    idx = i;
                    break;
                }

                if i32::from(tte.depth)
                    - ((MAX_AGE + tt_age - i32::from(tte.info.age())) & AGE_MASK) * 4
                    > i32::from(entry.depth)
                        - ((MAX_AGE + tt_age - i32::from(entry.info.age())) & AGE_MASK) * 4
                {
                    tte = entry;
                    idx = i;
                }
            }
        }

        // keep the old best move if the caller has none for this position.
        if best_move.is_null() && tte.key == key {
            best_move = Move::from_bits(tte.m);
        }

        let same_position = tte.key == key;
        let age_differential = (MAX_AGE + tt_age - i32::from(tte.info.age())) & AGE_MASK;

        // replace when the position differs, the bound got sharper, the
        // entry aged out, or the new depth is within 3 of the recorded one.
        if !same_position
            || flag == Bound::Exact && tte.info.flag() != Bound::Exact
            || age_differential != 0
            || depth + 3 >= i32::from(tte.depth)
        {
            let write = TTEntry {
                m: best_move.bits(),
                key,
                score: value_to_tt(score, ply)
                    .try_into()
                    .expect("score does not fit in the transposition table"),
                evaluation: eval
                    .try_into()
                    .expect("eval does not fit in the transposition table"),
                depth: depth.clamp(0, MAX_DEPTH as i32) as u8,
                info: PackedInfo::new(self.age, flag),
            };
            cluster.entries[idx] = write;
            self.table[cluster_index].store(cluster);
        }
    }

    pub fn probe(&self, key: u64, ply: usize) -> Option<TTHit> {
        let index = self.wrap_key(key);
        let key = TT::pack_key(key);

        let mut cluster = self.table[index].load();

        for slot in 0..CLUSTER_SIZE {
            let entry = cluster.entries[slot];
            if entry.key != key {
                continue;
            }
            // refresh the generation so entries on hot paths don't become
            // eviction fodder in the replacement scan.
            if entry.info.age() != self.age {
                cluster.entries[slot].info = PackedInfo::new(self.age, entry.info.flag());
                self.table[index].store(cluster);
            }
            return Some(TTHit {
                mov: Move::from_bits(entry.m),
                depth: entry.depth.into(),
                bound: entry.info.flag(),
                value: value_from_tt(entry.score.into(), ply),
                eval: entry.evaluation.into(),
            });
        }
        None
    }

    pub fn probe_move(&self, key: u64) -> Option<Move> {
        self.probe(key, 0).map(|hit| hit.mov)
    }

    /// Permille of sampled entries that belong to the current generation.
    pub fn hashfull(&self) -> usize {
        let sample = self.table.len().min(1000);
        let mut hit = 0;
        for cluster in &self.table[..sample] {
            let cluster = cluster.load();
            for entry in &cluster.entries {
                if entry.key != 0 && entry.info.age() == self.age {
                    hit += 1;
                }
            }
        }
        if sample == 0 {
            0
        } else {
            hit * 1000 / (sample * CLUSTER_SIZE)
        }
    }
}

/// Mate scores are stored relative to the storing node so they stay correct
/// when probed at a different distance from the root.
const fn value_to_tt(mut score: i32, ply: usize) -> i32 {
    #![allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    if score >= MINIMUM_MATE_SCORE {
        score += ply as i32;
    } else if score <= -MINIMUM_MATE_SCORE {
        score -= ply as i32;
    }
    score
}

const fn value_from_tt(mut score: i32, ply: usize) -> i32 {
    #![allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    if score >= MINIMUM_MATE_SCORE {
        score -= ply as i32;
    } else if score <= -MINIMUM_MATE_SCORE {
        score += ply as i32;
    }
    score
}

mod tests {
    #[test]
    fn store_probe_roundtrip() {
        use super::{Bound, TT};
        use crate::board::Board;
        let tt = TT::with_size_mb(1);
        let view = tt.view();
        let board = Board::starting_position();
        let m = board.parse_uci("e2e4").unwrap();

        view.store(board.hashkey(), 0, m, 17, 12, Bound::Exact, 5);
        let hit = view.probe(board.hashkey(), 0).expect("entry vanished");
        assert_eq!(hit.mov, m);
        assert_eq!(hit.value, 17);
        assert_eq!(hit.eval, 12);
        assert_eq!(hit.depth, 5);
        assert_eq!(hit.bound, Bound::Exact);

        // unrelated keys miss.
        assert!(view.probe(board.hashkey() ^ 0xDEAD_BEEF_CAFE_F00D, 0).is_none());
    }

    #[test]
    fn mate_scores_are_ply_normalised() {
        use super::{value_from_tt, value_to_tt};
        use crate::evaluation::{mate_in, mated_in};
        // a mate found 6 plies into the search, stored at ply 6 and probed
        // at ply 2, must read as a mate 4 plies closer.
        let stored = value_to_tt(mate_in(6), 6);
        assert_eq!(value_from_tt(stored, 2), mate_in(2));
        let stored = value_to_tt(mated_in(6), 6);
        assert_eq!(value_from_tt(stored, 2), mated_in(2));
        // non-mate scores pass through untouched.
        assert_eq!(value_from_tt(value_to_tt(250, 6), 2), 250);
    }

    #[test]
    fn deeper_entries_survive_shallow_overwrites() {
        use super::{Bound, TT};
        use crate::chessmove::Move;
        let tt = TT::with_size_mb(1);
        let view = tt.view();
        let key = 0x0123_4567_89AB_CDEF;

        view.store(key, 0, Move::NULL, 100, 100, Bound::Exact, 40);
        // a much shallower upper-bound result for the same position should
        // not clobber the deep exact entry.
        view.store(key, 0, Move::NULL, 5, 5, Bound::Upper, 1);
        let hit = view.probe(key, 0).unwrap();
        assert_eq!(hit.depth, 40);
        assert_eq!(hit.bound, Bound::Exact);
    }

    #[test]
    fn probe_hits_refresh_entry_age() {
        use super::{Bound, TT};
        use crate::chessmove::Move;
        let tt = TT::with_size_mb(1);
        let key = 0x0123_4567_89AB_CDEF;

        tt.view().store(key, 0, Move::NULL, 100, 100, Bound::Exact, 40);
        // a generation later, a probe hit must pull the entry into the
        // current generation; otherwise the aged-out arm of the replacement
        // test lets this shallow upper bound wipe the deep exact entry.
        tt.increase_age();
        let view = tt.view();
        assert!(view.probe(key, 0).is_some());
        view.store(key, 0, Move::NULL, 5, 5, Bound::Upper, 1);
        let hit = view.probe(key, 0).unwrap();
        assert_eq!(hit.depth, 40);
        assert_eq!(hit.bound, Bound::Exact);
    }

    #[test]
    fn table_sizes_to_power_of_two() {
        use super::{TT, MEGABYTE};
        let tt = TT::with_size_mb(2);
        let clusters = tt.size_bytes() / 48;
        assert!(clusters.is_power_of_two());
        assert!(tt.size_bytes() <= 2 * MEGABYTE);
    }
}
