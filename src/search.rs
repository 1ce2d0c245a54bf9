#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]

use std::sync::OnceLock;

use arrayvec::ArrayVec;

use crate::{
    board::Board,
    chessmove::Move,
    evaluation::{
        is_mate_score, mate_in, mated_in, DRAW_SCORE, INFINITY, MATE_SCORE, MAX_DEPTH, PAWN_VALUE,
        PIECE_VALUES,
    },
    history::{update_history, ThreadData},
    movegen::MAX_POSITION_MOVES,
    movepicker::MovePicker,
    piece::{Colour, Piece},
    pv::PVariation,
    searchinfo::SearchInfo,
    transpositiontable::{Bound, TTView},
    uci,
};

const ASPIRATION_WINDOW: i32 = 6;
const RFP_MARGIN: i32 = 64;
const RFP_IMPROVING_MARGIN: i32 = 50;
const RFP_DEPTH: i32 = 8;
const NMP_BASE_REDUCTION: i32 = 3;
const NMP_REDUCTION_EVAL_DIVISOR: i32 = 192;
const NMP_VERIFICATION_DEPTH: i32 = 12;
const FUTILITY_COEFF_0: i32 = 82;
const FUTILITY_COEFF_1: i32 = 101;
const FUTILITY_DEPTH: i32 = 6;
const RAZORING_COEFF_0: i32 = 427;
const RAZORING_COEFF_1: i32 = 167;
const PROBCUT_MARGIN: i32 = 227;
const PROBCUT_IMPROVING_MARGIN: i32 = 58;
const PROBCUT_MIN_DEPTH: i32 = 5;
const LMP_DEPTH: i32 = 8;
const HISTORY_PRUNING_DEPTH: i32 = 4;
const HISTORY_PRUNING_MARGIN: i32 = -2048;
const SINGULARITY_DEPTH: i32 = 8;
const DOUBLE_EXTENSION_MARGIN: i32 = 17;
const DOUBLE_EXTENSION_LIMIT: i32 = 5;

const LMR_BASE: f64 = 85.0;
const LMR_DIVISION: f64 = 206.0;

const QS_FUTILITY: i32 = 220;

const MINIMUM_MATE_SCORE: i32 = MATE_SCORE - MAX_DEPTH as i32;

/// Compile-time node classification: the root, nodes on the principal
/// variation, and everything else. Zero-window searches run as `OffPV` and
/// skip all the PV-only work.
pub trait NodeType {
    const PV: bool;
    const ROOT: bool;
    type Next: NodeType;
}

pub struct Root;
pub struct OnPV;
pub struct OffPV;

impl NodeType for Root {
    const PV: bool = true;
    const ROOT: bool = true;
    type Next = OnPV;
}
impl NodeType for OnPV {
    const PV: bool = true;
    const ROOT: bool = false;
    type Next = OnPV;
}
impl NodeType for OffPV {
    const PV: bool = false;
    const ROOT: bool = false;
    type Next = OffPV;
}

struct LMTable {
    table: [[i32; 64]; 64],
}

impl LMTable {
    fn new() -> Self {
        let mut table = [[0; 64]; 64];
        let (base, division) = (LMR_BASE / 100.0, LMR_DIVISION / 100.0);
        for (depth, row) in table.iter_mut().enumerate().skip(1) {
            for (played, entry) in row.iter_mut().enumerate().skip(1) {
                let ld = f64::ln(depth as f64);
                let lp = f64::ln(played as f64);
                *entry = (base + ld * lp / division) as i32;
            }
        }
        Self { table }
    }
}

fn lmr_reduction(depth: i32, moves_made: usize) -> i32 {
    static TABLE: OnceLock<LMTable> = OnceLock::new();
    let table = TABLE.get_or_init(LMTable::new);
    table.table[depth.clamp(0, 63) as usize][moves_made.min(63)]
}

const fn rfp_margin(depth: i32, improving: bool) -> i32 {
    RFP_MARGIN * depth - if improving { RFP_IMPROVING_MARGIN } else { 0 }
}

struct AspirationWindow {
    alpha: i32,
    beta: i32,
    delta: i32,
}

impl AspirationWindow {
    const fn infinite() -> Self {
        Self {
            alpha: -INFINITY,
            beta: INFINITY,
            delta: ASPIRATION_WINDOW,
        }
    }

    fn around_value(value: i32, depth: i32) -> Self {
        if is_mate_score(value) {
            // mate scores jump around too much to aspire to.
            return Self::infinite();
        }
        let delta = (ASPIRATION_WINDOW + (50 / depth - 3)).max(10);
        Self {
            alpha: (value - delta).max(-INFINITY),
            beta: (value + delta).min(INFINITY),
            delta,
        }
    }

    fn widen_down(&mut self, value: i32) {
        self.delta += self.delta / 2;
        self.beta = (self.alpha + self.beta) / 2;
        let lower = value - self.delta;
        self.alpha = if lower < -2000 { -INFINITY } else { lower };
    }

    fn widen_up(&mut self, value: i32) {
        self.delta += self.delta / 2;
        let upper = value + self.delta;
        self.beta = if upper > 2000 { INFINITY } else { upper };
    }
}

impl Board {
    /// The iterative-deepening driver: runs progressively deeper
    /// alpha-beta searches, each inside an aspiration window centred on the
    /// previous score, until the clock or a limit says stop. Returns the
    /// final score and best move.
    pub fn search_position(
        &mut self,
        info: &mut SearchInfo,
        t: &mut ThreadData,
        tt: TTView,
    ) -> (i32, Move) {
        self.set_height(0);
        info.clear_for_search();
        t.prepare_for_search();

        if self.count_legal_moves() == 0 {
            let score = if self.in_check() {
                mated_in(0)
            } else {
                DRAW_SCORE
            };
            return (score, Move::NULL);
        }

        // the game may already be over by claimable draw; play anything.
        if self.is_threefold_repetition() || self.is_fifty_move_draw() {
            let m = self.default_move(t, tt);
            return (DRAW_SCORE, m);
        }

        let mut pv = PVariation::default();
        let mut best_move = Move::NULL;
        let mut best_score = 0;

        let max_depth = info.time_manager.limit().depth_limit();
        'deepening: for depth in 1..=max_depth {
            if !info.time_manager.can_start_iteration(depth) {
                break;
            }
            let mut aw = if depth > 4 {
                AspirationWindow::around_value(best_score, depth)
            } else {
                AspirationWindow::infinite()
            };
            let score = loop {
                let score =
                    self.alpha_beta::<Root>(&mut pv, info, t, tt, depth, aw.alpha, aw.beta, false);
                if info.interrupted() {
                    break 'deepening;
                }
                if aw.alpha != -INFINITY && score <= aw.alpha {
                    if info.print_to_stdout {
                        uci::readout_info(info, tt, depth, score, &pv, Bound::Upper);
                    }
                    aw.widen_down(score);
                    continue;
                }
                if aw.beta != INFINITY && score >= aw.beta {
                    if info.print_to_stdout {
                        uci::readout_info(info, tt, depth, score, &pv, Bound::Lower);
                    }
                    aw.widen_up(score);
                    continue;
                }
                break score;
            };

            best_score = score;
            if let Some(m) = pv.best_move() {
                best_move = m;
            }
            if info.print_to_stdout {
                uci::readout_info(info, tt, depth, score, &pv, Bound::Exact);
            }

            // a forced mate doesn't get better with more depth.
            if is_mate_score(score) && MATE_SCORE - score.abs() < depth {
                break;
            }
        }

        if best_move.is_null() {
            best_move = self.default_move(t, tt);
        }
        (best_score, best_move)
    }

    /// Any legal move, for when the search was stopped before the first
    /// iteration completed.
    fn default_move(&mut self, t: &ThreadData, tt: TTView) -> Move {
        let tt_move = tt.probe_move(self.hashkey()).unwrap_or(Move::NULL);
        let mut picker = MovePicker::new(self, t, tt_move, false);
        while let Some(entry) = picker.next() {
            if self.make_move(entry.mov) {
                self.unmake_move();
                return entry.mov;
            }
        }
        Move::NULL
    }

    /// The main alpha-beta search, fail-soft. `do_null` guards against
    /// back-to-back null moves.
    #[allow(clippy::too_many_lines, clippy::cognitive_complexity, clippy::too_many_arguments)]
    pub fn alpha_beta<NT: NodeType>(
        &mut self,
        pv: &mut PVariation,
        info: &mut SearchInfo,
        t: &mut ThreadData,
        tt: TTView,
        mut depth: i32,
        mut alpha: i32,
        mut beta: i32,
        in_null: bool,
    ) -> i32 {
        #[cfg(debug_assertions)]
        self.check_validity();

        let mut local_pv = PVariation::default();
        let l_pv = &mut local_pv;
        pv.clear();

        if depth <= 0 {
            return self.quiescence::<NT>(pv, info, t, tt, alpha, beta);
        }

        info.nodes += 1;
        if info.nodes % 1024 == 0 {
            info.check_up();
        }
        if info.stopped {
            return 0;
        }

        let height = self.height();
        info.seldepth = info.seldepth.max(height);

        let in_check = self.in_check();

        if !NT::ROOT {
            if self.is_draw() {
                return DRAW_SCORE;
            }
            if height >= MAX_DEPTH {
                return if in_check { 0 } else { self.evaluate() };
            }

            // mate-distance pruning: even a mate here can't beat a shorter
            // mate found closer to the root.
            alpha = alpha.max(mated_in(height));
            beta = beta.min(mate_in(height + 1));
            if alpha >= beta {
                return alpha;
            }
        }

        let key = self.hashkey();
        let excluded = t.stack[height].excluded;

        let tt_hit = if excluded.is_null() {
            tt.probe(key, height)
        } else {
            // singular verification pretends the TT entry doesn't exist.
            None
        };
        if let Some(hit) = tt_hit {
            if !NT::PV
                && hit.depth >= depth
                && match hit.bound {
                    Bound::Exact => true,
                    Bound::Lower => hit.value >= beta,
                    Bound::Upper => hit.value <= alpha,
                    Bound::None => false,
                }
            {
                return hit.value;
            }
        }
        let tt_move = tt_hit.map_or(Move::NULL, |hit| hit.mov);

        // the TT carries the static eval from an earlier visit; -INFINITY
        // marks in-check entries where no eval was computed.
        let static_eval = if in_check {
            -INFINITY
        } else {
            match tt_hit {
                Some(hit) if hit.eval != -INFINITY => hit.eval,
                _ => self.evaluate(),
            }
        };
        t.stack[height].eval = static_eval;
        // are we doing better than two plies ago? loosens pruning margins
        // when the position is trending our way.
        let improving = !in_check && height >= 2 && static_eval > t.stack[height - 2].eval;

        if !NT::PV && !in_check && excluded.is_null() {
            // razoring: hopeless nodes drop straight into quiescence.
            if depth <= 2 && static_eval + RAZORING_COEFF_0 + RAZORING_COEFF_1 * depth < alpha {
                let value = self.quiescence::<OffPV>(l_pv, info, t, tt, alpha - 1, alpha);
                if value < alpha {
                    return value;
                }
            }

            // reverse futility: a static eval far above beta at low depth
            // is unlikely to come back down.
            if depth <= RFP_DEPTH
                && !is_mate_score(beta)
                && static_eval - rfp_margin(depth, improving) >= beta
            {
                return static_eval;
            }

            // null-move pruning: if passing still beats beta, an actual
            // move surely will. Needs a big piece on the board to dodge
            // zugzwang.
            if !in_null && depth >= 3 && static_eval >= beta && self.has_big_piece() {
                let r = NMP_BASE_REDUCTION
                    + depth / 3
                    + ((static_eval - beta) / NMP_REDUCTION_EVAL_DIVISOR).min(4);
                let nm_depth = depth - r;
                self.make_nullmove();
                let null_score =
                    -self.alpha_beta::<OffPV>(l_pv, info, t, tt, nm_depth, -beta, -beta + 1, true);
                self.unmake_nullmove();
                if info.stopped {
                    return 0;
                }
                if null_score >= beta {
                    // never trust an unproven mate from a null search.
                    let null_score = if is_mate_score(null_score) {
                        beta
                    } else {
                        null_score
                    };
                    if depth < NMP_VERIFICATION_DEPTH {
                        return null_score;
                    }
                    let verification = self.alpha_beta::<OffPV>(
                        l_pv, info, t, tt, nm_depth, beta - 1, beta, true,
                    );
                    if verification >= beta {
                        return null_score;
                    }
                }
            }

            // probcut: a capture that beats beta by a margin at reduced
            // depth is good enough to cut on.
            if depth >= PROBCUT_MIN_DEPTH && !is_mate_score(beta) {
                let r_beta = beta + PROBCUT_MARGIN
                    - if improving {
                        PROBCUT_IMPROVING_MARGIN
                    } else {
                        0
                    };
                let mut picker = MovePicker::new(self, t, tt_move, true);
                while let Some(entry) = picker.next() {
                    let m = entry.mov;
                    if !self.make_move(m) {
                        continue;
                    }
                    let mut value =
                        -self.quiescence::<OffPV>(l_pv, info, t, tt, -r_beta, -r_beta + 1);
                    if value >= r_beta && depth >= PROBCUT_MIN_DEPTH {
                        value = -self.alpha_beta::<OffPV>(
                            l_pv,
                            info,
                            t,
                            tt,
                            depth - 4,
                            -r_beta,
                            -r_beta + 1,
                            false,
                        );
                    }
                    self.unmake_move();
                    if info.stopped {
                        return 0;
                    }
                    if value >= r_beta {
                        tt.store(key, height, m, value, static_eval, Bound::Lower, depth - 3);
                        return value;
                    }
                }
            }
        }

        // internal iterative reduction: no TT move means the last visit
        // here was shallow or long ago, so don't overinvest.
        if !NT::ROOT && depth >= 4 && tt_hit.is_none() && excluded.is_null() {
            depth -= 1;
        }

        let original_alpha = alpha;
        let mut best_score = -INFINITY;
        let mut best_move = Move::NULL;
        let mut moves_made: usize = 0;
        let mut skip_quiets = false;
        let mut quiets_tried: ArrayVec<Move, MAX_POSITION_MOVES> = ArrayVec::new();

        let mut picker = MovePicker::new(self, t, tt_move, false);
        while let Some(entry) = picker.next() {
            let m = entry.mov;
            if m == excluded {
                continue;
            }
            let is_quiet = m.is_quiet();
            if skip_quiets && is_quiet {
                continue;
            }

            if !NT::ROOT && is_quiet && !in_check && best_score > -MINIMUM_MATE_SCORE {
                // late move pruning: deep move counts at low depth are a
                // waste of nodes.
                let lmp_threshold = if improving {
                    2 + depth * depth
                } else {
                    (2 + depth * depth) / 2
                };
                if !NT::PV && depth <= LMP_DEPTH && moves_made as i32 >= lmp_threshold {
                    skip_quiets = true;
                    continue;
                }
                // futility: the static eval is so far below alpha that
                // quiet moves can't catch up.
                if !NT::PV
                    && depth <= FUTILITY_DEPTH
                    && moves_made > 0
                    && static_eval + FUTILITY_COEFF_0 + FUTILITY_COEFF_1 * depth <= alpha
                {
                    skip_quiets = true;
                    continue;
                }
                // history pruning: moves that keep failing get dropped
                // near the leaves.
                if !NT::PV
                    && depth <= HISTORY_PRUNING_DEPTH
                    && moves_made > 0
                    && i32::from(t.main_history.get(self.piece_at(m.from()), m.to()))
                        < HISTORY_PRUNING_MARGIN * depth
                {
                    continue;
                }
            }

            let mut extension = 0;
            if in_check {
                extension = 1;
            } else if !NT::ROOT && depth >= SINGULARITY_DEPTH && m == tt_move && excluded.is_null()
            {
                if let Some(hit) = tt_hit {
                    if hit.depth >= depth - 3
                        && matches!(hit.bound, Bound::Lower | Bound::Exact)
                        && !is_mate_score(hit.value)
                    {
                        // singular extension: verify that every other move
                        // fails well below the TT score. The verification
                        // runs on the current position, before the TT move
                        // is made, with the TT move excluded.
                        let r_beta = (hit.value - depth * 3 / 4).max(-MATE_SCORE);
                        t.stack[height].excluded = m;
                        let value = self.alpha_beta::<OffPV>(
                            l_pv,
                            info,
                            t,
                            tt,
                            (depth - 1) / 2,
                            r_beta - 1,
                            r_beta,
                            false,
                        );
                        t.stack[height].excluded = Move::NULL;
                        if info.stopped {
                            return 0;
                        }
                        if value < r_beta {
                            extension = 1;
                            if !NT::PV
                                && value < r_beta - DOUBLE_EXTENSION_MARGIN
                                && t.stack[height].double_extensions <= DOUBLE_EXTENSION_LIMIT
                            {
                                extension = 2;
                            }
                        } else if r_beta >= beta {
                            // multi-cut: a second move also beats beta.
                            return r_beta;
                        }
                    }
                }
            }

            let moved_piece = self.piece_at(m.from());
            t.stack[height].searching = m;
            t.stack[height].searching_piece = moved_piece;

            if !self.make_move(m) {
                continue;
            }
            moves_made += 1;
            if is_quiet {
                quiets_tried.push(m);
            }
            t.stack[height + 1].double_extensions =
                t.stack[height].double_extensions + i32::from(extension == 2);

            let new_depth = depth - 1 + extension;
            let score = if moves_made == 1 {
                -self.alpha_beta::<NT::Next>(l_pv, info, t, tt, new_depth, -beta, -alpha, false)
            } else {
                // late move reductions: quiet moves far down the ordering
                // get a reduced-depth zero-window look first.
                let mut r = 0;
                if depth >= 3 && is_quiet && moves_made >= if NT::PV { 5 } else { 3 } {
                    r = lmr_reduction(depth, moves_made);
                    r += i32::from(!NT::PV);
                    r -= i32::from(improving);
                    r = r.clamp(0, new_depth - 1);
                }
                let mut score = -self.alpha_beta::<OffPV>(
                    l_pv,
                    info,
                    t,
                    tt,
                    new_depth - r,
                    -alpha - 1,
                    -alpha,
                    false,
                );
                if score > alpha && r > 0 {
                    score = -self.alpha_beta::<OffPV>(
                        l_pv,
                        info,
                        t,
                        tt,
                        new_depth,
                        -alpha - 1,
                        -alpha,
                        false,
                    );
                }
                if NT::PV && score > alpha && score < beta {
                    score = -self.alpha_beta::<NT::Next>(
                        l_pv, info, t, tt, new_depth, -beta, -alpha, false,
                    );
                }
                score
            };
            self.unmake_move();
            if info.stopped {
                return 0;
            }

            if score > best_score {
                best_score = score;
                if score > alpha {
                    best_move = m;
                    alpha = score;
                    if NT::PV {
                        pv.load_from(m, l_pv);
                    }
                }
                if alpha >= beta {
                    if is_quiet {
                        t.insert_killer(height, m);
                        t.insert_countermove(height, m);
                        update_history(t.main_history.get_mut(moved_piece, m.to()), depth, true);
                    }
                    // the moves we tried before this one turned out not to
                    // be the refutation; dock them.
                    let exclude_last = usize::from(is_quiet);
                    for &tried in quiets_tried
                        .iter()
                        .take(quiets_tried.len() - exclude_last)
                    {
                        let piece = self.piece_at(tried.from());
                        update_history(t.main_history.get_mut(piece, tried.to()), depth, false);
                    }
                    break;
                }
            }
        }

        if moves_made == 0 {
            if !excluded.is_null() {
                // every non-excluded move was illegal: the excluded move
                // is certainly singular.
                return alpha;
            }
            return if in_check {
                mated_in(height)
            } else {
                DRAW_SCORE
            };
        }

        if excluded.is_null() && !info.stopped {
            let bound = if best_score >= beta {
                Bound::Lower
            } else if best_score > original_alpha {
                Bound::Exact
            } else {
                Bound::Upper
            };
            tt.store(key, height, best_move, best_score, static_eval, bound, depth);
        }

        best_score
    }

    /// Resolves tactical noise at the horizon: only captures, promotions
    /// and check evasions are searched, with the static eval as a
    /// stand-pat floor.
    #[allow(clippy::cognitive_complexity)]
    pub fn quiescence<NT: NodeType>(
        &mut self,
        pv: &mut PVariation,
        info: &mut SearchInfo,
        t: &mut ThreadData,
        tt: TTView,
        mut alpha: i32,
        beta: i32,
    ) -> i32 {
        #[cfg(debug_assertions)]
        self.check_validity();

        let mut local_pv = PVariation::default();
        let l_pv = &mut local_pv;
        pv.clear();

        info.nodes += 1;
        if info.nodes % 1024 == 0 {
            info.check_up();
        }
        if info.stopped {
            return 0;
        }

        let height = self.height();
        info.seldepth = info.seldepth.max(height);

        if self.is_draw() {
            return DRAW_SCORE;
        }

        let in_check = self.in_check();
        if height >= MAX_DEPTH {
            return if in_check { 0 } else { self.evaluate() };
        }

        let key = self.hashkey();
        let tt_hit = tt.probe(key, height);
        if let Some(hit) = tt_hit {
            if !NT::PV
                && match hit.bound {
                    Bound::Exact => true,
                    Bound::Lower => hit.value >= beta,
                    Bound::Upper => hit.value <= alpha,
                    Bound::None => false,
                }
            {
                return hit.value;
            }
        }
        let tt_move = tt_hit.map_or(Move::NULL, |hit| hit.mov);

        let stand_pat = if in_check {
            // could be getting mated; no standing allowed.
            -INFINITY
        } else {
            self.evaluate()
        };

        if !in_check {
            if stand_pat >= beta {
                return stand_pat;
            }
            if stand_pat > alpha {
                alpha = stand_pat;
            }
        }

        let original_alpha = alpha;
        let mut best_score = stand_pat;
        let mut best_move = Move::NULL;
        let mut moves_made = 0;

        // in check, all evasions get generated; otherwise captures only.
        let mut picker = MovePicker::new(self, t, tt_move, !in_check);
        while let Some(entry) = picker.next() {
            let m = entry.mov;

            if !in_check && best_score > -MINIMUM_MATE_SCORE && !m.is_promo() {
                // futility: even winning this victim can't reach alpha.
                let victim_value = if m.is_ep() {
                    PAWN_VALUE
                } else {
                    PIECE_VALUES[m.capture().index()]
                };
                if stand_pat + QS_FUTILITY + victim_value <= alpha {
                    continue;
                }
                if self.is_losing_capture(m) {
                    continue;
                }
            }

            if !self.make_move(m) {
                continue;
            }
            moves_made += 1;
            let score = -self.quiescence::<NT>(l_pv, info, t, tt, -beta, -alpha);
            self.unmake_move();
            if info.stopped {
                return 0;
            }

            if score > best_score {
                best_score = score;
                if score > alpha {
                    best_move = m;
                    alpha = score;
                    if NT::PV {
                        pv.load_from(m, l_pv);
                    }
                }
                if alpha >= beta {
                    break;
                }
            }
        }

        if in_check && moves_made == 0 {
            return mated_in(height);
        }

        let bound = if best_score >= beta {
            Bound::Lower
        } else if best_score > original_alpha {
            Bound::Exact
        } else {
            Bound::Upper
        };
        if !info.stopped {
            tt.store(key, height, best_move, best_score, stand_pat, bound, 0);
        }

        best_score
    }

    /// A cheap stand-in for a full static exchange evaluation: a capture
    /// is hopeless if the attacker outvalues the victim and the target
    /// square is covered by an enemy pawn.
    fn is_losing_capture(&self, m: Move) -> bool {
        if m.is_ep() || !m.capture().is_piece() {
            return false;
        }
        let attacker = self.piece_at(m.from());
        let margin = PIECE_VALUES[attacker.index()] - PIECE_VALUES[m.capture().index()];
        if margin <= 0 {
            return false;
        }
        let them = attacker.colour().flip();
        let (their_pawn, dirs) = if them == Colour::WHITE {
            (Piece::WP, [-9, -11])
        } else {
            (Piece::BP, [9, 11])
        };
        dirs.into_iter()
            .any(|d| self.pieces[m.to().offset(d).index()] == their_pawn)
    }
}

mod tests {
    #[cfg(test)]
    fn run_search(fen: &str, depth: i32) -> (i32, crate::chessmove::Move) {
        use crate::{
            board::Board, history::ThreadData, searchinfo::SearchInfo, timemgmt::SearchLimit,
            transpositiontable::TT,
        };
        let mut board = Board::from_fen(fen).unwrap();
        let mut info = SearchInfo::new(SearchLimit::Depth(depth));
        info.print_to_stdout = false;
        let mut t = ThreadData::new();
        let tt = TT::with_size_mb(4);
        board.search_position(&mut info, &mut t, tt.view())
    }

    #[test]
    fn finds_mate_in_one() {
        use crate::evaluation::mate_in;
        let (score, best) = run_search("6k1/5ppp/8/8/8/8/5PPP/3R2K1 w - - 0 1", 4);
        assert_eq!(score, mate_in(1));
        assert_eq!(best.to_string(), "d1d8");
    }

    #[test]
    fn finds_back_rank_mate_in_two() {
        use crate::evaluation::mate_in;
        // 1.Ra8 Rxa8 2.Rxa8# (or mate immediately if the rook doesn't take).
        let (score, best) = run_search("4r1k1/5ppp/8/8/8/8/R7/R5K1 w - - 0 1", 6);
        assert_eq!(score, mate_in(3));
        assert!(best.to_string() == "a1a8" || best.to_string() == "a2a8");
    }

    #[test]
    fn checkmated_root_scores_mated_in_zero() {
        use crate::evaluation::mated_in;
        // back-rank mate has already been delivered; black has no moves.
        let (score, best) = run_search("R5k1/5ppp/8/8/8/8/8/K7 b - - 0 1", 4);
        assert_eq!(score, mated_in(0));
        assert!(best.is_null());
    }

    #[test]
    fn stalemate_scores_zero() {
        let (score, best) = run_search("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", 4);
        assert_eq!(score, 0);
        assert!(best.is_null());
    }

    #[test]
    fn fifty_move_escape_hatch() {
        // white is a queen down but one quiet move from a fifty-move draw.
        let (score, _) = run_search("q6k/8/8/8/8/8/8/7K w - - 99 120", 4);
        assert_eq!(score, 0);
    }

    #[test]
    fn deep_search_stays_sane_in_middlegame() {
        use crate::{
            board::Board, evaluation::is_mate_score, history::ThreadData,
            searchinfo::SearchInfo, timemgmt::SearchLimit, transpositiontable::TT,
        };
        let fen = "4rrk1/1p3qbp/p2n1p2/2NP2p1/1P1B4/3Q1R2/P5PP/5RK1 b - - 7 30";
        let mut board = Board::from_fen(fen).unwrap();
        let mut info = SearchInfo::new(SearchLimit::Depth(5));
        info.print_to_stdout = false;
        let mut t = ThreadData::new();
        let tt = TT::with_size_mb(4);
        let (score, best) = board.search_position(&mut info, &mut t, tt.view());

        assert!(!is_mate_score(score));
        assert!(!best.is_null());
        // searching must leave the position exactly as it found it.
        assert_eq!(board.fen(), fen);
        assert_eq!(board.hashkey(), board.generate_pos_key());
        // and the returned move must be legal in it.
        assert!(board.make_move(best));
    }

    #[test]
    fn threefold_repetition_draws_at_the_root() {
        use crate::{
            board::Board, history::ThreadData, searchinfo::SearchInfo,
            timemgmt::SearchLimit, transpositiontable::TT,
        };
        // knight shuffles bring the starting position up a third time.
        let mut board = Board::starting_position();
        for uci in [
            "g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8",
        ] {
            let m = board.parse_uci(uci).unwrap();
            assert!(board.make_move(m));
        }
        assert!(board.is_threefold_repetition());

        let mut info = SearchInfo::new(SearchLimit::Depth(3));
        info.print_to_stdout = false;
        let mut t = ThreadData::new();
        let tt = TT::with_size_mb(1);
        let (score, best) = board.search_position(&mut info, &mut t, tt.view());
        assert_eq!(score, 0);
        assert!(board.make_move(best));
    }

    #[test]
    fn zero_window_brackets_the_true_score() {
        use crate::{
            board::Board, evaluation::mate_in, history::ThreadData, pv::PVariation,
            search::Root, searchinfo::SearchInfo, timemgmt::SearchLimit,
            transpositiontable::TT,
        };
        // a forced mate is stable enough to probe with zero windows.
        let fen = "6k1/5ppp/8/8/8/8/5PPP/3R2K1 w - - 0 1";
        let mate = mate_in(1);

        let mut board = Board::from_fen(fen).unwrap();
        let mut info = SearchInfo::new(SearchLimit::Depth(4));
        info.print_to_stdout = false;
        let mut t = ThreadData::new();
        let tt = TT::with_size_mb(1);
        let mut pv = PVariation::default();
        // window below the mate score: must fail high.
        let score = board.alpha_beta::<Root>(&mut pv, &mut info, &mut t, tt.view(), 4, mate - 2, mate - 1, false);
        assert!(score >= mate - 1);
        // window above the mate score: must fail low.
        let tt2 = TT::with_size_mb(1);
        let mut t2 = ThreadData::new();
        let score = board.alpha_beta::<Root>(&mut pv, &mut info, &mut t2, tt2.view(), 4, mate, mate + 1, false);
        assert!(score <= mate);
    }
}
