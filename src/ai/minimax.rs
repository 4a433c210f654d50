use rand::seq::IteratorRandom;
use rand::Rng;

use crate::game::{check_draw, check_win, evaluate, Board, Mark, BOARD_SIZE};

/// 博弈树搜索的最大层数，等于棋盘格数。
pub const MAX_DEPTH: u8 = BOARD_SIZE as u8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub depth_reached: u8,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn visit(&mut self, depth: u8) {
        self.nodes += 1;
        if depth > self.depth_reached {
            self.depth_reached = depth;
        }
    }
}

/// 从空格中均匀随机选一个；棋盘已满时返回 `None`。
pub fn random_move<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Option<usize> {
    board.empty_cells().choose(rng)
}

/// 完整深度的极小化极大搜索，不剪枝。
///
/// 终局分：X 胜 -1，O 胜 +1，平局 0（与 [`evaluate`] 方向相反）。
/// O 取子节点最大分，X 取最小分；只有严格更优才替换，因此平分时保留索引最小的走法。
pub fn minimax(board: &mut Board, mark: Mark, stats: &mut SearchStats) -> Option<usize> {
    minimax_rec(board, mark, 0, stats).1
}

fn terminal_score(board: &Board) -> Option<i32> {
    match check_win(board) {
        Some(Mark::X) => Some(-1),
        Some(Mark::O) => Some(1),
        None if check_draw(board) => Some(0),
        None => None,
    }
}

fn minimax_rec(
    board: &mut Board,
    mark: Mark,
    depth: u8,
    stats: &mut SearchStats,
) -> (i32, Option<usize>) {
    stats.visit(depth);

    if let Some(score) = terminal_score(board) {
        return (score, None);
    }

    let mut best: Option<(i32, usize)> = None;
    for index in 0..BOARD_SIZE {
        if !board.is_empty_at(index) {
            continue;
        }

        let (score, _) = {
            let mut placed = board.place(index, mark);
            minimax_rec(&mut placed, mark.other(), depth + 1, stats)
        };

        let improves = match (best, mark) {
            (None, _) => true,
            (Some((best_score, _)), Mark::O) => score > best_score,
            (Some((best_score, _)), Mark::X) => score < best_score,
        };
        if improves {
            best = Some((score, index));
        }
    }

    match best {
        Some((score, index)) => (score, Some(index)),
        None => (0, None),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeuristicScore {
    /// 落子后当前方立即获胜。
    Win,
    /// 棋盘上已有对方的连线，分数不可比较，永远不会被选中。
    Unscored,
    Scored(i32),
}

fn heuristic_score(board: &Board, mark: Mark) -> HeuristicScore {
    match check_win(board) {
        Some(winner) if winner == mark => HeuristicScore::Win,
        Some(_) => HeuristicScore::Unscored,
        None => HeuristicScore::Scored(evaluate(board) * board.empty_count() as i32),
    }
}

/// 一层贪心启发：只看落子后的局面。
///
/// 当前方立即获胜的落子直接选中并停止扫描；否则按「评估分 × 剩余空格数」
/// 取 X 的最大值或 O 的最小值，仅在严格更优时替换。
/// 已被对方连成一线的棋盘没有可比较的分数，结果为 `None`。
pub fn minimax_heuristic(
    board: &mut Board,
    mark: Mark,
    stats: &mut SearchStats,
) -> Option<usize> {
    stats.visit(0);

    let mut best_move = None;
    let mut best_score = match mark {
        Mark::X => i32::MIN,
        Mark::O => i32::MAX,
    };

    for index in 0..BOARD_SIZE {
        if !board.is_empty_at(index) {
            continue;
        }

        let score = {
            let placed = board.place(index, mark);
            stats.visit(1);
            heuristic_score(&placed, mark)
        };

        match score {
            HeuristicScore::Win => return Some(index),
            HeuristicScore::Unscored => {}
            HeuristicScore::Scored(score) => {
                let improves = match mark {
                    Mark::X => score > best_score,
                    Mark::O => score < best_score,
                };
                if improves {
                    best_score = score;
                    best_move = Some(index);
                }
            }
        }
    }

    best_move
}

/// 带 alpha-beta 剪枝的极小化极大搜索，深度上限 [`MAX_DEPTH`]。
///
/// 使用 [`evaluate`] 的 +10/-10/0 方向：X 取最大，O 取最小。
/// 返回 `(最佳分, 最佳走法)`；根节点已是终局时走法为 `None`。
pub fn minimax_alpha_beta(
    board: &mut Board,
    mark: Mark,
    alpha: i32,
    beta: i32,
    depth: u8,
    stats: &mut SearchStats,
) -> (i32, Option<usize>) {
    stats.visit(depth);

    if check_win(board).is_some() || check_draw(board) || depth >= MAX_DEPTH {
        return (evaluate(board), None);
    }

    let mut alpha = alpha;
    let mut beta = beta;
    let mut best_move = None;

    match mark {
        Mark::X => {
            let mut best_score = i32::MIN;
            for index in 0..BOARD_SIZE {
                if !board.is_empty_at(index) {
                    continue;
                }
                let (score, _) = {
                    let mut placed = board.place(index, mark);
                    minimax_alpha_beta(&mut placed, Mark::O, alpha, beta, depth + 1, stats)
                };
                if score > best_score {
                    best_score = score;
                    best_move = Some(index);
                }
                alpha = alpha.max(score);
                if beta <= alpha {
                    break;
                }
            }
            (best_score, best_move)
        }
        Mark::O => {
            let mut best_score = i32::MAX;
            for index in 0..BOARD_SIZE {
                if !board.is_empty_at(index) {
                    continue;
                }
                let (score, _) = {
                    let mut placed = board.place(index, mark);
                    minimax_alpha_beta(&mut placed, Mark::X, alpha, beta, depth + 1, stats)
                };
                if score < best_score {
                    best_score = score;
                    best_move = Some(index);
                }
                beta = beta.min(score);
                if beta <= alpha {
                    break;
                }
            }
            (best_score, best_move)
        }
    }
}

/// 以完整窗口从根节点开始的 alpha-beta 搜索。
pub fn minimax_alpha_beta_root(
    board: &mut Board,
    mark: Mark,
    stats: &mut SearchStats,
) -> (i32, Option<usize>) {
    minimax_alpha_beta(board, mark, i32::MIN, i32::MAX, 0, stats)
}

/// 不剪枝的完整搜索分，使用 -1/+1/0 方向，供对照测试使用。
pub fn minimax_score(board: &mut Board, mark: Mark, stats: &mut SearchStats) -> i32 {
    minimax_rec(board, mark, 0, stats).0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    const X: Option<Mark> = Some(Mark::X);
    const O: Option<Mark> = Some(Mark::O);
    const E: Option<Mark> = None;

    fn board(cells: [Option<Mark>; 9]) -> Board {
        Board::from_cells(cells)
    }

    /// Plays `count` random moves from an empty board, stopping early on a finished game.
    fn random_position(rng: &mut SmallRng, count: usize) -> (Board, Mark) {
        let mut board = Board::empty();
        let mut mark = Mark::X;
        for _ in 0..count {
            if check_win(&board).is_some() || check_draw(&board) {
                break;
            }
            let index = random_move(&board, rng).expect("open board has a move");
            board.set(index, Some(mark));
            mark = mark.other();
        }
        (board, mark)
    }

    fn is_terminal(board: &Board) -> bool {
        check_win(board).is_some() || check_draw(board)
    }

    #[test]
    fn random_move_only_picks_empty_cells() {
        let board = board([E, X, O, E, X, E, O, E, E]);
        let mut rng = SmallRng::seed_from_u64(7);
        let mut seen = HashSet::new();
        for _ in 0..500 {
            let index = random_move(&board, &mut rng).expect("board has empty cells");
            assert!(board.is_empty_at(index), "picked occupied cell {index}");
            seen.insert(index);
        }
        let expected: HashSet<usize> = board.empty_cells().collect();
        assert_eq!(seen, expected, "every empty cell should be reachable");
    }

    #[test]
    fn random_move_on_full_board_is_none() {
        let full = board([X, O, X, O, O, X, X, X, O]);
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(random_move(&full, &mut rng), None);
    }

    #[test]
    fn minimax_takes_immediate_win_for_o() {
        let mut b = board([X, X, E, O, O, E, X, E, E]);
        let mut stats = SearchStats::new();
        assert_eq!(minimax(&mut b, Mark::O, &mut stats), Some(5));
        assert!(stats.nodes > 1);
    }

    #[test]
    fn minimax_prefers_win_over_block() {
        // O threatens the middle column, but X can complete the left column first.
        let mut b = board([X, O, E, E, O, E, X, E, E]);
        let mut stats = SearchStats::new();
        assert_eq!(minimax(&mut b, Mark::X, &mut stats), Some(3));
    }

    #[test]
    fn minimax_blocks_for_x() {
        let mut b = board([O, X, E, E, O, E, X, E, E]);
        let mut stats = SearchStats::new();
        let chosen = minimax(&mut b, Mark::X, &mut stats);
        assert_eq!(chosen, Some(8), "X must block the diagonal");

        let mut after = b;
        after.set(8, X);
        assert_ne!(
            minimax_score(&mut after, Mark::O, &mut SearchStats::new()),
            1,
            "blocking should not leave O a forced win"
        );
    }

    #[test]
    fn minimax_leaves_board_untouched() {
        let mut b = board([X, E, E, E, O, E, E, E, E]);
        let before = b;
        let mut stats = SearchStats::new();
        minimax(&mut b, Mark::X, &mut stats);
        assert_eq!(b, before);
    }

    #[test]
    fn minimax_on_full_board_has_no_move() {
        let mut full = board([X, O, X, O, O, X, X, X, O]);
        let mut stats = SearchStats::new();
        assert_eq!(minimax(&mut full, Mark::X, &mut stats), None);
    }

    #[test]
    fn heuristic_fixture_for_x() {
        let mut b = board([E, E, O, X, O, E, E, E, E]);
        let mut stats = SearchStats::new();
        assert_eq!(minimax_heuristic(&mut b, Mark::X, &mut stats), Some(0));
    }

    #[test]
    fn heuristic_fixture_for_o() {
        let mut b = board([X, E, O, X, E, E, E, E, E]);
        let mut stats = SearchStats::new();
        assert_eq!(minimax_heuristic(&mut b, Mark::O, &mut stats), Some(1));
    }

    #[test]
    fn heuristic_on_board_won_by_opponent_has_no_move() {
        let mut b = board([X, X, X, O, O, E, E, E, E]);
        let before = b;
        let mut stats = SearchStats::new();
        assert_eq!(minimax_heuristic(&mut b, Mark::O, &mut stats), None);
        assert_eq!(b, before);
    }

    #[test]
    fn heuristic_takes_immediate_win() {
        let mut b = board([X, X, E, O, O, E, E, E, E]);
        let mut stats = SearchStats::new();
        assert_eq!(minimax_heuristic(&mut b, Mark::X, &mut stats), Some(2));
        assert_eq!(minimax_heuristic(&mut b, Mark::O, &mut stats), Some(5));
    }

    #[test]
    fn alpha_beta_on_finished_board_returns_score_only() {
        let mut draw = board([X, O, X, O, O, X, X, X, O]);
        let mut stats = SearchStats::new();
        assert_eq!(minimax_alpha_beta_root(&mut draw, Mark::O, &mut stats), (0, None));

        let mut won = board([X, X, X, O, O, E, E, E, E]);
        assert_eq!(minimax_alpha_beta_root(&mut won, Mark::O, &mut stats), (10, None));
    }

    #[test]
    fn alpha_beta_finds_win_and_block() {
        let mut stats = SearchStats::new();

        let mut x_to_win = board([X, X, E, O, O, E, E, E, E]);
        assert_eq!(
            minimax_alpha_beta_root(&mut x_to_win, Mark::X, &mut stats),
            (10, Some(2))
        );

        let mut o_must_block = board([X, E, E, X, O, E, E, E, E]);
        let (_, index) = minimax_alpha_beta_root(&mut o_must_block, Mark::O, &mut stats);
        assert_eq!(index, Some(6));
    }

    #[test]
    fn alpha_beta_empty_board_is_a_draw() {
        let mut b = Board::empty();
        let mut stats = SearchStats::new();
        let (score, index) = minimax_alpha_beta_root(&mut b, Mark::X, &mut stats);
        assert_eq!(score, 0);
        assert!(index.is_some());
        assert_eq!(b, Board::empty());
        assert!(stats.depth_reached <= MAX_DEPTH);
    }

    #[test]
    fn alpha_beta_prunes_compared_to_exhaustive_search() {
        let mut b = board([X, E, E, E, E, E, E, E, E]);
        let mut pruned = SearchStats::new();
        let mut full = SearchStats::new();
        minimax_alpha_beta_root(&mut b, Mark::O, &mut pruned);
        minimax(&mut b, Mark::O, &mut full);
        assert!(pruned.nodes < full.nodes, "{} >= {}", pruned.nodes, full.nodes);
    }

    #[test]
    fn exhaustive_and_pruned_scores_agree() {
        let mut rng = SmallRng::seed_from_u64(0x7177_7ac0);
        let mut checked = 0;
        for round in 0..120 {
            let (mut b, mark) = random_position(&mut rng, 2 + round % 6);
            if is_terminal(&b) {
                continue;
            }
            let before = b;

            let exhaustive = minimax_score(&mut b, mark, &mut SearchStats::new());
            let (pruned, index) = minimax_alpha_beta_root(&mut b, mark, &mut SearchStats::new());

            assert_eq!(b, before, "search must not leak mutations");
            assert_eq!(pruned, -10 * exhaustive, "position {b:?} for {mark}");

            let index = index.expect("live board has a move");
            let mut after = b;
            after.set(index, Some(mark));
            let value_after = minimax_score(&mut after, mark.other(), &mut SearchStats::new());
            assert_eq!(value_after, exhaustive, "alpha-beta move must keep the game value");
            checked += 1;
        }
        assert!(checked > 50);
    }

    #[test]
    fn exhaustive_move_keeps_game_value() {
        let mut rng = SmallRng::seed_from_u64(42);
        for round in 0..60 {
            let (mut b, mark) = random_position(&mut rng, 3 + round % 5);
            if is_terminal(&b) {
                continue;
            }
            let value = minimax_score(&mut b, mark, &mut SearchStats::new());
            let index = minimax(&mut b, mark, &mut SearchStats::new()).expect("live board");
            let mut after = b;
            after.set(index, Some(mark));
            assert_eq!(
                minimax_score(&mut after, mark.other(), &mut SearchStats::new()),
                value
            );
        }
    }
}
