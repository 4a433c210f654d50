//! AI 算法模块：随机、极小化极大、一层启发式与 alpha-beta 剪枝。

pub mod agent;
pub mod minimax;

use rand::rngs::SmallRng;
use rand::SeedableRng;

pub use agent::{AiAgent, AiConfig, AiDecision, AiError, Algorithm};
pub use minimax::{
    minimax, minimax_alpha_beta, minimax_alpha_beta_root, minimax_heuristic, minimax_score,
    random_move, SearchStats, MAX_DEPTH,
};

use crate::game::{Board, Mark};

/// 按算法为 `mark` 选择落子位置；没有空格时返回 `None`。
///
/// 搜索会在 `board` 上试探落子，但返回前每一格都已恢复原值。
pub fn find_best_move(board: &mut Board, mark: Mark, algorithm: Algorithm) -> Option<usize> {
    let mut stats = SearchStats::new();
    match algorithm {
        Algorithm::Random => random_move(board, &mut SmallRng::from_entropy()),
        Algorithm::Minimax => minimax(board, mark, &mut stats),
        Algorithm::MinimaxHeuristic => minimax_heuristic(board, mark, &mut stats),
        Algorithm::MinimaxAlphaBeta => minimax_alpha_beta_root(board, mark, &mut stats).1,
    }
}

/// 与 [`find_best_move`] 相同，但算法以字符串标识传入；未知标识直接报错，棋盘不被触碰。
pub fn find_best_move_by_id(
    board: &mut Board,
    mark: Mark,
    algorithm_id: &str,
) -> Result<Option<usize>, AiError> {
    let algorithm: Algorithm = algorithm_id.parse()?;
    Ok(find_best_move(board, mark, algorithm))
}
