//! 游戏核心逻辑模块（棋盘、胜负判定、对局状态）。

pub mod board;
pub mod rules;
pub mod session;

pub use board::{Board, Cell, Mark, Placement, BOARD_SIZE, WIN_COMBINATIONS};
pub use rules::{
    check_draw, check_win, evaluate, game_status, GameStatus, RuleError, LOSS_SCORE, WIN_SCORE,
};
pub use session::{
    opponent_options, GameSession, Opponent, OpponentOption, COMPUTER_MARK, OPPONENT_OPTIONS,
};
