use serde::{Deserialize, Serialize};
use std::fmt;

use super::board::{Board, Mark, WIN_COMBINATIONS};

/// X 获胜时的评估分。
pub const WIN_SCORE: i32 = 10;
/// O 获胜时的评估分。
pub const LOSS_SCORE: i32 = -WIN_SCORE;

/// 按固定顺序扫描连线，返回第一条被同一方占满的连线的标记。
///
/// 不校验局面是否合法：若两方都有连线，返回先扫描到的那一方。
pub fn check_win(board: &Board) -> Option<Mark> {
    let cells = board.cells();
    WIN_COMBINATIONS.iter().find_map(|&[a, b, c]| match cells[a] {
        Some(mark) if cells[b] == Some(mark) && cells[c] == Some(mark) => Some(mark),
        _ => None,
    })
}

/// 棋盘已满即为平局；不先检查胜负，调用方需先调用 [`check_win`]。
pub fn check_draw(board: &Board) -> bool {
    board.is_full()
}

pub fn evaluate(board: &Board) -> i32 {
    match check_win(board) {
        Some(Mark::X) => WIN_SCORE,
        Some(Mark::O) => LOSS_SCORE,
        None => 0,
    }
}

/// 对局状态，供界面展示。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameStatus {
    Winner { mark: Mark },
    Draw,
    NextPlayer { mark: Mark },
}

impl GameStatus {
    pub fn is_over(&self) -> bool {
        !matches!(self, GameStatus::NextPlayer { .. })
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Winner { mark } => write!(f, "The winner is {mark}"),
            GameStatus::Draw => f.write_str("Game Draw"),
            GameStatus::NextPlayer { mark } => write!(f, "Next player: {mark}"),
        }
    }
}

/// 先判胜负再判平局，一个已满且有连线的棋盘算作胜局。
pub fn game_status(board: &Board, next: Mark) -> GameStatus {
    if let Some(mark) = check_win(board) {
        GameStatus::Winner { mark }
    } else if check_draw(board) {
        GameStatus::Draw
    } else {
        GameStatus::NextPlayer { mark: next }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum RuleError {
    GameFinished,
    CellOutOfRange { index: usize },
    CellOccupied { index: usize },
    ComputerTurn { mark: Mark },
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleError::GameFinished => f.write_str("game is already finished"),
            RuleError::CellOutOfRange { index } => write!(f, "cell {index} is out of range"),
            RuleError::CellOccupied { index } => write!(f, "cell {index} is already occupied"),
            RuleError::ComputerTurn { mark } => {
                write!(f, "it is the computer's turn to play {mark}")
            }
        }
    }
}

impl std::error::Error for RuleError {}
