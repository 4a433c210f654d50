use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::board::{Board, Mark, BOARD_SIZE};
use super::rules::{game_status, GameStatus, RuleError};
use crate::ai::{AiAgent, AiDecision, AiError, Algorithm};

/// 电脑固定执 O。
pub const COMPUTER_MARK: Mark = Mark::O;

/// O 方由谁控制。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "type", content = "algorithm", rename_all = "lowercase")]
pub enum Opponent {
    #[default]
    Human,
    Computer(Algorithm),
}

impl Opponent {
    pub fn id(self) -> &'static str {
        match self {
            Opponent::Human => "human",
            Opponent::Computer(algorithm) => algorithm.id(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Opponent::Human => "Human",
            Opponent::Computer(algorithm) => algorithm.label(),
        }
    }

    pub fn algorithm(self) -> Option<Algorithm> {
        match self {
            Opponent::Human => None,
            Opponent::Computer(algorithm) => Some(algorithm),
        }
    }
}

impl fmt::Display for Opponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Opponent {
    type Err = AiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("human") {
            return Ok(Opponent::Human);
        }
        s.parse().map(Opponent::Computer)
    }
}

/// 下拉框选项：(显示文本, 取值)。
pub const OPPONENT_OPTIONS: [Opponent; 5] = [
    Opponent::Human,
    Opponent::Computer(Algorithm::Random),
    Opponent::Computer(Algorithm::Minimax),
    Opponent::Computer(Algorithm::MinimaxHeuristic),
    Opponent::Computer(Algorithm::MinimaxAlphaBeta),
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpponentOption {
    pub text: String,
    pub value: String,
}

pub fn opponent_options() -> Vec<OpponentOption> {
    OPPONENT_OPTIONS
        .iter()
        .map(|opponent| OpponentOption {
            text: opponent.label().to_string(),
            value: opponent.id().to_string(),
        })
        .collect()
}

/// 一局对局的完整状态：棋盘、轮到谁、O 方由谁控制。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSession {
    pub board: Board,
    pub turn: Mark,
    #[serde(default)]
    pub opponent: Opponent,
}

impl Default for GameSession {
    fn default() -> Self {
        Self {
            board: Board::empty(),
            turn: Mark::X,
            opponent: Opponent::Human,
        }
    }
}

impl GameSession {
    pub fn new(opponent: Opponent) -> Self {
        Self {
            opponent,
            ..Self::default()
        }
    }

    pub fn status(&self) -> GameStatus {
        game_status(&self.board, self.turn)
    }

    pub fn is_over(&self) -> bool {
        self.status().is_over()
    }

    pub fn is_computer_turn(&self) -> bool {
        matches!(self.opponent, Opponent::Computer(_)) && self.turn == COMPUTER_MARK
    }

    pub fn set_opponent(&mut self, opponent: Opponent) {
        self.opponent = opponent;
    }

    /// 清空棋盘，X 先手，保留对手设置。
    pub fn reset(&mut self) {
        self.board = Board::empty();
        self.turn = Mark::X;
    }

    /// 人类玩家在 `index` 落子。
    pub fn play(&mut self, index: usize) -> Result<GameStatus, RuleError> {
        if self.is_over() {
            return Err(RuleError::GameFinished);
        }
        if index >= BOARD_SIZE {
            return Err(RuleError::CellOutOfRange { index });
        }
        if self.is_computer_turn() {
            return Err(RuleError::ComputerTurn { mark: self.turn });
        }
        self.place(index)
    }

    fn place(&mut self, index: usize) -> Result<GameStatus, RuleError> {
        if !self.board.is_empty_at(index) {
            return Err(RuleError::CellOccupied { index });
        }
        self.board.set(index, Some(self.turn));
        self.turn = self.turn.other();
        Ok(self.status())
    }

    /// 轮到电脑且对局未结束时，由 `agent` 决定并落子；否则返回 `None`。
    pub fn computer_move(
        &mut self,
        agent: &mut AiAgent,
    ) -> Result<Option<AiDecision>, RuleError> {
        let Some(algorithm) = self.opponent.algorithm() else {
            return Ok(None);
        };
        if self.turn != COMPUTER_MARK || self.is_over() {
            return Ok(None);
        }

        agent.set_algorithm(algorithm);
        let decision = agent.decide_move(&self.board, self.turn);
        if let Some(index) = decision.cell {
            self.place(index)?;
        }
        Ok(Some(decision))
    }
}
