use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::minimax::{
    minimax, minimax_alpha_beta_root, minimax_heuristic, random_move, SearchStats,
};
use crate::game::{evaluate, Board, Mark};

#[derive(Debug, Clone, Copy)]
struct WasmInstant {
    timestamp: f64,
}

impl WasmInstant {
    fn now() -> Self {
        Self {
            timestamp: now_ms(),
        }
    }

    fn elapsed(&self) -> Duration {
        let elapsed_ms = (now_ms() - self.timestamp).max(0.0);
        Duration::from_millis(elapsed_ms as u64)
    }
}

#[cfg(target_arch = "wasm32")]
fn now_ms() -> f64 {
    web_sys::js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
fn now_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// 电脑对手使用的落子算法。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    Random,
    Minimax,
    MinimaxHeuristic,
    MinimaxAlphaBeta,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Random,
        Algorithm::Minimax,
        Algorithm::MinimaxHeuristic,
        Algorithm::MinimaxAlphaBeta,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Algorithm::Random => "random",
            Algorithm::Minimax => "minimax",
            Algorithm::MinimaxHeuristic => "minimax-heuristic",
            Algorithm::MinimaxAlphaBeta => "minimax-alpha-beta",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Algorithm::Random => "AI: Random",
            Algorithm::Minimax => "AI: Minimax",
            Algorithm::MinimaxHeuristic => "AI: Minimax Heuristic",
            Algorithm::MinimaxAlphaBeta => "AI: Minimax Alpha-Beta",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Algorithm {
    type Err = AiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(Algorithm::Random),
            "minimax" => Ok(Algorithm::Minimax),
            "minimax-heuristic" | "minimaxbetter" => Ok(Algorithm::MinimaxHeuristic),
            "minimax-alpha-beta" | "minimaxalphabeta" => Ok(Algorithm::MinimaxAlphaBeta),
            _ => Err(AiError::UnsupportedAlgorithm { id: s.to_string() }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum AiError {
    UnsupportedAlgorithm { id: String },
}

impl fmt::Display for AiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiError::UnsupportedAlgorithm { id } => write!(f, "Invalid algorithm: {id}"),
        }
    }
}

impl std::error::Error for AiError {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub algorithm: Algorithm,
    /// 界面展示用的思考延迟，不影响搜索本身。
    pub think_delay: Duration,
}

impl AiConfig {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            think_delay: Duration::ZERO,
        }
    }

    pub fn with_think_delay(mut self, delay: Duration) -> Self {
        self.think_delay = delay;
        self
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig::new(Algorithm::MinimaxAlphaBeta)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiDecision {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell: Option<usize>,
    /// 仅 alpha-beta 给出评估分（+10/-10/0）。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<i32>,
    pub nodes: u64,
    pub depth_reached: u8,
    pub duration_ms: u64,
    pub algorithm: Algorithm,
}

pub struct AiAgent {
    config: AiConfig,
    rng: SmallRng,
}

impl AiAgent {
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(config: AiConfig, seed: u64) -> Self {
        Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    pub fn set_algorithm(&mut self, algorithm: Algorithm) {
        self.config.algorithm = algorithm;
    }

    pub fn set_think_delay(&mut self, delay: Duration) {
        self.config.think_delay = delay;
    }

    /// 在棋盘副本上搜索，调用方的棋盘不会被修改。
    pub fn decide_move(&mut self, board: &Board, mark: Mark) -> AiDecision {
        let start = WasmInstant::now();
        let mut scratch = *board;
        let mut stats = SearchStats::new();
        let algorithm = self.config.algorithm;

        let (cell, evaluation) = match algorithm {
            Algorithm::Random => {
                stats.nodes = 1;
                (random_move(&scratch, &mut self.rng), None)
            }
            Algorithm::Minimax => (minimax(&mut scratch, mark, &mut stats), None),
            Algorithm::MinimaxHeuristic => {
                (minimax_heuristic(&mut scratch, mark, &mut stats), None)
            }
            Algorithm::MinimaxAlphaBeta => {
                let (score, cell) = minimax_alpha_beta_root(&mut scratch, mark, &mut stats);
                (cell, Some(score))
            }
        };

        AiDecision {
            cell,
            evaluation: evaluation.or_else(|| cell.is_none().then(|| evaluate(board))),
            nodes: stats.nodes,
            depth_reached: stats.depth_reached,
            duration_ms: start.elapsed().as_millis() as u64,
            algorithm,
        }
    }
}
