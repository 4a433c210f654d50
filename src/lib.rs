#[macro_use]
pub mod utils;
pub mod ai;
pub mod game;

use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use std::str::FromStr;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use ai::{
    find_best_move, find_best_move_by_id, AiAgent, AiConfig, AiDecision, AiError, Algorithm,
    SearchStats,
};
pub use game::{
    check_draw, check_win, evaluate, game_status, opponent_options, Board, Cell, GameSession,
    GameStatus, Mark, Opponent, OpponentOption, RuleError, BOARD_SIZE, WIN_COMBINATIONS,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    utils::set_panic_hook();
    console_log!("tic-tac-toe engine loaded");
}

fn to_js_error<E: Serialize + std::fmt::Display>(error: E) -> JsValue {
    to_value(&error).unwrap_or_else(|_| JsValue::from_str(&error.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn board_from_js(board: JsValue) -> Result<Board, JsValue> {
    from_value(board).map_err(JsValue::from)
}

fn mark_from_js(mark: &str) -> Result<Mark, JsValue> {
    Mark::from_str(mark).map_err(|_| JsValue::from_str(&format!("invalid mark: {mark}")))
}

/// 返回占满某条连线的标记（`"X"`/`"O"`），否则返回 `undefined`。
#[wasm_bindgen(js_name = "checkWin")]
pub fn js_check_win(board: JsValue) -> Result<Option<String>, JsValue> {
    let board = board_from_js(board)?;
    Ok(check_win(&board).map(|mark| mark.to_string()))
}

#[wasm_bindgen(js_name = "checkDraw")]
pub fn js_check_draw(board: JsValue) -> Result<bool, JsValue> {
    let board = board_from_js(board)?;
    Ok(check_draw(&board))
}

#[wasm_bindgen(js_name = "evaluate")]
pub fn js_evaluate(board: JsValue) -> Result<i32, JsValue> {
    let board = board_from_js(board)?;
    Ok(evaluate(&board))
}

/// 为 `mark` 选择落子；没有可走位置时返回 `undefined`，未知算法抛出错误。
#[wasm_bindgen(js_name = "findBestMove")]
pub fn js_find_best_move(
    board: JsValue,
    mark: &str,
    algorithm: &str,
) -> Result<Option<u32>, JsValue> {
    let algorithm = Algorithm::from_str(algorithm).map_err(to_js_error)?;
    let mut board = board_from_js(board)?;
    let mark = mark_from_js(mark)?;
    Ok(find_best_move(&mut board, mark, algorithm).map(|index| index as u32))
}

/// 对手下拉框选项：`[{ text, value }]`。
#[wasm_bindgen(js_name = "opponentOptions")]
pub fn js_opponent_options() -> Result<JsValue, JsValue> {
    to_value(&opponent_options()).map_err(JsValue::from)
}

#[derive(Serialize)]
struct AiMoveResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    decision: Option<AiDecision>,
    status: GameStatus,
}

#[wasm_bindgen]
pub struct TicTacToe {
    session: GameSession,
    agent: AiAgent,
}

#[wasm_bindgen]
impl TicTacToe {
    #[wasm_bindgen(constructor)]
    pub fn new(initial_state_json: Option<String>) -> Result<TicTacToe, JsValue> {
        let session = if let Some(json) = initial_state_json {
            serde_json::from_str(&json).map_err(serde_to_js_error)?
        } else {
            GameSession::default()
        };
        Ok(TicTacToe {
            session,
            agent: AiAgent::new(AiConfig::default()),
        })
    }

    pub fn board(&self) -> Result<JsValue, JsValue> {
        to_value(&self.session.board).map_err(JsValue::from)
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session).map_err(serde_to_js_error)
    }

    pub fn status_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.status()).map_err(serde_to_js_error)
    }

    pub fn status_text(&self) -> String {
        self.session.status().to_string()
    }

    pub fn is_over(&self) -> bool {
        self.session.is_over()
    }

    pub fn is_computer_turn(&self) -> bool {
        self.session.is_computer_turn() && !self.session.is_over()
    }

    pub fn play(&mut self, index: u32) -> Result<String, JsValue> {
        let status = self.session.play(index as usize).map_err(to_js_error)?;
        serde_json::to_string(&status).map_err(serde_to_js_error)
    }

    pub fn set_opponent(&mut self, value: &str) -> Result<(), JsValue> {
        let opponent = Opponent::from_str(value).map_err(to_js_error)?;
        if opponent != self.session.opponent {
            console_log!("player O is now {}", opponent.label());
            self.session.set_opponent(opponent);
        }
        Ok(())
    }

    pub fn set_think_delay(&mut self, delay_ms: u32) {
        self.agent
            .set_think_delay(Duration::from_millis(u64::from(delay_ms)));
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    pub fn apply_ai_move(&mut self) -> Result<String, JsValue> {
        let decision = self
            .session
            .computer_move(&mut self.agent)
            .map_err(to_js_error)?;
        if let Some(decision) = &decision {
            console_log!(
                "{} chose {:?} after {} nodes in {}ms",
                decision.algorithm,
                decision.cell,
                decision.nodes,
                decision.duration_ms
            );
        }
        let response = AiMoveResponse {
            decision,
            status: self.session.status(),
        };
        serde_json::to_string(&response).map_err(serde_to_js_error)
    }

    /// 在副本上计算建议落子，可选延迟后以 JSON 形式兑现 Promise，不修改对局。
    pub fn think_ai(&self, delay_ms: Option<u32>) -> Promise {
        let board = self.session.board;
        let mark = self.session.turn;
        let config = self
            .session
            .opponent
            .algorithm()
            .map(AiConfig::new)
            .unwrap_or_default()
            .with_think_delay(self.agent.config().think_delay);
        let delay = delay_ms.unwrap_or(config.think_delay.as_millis() as u32);

        future_to_promise(async move {
            if delay > 0 {
                TimeoutFuture::new(delay).await;
            }
            let mut agent = AiAgent::new(config);
            let decision = agent.decide_move(&board, mark);
            let json = serde_json::to_string(&decision).map_err(serde_to_js_error)?;
            Ok(JsValue::from_str(&json))
        })
    }
}
