//! App 状态定义 (Model)
//!
//! 包含应用状态结构体及相关枚举

use std::time::Duration;

use ratatui::layout::{Position, Rect};

use crate::audio::CuePlayer;
use crate::game::GameController;

/// 牌桌列数
pub const GRID_COLUMNS: usize = 4;

/// 应用状态
pub struct App<P> {
    pub game: GameController<P>,
    pub cursor: usize,
    pub mode: AppMode,
    pub message: Option<String>,
    pub card_areas: Vec<Rect>, // 上一次渲染时每张卡牌的位置，用于鼠标点击
}

/// 应用模式
#[derive(Debug, Clone, PartialEq)]
pub enum AppMode {
    Normal,
    SelectingTheme(usize), // 主题选择框中高亮的下标
}

impl<P: CuePlayer> App<P> {
    /// 创建新的应用实例
    pub fn new(game: GameController<P>) -> Self {
        Self {
            game,
            cursor: 0,
            mode: AppMode::Normal,
            message: None,
            card_areas: Vec::new(),
        }
    }

    /// 推进游戏时钟
    pub fn tick(&mut self, now: Duration) {
        self.game.tick(now);
    }

    /// 屏幕坐标处的卡牌
    pub fn card_at(&self, column: u16, row: u16) -> Option<usize> {
        let position = Position::new(column, row);
        self.card_areas
            .iter()
            .position(|area| area.contains(position))
    }
}
