//! 业务逻辑处理 (Update/Dispatch)
//!
//! 包含核心的 dispatch 逻辑和各种业务处理方法

use super::actions::Action;
use super::state::{App, AppMode, GRID_COLUMNS};
use crate::audio::CuePlayer;
use crate::game::Activation;

impl<P: CuePlayer> App<P> {
    /// 核心逻辑分发
    pub fn dispatch(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return true,

            Action::MoveUp => match self.mode {
                AppMode::SelectingTheme(_) => self.move_theme(false),
                AppMode::Normal => self.move_cursor(-(GRID_COLUMNS as isize)),
            },
            Action::MoveDown => match self.mode {
                AppMode::SelectingTheme(_) => self.move_theme(true),
                AppMode::Normal => self.move_cursor(GRID_COLUMNS as isize),
            },
            Action::MoveLeft => self.move_cursor(-1),
            Action::MoveRight => self.move_cursor(1),

            Action::ActivateCard => self.activate(self.cursor),
            Action::ActivateAt(index) => {
                self.cursor = index;
                self.activate(index);
            }
            Action::StartGame => self.start_game(),
            Action::ShowFront => {
                self.game.conceal_all();
            }
            Action::ShowBack => {
                self.game.reveal_all();
            }
            Action::OpenThemePicker => self.open_theme_picker(),

            Action::Cancel => self.cancel(),
            Action::Submit => {
                if let AppMode::SelectingTheme(index) = self.mode {
                    self.confirm_theme(index);
                }
            }
        }
        false
    }

    // ============ 牌桌相关 ============

    /// 移动光标（越界时不动）
    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.game.cards().len() as isize;
        let target = self.cursor as isize + delta;
        if (0..len).contains(&target) {
            self.cursor = target as usize;
        }
    }

    /// 翻开卡牌
    pub fn activate(&mut self, index: usize) {
        if !self.game.board_visible() {
            self.message = Some("请先按 's' 开始游戏".to_string());
            return;
        }

        match self.game.on_card_activated(index) {
            Activation::Matched if self.game.is_complete() => {
                self.message = Some(format!(
                    "全部配对完成！共尝试 {} 次，按 's' 再来一局",
                    self.game.attempts()
                ));
            }
            Activation::Matched => self.message = Some("配对成功！".to_string()),
            Activation::Mismatched => self.message = Some("不匹配，再试试".to_string()),
            Activation::FirstSelected => self.message = None,
            Activation::Ignored => {}
        }
    }

    /// 开始游戏
    pub fn start_game(&mut self) {
        self.game.start_game();
        self.cursor = 0;
        self.message = Some(format!(
            "记住卡牌位置，{} 秒后翻回",
            self.game.timing().preview_ms / 1000
        ));
    }

    // ============ 主题相关 ============

    /// 打开主题选择框
    pub fn open_theme_picker(&mut self) {
        let current = self
            .game
            .catalog()
            .position(&self.game.theme().name)
            .unwrap_or(0);
        self.mode = AppMode::SelectingTheme(current);
    }

    fn move_theme(&mut self, down: bool) {
        if let AppMode::SelectingTheme(index) = self.mode {
            let len = self.game.catalog().len();
            let next = if down {
                (index + 1).min(len.saturating_sub(1))
            } else {
                index.saturating_sub(1)
            };
            self.mode = AppMode::SelectingTheme(next);
        }
    }

    /// 确认切换主题
    pub fn confirm_theme(&mut self, index: usize) {
        let name = self
            .game
            .catalog()
            .names()
            .get(index)
            .map(|s| s.to_string());

        self.mode = AppMode::Normal;
        let Some(name) = name else {
            return;
        };

        match self.game.select_theme(&name) {
            Ok(()) => {
                self.cursor = 0;
                self.message = Some(format!("已切换到主题 {}", name));
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    // ============ 通用操作 ============

    /// 取消当前操作
    pub fn cancel(&mut self) {
        self.mode = AppMode::Normal;
        self.message = None;
    }
}
