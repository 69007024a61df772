//! 游戏控制器
//!
//! 负责主题切换、洗牌发牌、翻牌状态机、配对判定与重置。
//! 所有延时动作（逐张翻牌、不匹配翻回、开局预览后盖牌）都交给
//! [`Scheduler`]，由 [`GameController::tick`] 推进。

use std::time::Duration;

use chrono::{DateTime, Local};
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

use crate::audio::{Cue, CuePlayer};
use crate::error::GameError;
use crate::models::{CARDS_PER_BOARD, Card, CardState, Theme, ThemeCatalog, new_deck};
use crate::scheduler::{Lane, Scheduler, TaskHandle};
use crate::storage::Timing;

/// 当前选中的卡牌
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    NoSelection,
    OneSelected(usize),
    TwoSelected(usize, usize),
}

impl Selection {
    pub fn contains(&self, index: usize) -> bool {
        match *self {
            Selection::NoSelection => false,
            Selection::OneSelected(a) => a == index,
            Selection::TwoSelected(a, b) => a == index || b == index,
        }
    }
}

/// 延时动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimedAction {
    Reveal(usize),
    Conceal(usize),
    ConcealAll,
    ResolveMismatch(usize, usize),
}

/// 点击卡牌的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Ignored,
    FirstSelected,
    Matched,
    Mismatched,
}

pub struct GameController<P> {
    catalog: ThemeCatalog,
    theme: Theme,
    timing: Timing,
    cards: Vec<Card>,
    selection: Selection,
    scheduler: Scheduler<TimedAction>,
    rng: Pcg64Mcg,
    cues: P,
    attempts: u32,
    started_at: Option<DateTime<Local>>,
    board_visible: bool,
    auto_conceal: Option<TaskHandle>, // 开局预览结束时的自动盖牌
}

impl<P: CuePlayer> GameController<P> {
    /// 创建控制器并生成第一副牌（牌桌在开始游戏前保持隐藏）
    pub fn new(
        catalog: ThemeCatalog,
        theme: &str,
        timing: Timing,
        cues: P,
    ) -> Result<Self, GameError> {
        Self::with_seed(catalog, theme, timing, cues, rand::random())
    }

    pub fn with_seed(
        catalog: ThemeCatalog,
        theme: &str,
        timing: Timing,
        cues: P,
        seed: u64,
    ) -> Result<Self, GameError> {
        let theme = catalog
            .get(theme)
            .cloned()
            .ok_or_else(|| GameError::UnknownTheme(theme.to_string()))?;

        let (timing, raised) = timing.normalized(CARDS_PER_BOARD);
        if raised {
            tracing::warn!(
                preview_ms = timing.preview_ms,
                "preview delay raised to cover the flip sequence"
            );
        }

        let mut game = Self {
            catalog,
            theme,
            timing,
            cards: Vec::new(),
            selection: Selection::NoSelection,
            scheduler: Scheduler::new(),
            rng: Pcg64Mcg::seed_from_u64(seed),
            cues,
            attempts: 0,
            started_at: None,
            board_visible: false,
            auto_conceal: None,
        };
        game.generate_board();
        Ok(game)
    }

    // ============ 命令 ============

    /// 切换主题并重新发牌
    pub fn select_theme(&mut self, name: &str) -> Result<(), GameError> {
        let theme = self
            .catalog
            .get(name)
            .cloned()
            .ok_or_else(|| GameError::UnknownTheme(name.to_string()))?;

        tracing::info!(from = %self.theme.name, to = %theme.name, "theme changed");
        self.theme = theme;
        self.generate_board();
        Ok(())
    }

    /// 洗牌并替换牌桌上的全部卡牌。旧卡牌上的延时动作一并作废
    pub fn generate_board(&mut self) {
        let cancelled = self.scheduler.cancel_all();
        let deck = new_deck(&self.theme, &mut self.rng);

        self.cards = deck.into_iter().map(Card::new).collect();
        self.selection = Selection::NoSelection;
        self.attempts = 0;
        self.started_at = self.board_visible.then(Local::now);
        self.auto_conceal = None;

        tracing::info!(
            theme = %self.theme.name,
            cards = self.cards.len(),
            cancelled,
            "board generated"
        );
    }

    /// 逐张翻到背面（显示背面按钮）
    pub fn reveal_all(&mut self) -> Vec<TaskHandle> {
        self.stagger(TimedAction::Reveal)
    }

    /// 逐张翻回正面（显示正面按钮）。预览期间手动盖牌即结束预览
    pub fn conceal_all(&mut self) -> Vec<TaskHandle> {
        if let Some(handle) = self.auto_conceal.take() {
            if self.scheduler.cancel(handle) {
                tracing::debug!("preview ended early");
            }
        }
        self.stagger(TimedAction::Conceal)
    }

    fn stagger(&mut self, action: fn(usize) -> TimedAction) -> Vec<TaskHandle> {
        let cancelled = self.scheduler.cancel_lane(Lane::Stagger);
        if cancelled > 0 {
            tracing::debug!(cancelled, "replaced pending flip sequence");
        }

        let step = self.timing.stagger();
        (0..self.cards.len())
            .map(|i| {
                self.scheduler
                    .schedule(step * i as u32, Lane::Stagger, action(i))
            })
            .collect()
    }

    /// 开始游戏：重新发牌，逐张翻开预览，预览结束后逐张盖回。
    /// 再次开始会取消上一局尚未执行的全部延时动作
    pub fn start_game(&mut self) {
        self.board_visible = true;
        self.generate_board();
        self.reveal_all();
        let handle = self.scheduler.schedule(
            self.timing.preview(),
            Lane::AutoConceal,
            TimedAction::ConcealAll,
        );
        self.auto_conceal = Some(handle);
    }

    /// 翻牌状态机
    pub fn on_card_activated(&mut self, index: usize) -> Activation {
        if self.is_locked() || self.selection == Selection::OneSelected(index) {
            return Activation::Ignored;
        }
        let Some(card) = self.cards.get_mut(index) else {
            return Activation::Ignored;
        };
        if card.is_disabled() {
            return Activation::Ignored;
        }
        card.reveal();

        match self.selection {
            Selection::NoSelection => {
                self.selection = Selection::OneSelected(index);
                Activation::FirstSelected
            }
            Selection::OneSelected(first) => {
                self.selection = Selection::TwoSelected(first, index);
                self.attempts += 1;
                self.evaluate_match()
            }
            Selection::TwoSelected(..) => Activation::Ignored,
        }
    }

    /// 比较两张选中卡牌的背面图片
    pub fn evaluate_match(&mut self) -> Activation {
        let Selection::TwoSelected(first, second) = self.selection else {
            return Activation::Ignored;
        };

        if self.cards[first].back == self.cards[second].back {
            self.cards[first].disable();
            self.cards[second].disable();
            self.cues.play(Cue::Match);
            self.selection = Selection::NoSelection;

            tracing::info!(first, second, image = %self.cards[first].back, "pair matched");
            if self.is_complete() {
                tracing::info!(attempts = self.attempts, "all pairs matched");
            }
            Activation::Matched
        } else {
            self.cues.play(Cue::Fail);
            self.scheduler.schedule(
                self.timing.mismatch_delay(),
                Lane::Resolution,
                TimedAction::ResolveMismatch(first, second),
            );
            tracing::debug!(first, second, "mismatch");
            Activation::Mismatched
        }
    }

    /// 取消单个延时动作
    #[cfg(test)]
    pub fn cancel_timer(&mut self, handle: TaskHandle) -> bool {
        self.scheduler.cancel(handle)
    }

    /// 推进时钟并执行所有到期的延时动作
    pub fn tick(&mut self, now: Duration) {
        while let Some(action) = self.scheduler.next_due(now) {
            self.apply(action);
        }
    }

    fn apply(&mut self, action: TimedAction) {
        match action {
            TimedAction::Reveal(i) => {
                if let Some(card) = self.cards.get_mut(i) {
                    card.reveal();
                }
            }
            TimedAction::Conceal(i) => {
                // 正在比较的卡牌保持翻开
                if !self.selection.contains(i) {
                    if let Some(card) = self.cards.get_mut(i) {
                        card.conceal();
                    }
                }
            }
            TimedAction::ConcealAll => {
                self.conceal_all();
            }
            TimedAction::ResolveMismatch(first, second) => {
                for i in [first, second] {
                    if let Some(card) = self.cards.get_mut(i) {
                        card.conceal();
                    }
                }
                if self.selection == Selection::TwoSelected(first, second) {
                    self.selection = Selection::NoSelection;
                }
            }
        }
    }

    // ============ 查询 ============

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn front_image(&self) -> &str {
        &self.theme.front
    }

    pub fn catalog(&self) -> &ThemeCatalog {
        &self.catalog
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// 两张卡牌等待比较结果时锁定牌桌
    pub fn is_locked(&self) -> bool {
        matches!(self.selection, Selection::TwoSelected(..))
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn matched_pairs(&self) -> usize {
        self.cards
            .iter()
            .filter(|c| c.state == CardState::Matched)
            .count()
            / 2
    }

    pub fn total_pairs(&self) -> usize {
        self.cards.len() / 2
    }

    pub fn is_complete(&self) -> bool {
        !self.cards.is_empty() && self.cards.iter().all(Card::is_disabled)
    }

    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.started_at
    }

    pub fn board_visible(&self) -> bool {
        self.board_visible
    }

    #[cfg(test)]
    pub fn pending_timers(&self) -> usize {
        self.scheduler.len()
    }

    #[cfg(test)]
    pub fn cues(&self) -> &P {
        &self.cues
    }
}
