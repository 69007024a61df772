//! 键盘/鼠标事件映射 (Input -> Action)
//!
//! 将按键事件转换为 Action

use std::io;

use crossterm::event::{KeyCode, MouseButton, MouseEvent, MouseEventKind};

use super::actions::Action;
use super::state::{App, AppMode};
use crate::audio::CuePlayer;

/// 根据当前模式和按键获取对应的 Action
pub fn get_action(mode: &AppMode, key: KeyCode) -> Option<Action> {
    match mode {
        AppMode::Normal => match key {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::MoveUp),
            KeyCode::Char('j') | KeyCode::Down => Some(Action::MoveDown),
            KeyCode::Char('h') | KeyCode::Left => Some(Action::MoveLeft),
            KeyCode::Char('l') | KeyCode::Right => Some(Action::MoveRight),
            KeyCode::Enter | KeyCode::Char(' ') => Some(Action::ActivateCard),
            KeyCode::Char('s') => Some(Action::StartGame),
            KeyCode::Char('f') => Some(Action::ShowFront),
            KeyCode::Char('b') => Some(Action::ShowBack),
            KeyCode::Char('t') => Some(Action::OpenThemePicker),
            _ => None,
        },
        AppMode::SelectingTheme(_) => match key {
            KeyCode::Esc | KeyCode::Char('q') => Some(Action::Cancel),
            KeyCode::Enter => Some(Action::Submit),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::MoveUp),
            KeyCode::Char('j') | KeyCode::Down => Some(Action::MoveDown),
            _ => None,
        },
    }
}

/// 处理按键事件
pub fn handle_key_event<P: CuePlayer>(app: &mut App<P>, key: KeyCode) -> io::Result<bool> {
    if let Some(action) = get_action(&app.mode, key) {
        Ok(app.dispatch(action))
    } else {
        Ok(false)
    }
}

/// 处理鼠标事件：左键点击卡牌即翻牌
pub fn handle_mouse_event<P: CuePlayer>(app: &mut App<P>, mouse: MouseEvent) {
    if app.mode != AppMode::Normal {
        return;
    }
    if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
        if let Some(index) = app.card_at(mouse.column, mouse.row) {
            app.dispatch(Action::ActivateAt(index));
        }
    }
}
