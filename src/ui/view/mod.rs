//! 视图层模块
//!
//! 包含主渲染入口和各种视图组件

pub mod components;
pub mod layouts;

use chrono::Local;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use super::state::{App, AppMode, GRID_COLUMNS};
use crate::audio::CuePlayer;
use crate::models::image_label;
use components::{render_card, render_dialog_framework};
use layouts::centered_rect;

/// 渲染 UI
pub fn render<P: CuePlayer>(frame: &mut Frame, app: &mut App<P>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 标题
            Constraint::Min(12),   // 牌桌
            Constraint::Length(3), // 状态
            Constraint::Length(3), // 帮助
        ])
        .split(frame.area());

    render_title(frame, app, chunks[0]);
    render_board(frame, app, chunks[1]);
    render_status(frame, app, chunks[2]);
    render_help(frame, app, chunks[3]);

    // 渲染弹窗
    if let AppMode::SelectingTheme(index) = app.mode {
        render_theme_dialog(frame, app, index);
    }
}

fn render_title<P: CuePlayer>(frame: &mut Frame, app: &App<P>, area: Rect) {
    let title = Paragraph::new(format!("🃏 翻牌配对  ·  主题: {}", app.game.theme().name))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, area);
}

fn render_board<P: CuePlayer>(frame: &mut Frame, app: &mut App<P>, area: Rect) {
    let block = Block::default().title("牌桌").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    app.card_areas.clear();
    if !app.game.board_visible() {
        let prompt = Paragraph::new("按 [s] 开始游戏")
            .style(Style::default().fg(Color::Gray))
            .centered();
        frame.render_widget(prompt, centered_rect(60, 20, inner));
        return;
    }

    let rows = app.game.cards().len().div_ceil(GRID_COLUMNS);
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, rows as u32); rows])
        .split(inner);

    let front = image_label(app.game.front_image()).to_string();
    for (row, row_area) in row_areas.iter().enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, GRID_COLUMNS as u32); GRID_COLUMNS])
            .split(*row_area);

        for (col, cell) in cells.iter().enumerate() {
            let index = row * GRID_COLUMNS + col;
            let Some(card) = app.game.cards().get(index) else {
                break;
            };
            let selected = app.game.selection().contains(index);
            render_card(frame, *cell, card, &front, index == app.cursor, selected);
            app.card_areas.push(*cell);
        }
    }
}

fn render_status<P: CuePlayer>(frame: &mut Frame, app: &App<P>, area: Rect) {
    let game = &app.game;
    let elapsed = game
        .started_at()
        .map(|t| format!("{} 秒", (Local::now() - t).num_seconds().max(0)))
        .unwrap_or_else(|| "-".to_string());

    let mut spans = vec![Span::raw(format!(
        "尝试: {}  配对: {}/{}  用时: {}",
        game.attempts(),
        game.matched_pairs(),
        game.total_pairs(),
        elapsed
    ))];
    if game.is_locked() {
        spans.push(Span::styled("  [比较中]", Style::default().fg(Color::Red)));
    }
    if game.is_complete() {
        spans.push(Span::styled(
            "  ✔ 完成",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let status = Paragraph::new(Line::from(spans))
        .block(Block::default().title("状态").borders(Borders::ALL));
    frame.render_widget(status, area);
}

fn render_help<P: CuePlayer>(frame: &mut Frame, app: &App<P>, area: Rect) {
    let help_text = match &app.mode {
        AppMode::Normal => {
            "[←↓↑→/hjkl] 移动  [Enter/空格] 翻牌  [s] 开始  [f] 显示正面  [b] 显示背面  [t] 主题  [q] 退出"
        }
        AppMode::SelectingTheme(_) => "[j/k] 选择主题  [Enter] 确认  [Esc] 取消",
    };

    let message = app.message.as_deref().unwrap_or("");
    let text = if message.is_empty() {
        help_text.to_string()
    } else {
        format!("{}  |  {}", help_text, message)
    };

    let help = Paragraph::new(text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(help, area);
}

fn render_theme_dialog<P: CuePlayer>(frame: &mut Frame, app: &App<P>, index: usize) {
    let area = centered_rect(40, 40, frame.area());
    let inner = render_dialog_framework(frame, area, "选择主题");

    let current = app.game.theme().name.as_str();
    let items: Vec<ListItem> = app
        .game
        .catalog()
        .names()
        .into_iter()
        .map(|name| {
            let marker = if name == current { "● " } else { "  " };
            ListItem::new(format!("{}{}", marker, name))
        })
        .collect();

    let list = List::new(items).highlight_style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED),
    );

    let mut state = ListState::default();
    state.select(Some(index));

    frame.render_stateful_widget(list, inner, &mut state);
}
