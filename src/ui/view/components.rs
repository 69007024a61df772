//! 通用 UI 组件
//!
//! 对话框、卡牌等通用组件

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::models::{Card, CardState, image_label};

/// [组件] 弹窗基础框架
pub fn render_dialog_framework(frame: &mut Frame, area: Rect, title: &str) -> Rect {
    frame.render_widget(Clear, area);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

/// [组件] 卡牌：正面朝上时显示主题封面，翻开后显示背面图片名
pub fn render_card(
    frame: &mut Frame,
    area: Rect,
    card: &Card,
    front: &str,
    is_cursor: bool,
    is_selected: bool,
) {
    let (label, style) = match card.state {
        CardState::Hidden => (format!("? {}", front), Style::default().fg(Color::DarkGray)),
        CardState::Revealed => (
            image_label(&card.back).to_string(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        CardState::Matched => (
            image_label(&card.back).to_string(),
            Style::default().fg(Color::Green),
        ),
    };

    let border_style = if is_cursor {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else if is_selected {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(if is_cursor {
            BorderType::Thick
        } else {
            BorderType::Rounded
        })
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .split(inner);
    frame.render_widget(Paragraph::new(label).style(style).centered(), rows[1]);
}
