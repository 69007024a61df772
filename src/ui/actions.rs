//! Action 枚举定义 (Intent)
//!
//! 用户交互转化为明确的语义化 Action

/// 用户操作枚举
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,

    // 牌桌操作
    ActivateCard,       // 翻开光标处的卡牌
    ActivateAt(usize),  // 鼠标点击
    StartGame,
    ShowFront,
    ShowBack,
    OpenThemePicker,

    // 弹窗交互
    Cancel, // Esc
    Submit, // Enter
}
