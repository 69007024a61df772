//! 错误类型

use std::io;

use thiserror::Error;

/// 游戏控制器返回的错误
#[derive(Debug, Error, PartialEq)]
pub enum GameError {
    #[error("unknown theme: {0}")]
    UnknownTheme(String),
}

/// 加载配置时可能出现的错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("theme {name} has {count} back images, expected {expected}")]
    BackImageCount {
        name: String,
        count: usize,
        expected: usize,
    },

    #[error("theme {name} lists back image {image} more than once")]
    DuplicateBackImage { name: String, image: String },

    #[error("duplicate theme name: {0}")]
    DuplicateTheme(String),

    #[error("theme catalog is empty")]
    EmptyCatalog,

    #[error("default theme {0} is not in the catalog")]
    UnknownDefaultTheme(String),
}
