use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::{Theme, ThemeCatalog};

/// 配置文件结构 (config.toml)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_theme: String,
    pub timing: Timing,
    pub sounds: SoundConfig,
    pub themes: Vec<Theme>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_theme: "anime".to_string(),
            timing: Timing::default(),
            sounds: SoundConfig::default(),
            themes: vec![Theme::anime(), Theme::tools()],
        }
    }
}

impl Config {
    /// 校验主题并生成主题目录
    pub fn catalog(&self) -> Result<ThemeCatalog, ConfigError> {
        let catalog = ThemeCatalog::from_themes(self.themes.clone())?;
        if !catalog.contains(&self.default_theme) {
            return Err(ConfigError::UnknownDefaultTheme(self.default_theme.clone()));
        }
        Ok(catalog)
    }
}

/// 各类延时（毫秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub stagger_ms: u64,
    pub mismatch_delay_ms: u64,
    pub preview_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            stagger_ms: 200,
            mismatch_delay_ms: 1000,
            preview_ms: 10_000,
        }
    }
}

impl Timing {
    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }

    pub fn mismatch_delay(&self) -> Duration {
        Duration::from_millis(self.mismatch_delay_ms)
    }

    pub fn preview(&self) -> Duration {
        Duration::from_millis(self.preview_ms)
    }

    /// 预览时长不得短于逐张翻开全部卡牌所需的时间，否则两段翻牌会交错。
    /// 返回调整后的配置以及是否做了调整
    pub fn normalized(self, cards: usize) -> (Self, bool) {
        let minimum = self.stagger_ms.saturating_mul(cards as u64);
        if self.preview_ms >= minimum {
            (self, false)
        } else {
            (
                Self {
                    preview_ms: minimum,
                    ..self
                },
                true,
            )
        }
    }
}

/// 提示音配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    /// 外部播放命令（如 `paplay`、`afplay`），留空则响铃
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,
    #[serde(rename = "match")]
    pub match_sound: String,
    #[serde(rename = "fail")]
    pub fail_sound: String,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            player: None,
            match_sound: "sounds/match.mp3".to_string(),
            fail_sound: "sounds/fail.mp3".to_string(),
        }
    }
}

/// 从TOML文件加载配置，文件不存在时使用默认配置
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// 配置文件不存在时写入默认配置，便于用户编辑
pub fn ensure_config(path: &Path) -> Result<bool, ConfigError> {
    if path.exists() {
        return Ok(false);
    }

    let content = toml::to_string_pretty(&Config::default())?;
    fs::write(path, content)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
default_theme = "tools"

[timing]
stagger_ms = 100

[sounds]
player = "paplay"
match = "ding.wav"
"#,
        )
        .unwrap();

        assert_eq!(config.default_theme, "tools");
        assert_eq!(
            config.timing,
            Timing {
                stagger_ms: 100,
                mismatch_delay_ms: 1000,
                preview_ms: 10_000,
            }
        );
        assert_eq!(config.sounds.player.as_deref(), Some("paplay"));
        assert_eq!(config.sounds.match_sound, "ding.wav");
        assert_eq!(config.sounds.fail_sound, "sounds/fail.mp3");
        assert_eq!(config.themes.len(), 2);
        assert!(config.catalog().is_ok());
    }

    #[test]
    fn test_custom_themes() {
        let config: Config = toml::from_str(
            r#"
default_theme = "space"

[[themes]]
name = "space"
front = "space/cover.png"
back = ["a.png", "b.png", "c.png", "d.png", "e.png", "f.png", "g.png", "h.png"]
"#,
        )
        .unwrap();

        let catalog = config.catalog().unwrap();
        assert_eq!(catalog.names(), vec!["space"]);
        assert_eq!(catalog.first().front, "space/cover.png");
    }

    #[test]
    fn test_repeated_back_image_is_rejected() {
        let config: Config = toml::from_str(
            r#"
default_theme = "dup"

[[themes]]
name = "dup"
front = "dup/cover.png"
back = ["a.png", "a.png", "c.png", "d.png", "e.png", "f.png", "g.png", "h.png"]
"#,
        )
        .unwrap();

        assert!(matches!(
            config.catalog(),
            Err(ConfigError::DuplicateBackImage { image, .. }) if image == "a.png"
        ));
    }

    #[test]
    fn test_unknown_default_theme() {
        let config = Config {
            default_theme: "space".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.catalog(),
            Err(ConfigError::UnknownDefaultTheme(name)) if name == "space"
        ));
    }

    #[test]
    fn test_malformed_config_is_rejected() {
        let dir = std::env::temp_dir().join(format!("pairflip-bad-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, "default_theme = [").unwrap();

        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_ensure_config_writes_defaults_once() {
        let dir = std::env::temp_dir().join(format!("pairflip-cfg-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let _ = fs::remove_file(&path);

        assert_eq!(load_config(&path).unwrap(), Config::default());
        assert!(ensure_config(&path).unwrap());
        assert!(!ensure_config(&path).unwrap());
        assert_eq!(load_config(&path).unwrap(), Config::default());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_preview_is_raised_to_cover_stagger() {
        let timing = Timing {
            stagger_ms: 200,
            mismatch_delay_ms: 1000,
            preview_ms: 1000,
        };
        let (fixed, changed) = timing.normalized(16);
        assert!(changed);
        assert_eq!(fixed.preview_ms, 3200);

        let (same, changed) = Timing::default().normalized(16);
        assert!(!changed);
        assert_eq!(same, Timing::default());
    }
}
