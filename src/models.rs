use std::collections::HashSet;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 每个主题的背面图片数量（即一局的对数）
pub const PAIRS_PER_BOARD: usize = 8;
/// 一局的卡牌数量
pub const CARDS_PER_BOARD: usize = PAIRS_PER_BOARD * 2;

/// 主题：一张共用的正面图片 + 8 张背面图片
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub front: String,
    pub back: Vec<String>,
}

impl Theme {
    pub fn new(name: &str, front: &str, back: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            front: front.to_string(),
            back: back.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn anime() -> Self {
        Self::new(
            "anime",
            "anime_image/img1.jpg",
            &[
                "anime_image/img2.jpg",
                "anime_image/img3.jpg",
                "anime_image/img4.jpg",
                "anime_image/img5.jpg",
                "anime_image/img6.jpg",
                "anime_image/img7.jpg",
                "anime_image/img8.jpg",
                "anime_image/img9.jpg",
            ],
        )
    }

    pub fn tools() -> Self {
        Self::new(
            "tools",
            "tools/tools1.jpg",
            &[
                "tools/tools2.jpg",
                "tools/tools3.jpg",
                "tools/tools4.jpg",
                "tools/tools5.jpg",
                "tools/tools6.jpg",
                "tools/tools7.jpg",
                "tools/tools8.jpg",
                "tools/tools9.jpg",
            ],
        )
    }
}

/// 主题目录（保持配置中的顺序，供主题选择框使用）
#[derive(Debug, Clone, PartialEq)]
pub struct ThemeCatalog {
    themes: Vec<Theme>,
}

impl ThemeCatalog {
    /// 内置的两个主题
    pub fn builtin() -> Self {
        Self {
            themes: vec![Theme::anime(), Theme::tools()],
        }
    }

    /// 从配置构建目录，校验每个主题恰好有 8 张互不相同的背面图片且名称不重复
    pub fn from_themes(themes: Vec<Theme>) -> Result<Self, ConfigError> {
        if themes.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }

        let mut seen = HashSet::new();
        for theme in &themes {
            if theme.back.len() != PAIRS_PER_BOARD {
                return Err(ConfigError::BackImageCount {
                    name: theme.name.clone(),
                    count: theme.back.len(),
                    expected: PAIRS_PER_BOARD,
                });
            }
            let mut images = HashSet::new();
            if let Some(image) = theme.back.iter().find(|image| !images.insert(image.as_str())) {
                return Err(ConfigError::DuplicateBackImage {
                    name: theme.name.clone(),
                    image: image.clone(),
                });
            }
            if !seen.insert(theme.name.as_str()) {
                return Err(ConfigError::DuplicateTheme(theme.name.clone()));
            }
        }

        Ok(Self { themes })
    }

    pub fn get(&self, name: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.themes.iter().position(|t| t.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.themes.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    #[cfg(test)]
    pub fn first(&self) -> &Theme {
        // from_themes 保证非空
        &self.themes[0]
    }
}

/// 卡牌状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardState {
    #[default]
    Hidden, // 显示正面
    Revealed, // 显示背面
    Matched,  // 已配对，不再响应
}

/// 卡牌
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub back: String,
    pub state: CardState,
}

impl Card {
    pub fn new(back: String) -> Self {
        Self {
            back,
            state: CardState::Hidden,
        }
    }

    /// 背面是否朝上（翻开或已配对）
    #[cfg(test)]
    pub fn is_face_up(&self) -> bool {
        matches!(self.state, CardState::Revealed | CardState::Matched)
    }

    pub fn is_disabled(&self) -> bool {
        self.state == CardState::Matched
    }

    /// 翻到背面，返回状态是否改变
    pub fn reveal(&mut self) -> bool {
        if self.state == CardState::Hidden {
            self.state = CardState::Revealed;
            true
        } else {
            false
        }
    }

    /// 翻回正面，已配对的卡牌不受影响
    pub fn conceal(&mut self) -> bool {
        if self.state == CardState::Revealed {
            self.state = CardState::Hidden;
            true
        } else {
            false
        }
    }

    pub fn disable(&mut self) {
        self.state = CardState::Matched;
    }
}

/// 每张背面图片放入两次
pub fn build_deck(backs: &[String]) -> Vec<String> {
    let mut deck = Vec::with_capacity(backs.len() * 2);
    for image in backs {
        deck.push(image.clone());
        deck.push(image.clone());
    }
    deck
}

/// Fisher-Yates 洗牌
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// 根据主题生成洗好的牌组
pub fn new_deck<R: Rng + ?Sized>(theme: &Theme, rng: &mut R) -> Vec<String> {
    let mut deck = build_deck(&theme.back);
    shuffle(&mut deck, rng);
    deck
}

/// 图片路径的短名（用于终端显示），如 `anime_image/img2.jpg` -> `img2`
pub fn image_label(path: &str) -> &str {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    fn counts(deck: &[String]) -> HashMap<&str, usize> {
        let mut map = HashMap::new();
        for image in deck {
            *map.entry(image.as_str()).or_insert(0) += 1;
        }
        map
    }

    #[test]
    fn test_build_deck_duplicates_each_image() {
        let theme = Theme::anime();
        let deck = build_deck(&theme.back);

        assert_eq!(deck.len(), CARDS_PER_BOARD);
        let counts = counts(&deck);
        assert_eq!(counts.len(), PAIRS_PER_BOARD);
        assert!(counts.values().all(|&n| n == 2));
    }

    #[test]
    fn test_new_deck_keeps_pairs() {
        let mut rng = Pcg64Mcg::seed_from_u64(7);
        for theme in [Theme::anime(), Theme::tools()] {
            for _ in 0..50 {
                let deck = new_deck(&theme, &mut rng);
                assert_eq!(deck.len(), CARDS_PER_BOARD);
                let counts = counts(&deck);
                assert_eq!(counts.len(), PAIRS_PER_BOARD);
                assert!(counts.values().all(|&n| n == 2));
                assert!(deck.iter().all(|image| theme.back.contains(image)));
            }
        }
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = Pcg64Mcg::seed_from_u64(42);
        let original: Vec<u32> = (0..16).collect();
        let mut items = original.clone();
        shuffle(&mut items, &mut rng);

        let mut sorted = items.clone();
        sorted.sort();
        assert_eq!(sorted, original);
    }

    #[test]
    fn test_shuffle_produces_non_identity() {
        let mut rng = Pcg64Mcg::seed_from_u64(1);
        let original: Vec<u32> = (0..16).collect();
        let moved = (0..20)
            .filter(|_| {
                let mut items = original.clone();
                shuffle(&mut items, &mut rng);
                items != original
            })
            .count();
        assert!(moved > 0);
    }

    #[test]
    fn test_shuffle_is_roughly_uniform() {
        let mut rng = Pcg64Mcg::seed_from_u64(2024);
        let mut seen: HashMap<Vec<u8>, usize> = HashMap::new();
        for _ in 0..6000 {
            let mut items = vec![0u8, 1, 2];
            shuffle(&mut items, &mut rng);
            *seen.entry(items).or_insert(0) += 1;
        }

        assert_eq!(seen.len(), 6);
        for (perm, n) in &seen {
            assert!((800..1200).contains(n), "{perm:?} appeared {n} times");
        }
    }

    #[test]
    fn test_shuffle_handles_short_slices() {
        let mut rng = Pcg64Mcg::seed_from_u64(3);
        let mut empty: Vec<u8> = Vec::new();
        shuffle(&mut empty, &mut rng);
        let mut one = vec![9];
        shuffle(&mut one, &mut rng);
        assert_eq!(one, vec![9]);
    }

    #[test]
    fn test_card_transitions() {
        let mut card = Card::new("anime_image/img2.jpg".to_string());
        assert_eq!(card.state, CardState::Hidden);
        assert!(!card.conceal());

        assert!(card.reveal());
        assert!(!card.reveal());
        assert!(card.is_face_up());

        assert!(card.conceal());
        assert_eq!(card.state, CardState::Hidden);

        card.reveal();
        card.disable();
        assert!(card.is_disabled());
        assert!(!card.conceal());
        assert!(!card.reveal());
        assert_eq!(card.state, CardState::Matched);
    }

    #[test]
    fn test_catalog_validation() {
        let catalog = ThemeCatalog::builtin();
        assert_eq!(catalog.names(), vec!["anime", "tools"]);
        assert_eq!(catalog.position("tools"), Some(1));
        assert!(!catalog.contains("space"));

        let short = Theme::new("short", "f.jpg", &["a.jpg", "b.jpg"]);
        assert!(matches!(
            ThemeCatalog::from_themes(vec![short]),
            Err(ConfigError::BackImageCount { count: 2, .. })
        ));

        assert!(matches!(
            ThemeCatalog::from_themes(vec![Theme::anime(), Theme::anime()]),
            Err(ConfigError::DuplicateTheme(name)) if name == "anime"
        ));

        assert!(matches!(
            ThemeCatalog::from_themes(Vec::new()),
            Err(ConfigError::EmptyCatalog)
        ));

        let repeated = Theme::new(
            "dup",
            "f.jpg",
            &["a.png", "a.png", "c.png", "d.png", "e.png", "f.png", "g.png", "h.png"],
        );
        assert!(matches!(
            ThemeCatalog::from_themes(vec![repeated]),
            Err(ConfigError::DuplicateBackImage { name, image }) if name == "dup" && image == "a.png"
        ));
    }

    #[test]
    fn test_image_label() {
        assert_eq!(image_label("anime_image/img2.jpg"), "img2");
        assert_eq!(image_label("tools/tools9.jpg"), "tools9");
        assert_eq!(image_label("plain"), "plain");
    }
}
