use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// The three mutually exclusive directional classifications a formula can target.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum BiasType {
    #[strum(to_string = "Bullish")]
    Bullish,
    #[strum(to_string = "Neutral")]
    Neutral,
    #[strum(to_string = "Bearish")]
    Bearish,
}

impl BiasType {
    /// Fixed display order used by previews and status messages.
    pub const DISPLAY_ORDER: [BiasType; 3] = [Self::Bullish, Self::Neutral, Self::Bearish];

    /// Tie-break when more than one zone condition holds at the same point.
    /// Earlier entries win.
    pub const ZONE_PRIORITY: [BiasType; 3] = [Self::Bullish, Self::Bearish, Self::Neutral];

    pub const COUNT: usize = 3;

    /// Stable slot for per-category arrays.
    pub const fn index(self) -> usize {
        match self {
            Self::Bullish => 0,
            Self::Neutral => 1,
            Self::Bearish => 2,
        }
    }

    /// Bullish and bearish mirror each other. Neutral has no opposite.
    pub const fn opposite(self) -> Option<BiasType> {
        match self {
            Self::Bullish => Some(Self::Bearish),
            Self::Bearish => Some(Self::Bullish),
            Self::Neutral => None,
        }
    }

    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Bullish => "📈",
            Self::Neutral => "➖",
            Self::Bearish => "📉",
        }
    }

    pub const fn short_label(self) -> &'static str {
        match self {
            Self::Bullish => "BULL",
            Self::Neutral => "NEUTRAL",
            Self::Bearish => "BEAR",
        }
    }

    /// Categories that must have a completed formula before a test can run.
    pub fn required(include_neutral: bool) -> Vec<BiasType> {
        Self::DISPLAY_ORDER
            .into_iter()
            .filter(|b| include_neutral || *b != Self::Neutral)
            .collect()
    }
}

/// The two overlay families drawn per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum OverlayKind {
    /// Price region above/below a boundary line.
    Zone,
    /// Time span where a condition holds.
    Shade,
}

impl OverlayKind {
    pub const COUNT: usize = 2;

    pub const fn index(self) -> usize {
        match self {
            Self::Zone => 0,
            Self::Shade => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn indices_are_unique_and_dense() {
        let mut seen = [false; BiasType::COUNT];
        for b in BiasType::iter() {
            assert!(!seen[b.index()]);
            seen[b.index()] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn opposites_are_symmetric() {
        assert_eq!(BiasType::Bullish.opposite(), Some(BiasType::Bearish));
        assert_eq!(BiasType::Bearish.opposite(), Some(BiasType::Bullish));
        assert_eq!(BiasType::Neutral.opposite(), None);
    }

    #[test]
    fn required_categories_follow_neutral_toggle() {
        assert_eq!(
            BiasType::required(false),
            vec![BiasType::Bullish, BiasType::Bearish]
        );
        assert_eq!(BiasType::required(true), BiasType::DISPLAY_ORDER.to_vec());
    }

    #[test]
    fn wire_names_are_lowercase() {
        let json = serde_json::to_string(&BiasType::Bearish).unwrap();
        assert_eq!(json, "\"bearish\"");
    }
}
