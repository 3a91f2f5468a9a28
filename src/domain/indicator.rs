use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// How an indicator's parameter field is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Lookback length in bars (moving averages, oscillators).
    Period,
    /// Bars back from the current candle (0 = current).
    BarOffset,
    /// Number of completed prior periods back (1 = previous period).
    PriorPeriods,
    /// A literal number used as-is.
    Literal,
}

/// The closed indicator vocabulary a formula operand can draw from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    // Moving averages
    #[strum(to_string = "SMA")]
    Sma,
    #[strum(to_string = "EMA")]
    Ema,
    #[strum(to_string = "WMA")]
    Wma,

    // Oscillators
    #[strum(to_string = "RSI")]
    Rsi,
    #[strum(to_string = "Stoch")]
    Stochastic,
    #[strum(to_string = "CCI")]
    Cci,

    // Static per-candle price fields
    #[strum(to_string = "Open")]
    Open,
    #[strum(to_string = "High")]
    High,
    #[strum(to_string = "Low")]
    Low,
    #[strum(to_string = "Close")]
    Close,

    // Prior-period extremes
    #[strum(to_string = "Prev High")]
    PrevHigh,
    #[strum(to_string = "Prev Low")]
    PrevLow,

    #[strum(to_string = "Value")]
    Value,
}

impl Indicator {
    pub const fn param_kind(self) -> ParamKind {
        match self {
            Self::Sma | Self::Ema | Self::Wma | Self::Rsi | Self::Stochastic | Self::Cci => {
                ParamKind::Period
            }
            Self::Open | Self::High | Self::Low | Self::Close => ParamKind::BarOffset,
            Self::PrevHigh | Self::PrevLow => ParamKind::PriorPeriods,
            Self::Value => ParamKind::Literal,
        }
    }

    /// Live price references. A formula whose left operand is one of these is
    /// evaluated against an externally supplied price rather than a series.
    pub const fn is_price_reference(self) -> bool {
        matches!(self, Self::Open | Self::High | Self::Low | Self::Close)
    }

    pub const fn is_literal(self) -> bool {
        matches!(self, Self::Value)
    }

    /// Name used by the scan collaborator for series keys.
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Sma => "sma",
            Self::Ema => "ema",
            Self::Wma => "wma",
            Self::Rsi => "rsi",
            Self::Stochastic => "stochastic",
            Self::Cci => "cci",
            Self::Open => "open",
            Self::High => "high",
            Self::Low => "low",
            Self::Close => "close",
            Self::PrevHigh => "prev_high",
            Self::PrevLow => "prev_low",
            Self::Value => "value",
        }
    }

    /// Key of the precomputed series for this indicator and a validated
    /// whole-number parameter, e.g. `sma_20`. Literals have no series.
    pub fn series_key(self, param: f64) -> Option<String> {
        if self.is_literal() {
            return None;
        }
        Some(format!("{}_{}", self.wire_name(), param as i64))
    }

    /// Suggested parameter when the indicator is first picked.
    pub const fn default_param(self) -> &'static str {
        match self.param_kind() {
            ParamKind::Period if matches!(self, Self::Rsi | Self::Stochastic) => "14",
            ParamKind::Period => "20",
            ParamKind::BarOffset => "0",
            ParamKind::PriorPeriods => "1",
            ParamKind::Literal => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn only_price_fields_are_price_references() {
        let refs: Vec<Indicator> = Indicator::iter().filter(|i| i.is_price_reference()).collect();
        assert_eq!(
            refs,
            vec![Indicator::Open, Indicator::High, Indicator::Low, Indicator::Close]
        );
    }

    #[test]
    fn series_key_joins_wire_name_and_whole_param() {
        assert_eq!(Indicator::Sma.series_key(20.0).as_deref(), Some("sma_20"));
        assert_eq!(
            Indicator::PrevHigh.series_key(1.0).as_deref(),
            Some("prev_high_1")
        );
        assert_eq!(Indicator::Value.series_key(100.0), None);
    }

    #[test]
    fn wire_name_matches_serde_name() {
        for ind in Indicator::iter() {
            let json = serde_json::to_string(&ind).unwrap();
            assert_eq!(json, format!("\"{}\"", ind.wire_name()));
        }
    }
}
