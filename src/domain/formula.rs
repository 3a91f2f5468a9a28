use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

use crate::domain::{BiasType, Indicator};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, Default,
)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    #[strum(to_string = "1m")]
    M1,
    #[serde(rename = "5m")]
    #[strum(to_string = "5m")]
    M5,
    #[serde(rename = "15m")]
    #[strum(to_string = "15m")]
    M15,
    #[serde(rename = "30m")]
    #[strum(to_string = "30m")]
    M30,
    #[serde(rename = "1h")]
    #[strum(to_string = "1h")]
    #[default]
    H1,
    #[serde(rename = "4h")]
    #[strum(to_string = "4h")]
    H4,
    #[serde(rename = "1d")]
    #[strum(to_string = "1D")]
    D1,
    #[serde(rename = "1w")]
    #[strum(to_string = "1W")]
    W1,
}

/// Comparison between the two operands of a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum Operator {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
}

/// Side of the boundary a satisfied price-based condition lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillDirection {
    Top,
    Bottom,
}

impl Operator {
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
        }
    }

    /// Operator used when mirroring a formula into the opposite bias category.
    /// Only the strict inequalities swap; the rest pass through unchanged.
    pub const fn mirrored(self) -> Operator {
        match self {
            Self::Gt => Self::Lt,
            Self::Lt => Self::Gt,
            other => other,
        }
    }

    /// `None` for equality operators: there is no region to fill, only a line.
    pub const fn fill_direction(self) -> Option<FillDirection> {
        match self {
            Self::Gt | Self::Ge => Some(FillDirection::Top),
            Self::Lt | Self::Le => Some(FillDirection::Bottom),
            Self::Equal | Self::NotEqual => None,
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One bias rule: `<timeframe> <indicator1>(<param>) <operator> <indicator2>(<param>)`.
///
/// Every field may be empty while the user is still building it. A formula is
/// complete once all seven are filled in.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Formula {
    pub bias_type: Option<BiasType>,
    pub timeframe: Option<Timeframe>,
    pub indicator1: Option<Indicator>,
    #[serde(default)]
    pub indicator1_param: String,
    pub operator: Option<Operator>,
    pub indicator2: Option<Indicator>,
    #[serde(default)]
    pub indicator2_param: String,
}

/// Names of the seven formula fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum FormulaField {
    BiasType,
    Timeframe,
    Indicator1,
    Indicator1Param,
    Operator,
    Indicator2,
    Indicator2Param,
}

/// A single field assignment. `None`/empty string clears the field.
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaEdit {
    BiasType(Option<BiasType>),
    Timeframe(Option<Timeframe>),
    Indicator1(Option<Indicator>),
    Indicator1Param(String),
    Operator(Option<Operator>),
    Indicator2(Option<Indicator>),
    Indicator2Param(String),
}

impl FormulaEdit {
    pub fn field(&self) -> FormulaField {
        match self {
            Self::BiasType(_) => FormulaField::BiasType,
            Self::Timeframe(_) => FormulaField::Timeframe,
            Self::Indicator1(_) => FormulaField::Indicator1,
            Self::Indicator1Param(_) => FormulaField::Indicator1Param,
            Self::Operator(_) => FormulaField::Operator,
            Self::Indicator2(_) => FormulaField::Indicator2,
            Self::Indicator2Param(_) => FormulaField::Indicator2Param,
        }
    }
}

impl Formula {
    /// A blank formula already assigned to a category.
    pub fn empty_for(bias: BiasType) -> Self {
        Self {
            bias_type: Some(bias),
            ..Self::default()
        }
    }

    pub fn is_field_empty(&self, field: FormulaField) -> bool {
        match field {
            FormulaField::BiasType => self.bias_type.is_none(),
            FormulaField::Timeframe => self.timeframe.is_none(),
            FormulaField::Indicator1 => self.indicator1.is_none(),
            FormulaField::Indicator1Param => self.indicator1_param.trim().is_empty(),
            FormulaField::Operator => self.operator.is_none(),
            FormulaField::Indicator2 => self.indicator2.is_none(),
            FormulaField::Indicator2Param => self.indicator2_param.trim().is_empty(),
        }
    }

    /// Copy of this formula retargeted at `bias` with its comparison mirrored.
    pub fn mirrored_into(&self, bias: BiasType) -> Self {
        Self {
            bias_type: Some(bias),
            operator: self.operator.map(Operator::mirrored),
            ..self.clone()
        }
    }

    /// Price-based formulas compare a live price against a boundary series.
    pub fn is_price_based(&self) -> bool {
        self.indicator1.is_some_and(Indicator::is_price_reference)
    }
}
