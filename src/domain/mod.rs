// Domain types and value objects
mod bias;
mod formula;
mod indicator;
mod series;

pub use bias::{BiasType, OverlayKind};
pub use formula::{FillDirection, Formula, FormulaEdit, FormulaField, Operator, Timeframe};
pub use indicator::{Indicator, ParamKind};
pub use series::{ActiveRange, IndicatorSeries, IndicatorSet, SeriesPoint};
