use crate::domain::BiasType;
use crate::models::condition::Condition;

/// Where the pointer is, in chart units, and which zone it falls in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverContext {
    pub price: f64,
    pub timestamp: i64,
    pub zone: Option<BiasType>,
}

/// Classifies a hovered point into at most one bias zone.
///
/// Only price-based conditions take part. When several hold, the first entry of
/// [`BiasType::ZONE_PRIORITY`] wins.
pub fn classify<'a, I>(price: f64, timestamp: i64, conditions: I) -> Option<BiasType>
where
    I: IntoIterator<Item = (BiasType, &'a Condition)>,
{
    let mut holds = [false; BiasType::COUNT];
    for (bias, condition) in conditions {
        if condition.holds_at(price, timestamp) == Some(true) {
            holds[bias.index()] = true;
        }
    }
    BiasType::ZONE_PRIORITY
        .into_iter()
        .find(|b| holds[b.index()])
}
