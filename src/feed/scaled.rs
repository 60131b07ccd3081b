//! Price derived from another price divided by a scale factor

use super::{Price, PriceFeed};
use std::sync::Arc;

/// Divides the price of a base feed by the price of a scale feed.
///
/// Absent whenever either input is absent, or when the scale is zero.
pub struct ScaledFeed {
    base: Arc<dyn PriceFeed>,
    scale: Arc<dyn PriceFeed>,
}

impl ScaledFeed {
    /// Create a feed reporting `base / scale`
    pub fn new(base: Arc<dyn PriceFeed>, scale: Arc<dyn PriceFeed>) -> Self {
        Self { base, scale }
    }
}

impl PriceFeed for ScaledFeed {
    fn get_price(&self) -> Option<Price> {
        let base = self.base.get_price()?;
        let scale = self.scale.get_price()?;

        if scale.is_zero() {
            tracing::warn!("Scale price is zero, cannot derive price");
            return None;
        }

        base.checked_div(scale).map(|price| price.normalize())
    }
}
