//! Constant price feed

use super::{Price, PriceFeed};

/// Feed that always reports the same price
#[derive(Debug, Clone)]
pub struct FixedPriceFeed {
    price: Price,
}

impl FixedPriceFeed {
    /// Create a feed reporting `price` forever
    pub fn new(price: Price) -> Self {
        tracing::info!(price = %price, "Using fixed price as the price feed");
        Self { price }
    }
}

impl PriceFeed for FixedPriceFeed {
    fn get_price(&self) -> Option<Price> {
        Some(self.price)
    }
}
