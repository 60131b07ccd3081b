//! On-chain oracle price feed
//!
//! The oracle is read synchronously on every call. Oracle values are
//! fixed-point integers, 18 decimals for a wad.

use super::{FeedError, Price, PriceFeed};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Decimals of a wad fixed-point value
pub const WAD_DECIMALS: u32 = 18;

/// Decimals of a ray fixed-point value
pub const RAY_DECIMALS: u32 = 27;

/// Client able to read the current raw value of an on-chain oracle
pub trait OracleClient: Send + Sync {
    /// Read the current raw fixed-point value
    fn read_raw(&self) -> Result<u128, FeedError>;

    /// Human-readable description for logs
    fn describe(&self) -> String {
        "oracle".to_string()
    }
}

/// Largest mantissa a `Decimal` can hold (96 bits)
const MAX_MANTISSA: u128 = (1 << 96) - 1;

/// Largest scale a `Decimal` can hold
const MAX_SCALE: u32 = 28;

/// Convert a raw fixed-point integer with `decimals` decimals into a price.
///
/// Trailing digits that do not fit the 96-bit mantissa are rounded away
/// (half up), so only values whose integer part is too large fail.
pub fn from_fixed_point(raw: u128, decimals: u32) -> Result<Price, FeedError> {
    let out_of_range = || FeedError::Payload(format!("oracle value {} out of range", raw));

    let mut scale = decimals;
    let mut divisor: u128 = 1;
    while scale > 0 && (raw / divisor > MAX_MANTISSA || scale > MAX_SCALE) {
        divisor = divisor.checked_mul(10).ok_or_else(out_of_range)?;
        scale -= 1;
    }

    let mut mantissa = raw / divisor;
    if divisor > 1 && raw % divisor >= divisor / 2 {
        mantissa += 1;
    }

    let value = i128::try_from(mantissa).map_err(|_| out_of_range())?;
    Decimal::try_from_i128_with_scale(value, scale)
        .map(|price| price.normalize())
        .map_err(|e| FeedError::Payload(format!("oracle value {} not representable: {}", raw, e)))
}

/// Feed reading its price straight from an oracle
pub struct BlockchainFeed {
    client: Arc<dyn OracleClient>,
    decimals: u32,
}

impl BlockchainFeed {
    /// Create a feed over a wad-denominated oracle
    pub fn new(client: Arc<dyn OracleClient>) -> Self {
        Self::with_decimals(client, WAD_DECIMALS)
    }

    /// Create a feed over an oracle with a custom number of decimals
    pub fn with_decimals(client: Arc<dyn OracleClient>, decimals: u32) -> Self {
        tracing::info!(oracle = %client.describe(), decimals, "Using on-chain oracle as the price feed");
        Self { client, decimals }
    }

    /// Read the oracle, propagating failures
    pub fn read_price(&self) -> Result<Price, FeedError> {
        let raw = self.client.read_raw()?;
        from_fixed_point(raw, self.decimals)
    }
}

impl PriceFeed for BlockchainFeed {
    fn get_price(&self) -> Option<Price> {
        match self.read_price() {
            Ok(price) => Some(price),
            Err(e) => {
                tracing::warn!(oracle = %self.client.describe(), error = %e, "Failed to read oracle");
                None
            }
        }
    }
}
