#![warn(clippy::missing_docs_in_private_items)]

/// Denominator turning `fee_percent` values into fractions, in parts per million.
pub const PROPORTIONAL_FEE_DENOMINATOR: u64 = 1_000_000;

/// Path weights quantize fees to `10^-WEIGHT_PRECISION_DECIMALS` token units.
pub const WEIGHT_PRECISION_DECIMALS: u32 = 4;

/// Upper bound on the number of candidate routes a single query materializes.
pub const MAX_PATHS_PER_QUERY: usize = 100;
