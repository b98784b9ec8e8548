#![warn(clippy::missing_docs_in_private_items)]

use pfs_primitives::types::{
	FeeAmount,
	TokenAmount,
	U256,
};

use crate::{
	constants::{
		PROPORTIONAL_FEE_DENOMINATOR,
		WEIGHT_PRECISION_DECIMALS,
	},
	types::{
		FeePolicy,
		FeePolicyKind,
	},
};

/// Computes the fee charged for relaying `amount` under the given policy.
pub fn compute_fee(policy: &FeePolicy, amount: TokenAmount) -> FeeAmount {
	match policy.kind {
		FeePolicyKind::None => FeeAmount::zero(),
		FeePolicyKind::Constant => policy.fee_constant,
		FeePolicyKind::Percent => proportional_fee(amount, policy.fee_percent),
		FeePolicyKind::Combined => policy
			.fee_constant
			.saturating_add(proportional_fee(amount, policy.fee_percent)),
	}
}

/// Computes `amount * percent / 1_000_000` with floor division.
///
/// The multiplication is split so the intermediate product stays within 256
/// bits: `amount = q * 10^6 + r` gives `q * percent + r * percent / 10^6`
/// exactly.
fn proportional_fee(amount: TokenAmount, percent: u32) -> FeeAmount {
	let denominator = U256::from(PROPORTIONAL_FEE_DENOMINATOR);
	let percent = U256::from(percent);
	let quotient = amount / denominator;
	let remainder = amount % denominator;
	quotient
		.saturating_mul(percent)
		.saturating_add((remainder * percent) / denominator)
}

/// Projects a fee onto a bounded integer weight for ranking.
///
/// Fees are quantized to `10^-4` token units; anything smaller becomes
/// weight zero. Overflowing magnitudes cap at `i64::MAX` instead of
/// wrapping.
pub fn fee_to_weight(fee: FeeAmount, decimals: u32) -> u64 {
	let scaled = if decimals >= WEIGHT_PRECISION_DECIMALS {
		fee / U256::exp10((decimals - WEIGHT_PRECISION_DECIMALS) as usize)
	} else {
		match fee.checked_mul(U256::exp10((WEIGHT_PRECISION_DECIMALS - decimals) as usize)) {
			Some(scaled) => scaled,
			None => return i64::MAX as u64,
		}
	};

	if scaled > U256::from(i64::MAX) {
		i64::MAX as u64
	} else {
		scaled.as_u64()
	}
}
