pub mod mock;
mod royalty;
mod split;

pub use crate::royalty::{RoyaltiesInfoResponse, RoyaltyQueryMsg};
pub use crate::split::ProceedsSplit;

/// 10000 basis points = 100%
pub const BPS_DENOM: u64 = 10_000;
/// ceiling for a royalty schedule, 20%
pub const MAX_ROYALTY_BPS: u64 = 2_000;
/// ceiling for the platform fee, 10%
pub const MAX_FEE_BPS: u64 = 1_000;
