use cosmwasm_std::{StdResult, Uint128};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::BPS_DENOM;

/// How the gross price of a settled sale is divided. The three legs always
/// sum back to the gross price, integer arithmetic, nothing lost to rounding:
/// the fee and royalty round down and the seller keeps the remainder.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct ProceedsSplit {
    pub price: Uint128,
    pub fee: Uint128,
    pub royalty: Uint128,
    pub seller_amount: Uint128,
}

impl ProceedsSplit {
    pub fn compute(price: Uint128, fee_bps: u64, royalty: Uint128) -> StdResult<Self> {
        let fee = price.multiply_ratio(fee_bps, BPS_DENOM);
        // fee and royalty ceilings keep this from underflowing against a
        // well-behaved registry, checked anyway
        let seller_amount = price.checked_sub(fee)?.checked_sub(royalty)?;
        Ok(ProceedsSplit {
            price,
            fee,
            royalty,
            seller_amount,
        })
    }
}
