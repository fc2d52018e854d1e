use cosmwasm_std::Uint128;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Royalty interface served by the token registry. Settlement contracts query
/// it with the listing price to learn the payout leg for the current schedule.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoyaltyQueryMsg {
    RoyaltyInfo {
        token_id: String,
        sale_price: Uint128,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct RoyaltiesInfoResponse {
    /// empty when the token carries no royalty schedule
    pub address: String,
    pub royalty_amount: Uint128,
}
