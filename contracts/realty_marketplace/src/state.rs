use cosmwasm_std::{Addr, Uint128};
use cw_storage_plus::{Item, Map};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct ContractInfo {
    pub name: String,
    /// admin principal, set to the instantiating address
    pub creator: String,
    /// the accepted settlement denom
    pub denom: String,
    /// the token registry holding custody records
    pub nft_addr: Addr,
    pub fee_recipient: Addr,
    /// platform fee in basis points taken out of every sale
    pub fee_bps: u64,
    pub paused: bool,
}

/// One record per token id. Records survive settlement and cancellation with
/// `active` cleared and the price zeroed, so views keep reporting past
/// listings; re-listing reactivates the record.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct Listing {
    pub seller: Addr,
    pub price: Uint128,
    pub active: bool,
}

pub const CONTRACT_INFO: Item<ContractInfo> = Item::new("marketplace_info");
pub const LISTINGS: Map<&str, Listing> = Map::new("listings");
