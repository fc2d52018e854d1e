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

/// One record per token id, kept after settlement or cancellation with
/// `active` cleared and the price zeroed.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct Listing {
    pub seller: Addr,
    pub price: Uint128,
    pub active: bool,
}

/// Earnest money held against a listing. The first depositor commits as the
/// buyer; the record is drained on finalize and refunded on cancel.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct Deposit {
    pub buyer: Addr,
    pub amount: Uint128,
}

pub const CONTRACT_INFO: Item<ContractInfo> = Item::new("escrow_info");
pub const LISTINGS: Map<&str, Listing> = Map::new("listings");
pub const DEPOSITS: Map<&str, Deposit> = Map::new("deposits");
