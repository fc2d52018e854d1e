use cosmwasm_schema::QueryResponses;
use cosmwasm_std::{Addr, Uint128};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::ContractInfo;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct InstantiateMsg {
    pub name: String,
    pub denom: String,
    pub nft_addr: String,
    /// defaults to the instantiating address
    pub fee_recipient: Option<String>,
    pub fee_bps: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteMsg {
    /// List an owned, escrow-approved token; custody moves to the escrow
    ListProperty { token_id: String, price: Uint128 },
    /// Seller-only price change on an active listing
    UpdatePrice { token_id: String, price: Uint128 },
    /// Seller-only; custody returns to the seller and any earnest money is
    /// refunded in full
    CancelListing { token_id: String },
    /// Put earnest money toward a listing; the first depositor commits as
    /// the buyer
    DepositEarnest { token_id: String },
    /// Settle once the accumulated deposit covers the price
    FinalizeSale { token_id: String },
    UpdateInfo(UpdateContractMsg),
    Pause {},
    Unpause {},
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct UpdateContractMsg {
    pub name: Option<String>,
    pub creator: Option<String>,
    pub denom: Option<String>,
    pub nft_addr: Option<String>,
    pub fee_recipient: Option<String>,
    pub fee_bps: Option<u64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema, QueryResponses)]
#[serde(rename_all = "snake_case")]
pub enum QueryMsg {
    #[returns(ContractInfo)]
    GetContractInfo {},
    #[returns(ListingResponse)]
    GetListing { token_id: String },
    // GetListings returns every listing record, active or not
    #[returns(ListingsResponse)]
    GetListings {
        offset: Option<String>,
        limit: Option<u8>,
        order: Option<u8>,
    },
    #[returns(DepositResponse)]
    GetDeposit { token_id: String },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct ListingResponse {
    pub token_id: String,
    pub seller: Addr,
    pub price: Uint128,
    pub active: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct ListingsResponse {
    pub listings: Vec<ListingResponse>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct DepositResponse {
    pub token_id: String,
    pub buyer: Addr,
    pub amount: Uint128,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct MigrateMsg {}
