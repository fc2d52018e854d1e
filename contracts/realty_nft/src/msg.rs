use cosmwasm_schema::QueryResponses;
use cosmwasm_std::{Binary, Empty, Uint128};
use cw_utils::Expiration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use realty::RoyaltiesInfoResponse;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct InstantiateMsg {
    pub name: String,
    pub symbol: String,
}

/// the custody surface is wire-compatible with the cw721 interface crate so
/// settlement contracts can drive it through `Cw721ExecuteMsg`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteMsg {
    /// Mint a property token to the caller, with an optional royalty record
    MintProperty {
        token_uri: String,
        royalty_recipient: Option<String>,
        royalty_bps: Option<u64>,
    },
    TransferNft {
        recipient: String,
        token_id: String,
    },
    SendNft {
        contract: String,
        token_id: String,
        msg: Binary,
    },
    Approve {
        spender: String,
        token_id: String,
        expires: Option<Expiration>,
    },
    Revoke {
        spender: String,
        token_id: String,
    },
    ApproveAll {
        operator: String,
        expires: Option<Expiration>,
    },
    RevokeAll {
        operator: String,
    },
    /// Registry-wide fallback royalty, creator only
    SetDefaultRoyalty {
        recipient: String,
        bps: u64,
    },
    DeleteDefaultRoyalty {},
    /// Drop a per-token royalty record so the default applies again, creator only
    ResetTokenRoyalty {
        token_id: String,
    },
}

pub type Extension = Option<Empty>;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema, QueryResponses)]
#[serde(rename_all = "snake_case")]
pub enum QueryMsg {
    #[returns(cw721::OwnerOfResponse)]
    OwnerOf {
        token_id: String,
        include_expired: Option<bool>,
    },
    #[returns(cw721::ApprovalResponse)]
    Approval {
        token_id: String,
        spender: String,
        include_expired: Option<bool>,
    },
    #[returns(cw721::ApprovalsResponse)]
    Approvals {
        token_id: String,
        include_expired: Option<bool>,
    },
    #[returns(cw721::OperatorResponse)]
    Operator {
        owner: String,
        operator: String,
        include_expired: Option<bool>,
    },
    #[returns(cw721::OperatorsResponse)]
    AllOperators {
        owner: String,
        include_expired: Option<bool>,
        start_after: Option<String>,
        limit: Option<u32>,
    },
    #[returns(cw721::NumTokensResponse)]
    NumTokens {},
    #[returns(cw721::ContractInfoResponse)]
    ContractInfo {},
    #[returns(cw721::NftInfoResponse<Extension>)]
    NftInfo { token_id: String },
    #[returns(cw721::AllNftInfoResponse<Extension>)]
    AllNftInfo {
        token_id: String,
        include_expired: Option<bool>,
    },
    #[returns(cw721::TokensResponse)]
    Tokens {
        owner: String,
        start_after: Option<String>,
        limit: Option<u32>,
    },
    #[returns(cw721::TokensResponse)]
    AllTokens {
        start_after: Option<String>,
        limit: Option<u32>,
    },
    /// ERC-2981 style royalty resolution: per-token record, else registry
    /// default, else zero
    #[returns(RoyaltiesInfoResponse)]
    RoyaltyInfo {
        token_id: String,
        sale_price: Uint128,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct MigrateMsg {}
