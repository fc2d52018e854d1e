use cosmwasm_std::{Addr, BlockInfo, StdResult, Storage};
use cw_storage_plus::{Index, IndexList, IndexedMap, Item, Map, MultiIndex};
use cw_utils::Expiration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct RegistryInfo {
    pub name: String,
    pub symbol: String,
    /// admin principal for the default-royalty configuration
    pub creator: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct Approval {
    pub spender: Addr,
    pub expires: Expiration,
}

impl Approval {
    pub fn is_expired(&self, block: &BlockInfo) -> bool {
        self.expires.is_expired(block)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct TokenInfo {
    pub owner: Addr,
    /// cleared on every change of custody
    pub approvals: Vec<Approval>,
    pub token_uri: String,
}

/// royalty schedule leg: either a per-token record or the registry default
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct RoyaltyConfig {
    pub recipient: Addr,
    pub bps: u64,
}

pub const REGISTRY_INFO: Item<RegistryInfo> = Item::new("registry_info");
pub const TOKEN_COUNT: Item<u64> = Item::new("num_tokens");
/// (owner, operator) -> blanket approval expiry
pub const OPERATORS: Map<(&Addr, &Addr), Expiration> = Map::new("operators");
pub const TOKEN_ROYALTIES: Map<&str, RoyaltyConfig> = Map::new("token_royalties");
pub const DEFAULT_ROYALTY: Item<RoyaltyConfig> = Item::new("default_royalty");

pub fn num_tokens(storage: &dyn Storage) -> StdResult<u64> {
    Ok(TOKEN_COUNT.may_load(storage)?.unwrap_or_default())
}

pub fn increment_tokens(storage: &mut dyn Storage) -> StdResult<u64> {
    let val = num_tokens(storage)? + 1;
    TOKEN_COUNT.save(storage, &val)?;
    Ok(val)
}

pub struct TokenIndexes<'a> {
    pub owner: MultiIndex<'a, Addr, TokenInfo, String>,
}

impl<'a> IndexList<TokenInfo> for TokenIndexes<'a> {
    fn get_indexes(&'_ self) -> Box<dyn Iterator<Item = &'_ dyn Index<TokenInfo>> + '_> {
        let v: Vec<&dyn Index<TokenInfo>> = vec![&self.owner];
        Box::new(v.into_iter())
    }
}

// this IndexedMap instance has a lifetime
pub fn tokens<'a>() -> IndexedMap<'a, &'a str, TokenInfo, TokenIndexes<'a>> {
    let indexes = TokenIndexes {
        owner: MultiIndex::new(|_pk, t| t.owner.clone(), "tokens", "tokens__owner"),
    };
    IndexedMap::new("tokens", indexes)
}
