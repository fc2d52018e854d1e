use crate::error::ContractError;
use crate::msg::{ExecuteMsg, Extension, InstantiateMsg, MigrateMsg, QueryMsg};
use crate::state::{
    increment_tokens, num_tokens, tokens, Approval, RegistryInfo, RoyaltyConfig, TokenInfo,
    DEFAULT_ROYALTY, OPERATORS, REGISTRY_INFO, TOKEN_ROYALTIES,
};
use cosmwasm_std::{
    attr, entry_point, to_json_binary, Addr, Binary, Deps, DepsMut, Env, MessageInfo, Order,
    Response, StdError, StdResult, Uint128,
};
use cw2::set_contract_version;
use cw721::{
    AllNftInfoResponse, Approval as Cw721Approval, ApprovalResponse, ApprovalsResponse,
    ContractInfoResponse, Cw721ReceiveMsg, NftInfoResponse, NumTokensResponse, OperatorResponse,
    OperatorsResponse, OwnerOfResponse, TokensResponse,
};
use cw_storage_plus::Bound;
use cw_utils::{maybe_addr, Expiration};
use realty::{RoyaltiesInfoResponse, BPS_DENOM, MAX_ROYALTY_BPS};

const CONTRACT_NAME: &str = "crates.io:realty_nft";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

// settings for pagination
const MAX_LIMIT: u32 = 100;
const DEFAULT_LIMIT: u32 = 100;

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    let registry = RegistryInfo {
        name: msg.name,
        symbol: msg.symbol,
        creator: info.sender.to_string(),
    };
    REGISTRY_INFO.save(deps.storage, &registry)?;
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    Ok(Response::default())
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::MintProperty {
            token_uri,
            royalty_recipient,
            royalty_bps,
        } => try_mint_property(deps, info, token_uri, royalty_recipient, royalty_bps),
        ExecuteMsg::TransferNft {
            recipient,
            token_id,
        } => try_transfer_nft(deps, env, info, recipient, token_id),
        ExecuteMsg::SendNft {
            contract,
            token_id,
            msg,
        } => try_send_nft(deps, env, info, contract, token_id, msg),
        ExecuteMsg::Approve {
            spender,
            token_id,
            expires,
        } => try_approve(deps, env, info, spender, token_id, expires),
        ExecuteMsg::Revoke { spender, token_id } => {
            try_revoke(deps, env, info, spender, token_id)
        }
        ExecuteMsg::ApproveAll { operator, expires } => {
            try_approve_all(deps, env, info, operator, expires)
        }
        ExecuteMsg::RevokeAll { operator } => try_revoke_all(deps, info, operator),
        ExecuteMsg::SetDefaultRoyalty { recipient, bps } => {
            try_set_default_royalty(deps, info, recipient, bps)
        }
        ExecuteMsg::DeleteDefaultRoyalty {} => try_delete_default_royalty(deps, info),
        ExecuteMsg::ResetTokenRoyalty { token_id } => {
            try_reset_token_royalty(deps, info, token_id)
        }
    }
}

// ============================== Message Handlers ==============================

pub fn try_mint_property(
    deps: DepsMut,
    info: MessageInfo,
    token_uri: String,
    royalty_recipient: Option<String>,
    royalty_bps: Option<u64>,
) -> Result<Response, ContractError> {
    // per-token royalty record, kept even at zero bps so it shadows the default
    let royalty = match royalty_recipient {
        Some(recipient) => {
            let bps = royalty_bps.unwrap_or(0);
            if bps > MAX_ROYALTY_BPS {
                return Err(ContractError::RoyaltyTooHigh { bps });
            }
            Some(RoyaltyConfig {
                recipient: deps.api.addr_validate(&recipient)?,
                bps,
            })
        }
        None => None,
    };

    let id = increment_tokens(deps.storage)?;
    let token_id = id.to_string();

    let token = TokenInfo {
        owner: info.sender.clone(),
        approvals: vec![],
        token_uri: token_uri.clone(),
    };
    tokens().save(deps.storage, &token_id, &token)?;
    if let Some(config) = royalty {
        TOKEN_ROYALTIES.save(deps.storage, &token_id, &config)?;
    }

    Ok(Response::new().add_attributes(vec![
        attr("action", "mint_property"),
        attr("minter", info.sender),
        attr("token_id", token_id),
        attr("token_uri", token_uri),
    ]))
}

pub fn try_transfer_nft(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    recipient: String,
    token_id: String,
) -> Result<Response, ContractError> {
    let recipient_addr = deps.api.addr_validate(&recipient)?;
    transfer_token(deps, &env, &info.sender, &recipient_addr, &token_id)?;

    Ok(Response::new().add_attributes(vec![
        attr("action", "transfer_nft"),
        attr("sender", info.sender),
        attr("recipient", recipient),
        attr("token_id", token_id),
    ]))
}

pub fn try_send_nft(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    contract: String,
    token_id: String,
    msg: Binary,
) -> Result<Response, ContractError> {
    let contract_addr = deps.api.addr_validate(&contract)?;
    transfer_token(deps, &env, &info.sender, &contract_addr, &token_id)?;

    let receive_msg = Cw721ReceiveMsg {
        sender: info.sender.to_string(),
        token_id: token_id.clone(),
        msg,
    };

    Ok(Response::new()
        .add_message(receive_msg.into_cosmos_msg(contract.clone())?)
        .add_attributes(vec![
            attr("action", "send_nft"),
            attr("sender", info.sender),
            attr("recipient", contract),
            attr("token_id", token_id),
        ]))
}

/// moves custody and clears token approvals, the caller must be owner,
/// approved spender or operator
fn transfer_token(
    deps: DepsMut,
    env: &Env,
    sender: &Addr,
    recipient: &Addr,
    token_id: &str,
) -> Result<TokenInfo, ContractError> {
    let mut token = tokens().load(deps.storage, token_id)?;
    check_can_send(deps.as_ref(), env, sender, &token)?;

    token.owner = recipient.clone();
    token.approvals = vec![];
    tokens().save(deps.storage, token_id, &token)?;
    Ok(token)
}

pub fn try_approve(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    spender: String,
    token_id: String,
    expires: Option<Expiration>,
) -> Result<Response, ContractError> {
    update_approval(deps, &env, &info, &spender, &token_id, true, expires)?;

    Ok(Response::new().add_attributes(vec![
        attr("action", "approve"),
        attr("sender", info.sender),
        attr("spender", spender),
        attr("token_id", token_id),
    ]))
}

pub fn try_revoke(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    spender: String,
    token_id: String,
) -> Result<Response, ContractError> {
    update_approval(deps, &env, &info, &spender, &token_id, false, None)?;

    Ok(Response::new().add_attributes(vec![
        attr("action", "revoke"),
        attr("sender", info.sender),
        attr("spender", spender),
        attr("token_id", token_id),
    ]))
}

fn update_approval(
    deps: DepsMut,
    env: &Env,
    info: &MessageInfo,
    spender: &str,
    token_id: &str,
    add: bool,
    expires: Option<Expiration>,
) -> Result<TokenInfo, ContractError> {
    let mut token = tokens().load(deps.storage, token_id)?;
    check_can_approve(deps.as_ref(), env, &info.sender, &token)?;

    let spender_addr = deps.api.addr_validate(spender)?;
    // replace any stale approval for this spender
    token.approvals.retain(|a| a.spender != spender_addr);

    if add {
        let expires = expires.unwrap_or_default();
        if expires.is_expired(&env.block) {
            return Err(ContractError::Expired {});
        }
        token.approvals.push(Approval {
            spender: spender_addr,
            expires,
        });
    }

    tokens().save(deps.storage, token_id, &token)?;
    Ok(token)
}

pub fn try_approve_all(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    operator: String,
    expires: Option<Expiration>,
) -> Result<Response, ContractError> {
    let expires = expires.unwrap_or_default();
    if expires.is_expired(&env.block) {
        return Err(ContractError::Expired {});
    }

    let operator_addr = deps.api.addr_validate(&operator)?;
    OPERATORS.save(deps.storage, (&info.sender, &operator_addr), &expires)?;

    Ok(Response::new().add_attributes(vec![
        attr("action", "approve_all"),
        attr("sender", info.sender),
        attr("operator", operator),
    ]))
}

pub fn try_revoke_all(
    deps: DepsMut,
    info: MessageInfo,
    operator: String,
) -> Result<Response, ContractError> {
    let operator_addr = deps.api.addr_validate(&operator)?;
    OPERATORS.remove(deps.storage, (&info.sender, &operator_addr));

    Ok(Response::new().add_attributes(vec![
        attr("action", "revoke_all"),
        attr("sender", info.sender),
        attr("operator", operator),
    ]))
}

pub fn try_set_default_royalty(
    deps: DepsMut,
    info: MessageInfo,
    recipient: String,
    bps: u64,
) -> Result<Response, ContractError> {
    assert_creator(deps.as_ref(), &info.sender)?;
    if bps > MAX_ROYALTY_BPS {
        return Err(ContractError::RoyaltyTooHigh { bps });
    }

    let config = RoyaltyConfig {
        recipient: deps.api.addr_validate(&recipient)?,
        bps,
    };
    DEFAULT_ROYALTY.save(deps.storage, &config)?;

    Ok(Response::new().add_attributes(vec![
        attr("action", "set_default_royalty"),
        attr("recipient", recipient),
        attr("bps", bps.to_string()),
    ]))
}

pub fn try_delete_default_royalty(
    deps: DepsMut,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    assert_creator(deps.as_ref(), &info.sender)?;
    DEFAULT_ROYALTY.remove(deps.storage);

    Ok(Response::new().add_attributes(vec![attr("action", "delete_default_royalty")]))
}

pub fn try_reset_token_royalty(
    deps: DepsMut,
    info: MessageInfo,
    token_id: String,
) -> Result<Response, ContractError> {
    assert_creator(deps.as_ref(), &info.sender)?;
    // errors on unknown tokens instead of silently succeeding
    tokens().load(deps.storage, &token_id)?;
    TOKEN_ROYALTIES.remove(deps.storage, &token_id);

    Ok(Response::new().add_attributes(vec![
        attr("action", "reset_token_royalty"),
        attr("token_id", token_id),
    ]))
}

// ============================== Permission Helpers ==============================

fn assert_creator(deps: Deps, sender: &Addr) -> Result<(), ContractError> {
    let registry = REGISTRY_INFO.load(deps.storage)?;
    if sender.as_str() != registry.creator {
        return Err(ContractError::Unauthorized {
            sender: sender.to_string(),
        });
    }
    Ok(())
}

fn check_can_send(
    deps: Deps,
    env: &Env,
    sender: &Addr,
    token: &TokenInfo,
) -> Result<(), ContractError> {
    if token.owner == *sender {
        return Ok(());
    }
    if token
        .approvals
        .iter()
        .any(|a| a.spender == *sender && !a.is_expired(&env.block))
    {
        return Ok(());
    }
    check_operator(deps, env, &token.owner, sender)
}

fn check_can_approve(
    deps: Deps,
    env: &Env,
    sender: &Addr,
    token: &TokenInfo,
) -> Result<(), ContractError> {
    if token.owner == *sender {
        return Ok(());
    }
    check_operator(deps, env, &token.owner, sender)
}

fn check_operator(deps: Deps, env: &Env, owner: &Addr, sender: &Addr) -> Result<(), ContractError> {
    match OPERATORS.may_load(deps.storage, (owner, sender))? {
        Some(expires) if !expires.is_expired(&env.block) => Ok(()),
        _ => Err(ContractError::Unauthorized {
            sender: sender.to_string(),
        }),
    }
}

// ============================== Query Handlers ==============================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::OwnerOf {
            token_id,
            include_expired,
        } => to_json_binary(&query_owner_of(
            deps,
            &env,
            token_id,
            include_expired.unwrap_or(false),
        )?),
        QueryMsg::Approval {
            token_id,
            spender,
            include_expired,
        } => to_json_binary(&query_approval(
            deps,
            &env,
            token_id,
            spender,
            include_expired.unwrap_or(false),
        )?),
        QueryMsg::Approvals {
            token_id,
            include_expired,
        } => to_json_binary(&query_approvals(
            deps,
            &env,
            token_id,
            include_expired.unwrap_or(false),
        )?),
        QueryMsg::Operator {
            owner,
            operator,
            include_expired,
        } => to_json_binary(&query_operator(
            deps,
            &env,
            owner,
            operator,
            include_expired.unwrap_or(false),
        )?),
        QueryMsg::AllOperators {
            owner,
            include_expired,
            start_after,
            limit,
        } => to_json_binary(&query_all_operators(
            deps,
            &env,
            owner,
            include_expired.unwrap_or(false),
            start_after,
            limit,
        )?),
        QueryMsg::NumTokens {} => to_json_binary(&NumTokensResponse {
            count: num_tokens(deps.storage)?,
        }),
        QueryMsg::ContractInfo {} => {
            let registry = REGISTRY_INFO.load(deps.storage)?;
            to_json_binary(&ContractInfoResponse {
                name: registry.name,
                symbol: registry.symbol,
            })
        }
        QueryMsg::NftInfo { token_id } => to_json_binary(&query_nft_info(deps, token_id)?),
        QueryMsg::AllNftInfo {
            token_id,
            include_expired,
        } => to_json_binary(&query_all_nft_info(
            deps,
            &env,
            token_id,
            include_expired.unwrap_or(false),
        )?),
        QueryMsg::Tokens {
            owner,
            start_after,
            limit,
        } => to_json_binary(&query_tokens(deps, owner, start_after, limit)?),
        QueryMsg::AllTokens { start_after, limit } => {
            to_json_binary(&query_all_tokens(deps, start_after, limit)?)
        }
        QueryMsg::RoyaltyInfo {
            token_id,
            sale_price,
        } => to_json_binary(&query_royalty_info(deps, token_id, sale_price)?),
    }
}

fn humanize_approvals(
    env: &Env,
    token: &TokenInfo,
    include_expired: bool,
) -> Vec<Cw721Approval> {
    token
        .approvals
        .iter()
        .filter(|a| include_expired || !a.is_expired(&env.block))
        .map(|a| Cw721Approval {
            spender: a.spender.to_string(),
            expires: a.expires,
        })
        .collect()
}

fn query_owner_of(
    deps: Deps,
    env: &Env,
    token_id: String,
    include_expired: bool,
) -> StdResult<OwnerOfResponse> {
    let token = tokens().load(deps.storage, &token_id)?;
    Ok(OwnerOfResponse {
        owner: token.owner.to_string(),
        approvals: humanize_approvals(env, &token, include_expired),
    })
}

fn query_approval(
    deps: Deps,
    env: &Env,
    token_id: String,
    spender: String,
    include_expired: bool,
) -> StdResult<ApprovalResponse> {
    let token = tokens().load(deps.storage, &token_id)?;
    let approval = token
        .approvals
        .iter()
        .find(|a| a.spender.as_str() == spender && (include_expired || !a.is_expired(&env.block)))
        .ok_or_else(|| StdError::not_found("Approval"))?;
    Ok(ApprovalResponse {
        approval: Cw721Approval {
            spender: approval.spender.to_string(),
            expires: approval.expires,
        },
    })
}

fn query_approvals(
    deps: Deps,
    env: &Env,
    token_id: String,
    include_expired: bool,
) -> StdResult<ApprovalsResponse> {
    let token = tokens().load(deps.storage, &token_id)?;
    Ok(ApprovalsResponse {
        approvals: humanize_approvals(env, &token, include_expired),
    })
}

fn query_operator(
    deps: Deps,
    env: &Env,
    owner: String,
    operator: String,
    include_expired: bool,
) -> StdResult<OperatorResponse> {
    let owner_addr = deps.api.addr_validate(&owner)?;
    let operator_addr = deps.api.addr_validate(&operator)?;
    match OPERATORS.may_load(deps.storage, (&owner_addr, &operator_addr))? {
        Some(expires) if include_expired || !expires.is_expired(&env.block) => {
            Ok(OperatorResponse {
                approval: Cw721Approval {
                    spender: operator,
                    expires,
                },
            })
        }
        _ => Err(StdError::not_found("Approval")),
    }
}

fn query_all_operators(
    deps: Deps,
    env: &Env,
    owner: String,
    include_expired: bool,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<OperatorsResponse> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let owner_addr = deps.api.addr_validate(&owner)?;
    let start_addr = maybe_addr(deps.api, start_after)?;
    let start = start_addr.as_ref().map(Bound::exclusive);

    let operators = OPERATORS
        .prefix(&owner_addr)
        .range(deps.storage, start, None, Order::Ascending)
        .filter(|r| {
            include_expired || r.is_err() || !r.as_ref().unwrap().1.is_expired(&env.block)
        })
        .take(limit)
        .map(|r| {
            r.map(|(spender, expires)| Cw721Approval {
                spender: spender.to_string(),
                expires,
            })
        })
        .collect::<StdResult<Vec<_>>>()?;
    Ok(OperatorsResponse { operators })
}

fn query_nft_info(deps: Deps, token_id: String) -> StdResult<NftInfoResponse<Extension>> {
    let token = tokens().load(deps.storage, &token_id)?;
    Ok(NftInfoResponse {
        token_uri: Some(token.token_uri),
        extension: None,
    })
}

fn query_all_nft_info(
    deps: Deps,
    env: &Env,
    token_id: String,
    include_expired: bool,
) -> StdResult<AllNftInfoResponse<Extension>> {
    let token = tokens().load(deps.storage, &token_id)?;
    Ok(AllNftInfoResponse {
        access: OwnerOfResponse {
            owner: token.owner.to_string(),
            approvals: humanize_approvals(env, &token, include_expired),
        },
        info: NftInfoResponse {
            token_uri: Some(token.token_uri),
            extension: None,
        },
    })
}

fn query_tokens(
    deps: Deps,
    owner: String,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<TokensResponse> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let owner_addr = deps.api.addr_validate(&owner)?;
    let start = start_after.as_deref().map(Bound::exclusive);

    let tokens_list = tokens()
        .idx
        .owner
        .prefix(owner_addr)
        .keys(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .collect::<StdResult<Vec<String>>>()?;
    Ok(TokensResponse {
        tokens: tokens_list,
    })
}

fn query_all_tokens(
    deps: Deps,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<TokensResponse> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.as_deref().map(Bound::exclusive);

    let tokens_list = tokens()
        .keys(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .collect::<StdResult<Vec<String>>>()?;
    Ok(TokensResponse {
        tokens: tokens_list,
    })
}

fn query_royalty_info(
    deps: Deps,
    token_id: String,
    sale_price: Uint128,
) -> StdResult<RoyaltiesInfoResponse> {
    tokens().load(deps.storage, &token_id)?;

    // per-token record shadows the registry default, even at zero bps
    let config = match TOKEN_ROYALTIES.may_load(deps.storage, &token_id)? {
        Some(config) => Some(config),
        None => DEFAULT_ROYALTY.may_load(deps.storage)?,
    };

    Ok(match config {
        Some(config) => RoyaltiesInfoResponse {
            address: config.recipient.to_string(),
            royalty_amount: sale_price.multiply_ratio(config.bps, BPS_DENOM),
        },
        None => RoyaltiesInfoResponse {
            address: String::default(),
            royalty_amount: Uint128::zero(),
        },
    })
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(_deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    Ok(Response::default())
}
