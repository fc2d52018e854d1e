use crate::error::ContractError;
use crate::msg::{
    DepositResponse, ExecuteMsg, InstantiateMsg, ListingResponse, ListingsResponse, MigrateMsg,
    QueryMsg, UpdateContractMsg,
};
use crate::state::{ContractInfo, Deposit, Listing, CONTRACT_INFO, DEPOSITS, LISTINGS};
use cosmwasm_std::{
    attr, entry_point, to_json_binary, Attribute, BankMsg, Binary, Coin, CosmosMsg, Deps, DepsMut,
    Env, MessageInfo, Order, Response, StdError, StdResult, Uint128, WasmMsg,
};
use cw2::set_contract_version;
use cw721::{Cw721ExecuteMsg, Cw721QueryMsg, OperatorResponse, OwnerOfResponse};
use cw_storage_plus::Bound;
use realty::{ProceedsSplit, RoyaltiesInfoResponse, RoyaltyQueryMsg, MAX_FEE_BPS};

const CONTRACT_NAME: &str = "crates.io:realty_escrow";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

// settings for pagination
const MAX_LIMIT: u8 = 100;
const DEFAULT_LIMIT: u8 = 100;

fn sanitize_fee(bps: u64) -> Result<u64, ContractError> {
    if bps > MAX_FEE_BPS {
        return Err(ContractError::BpsTooHigh { bps });
    }
    Ok(bps)
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    let fee_recipient = match msg.fee_recipient {
        Some(addr) => deps.api.addr_validate(&addr)?,
        None => info.sender.clone(),
    };
    let contract_info = ContractInfo {
        name: msg.name,
        creator: info.sender.to_string(),
        denom: msg.denom,
        nft_addr: deps.api.addr_validate(&msg.nft_addr)?,
        fee_recipient,
        fee_bps: sanitize_fee(msg.fee_bps)?,
        paused: false,
    };
    CONTRACT_INFO.save(deps.storage, &contract_info)?;
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
        ExecuteMsg::ListProperty { token_id, price } => {
            try_list_property(deps, env, info, token_id, price)
        }
        ExecuteMsg::UpdatePrice { token_id, price } => {
            try_update_price(deps, info, token_id, price)
        }
        ExecuteMsg::CancelListing { token_id } => try_cancel_listing(deps, info, token_id),
        ExecuteMsg::DepositEarnest { token_id } => try_deposit_earnest(deps, info, token_id),
        ExecuteMsg::FinalizeSale { token_id } => try_finalize_sale(deps, info, token_id),
        ExecuteMsg::UpdateInfo(msg) => try_update_info(deps, info, msg),
        ExecuteMsg::Pause {} => try_set_paused(deps, info, true),
        ExecuteMsg::Unpause {} => try_set_paused(deps, info, false),
    }
}

// ============================== Message Handlers ==============================

pub fn try_list_property(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    token_id: String,
    price: Uint128,
) -> Result<Response, ContractError> {
    let contract_info = CONTRACT_INFO.load(deps.storage)?;
    assert_not_paused(&contract_info)?;

    if price.is_zero() {
        return Err(ContractError::InvalidPrice {});
    }
    if let Some(listing) = LISTINGS.may_load(deps.storage, &token_id)? {
        if listing.active {
            return Err(ContractError::AlreadyListed {});
        }
    }

    let owner_rsp = verify_owner(
        deps.as_ref(),
        contract_info.nft_addr.as_str(),
        &token_id,
        info.sender.as_str(),
    )?;

    // the escrow needs a live approval (token or operator) before it can
    // pull the asset into custody
    let escrow = env.contract.address;
    let approved = owner_rsp
        .approvals
        .iter()
        .any(|a| a.spender == escrow.as_str());
    if !approved {
        let operator: StdResult<OperatorResponse> = deps.querier.query_wasm_smart(
            contract_info.nft_addr.clone(),
            &Cw721QueryMsg::Operator {
                owner: owner_rsp.owner.clone(),
                operator: escrow.to_string(),
                include_expired: Some(false),
            },
        );
        if operator.is_err() {
            return Err(ContractError::NotApproved {});
        }
    }

    LISTINGS.save(
        deps.storage,
        &token_id,
        &Listing {
            seller: info.sender.clone(),
            price,
            active: true,
        },
    )?;

    // take custody while the listing is live
    let transfer_cw721_msg = Cw721ExecuteMsg::TransferNft {
        recipient: escrow.to_string(),
        token_id: token_id.clone(),
    };
    let exec_cw721_transfer = WasmMsg::Execute {
        contract_addr: contract_info.nft_addr.to_string(),
        msg: to_json_binary(&transfer_cw721_msg)?,
        funds: vec![],
    };

    Ok(Response::new()
        .add_message(exec_cw721_transfer)
        .add_attributes(vec![
            attr("action", "list_property"),
            attr("token_id", token_id),
            attr("seller", info.sender),
            attr("price", price),
        ]))
}

pub fn try_update_price(
    deps: DepsMut,
    info: MessageInfo,
    token_id: String,
    price: Uint128,
) -> Result<Response, ContractError> {
    let contract_info = CONTRACT_INFO.load(deps.storage)?;
    assert_not_paused(&contract_info)?;

    let mut listing = load_active_listing(deps.as_ref(), &token_id)?;
    if listing.seller != info.sender {
        return Err(ContractError::NotSeller {});
    }
    if price.is_zero() {
        return Err(ContractError::InvalidPrice {});
    }

    listing.price = price;
    LISTINGS.save(deps.storage, &token_id, &listing)?;

    Ok(Response::new().add_attributes(vec![
        attr("action", "update_price"),
        attr("token_id", token_id),
        attr("price", price),
    ]))
}

pub fn try_cancel_listing(
    deps: DepsMut,
    info: MessageInfo,
    token_id: String,
) -> Result<Response, ContractError> {
    let contract_info = CONTRACT_INFO.load(deps.storage)?;
    assert_not_paused(&contract_info)?;

    let mut listing = load_active_listing(deps.as_ref(), &token_id)?;
    if listing.seller != info.sender {
        return Err(ContractError::NotSeller {});
    }

    listing.active = false;
    listing.price = Uint128::zero();
    LISTINGS.save(deps.storage, &token_id, &listing)?;

    let mut cosmos_msgs: Vec<CosmosMsg> = vec![];
    let mut attributes = vec![
        attr("action", "cancel_listing"),
        attr("token_id", token_id.clone()),
        attr("seller", info.sender.clone()),
    ];

    // custody goes back to the seller
    let transfer_cw721_msg = Cw721ExecuteMsg::TransferNft {
        recipient: info.sender.to_string(),
        token_id: token_id.clone(),
    };
    cosmos_msgs.push(
        WasmMsg::Execute {
            contract_addr: contract_info.nft_addr.to_string(),
            msg: to_json_binary(&transfer_cw721_msg)?,
            funds: vec![],
        }
        .into(),
    );

    // earnest money goes back to its depositor, in full
    if let Some(deposit) = DEPOSITS.may_load(deps.storage, &token_id)? {
        cosmos_msgs.push(
            BankMsg::Send {
                to_address: deposit.buyer.to_string(),
                amount: vec![Coin {
                    denom: contract_info.denom,
                    amount: deposit.amount,
                }],
            }
            .into(),
        );
        attributes.push(attr("refund", deposit.amount));
        attributes.push(attr("refund_receiver", deposit.buyer));
        DEPOSITS.remove(deps.storage, &token_id);
    }

    Ok(Response::new()
        .add_messages(cosmos_msgs)
        .add_attributes(attributes))
}

pub fn try_deposit_earnest(
    deps: DepsMut,
    info: MessageInfo,
    token_id: String,
) -> Result<Response, ContractError> {
    let contract_info = CONTRACT_INFO.load(deps.storage)?;
    assert_not_paused(&contract_info)?;

    let listing = load_active_listing(deps.as_ref(), &token_id)?;
    if listing.seller == info.sender {
        return Err(ContractError::SelfPurchase {});
    }

    let amount = collect_funds(&info.funds, &contract_info.denom)?;

    // the first depositor commits as the buyer for this listing
    let deposit = match DEPOSITS.may_load(deps.storage, &token_id)? {
        Some(mut deposit) => {
            if deposit.buyer != info.sender {
                return Err(ContractError::BuyerMismatch {
                    buyer: deposit.buyer.to_string(),
                });
            }
            deposit.amount += amount;
            deposit
        }
        None => Deposit {
            buyer: info.sender.clone(),
            amount,
        },
    };
    DEPOSITS.save(deps.storage, &token_id, &deposit)?;

    Ok(Response::new().add_attributes(vec![
        attr("action", "deposit_earnest"),
        attr("token_id", token_id),
        attr("buyer", info.sender),
        attr("amount", amount),
        attr("total_deposit", deposit.amount),
    ]))
}

pub fn try_finalize_sale(
    deps: DepsMut,
    info: MessageInfo,
    token_id: String,
) -> Result<Response, ContractError> {
    let contract_info = CONTRACT_INFO.load(deps.storage)?;
    assert_not_paused(&contract_info)?;

    let mut listing = load_active_listing(deps.as_ref(), &token_id)?;
    let deposit = DEPOSITS
        .may_load(deps.storage, &token_id)?
        .ok_or(ContractError::NoDeposit {})?;
    if info.sender != deposit.buyer && info.sender != listing.seller {
        return Err(ContractError::NotParticipant {});
    }
    if deposit.amount < listing.price {
        return Err(ContractError::InsufficientFunds {});
    }

    // royalty schedule comes from the registry: per-token, else default, else zero
    let royalty_rsp: RoyaltiesInfoResponse = deps.querier.query_wasm_smart(
        contract_info.nft_addr.clone(),
        &RoyaltyQueryMsg::RoyaltyInfo {
            token_id: token_id.clone(),
            sale_price: listing.price,
        },
    )?;
    let split = ProceedsSplit::compute(
        listing.price,
        contract_info.fee_bps,
        royalty_rsp.royalty_amount,
    )?;
    let refund = deposit
        .amount
        .checked_sub(listing.price)
        .map_err(StdError::from)?;

    let mut cosmos_msgs: Vec<CosmosMsg> = vec![];

    // custody to the committed buyer
    let transfer_cw721_msg = Cw721ExecuteMsg::TransferNft {
        recipient: deposit.buyer.to_string(),
        token_id: token_id.clone(),
    };
    cosmos_msgs.push(
        WasmMsg::Execute {
            contract_addr: contract_info.nft_addr.to_string(),
            msg: to_json_binary(&transfer_cw721_msg)?,
            funds: vec![],
        }
        .into(),
    );

    // pay out all legs from the accumulated balance, zero legs are skipped
    if !split.fee.is_zero() {
        cosmos_msgs.push(
            BankMsg::Send {
                to_address: contract_info.fee_recipient.to_string(),
                amount: vec![Coin {
                    denom: contract_info.denom.clone(),
                    amount: split.fee,
                }],
            }
            .into(),
        );
    }
    if !split.royalty.is_zero() {
        let royalty_recipient = deps.api.addr_validate(&royalty_rsp.address)?;
        cosmos_msgs.push(
            BankMsg::Send {
                to_address: royalty_recipient.to_string(),
                amount: vec![Coin {
                    denom: contract_info.denom.clone(),
                    amount: split.royalty,
                }],
            }
            .into(),
        );
    }
    if !split.seller_amount.is_zero() {
        cosmos_msgs.push(
            BankMsg::Send {
                to_address: listing.seller.to_string(),
                amount: vec![Coin {
                    denom: contract_info.denom.clone(),
                    amount: split.seller_amount,
                }],
            }
            .into(),
        );
    }

    let mut attributes: Vec<Attribute> = vec![
        attr("action", "finalize_sale"),
        attr("token_id", token_id.clone()),
        attr("buyer", deposit.buyer.clone()),
        attr("seller", listing.seller.clone()),
        attr("price", listing.price),
        attr("platform_fee", split.fee),
        attr("royalty", split.royalty),
        attr("seller_amount", split.seller_amount),
    ];
    if !split.royalty.is_zero() {
        attributes.push(attr("royalty_recipient", royalty_rsp.address));
    }

    // anything deposited beyond the price goes straight back to the buyer
    if !refund.is_zero() {
        cosmos_msgs.push(
            BankMsg::Send {
                to_address: deposit.buyer.to_string(),
                amount: vec![Coin {
                    denom: contract_info.denom,
                    amount: refund,
                }],
            }
            .into(),
        );
        attributes.push(attr("refund", refund));
    }

    DEPOSITS.remove(deps.storage, &token_id);
    listing.active = false;
    listing.price = Uint128::zero();
    LISTINGS.save(deps.storage, &token_id, &listing)?;

    Ok(Response::new()
        .add_messages(cosmos_msgs)
        .add_attributes(attributes))
}

pub fn try_update_info(
    deps: DepsMut,
    info: MessageInfo,
    msg: UpdateContractMsg,
) -> Result<Response, ContractError> {
    let nft_addr = msg
        .nft_addr
        .as_deref()
        .map(|addr| deps.api.addr_validate(addr))
        .transpose()?;
    let fee_recipient = msg
        .fee_recipient
        .as_deref()
        .map(|addr| deps.api.addr_validate(addr))
        .transpose()?;

    let new_contract_info = CONTRACT_INFO.update(deps.storage, |mut contract_info| {
        // Unauthorized
        if !info.sender.to_string().eq(&contract_info.creator) {
            return Err(ContractError::Unauthorized {
                sender: info.sender.to_string(),
            });
        }
        if let Some(name) = msg.name {
            contract_info.name = name;
        }
        if let Some(creator) = msg.creator {
            contract_info.creator = creator;
        }
        if let Some(denom) = msg.denom {
            contract_info.denom = denom;
        }
        if let Some(nft_addr) = nft_addr {
            contract_info.nft_addr = nft_addr;
        }
        if let Some(fee_recipient) = fee_recipient {
            contract_info.fee_recipient = fee_recipient;
        }
        if let Some(fee_bps) = msg.fee_bps {
            contract_info.fee_bps = sanitize_fee(fee_bps)?;
        }
        Ok(contract_info)
    })?;

    Ok(Response::new()
        .add_attributes(vec![attr("action", "update_info")])
        .set_data(to_json_binary(&new_contract_info)?))
}

pub fn try_set_paused(
    deps: DepsMut,
    info: MessageInfo,
    paused: bool,
) -> Result<Response, ContractError> {
    CONTRACT_INFO.update(deps.storage, |mut contract_info| {
        if !info.sender.to_string().eq(&contract_info.creator) {
            return Err(ContractError::Unauthorized {
                sender: info.sender.to_string(),
            });
        }
        contract_info.paused = paused;
        Ok(contract_info)
    })?;

    Ok(Response::new().add_attributes(vec![attr(
        "action",
        if paused { "pause" } else { "unpause" },
    )]))
}

// ============================== Guards ==============================

fn assert_not_paused(contract_info: &ContractInfo) -> Result<(), ContractError> {
    if contract_info.paused {
        return Err(ContractError::Paused {});
    }
    Ok(())
}

fn load_active_listing(deps: Deps, token_id: &str) -> Result<Listing, ContractError> {
    match LISTINGS.may_load(deps.storage, token_id)? {
        Some(listing) if listing.active => Ok(listing),
        _ => Err(ContractError::NotListed {}),
    }
}

/// sums the sent coins in the settlement denom
fn collect_funds(funds: &[Coin], denom: &str) -> Result<Uint128, ContractError> {
    if funds.is_empty() {
        return Err(ContractError::NoFunds {});
    }
    let amount = funds
        .iter()
        .filter(|coin| coin.denom == denom)
        .fold(Uint128::zero(), |acc, coin| acc + coin.amount);
    if amount.is_zero() {
        return Err(ContractError::InvalidDenom {
            denom: denom.to_string(),
        });
    }
    Ok(amount)
}

/// checks the registry's custody record against the expected holder
pub fn verify_owner(
    deps: Deps,
    nft_addr: &str,
    token_id: &str,
    expected: &str,
) -> Result<OwnerOfResponse, ContractError> {
    let owner_rsp: OwnerOfResponse = deps.querier.query_wasm_smart(
        nft_addr,
        &Cw721QueryMsg::OwnerOf {
            token_id: token_id.to_string(),
            include_expired: Some(false),
        },
    )?;
    if owner_rsp.owner != expected {
        return Err(ContractError::NotOwner {});
    }
    Ok(owner_rsp)
}

// ============================== Query Handlers ==============================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::GetContractInfo {} => to_json_binary(&CONTRACT_INFO.load(deps.storage)?),
        QueryMsg::GetListing { token_id } => to_json_binary(&query_listing(deps, token_id)?),
        QueryMsg::GetListings {
            offset,
            limit,
            order,
        } => to_json_binary(&query_listings(deps, offset, limit, order)?),
        QueryMsg::GetDeposit { token_id } => to_json_binary(&query_deposit(deps, token_id)?),
    }
}

fn query_listing(deps: Deps, token_id: String) -> StdResult<ListingResponse> {
    let listing = LISTINGS.load(deps.storage, &token_id)?;
    Ok(ListingResponse {
        token_id,
        seller: listing.seller,
        price: listing.price,
        active: listing.active,
    })
}

fn query_deposit(deps: Deps, token_id: String) -> StdResult<DepositResponse> {
    let deposit = DEPOSITS.load(deps.storage, &token_id)?;
    Ok(DepositResponse {
        token_id,
        buyer: deposit.buyer,
        amount: deposit.amount,
    })
}

fn query_listings(
    deps: Deps,
    offset: Option<String>,
    limit: Option<u8>,
    order: Option<u8>,
) -> StdResult<ListingsResponse> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;

    let mut min: Option<Bound<&str>> = None;
    let mut max: Option<Bound<&str>> = None;
    let mut order_enum = Order::Ascending;
    if let Some(num) = order {
        if num == 2 {
            order_enum = Order::Descending;
        }
    }

    // if there is an offset, assign to min or max
    if let Some(offset) = offset.as_deref() {
        let offset_value = Some(Bound::exclusive(offset));
        match order_enum {
            Order::Ascending => min = offset_value,
            Order::Descending => max = offset_value,
        }
    };

    let listings = LISTINGS
        .range(deps.storage, min, max, order_enum)
        .take(limit)
        .map(|item| {
            item.map(|(token_id, listing)| ListingResponse {
                token_id,
                seller: listing.seller,
                price: listing.price,
                active: listing.active,
            })
        })
        .collect::<StdResult<Vec<_>>>()?;

    Ok(ListingsResponse { listings })
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(_deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    Ok(Response::default())
}
