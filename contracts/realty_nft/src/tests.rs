use crate::contract::{execute, instantiate, query};
use crate::error::ContractError;
use crate::msg::{ExecuteMsg, InstantiateMsg, QueryMsg};
use cosmwasm_std::testing::{mock_dependencies, mock_env, mock_info, MockApi, MockQuerier, MockStorage};
use cosmwasm_std::{from_json, Empty, OwnedDeps, Uint128};
use cw721::{NftInfoResponse, NumTokensResponse, OwnerOfResponse, TokensResponse};
use cw_utils::Expiration;
use realty::RoyaltiesInfoResponse;

const CREATOR: &str = "creator";
const MINTER: &str = "alice";
const ROYALTY_RECIPIENT: &str = "royalty_recipient";
const URI: &str = "ipfs://QmTudSYeM7mz3PkYEWXWqPjomRPHogcMFSq7XAvsvsgAPS";

fn setup_contract() -> OwnedDeps<MockStorage, MockApi, MockQuerier, Empty> {
    let mut deps = mock_dependencies();
    let msg = InstantiateMsg {
        name: String::from("Real Estate Registry"),
        symbol: String::from("ESTATE"),
    };
    let info = mock_info(CREATOR, &[]);
    let res = instantiate(deps.as_mut(), mock_env(), info, msg).unwrap();
    assert_eq!(0, res.messages.len());
    deps
}

fn mint(
    deps: &mut OwnedDeps<MockStorage, MockApi, MockQuerier, Empty>,
    minter: &str,
    recipient: Option<&str>,
    bps: Option<u64>,
) {
    let msg = ExecuteMsg::MintProperty {
        token_uri: URI.to_string(),
        royalty_recipient: recipient.map(String::from),
        royalty_bps: bps,
    };
    execute(deps.as_mut(), mock_env(), mock_info(minter, &[]), msg).unwrap();
}

fn royalty_of(
    deps: &OwnedDeps<MockStorage, MockApi, MockQuerier, Empty>,
    token_id: &str,
    sale_price: u128,
) -> RoyaltiesInfoResponse {
    let res = query(
        deps.as_ref(),
        mock_env(),
        QueryMsg::RoyaltyInfo {
            token_id: token_id.to_string(),
            sale_price: Uint128::from(sale_price),
        },
    )
    .unwrap();
    from_json(&res).unwrap()
}

#[test]
fn mint_assigns_sequential_ids() {
    let mut deps = setup_contract();
    mint(&mut deps, MINTER, None, None);
    mint(&mut deps, "bob", None, None);

    let res = query(deps.as_ref(), mock_env(), QueryMsg::NumTokens {}).unwrap();
    let count: NumTokensResponse = from_json(&res).unwrap();
    assert_eq!(2, count.count);

    let res = query(
        deps.as_ref(),
        mock_env(),
        QueryMsg::OwnerOf {
            token_id: "1".into(),
            include_expired: None,
        },
    )
    .unwrap();
    let owner: OwnerOfResponse = from_json(&res).unwrap();
    assert_eq!(MINTER, owner.owner);

    let res = query(
        deps.as_ref(),
        mock_env(),
        QueryMsg::NftInfo {
            token_id: "2".into(),
        },
    )
    .unwrap();
    let info: NftInfoResponse<Option<Empty>> = from_json(&res).unwrap();
    assert_eq!(Some(URI.to_string()), info.token_uri);
}

#[test]
fn only_owner_approved_or_operator_can_transfer() {
    let mut deps = setup_contract();
    mint(&mut deps, MINTER, None, None);

    let transfer = ExecuteMsg::TransferNft {
        recipient: "carol".into(),
        token_id: "1".into(),
    };

    // random sender is rejected
    let err = execute(
        deps.as_mut(),
        mock_env(),
        mock_info("mallory", &[]),
        transfer.clone(),
    )
    .unwrap_err();
    match err {
        ContractError::Unauthorized { .. } => {}
        e => panic!("unexpected error: {}", e),
    }

    // approved spender moves the token
    execute(
        deps.as_mut(),
        mock_env(),
        mock_info(MINTER, &[]),
        ExecuteMsg::Approve {
            spender: "escrow".into(),
            token_id: "1".into(),
            expires: None,
        },
    )
    .unwrap();
    execute(
        deps.as_mut(),
        mock_env(),
        mock_info("escrow", &[]),
        transfer,
    )
    .unwrap();

    let res = query(
        deps.as_ref(),
        mock_env(),
        QueryMsg::OwnerOf {
            token_id: "1".into(),
            include_expired: Some(true),
        },
    )
    .unwrap();
    let owner: OwnerOfResponse = from_json(&res).unwrap();
    assert_eq!("carol", owner.owner);
    // approvals are wiped with custody
    assert!(owner.approvals.is_empty());
}

#[test]
fn expired_approval_cannot_transfer() {
    let mut deps = setup_contract();
    mint(&mut deps, MINTER, None, None);

    let env = mock_env();
    execute(
        deps.as_mut(),
        env.clone(),
        mock_info(MINTER, &[]),
        ExecuteMsg::Approve {
            spender: "escrow".into(),
            token_id: "1".into(),
            expires: Some(Expiration::AtHeight(env.block.height + 1)),
        },
    )
    .unwrap();

    let mut late = mock_env();
    late.block.height = env.block.height + 10;
    let err = execute(
        deps.as_mut(),
        late,
        mock_info("escrow", &[]),
        ExecuteMsg::TransferNft {
            recipient: "carol".into(),
            token_id: "1".into(),
        },
    )
    .unwrap_err();
    assert!(matches!(err, ContractError::Unauthorized { .. }));
}

#[test]
fn operator_approval_is_blanket() {
    let mut deps = setup_contract();
    mint(&mut deps, MINTER, None, None);
    mint(&mut deps, MINTER, None, None);

    execute(
        deps.as_mut(),
        mock_env(),
        mock_info(MINTER, &[]),
        ExecuteMsg::ApproveAll {
            operator: "manager".into(),
            expires: None,
        },
    )
    .unwrap();

    for token_id in ["1", "2"] {
        execute(
            deps.as_mut(),
            mock_env(),
            mock_info("manager", &[]),
            ExecuteMsg::TransferNft {
                recipient: "manager".into(),
                token_id: token_id.into(),
            },
        )
        .unwrap();
    }

    // revoked operator loses access to tokens it now does not own
    execute(
        deps.as_mut(),
        mock_env(),
        mock_info("manager", &[]),
        ExecuteMsg::TransferNft {
            recipient: MINTER.into(),
            token_id: "1".into(),
        },
    )
    .unwrap();
    execute(
        deps.as_mut(),
        mock_env(),
        mock_info(MINTER, &[]),
        ExecuteMsg::RevokeAll {
            operator: "manager".into(),
        },
    )
    .unwrap();
    let err = execute(
        deps.as_mut(),
        mock_env(),
        mock_info("manager", &[]),
        ExecuteMsg::TransferNft {
            recipient: "manager".into(),
            token_id: "1".into(),
        },
    )
    .unwrap_err();
    assert!(matches!(err, ContractError::Unauthorized { .. }));
}

#[test]
fn royalty_resolution_per_token_then_default_then_zero() {
    let mut deps = setup_contract();
    // token 1 with its own 5% schedule, token 2 without any
    mint(&mut deps, MINTER, Some(ROYALTY_RECIPIENT), Some(500));
    mint(&mut deps, MINTER, None, None);

    let info = royalty_of(&deps, "1", 10_000_000);
    assert_eq!(ROYALTY_RECIPIENT, info.address);
    assert_eq!(Uint128::from(500_000u128), info.royalty_amount);

    // nothing recorded, nothing owed
    let info = royalty_of(&deps, "2", 10_000_000);
    assert_eq!(Uint128::zero(), info.royalty_amount);

    // registry default kicks in as the fallback
    execute(
        deps.as_mut(),
        mock_env(),
        mock_info(CREATOR, &[]),
        ExecuteMsg::SetDefaultRoyalty {
            recipient: "estate_dao".into(),
            bps: 100,
        },
    )
    .unwrap();
    let info = royalty_of(&deps, "2", 10_000_000);
    assert_eq!("estate_dao", info.address);
    assert_eq!(Uint128::from(100_000u128), info.royalty_amount);

    // per-token record still shadows it
    let info = royalty_of(&deps, "1", 10_000_000);
    assert_eq!(ROYALTY_RECIPIENT, info.address);

    // reset sends token 1 to the default, delete drops everything
    execute(
        deps.as_mut(),
        mock_env(),
        mock_info(CREATOR, &[]),
        ExecuteMsg::ResetTokenRoyalty {
            token_id: "1".into(),
        },
    )
    .unwrap();
    let info = royalty_of(&deps, "1", 10_000_000);
    assert_eq!("estate_dao", info.address);

    execute(
        deps.as_mut(),
        mock_env(),
        mock_info(CREATOR, &[]),
        ExecuteMsg::DeleteDefaultRoyalty {},
    )
    .unwrap();
    let info = royalty_of(&deps, "1", 10_000_000);
    assert_eq!(Uint128::zero(), info.royalty_amount);
}

#[test]
fn zero_bps_record_is_allowed() {
    let mut deps = setup_contract();
    mint(&mut deps, MINTER, Some(ROYALTY_RECIPIENT), Some(0));

    let info = royalty_of(&deps, "1", 1_000_000);
    assert_eq!(Uint128::zero(), info.royalty_amount);
}

#[test]
fn royalty_ceiling_is_enforced() {
    let mut deps = setup_contract();
    let err = execute(
        deps.as_mut(),
        mock_env(),
        mock_info(MINTER, &[]),
        ExecuteMsg::MintProperty {
            token_uri: URI.to_string(),
            royalty_recipient: Some(ROYALTY_RECIPIENT.into()),
            royalty_bps: Some(3000),
        },
    )
    .unwrap_err();
    match err {
        ContractError::RoyaltyTooHigh { bps } => assert_eq!(3000, bps),
        e => panic!("unexpected error: {}", e),
    }

    let err = execute(
        deps.as_mut(),
        mock_env(),
        mock_info(CREATOR, &[]),
        ExecuteMsg::SetDefaultRoyalty {
            recipient: ROYALTY_RECIPIENT.into(),
            bps: 2001,
        },
    )
    .unwrap_err();
    assert!(matches!(err, ContractError::RoyaltyTooHigh { .. }));
}

#[test]
fn royalty_admin_is_creator_gated() {
    let mut deps = setup_contract();
    mint(&mut deps, MINTER, Some(ROYALTY_RECIPIENT), Some(500));

    for msg in [
        ExecuteMsg::SetDefaultRoyalty {
            recipient: MINTER.into(),
            bps: 100,
        },
        ExecuteMsg::DeleteDefaultRoyalty {},
        ExecuteMsg::ResetTokenRoyalty {
            token_id: "1".into(),
        },
    ] {
        let err = execute(deps.as_mut(), mock_env(), mock_info(MINTER, &[]), msg).unwrap_err();
        assert!(matches!(err, ContractError::Unauthorized { .. }));
    }
}

#[test]
fn tokens_by_owner() {
    let mut deps = setup_contract();
    mint(&mut deps, MINTER, None, None);
    mint(&mut deps, "bob", None, None);
    mint(&mut deps, MINTER, None, None);

    let res = query(
        deps.as_ref(),
        mock_env(),
        QueryMsg::Tokens {
            owner: MINTER.into(),
            start_after: None,
            limit: None,
        },
    )
    .unwrap();
    let tokens: TokensResponse = from_json(&res).unwrap();
    assert_eq!(vec!["1".to_string(), "3".to_string()], tokens.tokens);

    let res = query(
        deps.as_ref(),
        mock_env(),
        QueryMsg::AllTokens {
            start_after: Some("1".into()),
            limit: None,
        },
    )
    .unwrap();
    let tokens: TokensResponse = from_json(&res).unwrap();
    assert_eq!(vec!["2".to_string(), "3".to_string()], tokens.tokens);
}
