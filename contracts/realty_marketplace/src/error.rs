use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("Unauthorized market call with sender: {sender}")]
    Unauthorized { sender: String },

    #[error("Caller is not the token owner")]
    NotOwner {},

    #[error("Caller is not the listing seller")]
    NotSeller {},

    #[error("Escrow has no approval to take custody of the token")]
    NotApproved {},

    #[error("Price must be greater than zero")]
    InvalidPrice {},

    #[error("Token is already listed")]
    AlreadyListed {},

    #[error("Token is not listed")]
    NotListed {},

    #[error("Insufficient funds")]
    InsufficientFunds {},

    #[error("Funds amount is empty")]
    NoFunds {},

    #[error("Wrong payment denom, expected {denom}")]
    InvalidDenom { denom: String },

    #[error("Seller cannot buy their own listing")]
    SelfPurchase {},

    #[error("Fee of {bps} basis points is above the ceiling")]
    BpsTooHigh { bps: u64 },

    #[error("Market is paused")]
    Paused {},
}

impl From<ContractError> for String {
    /// Utility for explicit conversion to `String`.
    #[inline]
    fn from(err: ContractError) -> String {
        err.to_string()
    }
}
