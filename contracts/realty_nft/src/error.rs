use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("Unauthorized registry call with sender: {sender}")]
    Unauthorized { sender: String },

    #[error("Royalty of {bps} basis points is above the ceiling")]
    RoyaltyTooHigh { bps: u64 },

    #[error("Approval is expired")]
    Expired {},
}

impl From<ContractError> for String {
    /// Utility for explicit conversion to `String`.
    #[inline]
    fn from(err: ContractError) -> String {
        err.to_string()
    }
}
