use thiserror::Error;

/// Rejections reported back to the actor who issued a land or bank operation.
///
/// None of these are fatal; every variant is rendered as a chat reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LandError {
    #[error("insufficient funds: costs {needed}, balance {available}")]
    InsufficientFunds { needed: u64, available: u64 },

    #[error("this land is not yours")]
    NotOwner,

    /// Claimed by someone else and not listed for sale.
    #[error("this land already has an owner and is not for sale")]
    AlreadyOwned,

    #[error("this land is already yours")]
    AlreadyYours,

    /// No block selected, or the selection cannot be used for this verb.
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("you do not have permission to do that")]
    NoPermission,

    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("player not found or offline: {0}")]
    PlayerNotFound(String),

    /// Recognised verb with bad arguments; the text is the usage line.
    #[error("{0}")]
    Usage(&'static str),
}
