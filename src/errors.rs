use alloy_primitives::{Address, B256, U256};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Caller {0} is not the hook administrator")]
    Unauthorized(Address),

    #[error("Capture share {0} bps exceeds 10000")]
    InvalidCaptureShare(u32),

    #[error("Staleness threshold must be positive, got {0}s")]
    InvalidStalenessThreshold(u64),

    #[error("Invalid price feed id {0} for asset {1}")]
    InvalidFeedId(B256, Address),

    #[error("Price feed not found: {0}")]
    PriceFeedNotFound(B256),

    #[error("Executor captured {captured}, above hook share {hook_share}")]
    CaptureExceedsShare { captured: U256, hook_share: U256 },

    #[error("Arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error("Division by zero in {0}")]
    DivisionByZero(&'static str),

    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    #[error("Parse int error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),

    #[error("Hex parse error: {0}")]
    Hex(#[from] alloy_primitives::hex::FromHexError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Contract error: {0}")]
    Contract(
        #[from]
        ethers::contract::ContractError<ethers::providers::Provider<ethers::providers::Http>>,
    ),

    #[error("Serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}
