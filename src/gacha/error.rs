use thiserror::Error;

/// 抽卡引擎自身的错误 (与存储无关)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GachaError {
    #[error("No eligible rewards")]
    NoEligibleRewards,

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl GachaError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        GachaError::InvalidConfiguration(msg.into())
    }
}
