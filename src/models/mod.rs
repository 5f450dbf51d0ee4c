pub mod common;
pub mod gacha;
pub mod pagination;
pub mod pity_config;

pub use common::*;
pub use gacha::*;
pub use pagination::*;
pub use pity_config::*;
