pub mod gacha_service;
pub mod pity_config_service;

pub use gacha_service::*;
pub use pity_config_service::*;
