pub mod app_state;
pub mod gacha;

pub use app_state::app_state_config;
pub use gacha::gacha_config;
