pub mod ownership_records;
pub mod pity_policies;
pub mod profiles;
pub mod reward_groups;
pub mod reward_items;

pub use ownership_records as ownership_record_entity;
pub use pity_policies as pity_policy_entity;
pub use profiles as profile_entity;
pub use reward_groups as reward_group_entity;
pub use reward_items as reward_item_entity;

pub use reward_items::UNLIMITED_STOCK;
