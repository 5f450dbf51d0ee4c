//! 加权抽卡引擎
//!
//! 一次抽卡分两步：先按 pity 加成后归一化的分布抽分组，再在组内抽物品。
//! 本模块不访问数据库，落库见 `services::gacha_service`。

pub mod basis_points;
pub mod distribution;
pub mod error;
pub mod group_weights;
pub mod item_selector;
pub mod pity;

pub use basis_points::BasisPoints;
pub use error::GachaError;
pub use group_weights::{GroupCandidate, GroupDistribution, GroupWeight, GroupWeightCalculator};
pub use item_selector::{ItemCandidate, ItemDistribution, ItemSelector, SelectionMode, Stock};
pub use pity::{BoostFormula, CounterUpdate, PityOutcome, PityPolicy, next_counter};

use rand::Rng;
use std::collections::HashMap;

use crate::entities::{reward_group_entity, reward_item_entity};

/// 至少拥有一个可抽取物品的启用分组及其物品
#[derive(Debug, Clone, Default)]
pub struct RewardPool {
    groups: Vec<GroupCandidate>,
    items: HashMap<i64, Vec<ItemCandidate>>,
}

impl RewardPool {
    pub fn from_models(
        groups: &[reward_group_entity::Model],
        items: &[reward_item_entity::Model],
    ) -> Result<Self, GachaError> {
        let mut by_group: HashMap<i64, Vec<ItemCandidate>> = HashMap::new();
        for item in items {
            // 未分组的物品不参与抽取
            let Some(group_id) = item.group_id else {
                continue;
            };
            if let Some(candidate) = ItemCandidate::from_model(item)? {
                by_group.entry(group_id).or_default().push(candidate);
            }
        }

        let mut candidates = Vec::new();
        for group in groups.iter().filter(|g| g.is_active) {
            let candidate = GroupCandidate::try_from(group)?;
            if by_group.get(&group.id).is_some_and(|items| !items.is_empty()) {
                candidates.push(candidate);
            }
        }
        by_group.retain(|id, _| candidates.iter().any(|g| g.id == *id));

        Ok(Self {
            groups: candidates,
            items: by_group,
        })
    }

    pub fn groups(&self) -> &[GroupCandidate] {
        &self.groups
    }

    pub fn items_in(&self, group_id: i64) -> &[ItemCandidate] {
        self.items.get(&group_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// 一次抽卡两步抽取的结果
#[derive(Debug, Clone, PartialEq)]
pub struct RollDraw {
    pub group: GroupWeight,
    pub item: ItemCandidate,
    pub pity_multiplier: u32,
}

/// 先抽分组再抽物品，每步各取一个随机值
pub fn draw<R: Rng + ?Sized>(
    pool: &RewardPool,
    policy: &PityPolicy,
    counter: u32,
    rng: &mut R,
) -> Result<RollDraw, GachaError> {
    let groups = GroupWeightCalculator::new(policy).calculate(pool.groups(), counter)?;
    let group = groups.select(rng).clone();

    let candidates = pool.items_in(group.group_id);
    let item_id = ItemSelector::distribution(candidates)?.select(rng);
    let item = candidates
        .iter()
        .find(|i| i.id == item_id)
        .copied()
        .ok_or(GachaError::NoEligibleRewards)?;

    Ok(RollDraw {
        group,
        item,
        pity_multiplier: groups.pity_multiplier(),
    })
}
