use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{
    ownership_record_entity as record_entity, reward_group_entity as group_entity,
    reward_item_entity as item_entity,
};
use crate::gacha::{GroupDistribution, GroupWeight};

use super::PaginatedResponse;

/// 抽中的物品
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RolledItem {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub group_id: i64,
    pub group_name: String,
    /// 限定分组
    pub is_limited_edition: bool,
}

impl RolledItem {
    pub fn new(item: &item_entity::Model, group: &group_entity::Model) -> Self {
        RolledItem {
            id: item.id,
            name: item.name.clone(),
            description: item.description.clone(),
            image: item.image.clone(),
            group_id: group.id,
            group_name: group.name.clone(),
            is_limited_edition: group.is_limited_edition,
        }
    }
}

/// 抽卡 (Roll) 响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RollResponse {
    pub item: RolledItem,
    /// 归属记录唯一ID
    pub record_id: Uuid,
    pub rolled_at: DateTime<Utc>,
    /// 扣费后的余额
    pub balance: i64,
    /// 更新后的 pity 计数
    pub pity_counter: i32,
    /// 本次是否算作“中” (计数清零)
    pub is_win: bool,
    /// 本次抽取时 pity 加成是否生效
    pub pity_boosted: bool,
}

/// 单个分组的当前概率
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GroupOddsResponse {
    pub group_id: i64,
    pub name: String,
    pub is_limited_edition: bool,
    /// 基础权重 (basis points)
    pub base_weight: u32,
    /// pity 加成后的相对权重
    pub adjusted_weight: f64,
    /// 归一化概率 [0, 1]
    pub probability: f64,
}

impl GroupOddsResponse {
    pub fn new(weight: &GroupWeight, group: Option<&group_entity::Model>) -> Self {
        GroupOddsResponse {
            group_id: weight.group_id,
            name: group.map(|g| g.name.clone()).unwrap_or_default(),
            is_limited_edition: group.is_some_and(|g| g.is_limited_edition),
            base_weight: weight.base_weight.get(),
            adjusted_weight: weight.adjusted_weight,
            probability: weight.probability,
        }
    }
}

/// 概率预览响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OddsResponse {
    pub pity_counter: i32,
    pub pity_multiplier: u32,
    pub groups: Vec<GroupOddsResponse>,
}

impl OddsResponse {
    pub fn new(
        pity_counter: i32,
        distribution: &GroupDistribution,
        groups: &[group_entity::Model],
    ) -> Self {
        OddsResponse {
            pity_counter,
            pity_multiplier: distribution.pity_multiplier(),
            groups: distribution
                .entries()
                .iter()
                .map(|w| GroupOddsResponse::new(w, groups.iter().find(|g| g.id == w.group_id)))
                .collect(),
        }
    }
}

/// 归属记录查询参数
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct OwnershipRecordQuery {
    /// 页码 (默认 1)
    pub page: Option<u32>,
    /// 每页数量 (默认 20)
    pub per_page: Option<u32>,
}

/// 归属记录响应
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OwnershipRecordResponse {
    pub unique_id: Uuid,
    pub item_id: i64,
    /// 物品已被删除时为空
    pub item_name: Option<String>,
    pub item_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<(record_entity::Model, Option<item_entity::Model>)> for OwnershipRecordResponse {
    fn from((record, item): (record_entity::Model, Option<item_entity::Model>)) -> Self {
        OwnershipRecordResponse {
            unique_id: record.unique_id,
            item_id: record.item_id,
            item_name: item.as_ref().map(|i| i.name.clone()),
            item_image: item.and_then(|i| i.image),
            created_at: record.created_at,
        }
    }
}

/// 归属记录分页响应
pub type OwnershipRecordPageResponse = PaginatedResponse<OwnershipRecordResponse>;
