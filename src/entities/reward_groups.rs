use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 稀有度分组
/// - base_weight: 基础权重 (basis points)，越小越稀有
/// - is_active = false 的分组永远不参与抽取
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "reward_groups")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub base_weight: i32,
    pub is_limited_edition: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::reward_items::Entity")]
    RewardItems,
}

impl Related<super::reward_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RewardItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
