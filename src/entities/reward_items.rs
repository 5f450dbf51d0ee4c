use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// -1 表示无限库存
pub const UNLIMITED_STOCK: i32 = -1;

/// 奖励物品
/// - stock_quantity: -1 无限; > 0 剩余数量; 0 已售罄 (不可抽取)
/// - manual_weight: 手动权重 (basis points)，仅对无限库存物品生效
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "reward_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub group_id: Option<i64>,
    pub stock_quantity: i32,
    pub manual_weight: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn is_unlimited(&self) -> bool {
        self.stock_quantity == UNLIMITED_STOCK
    }

    /// 启用且 (无限库存 或 剩余 > 0)
    pub fn is_available(&self) -> bool {
        self.is_active && (self.is_unlimited() || self.stock_quantity > 0)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::reward_groups::Entity",
        from = "Column::GroupId",
        to = "super::reward_groups::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    RewardGroup,
}

impl Related<super::reward_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RewardGroup.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
