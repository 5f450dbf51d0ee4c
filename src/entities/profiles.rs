use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 玩家档案
/// - coins: 货币余额 (非负)
/// - consecutive_rolls_without_win: pity 计数，仅由抽卡事务修改
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub username: String,
    pub coins: i64,
    pub consecutive_rolls_without_win: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn can_afford(&self, cost: i64) -> bool {
        self.coins >= cost
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ownership_records::Entity")]
    OwnershipRecords,
}

impl Related<super::ownership_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OwnershipRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
