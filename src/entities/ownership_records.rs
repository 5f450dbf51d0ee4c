use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 物品归属记录
/// - 每次成功抽卡追加一条，创建后不可修改
/// - unique_id 由服务端生成 (UUID v4)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ownership_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub unique_id: Uuid,
    pub profile_id: Uuid,
    pub item_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profiles::Entity",
        from = "Column::ProfileId",
        to = "super::profiles::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Profile,
    #[sea_orm(
        belongs_to = "super::reward_items::Entity",
        from = "Column::ItemId",
        to = "super::reward_items::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    RewardItem,
}

impl Related<super::profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::reward_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RewardItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
